use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Who is responsible for removing a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    /// Removed when the [`Workspace`] is dropped, on every exit path
    Scoped,
    /// Left on disk for the execution backend or a later cleanup pass
    Detached,
}

/// Allocates workspaces under a single root directory
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates a fresh, empty workspace directory
    pub fn create(&self, cleanup: Cleanup) -> io::Result<Workspace> {
        fs::create_dir_all(&self.root)?;
        // Runners spawn artifacts by path, so the workspace must be absolute
        let root = fs::canonicalize(&self.root)?;

        let id = Uuid::new_v4().to_string();
        let path = root.join(&id);
        fs::create_dir(&path)?;

        log::debug!("Created workspace {} ({cleanup:?})", path.display());
        Ok(Workspace { id, path, cleanup })
    }
}

/// A directory holding one execution's source files and build artifacts
///
/// Each workspace is named by a fresh UUID under the manager's root and is
/// owned by exactly one request. Whether dropping it removes the directory is
/// decided by its [`Cleanup`] flag.
#[derive(Debug)]
pub struct Workspace {
    id: String,
    path: PathBuf,
    cleanup: Cleanup,
}

impl Workspace {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cleanup(&self) -> Cleanup {
        self.cleanup
    }

    /// Hands ownership of the directory to someone else; dropping no longer removes it
    pub fn detach(&mut self) {
        self.cleanup = Cleanup::Detached;
    }

    /// Writes each file under its base name and returns how many were written
    ///
    /// Directory components in the supplied names are discarded, never
    /// honored. Names without a usable base name are skipped.
    pub fn populate<I, N, C>(&self, files: I) -> io::Result<usize>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let mut written = 0;
        for (name, content) in files {
            let name = name.as_ref();
            let Some(base) = base_name(name) else {
                log::warn!("Skipping file with unusable name {name:?}");
                continue;
            };
            fs::write(self.path.join(base), content.as_ref())?;
            written += 1;
        }

        if log::log_enabled!(log::Level::Debug) {
            for entry in fs::read_dir(&self.path)?.flatten() {
                log::debug!("  {}", entry.file_name().to_string_lossy());
            }
        }

        Ok(written)
    }

    /// Recursively removes the directory; safe to call any number of times
    pub fn destroy(&self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("Removed workspace {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove workspace {}: {e}", self.path.display()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.cleanup == Cleanup::Scoped {
            self.destroy();
        }
    }
}

/// Last path segment of a submitted file name, treating `/` and `\` alike
fn base_name(name: &str) -> Option<&str> {
    let base = name
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()?;

    match base {
        "" | "." | ".." => None,
        _ => Some(base),
    }
}

/// Renders a path with forward slashes regardless of platform
pub fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
