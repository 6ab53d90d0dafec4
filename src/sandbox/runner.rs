use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dispatcher::ExecutionResult;
use crate::error::ExecError;

use super::process::{Capture, describe_status};

/// What a runner needs to know about the request it serves
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Populated workspace, also used as the working directory
    pub dir: &'a Path,
    /// Wall-clock bound for each spawned process, if any
    pub timeout: Option<Duration>,
}

/// How captured bytes are attributed when the program exits non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    /// Everything the program printed goes to `error`, `stdout` stays empty
    Strict,
    /// Printed output stays in `stdout` and is also echoed into `error`
    KeepPartial,
}

impl Attribution {
    /// Turns a finished process into either its output or a runtime failure
    pub fn classify(self, capture: Capture) -> Result<String, RunFailure> {
        if capture.status.success() {
            return Ok(capture.output);
        }

        let partial = match self {
            Self::Strict => String::new(),
            Self::KeepPartial => capture.output.clone(),
        };

        Err(RunFailure {
            partial,
            error: ExecError::RuntimeFailure {
                status: describe_status(&capture.status),
                output: capture.output,
            },
        })
    }
}

/// A failed run together with whatever output is kept alongside the error
#[derive(Debug)]
pub struct RunFailure {
    pub partial: String,
    pub error: ExecError,
}

impl RunFailure {
    /// The `{result, error}` pair reported to the caller
    pub fn into_result(self) -> ExecutionResult {
        ExecutionResult {
            stdout: self.partial,
            error: self.error.to_string(),
        }
    }
}

impl From<ExecError> for RunFailure {
    fn from(error: ExecError) -> Self {
        Self {
            partial: String::new(),
            error,
        }
    }
}

impl From<io::Error> for RunFailure {
    fn from(error: io::Error) -> Self {
        ExecError::from(error).into()
    }
}

/// Where a language looks for its entry point
#[derive(Debug, Clone, Copy)]
pub struct SourcePattern {
    /// Exact names probed first, in order
    pub canonical: &'static [&'static str],
    /// Suffixes globbed next, in order, e.g. `".py"`
    pub extensions: &'static [&'static str],
}

impl SourcePattern {
    pub fn find(&self, dir: &Path) -> Option<PathBuf> {
        for name in self.canonical {
            let path = dir.join(name);
            if path.is_file() {
                return Some(path);
            }
        }

        let mut names: Vec<String> = fs::read_dir(dir)
            .ok()?
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();

        self.extensions.iter().find_map(|ext| {
            names
                .iter()
                .find(|name| name.ends_with(ext))
                .map(|name| dir.join(name))
        })
    }
}

/// Language-specific locate/compile/execute lifecycle
///
/// Runners are stateless: everything request-specific arrives through
/// [`Context`]. Compiled languages override [`Runner::compile`]; interpreted
/// ones hand the located source straight to [`Runner::execute`].
pub trait Runner: Send + Sync {
    /// Human-readable language name used in messages
    fn label(&self) -> &'static str;

    fn attribution(&self) -> Attribution {
        Attribution::Strict
    }

    /// Finds the entry-point source file in the workspace
    fn locate(&self, dir: &Path) -> Result<PathBuf, ExecError>;

    /// Builds the located source and returns what [`Runner::execute`] should run
    fn compile(&self, _ctx: &Context<'_>, source: PathBuf) -> Result<PathBuf, ExecError> {
        Ok(source)
    }

    /// Runs the artifact with `stdin`, capturing both output streams
    fn execute(&self, ctx: &Context<'_>, artifact: &Path, stdin: &str)
    -> Result<Capture, ExecError>;

    /// Full lifecycle; a failed locate or compile never spawns the program
    fn run(&self, ctx: &Context<'_>, stdin: &str) -> Result<String, RunFailure> {
        let source = self.locate(ctx.dir)?;
        log::debug!("{} source located at {}", self.label(), source.display());

        let artifact = self.compile(ctx, source)?;
        let capture = self.execute(ctx, &artifact, stdin)?;
        log::debug!(
            "{} program finished with {}, {} bytes captured",
            self.label(),
            describe_status(&capture.status),
            capture.output.len()
        );

        self.attribution().classify(capture)
    }
}
