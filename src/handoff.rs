use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{Config, EXECUTOR_MODE_VAR};
use crate::error::ExecError;
use crate::sandbox::process::{capture_split, describe_status};
use crate::workspace::{Cleanup, Workspace, WorkspaceManager, slash_path};

/// Sub-directory of a problem holding its immutable test bundle
const BUNDLE_VERSION: &str = "v1";

/// Written when a submission arrives without files, so the backend always finds one
const PLACEHOLDER_FILE: &str = "code.txt";

/// Wire descriptor handed to the backend
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Job {
    submission_id: String,
    problem_bundle: String,
    submission_dir: String,
    language: String,
}

impl Job {
    /// Builds a job, requiring both directories to be absolute and to exist
    pub fn new(
        submission_id: impl Into<String>,
        problem_bundle: &Path,
        submission_dir: &Path,
        language: impl Into<String>,
    ) -> Result<Self, ExecError> {
        for path in [problem_bundle, submission_dir] {
            if !path.is_absolute() || !path.exists() {
                return Err(ExecError::BackendInvocationFailed(format!(
                    "job path {} is not an existing absolute path",
                    path.display()
                )));
            }
        }

        Ok(Self {
            submission_id: submission_id.into(),
            problem_bundle: slash_path(problem_bundle),
            submission_dir: slash_path(submission_dir),
            language: language.into(),
        })
    }

    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    pub fn problem_bundle(&self) -> &str {
        &self.problem_bundle
    }

    pub fn submission_dir(&self) -> &str {
        &self.submission_dir
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

/// Builds jobs from submissions and runs them through the backend executable
///
/// The backend is a local executable that receives one JSON [`Job`] on its
/// standard input and prints one JSON object describing the verdict. Only the
/// brace delimiting of the reply is checked; its schema belongs to the backend.
#[derive(Debug, Clone)]
pub struct HandoffClient {
    data_root: PathBuf,
    workspaces: WorkspaceManager,
    candidates: Vec<PathBuf>,
    mode: String,
    timeout: Option<Duration>,
}

impl HandoffClient {
    pub fn new(
        data_root: impl Into<PathBuf>,
        workspaces: WorkspaceManager,
        candidates: Vec<PathBuf>,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            data_root: data_root.into(),
            workspaces,
            candidates,
            mode: mode.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.paths.data_root.clone(),
            config.submission_workspaces(),
            config.executor.candidates.clone(),
            config.executor.mode.clone(),
        )
        .with_timeout(config.execution.timeout())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Absolute path of the problem's bundle directory
    pub fn bundle_path(&self, problem_id: &str) -> Result<PathBuf, ExecError> {
        let not_found = || ExecError::ProblemNotFound(problem_id.to_string());

        // The id names exactly one directory under the data root
        let mut components = Path::new(problem_id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(not_found()),
        }

        let bundle = self.data_root.join(problem_id).join(BUNDLE_VERSION);
        if !bundle.is_dir() {
            log::info!("Problem {problem_id} has no bundle at {}", bundle.display());
            return Err(not_found());
        }

        fs::canonicalize(&bundle).map_err(|_| not_found())
    }

    /// Allocates and populates the submission workspace and builds its job
    ///
    /// The returned workspace is already detached: dropping it leaves the
    /// directory for the backend. It is removed again if anything fails first.
    pub fn prepare<I, N, C>(
        &self,
        problem_id: &str,
        language: &str,
        files: I,
    ) -> Result<(Job, Workspace), ExecError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let bundle = self.bundle_path(problem_id)?;

        let mut workspace = self.workspaces.create(Cleanup::Scoped)?;
        if workspace.populate(files)? == 0 {
            fs::write(workspace.path().join(PLACEHOLDER_FILE), "")?;
        }

        let job = Job::new(workspace.id(), &bundle, workspace.path(), language)?;
        workspace.detach();
        log::debug!("Prepared job {job:?}");

        Ok((job, workspace))
    }

    /// First candidate executable that exists
    pub fn resolve_backend(&self) -> Result<&Path, ExecError> {
        self.candidates
            .iter()
            .find(|candidate| candidate.is_file())
            .map(PathBuf::as_path)
            .ok_or_else(|| {
                ExecError::BackendInvocationFailed("no executor binary found".to_string())
            })
    }

    /// Sends `job` to the backend and returns its validated reply
    pub fn dispatch(&self, job: &Job) -> Result<String, ExecError> {
        let backend = self.resolve_backend()?;
        let payload = serde_json::to_string(job).map_err(|e| {
            ExecError::BackendInvocationFailed(format!("failed to encode job: {e}"))
        })?;
        log::info!(
            "Sending job {} to executor {} (mode {})",
            job.submission_id,
            backend.display(),
            self.mode
        );

        let mut command = Command::new(backend);
        command.env(EXECUTOR_MODE_VAR, &self.mode);

        let capture = capture_split(&mut command, &payload, self.timeout).map_err(|e| match e {
            ExecError::BackendInvocationFailed(_) => e,
            other => ExecError::BackendInvocationFailed(other.to_string()),
        })?;

        if !capture.stderr.trim().is_empty() {
            log::debug!("Executor stderr: {}", capture.stderr.trim_end());
        }

        if !capture.status.success() {
            log::error!(
                "Executor failed on job {} with {}",
                job.submission_id,
                describe_status(&capture.status)
            );
            return Err(ExecError::BackendInvocationFailed(describe_status(
                &capture.status,
            )));
        }

        validate_backend_output(&capture.stdout)
    }

    /// Builds a job for the submission and runs it through the backend
    pub fn submit<I, N, C>(
        &self,
        problem_id: &str,
        language: &str,
        files: I,
    ) -> Result<String, ExecError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let (job, _workspace) = self.prepare(problem_id, language, files)?;
        self.dispatch(&job)
    }
}

/// Accepts backend output that looks like a single JSON object, trimmed
pub fn validate_backend_output(raw: &str) -> Result<String, ExecError> {
    let output = raw.trim();
    if output.starts_with('{') && output.ends_with('}') {
        return Ok(output.to_string());
    }

    log::error!("Invalid executor output: {output}");
    Err(ExecError::BackendInvocationFailed(
        "malformed executor output".to_string(),
    ))
}
