use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ExecError;
use crate::sandbox::{Context, Registry, RunFailure};
use crate::workspace::{Cleanup, WorkspaceManager};

/// A "run with input" request
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ExecutionRequest {
    pub language: String,
    #[serde(default)]
    pub files: HashMap<String, String>,
    #[serde(rename = "input", default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
}

/// Uniform outcome of a direct run; an empty `error` means success
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    #[serde(rename = "result")]
    pub stdout: String,
    pub error: String,
}

impl ExecutionResult {
    pub fn success(stdout: String) -> Self {
        Self {
            stdout,
            error: String::new(),
        }
    }
}

/// Runs requests in a throwaway workspace using the language registry
///
/// Each call creates exactly one workspace and removes it before returning,
/// whatever the outcome. Calls share nothing, so any number may run concurrently.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    workspaces: WorkspaceManager,
    registry: Registry,
    timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(workspaces: WorkspaceManager, registry: Registry) -> Self {
        Self {
            workspaces,
            registry,
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.run_workspaces(),
            Registry::standard(&config.toolchains),
        )
        .with_timeout(config.execution.timeout())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Executes `request`; every failure is folded into the returned result
    pub fn run(&self, request: &ExecutionRequest) -> ExecutionResult {
        match self.try_run(request) {
            Ok(stdout) => ExecutionResult::success(stdout),
            Err(failure) => failure.into_result(),
        }
    }

    /// Like [`Dispatcher::run`], but keeps the failure kind for callers that classify it
    pub fn try_run(&self, request: &ExecutionRequest) -> Result<String, RunFailure> {
        if request.files.is_empty() {
            return Err(ExecError::NoFiles.into());
        }

        let workspace = self.workspaces.create(Cleanup::Scoped)?;
        let written = workspace.populate(&request.files)?;
        log::info!(
            "Running {} request in workspace {} ({written} files)",
            request.language,
            workspace.id()
        );

        let runner = self.registry.resolve(&request.language)?;
        let ctx = Context {
            dir: workspace.path(),
            timeout: self.timeout,
        };
        let outcome = runner.run(&ctx, request.stdin.as_deref().unwrap_or(""));

        match &outcome {
            Ok(stdout) => log::info!(
                "Execution succeeded in workspace {}, {} bytes of output",
                workspace.id(),
                stdout.len()
            ),
            Err(failure) => log::info!(
                "Execution failed in workspace {}: {}",
                workspace.id(),
                first_line(&failure.error.to_string())
            ),
        }

        outcome
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
