use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every way an execution request can fail
///
/// The `Display` text of each variant is what ends up in the `error` field of
/// a direct-run response, so it must stay free of stack traces.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("No files provided")]
    NoFiles,

    #[error("unsupported language: {0}")]
    Unsupported(String),

    #[error("{label} file not found")]
    SourceNotFound { label: &'static str, dir: PathBuf },

    #[error("{}", compile_message(.label, .status, .output))]
    CompileError {
        label: &'static str,
        status: String,
        output: String,
    },

    #[error("{}", join_output(.output, .status))]
    RuntimeFailure { status: String, output: String },

    #[error("time limit exceeded after {millis} ms")]
    TimedOut { millis: u128 },

    #[error("{0}")]
    Placeholder(&'static str),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("problem not found: {0}")]
    ProblemNotFound(String),

    #[error("backend invocation failed: {0}")]
    BackendInvocationFailed(String),
}

impl ExecError {
    /// Whether the failure is the caller's fault rather than the program's or ours
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NoFiles | Self::Unsupported(_))
    }
}

fn compile_message(label: &str, status: &str, output: &str) -> String {
    let output = output.trim_end();
    if output.is_empty() {
        format!("{label} compilation failed: {status}")
    } else {
        format!("{label} compilation failed: {status}\n{output}")
    }
}

/// Captured output first, then the exit description on its own line
fn join_output(output: &str, status: &str) -> String {
    let output = output.trim_end();
    if output.is_empty() {
        status.to_string()
    } else {
        format!("{output}\n{status}")
    }
}
