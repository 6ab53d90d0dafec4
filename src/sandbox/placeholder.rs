use std::path::{Path, PathBuf};

use crate::error::ExecError;

use super::process::Capture;
use super::runner::{Context, RunFailure, Runner};

/// A registered language that always fails with a fixed message
///
/// Keeps the language listed as supported while execution for it does not exist.
#[derive(Debug, Clone, Copy)]
pub struct Placeholder {
    label: &'static str,
    message: &'static str,
}

impl Placeholder {
    pub const fn new(label: &'static str, message: &'static str) -> Self {
        Self { label, message }
    }

    pub const fn sql() -> Self {
        Self::new("SQL", "SQL execution requires database setup")
    }
}

impl Runner for Placeholder {
    fn label(&self) -> &'static str {
        self.label
    }

    fn locate(&self, _dir: &Path) -> Result<PathBuf, ExecError> {
        Err(ExecError::Placeholder(self.message))
    }

    fn execute(
        &self,
        _ctx: &Context<'_>,
        _artifact: &Path,
        _stdin: &str,
    ) -> Result<Capture, ExecError> {
        Err(ExecError::Placeholder(self.message))
    }

    fn run(&self, _ctx: &Context<'_>, _stdin: &str) -> Result<String, RunFailure> {
        Err(ExecError::Placeholder(self.message).into())
    }
}
