use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ExecError;

use super::process::{Capture, capture_combined};
use super::runner::{Attribution, Context, Runner, SourcePattern};

/// A language run straight from source by an interpreter or toolchain driver
#[derive(Debug, Clone)]
pub struct Interpreted {
    label: &'static str,
    pattern: SourcePattern,
    program: String,
    /// Arguments placed before the source path, e.g. `run` for `go run`
    leading_args: &'static [&'static str],
    attribution: Attribution,
}

impl Interpreted {
    pub fn new(label: &'static str, pattern: SourcePattern, program: impl Into<String>) -> Self {
        Self {
            label,
            pattern,
            program: program.into(),
            leading_args: &[],
            attribution: Attribution::Strict,
        }
    }

    pub fn python() -> Self {
        let pattern = SourcePattern {
            canonical: &["Main.py"],
            extensions: &[".py"],
        };
        Self::new("Python", pattern, "python3").with_attribution(Attribution::KeepPartial)
    }

    pub fn javascript() -> Self {
        let pattern = SourcePattern {
            canonical: &["Main.js"],
            extensions: &[".js"],
        };
        Self::new("JavaScript", pattern, "node")
    }

    /// `go run` builds into its own cache, so nothing is left in the workspace
    pub fn go() -> Self {
        let pattern = SourcePattern {
            canonical: &["main.go"],
            extensions: &[".go"],
        };
        let mut runner = Self::new("Go", pattern, "go");
        runner.leading_args = &["run"];
        runner
    }

    pub fn swift() -> Self {
        let pattern = SourcePattern {
            canonical: &["main.swift"],
            extensions: &[".swift"],
        };
        Self::new("Swift", pattern, "swift")
    }

    pub fn ruby() -> Self {
        let pattern = SourcePattern {
            canonical: &["main.rb"],
            extensions: &[".rb"],
        };
        Self::new("Ruby", pattern, "ruby")
    }

    pub fn bash() -> Self {
        let pattern = SourcePattern {
            canonical: &["main.sh", "script.sh", "Main.sh", "Script.sh"],
            extensions: &[".sh", ".bash"],
        };
        Self::new("Bash", pattern, "bash")
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = attribution;
        self
    }
}

impl Runner for Interpreted {
    fn label(&self) -> &'static str {
        self.label
    }

    fn attribution(&self) -> Attribution {
        self.attribution
    }

    fn locate(&self, dir: &Path) -> Result<PathBuf, ExecError> {
        self.pattern.find(dir).ok_or_else(|| ExecError::SourceNotFound {
            label: self.label,
            dir: dir.to_path_buf(),
        })
    }

    fn execute(
        &self,
        ctx: &Context<'_>,
        artifact: &Path,
        stdin: &str,
    ) -> Result<Capture, ExecError> {
        log::info!("Executing: {} {}", self.program, artifact.display());

        let mut command = Command::new(&self.program);
        command
            .args(self.leading_args)
            .arg(artifact)
            .current_dir(ctx.dir);

        capture_combined(&mut command, stdin, ctx.timeout)
    }
}
