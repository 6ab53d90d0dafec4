use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ExecError;

use super::process::{Capture, capture_combined, describe_status};
use super::runner::{Context, Runner, SourcePattern};

/// Name of the binary native compilers write into the workspace
const EXECUTABLE_NAME: &str = "main";

/// Runs a toolchain command and turns a non-zero exit into a compile error
fn run_compiler(label: &'static str, ctx: &Context<'_>, command: &mut Command) -> Result<(), ExecError> {
    log::info!(
        "Compiling {label}: {} {:?}",
        command.get_program().to_string_lossy(),
        command.get_args().collect::<Vec<_>>()
    );
    command.current_dir(ctx.dir);

    let capture = capture_combined(command, "", ctx.timeout)?;
    if !capture.status.success() {
        log::info!("{label} compilation failed with {}", describe_status(&capture.status));
        return Err(ExecError::CompileError {
            label,
            status: describe_status(&capture.status),
            output: capture.output,
        });
    }

    Ok(())
}

fn locate(label: &'static str, pattern: &SourcePattern, dir: &Path) -> Result<PathBuf, ExecError> {
    pattern.find(dir).ok_or_else(|| ExecError::SourceNotFound {
        label,
        dir: dir.to_path_buf(),
    })
}

/// C, C++ and Rust: `<compiler> -o <workspace>/main <source>`, then run the binary
#[derive(Debug, Clone)]
pub struct Native {
    label: &'static str,
    pattern: SourcePattern,
    compiler: String,
}

impl Native {
    pub fn new(label: &'static str, pattern: SourcePattern, compiler: impl Into<String>) -> Self {
        Self {
            label,
            pattern,
            compiler: compiler.into(),
        }
    }

    pub fn c() -> Self {
        let pattern = SourcePattern {
            canonical: &["Main.c"],
            extensions: &[".c"],
        };
        Self::new("C", pattern, "gcc")
    }

    pub fn cpp() -> Self {
        let pattern = SourcePattern {
            canonical: &["Main.cpp"],
            extensions: &[".cpp"],
        };
        Self::new("C++", pattern, "g++")
    }

    pub fn rust() -> Self {
        let pattern = SourcePattern {
            canonical: &["main.rs"],
            extensions: &[".rs"],
        };
        Self::new("Rust", pattern, "rustc")
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }
}

impl Runner for Native {
    fn label(&self) -> &'static str {
        self.label
    }

    fn locate(&self, dir: &Path) -> Result<PathBuf, ExecError> {
        locate(self.label, &self.pattern, dir)
    }

    fn compile(&self, ctx: &Context<'_>, source: PathBuf) -> Result<PathBuf, ExecError> {
        let executable = ctx.dir.join(EXECUTABLE_NAME);

        let mut command = Command::new(&self.compiler);
        command.arg("-o").arg(&executable).arg(&source);
        run_compiler(self.label, ctx, &mut command)?;

        // A compiler that exits zero without producing a binary still failed
        if !executable.is_file() {
            return Err(ExecError::CompileError {
                label: self.label,
                status: "exit status 0".to_string(),
                output: format!("{} produced no executable", self.compiler),
            });
        }

        Ok(executable)
    }

    fn execute(
        &self,
        ctx: &Context<'_>,
        artifact: &Path,
        stdin: &str,
    ) -> Result<Capture, ExecError> {
        log::info!("Executing: {}", artifact.display());

        let mut command = Command::new(artifact);
        command.current_dir(ctx.dir);
        capture_combined(&mut command, stdin, ctx.timeout)
    }
}

/// `javac <source>`, then `java -cp <workspace> Main`
#[derive(Debug, Clone)]
pub struct Java {
    compiler: String,
    runtime: String,
}

impl Java {
    const LABEL: &'static str = "Java";
    const MAIN_CLASS: &'static str = "Main";
    const PATTERN: SourcePattern = SourcePattern {
        canonical: &["Main.java"],
        extensions: &[".java"],
    };

    pub fn new() -> Self {
        Self {
            compiler: "javac".to_string(),
            runtime: "java".to_string(),
        }
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }
}

impl Default for Java {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner for Java {
    fn label(&self) -> &'static str {
        Self::LABEL
    }

    fn locate(&self, dir: &Path) -> Result<PathBuf, ExecError> {
        locate(Self::LABEL, &Self::PATTERN, dir)
    }

    fn compile(&self, ctx: &Context<'_>, source: PathBuf) -> Result<PathBuf, ExecError> {
        let mut command = Command::new(&self.compiler);
        command.arg(&source);
        run_compiler(Self::LABEL, ctx, &mut command)?;
        Ok(ctx.dir.to_path_buf())
    }

    /// `artifact` is the class path; the entry point is always class `Main`
    fn execute(
        &self,
        ctx: &Context<'_>,
        artifact: &Path,
        stdin: &str,
    ) -> Result<Capture, ExecError> {
        log::info!("Executing: {} -cp {} {}", self.runtime, artifact.display(), Self::MAIN_CLASS);

        let mut command = Command::new(&self.runtime);
        command
            .arg("-cp")
            .arg(artifact)
            .arg(Self::MAIN_CLASS)
            .current_dir(ctx.dir);
        capture_combined(&mut command, stdin, ctx.timeout)
    }
}

/// `tsc <source>`, then `node` on the emitted JavaScript next to it
#[derive(Debug, Clone)]
pub struct TypeScript {
    compiler: String,
    runtime: String,
}

impl TypeScript {
    const LABEL: &'static str = "TypeScript";
    const PATTERN: SourcePattern = SourcePattern {
        canonical: &["Main.ts"],
        extensions: &[".ts"],
    };

    pub fn new() -> Self {
        Self {
            compiler: "tsc".to_string(),
            runtime: "node".to_string(),
        }
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }
}

impl Default for TypeScript {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner for TypeScript {
    fn label(&self) -> &'static str {
        Self::LABEL
    }

    fn locate(&self, dir: &Path) -> Result<PathBuf, ExecError> {
        locate(Self::LABEL, &Self::PATTERN, dir)
    }

    fn compile(&self, ctx: &Context<'_>, source: PathBuf) -> Result<PathBuf, ExecError> {
        let mut command = Command::new(&self.compiler);
        command.arg(&source);
        run_compiler(Self::LABEL, ctx, &mut command)?;

        let emitted = source.with_extension("js");
        if !emitted.is_file() {
            return Err(ExecError::CompileError {
                label: Self::LABEL,
                status: "exit status 0".to_string(),
                output: format!("{} did not emit {}", self.compiler, file_name(&emitted)),
            });
        }

        Ok(emitted)
    }

    fn execute(
        &self,
        ctx: &Context<'_>,
        artifact: &Path,
        stdin: &str,
    ) -> Result<Capture, ExecError> {
        log::info!("Executing: {} {}", self.runtime, artifact.display());

        let mut command = Command::new(&self.runtime);
        command.arg(artifact).current_dir(ctx.dir);
        capture_combined(&mut command, stdin, ctx.timeout)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
