#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use ceesar::config::Config;

/// Verdict printed by the reference `executor` binary
pub const CANNED_VERDICT: &str = r#"{"verdict":"Accepted","tests":[{"name":"public/01","status":"AC","time_ms":1,"message":""}]}"#;

pub const PROBLEM_ID: &str = "two-sum";

// Isolated scratch and data roots, removed when dropped
pub struct TestRoots {
    pub dir: TempDir,
}

impl TestRoots {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create test root");
        std::fs::create_dir_all(dir.path().join("problems").join(PROBLEM_ID).join("v1"))
            .expect("Failed to create problem bundle");
        Self { dir }
    }

    pub fn scratch_root(&self) -> PathBuf {
        self.dir.path().join("scratch")
    }

    pub fn data_root(&self) -> PathBuf {
        self.dir.path().join("problems")
    }

    pub fn run_root(&self) -> PathBuf {
        self.scratch_root().join("run")
    }

    pub fn submission_root(&self) -> PathBuf {
        self.scratch_root().join("submissions")
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.paths.scratch_root = self.scratch_root();
        config.paths.data_root = self.data_root();
        config.executor.candidates = vec![reference_executor()];
        config.executor.mode = "docker".to_string();
        config
    }
}

/// Path of the stand-in backend built alongside the tests
pub fn reference_executor() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_executor"))
}

/// Number of entries left in a directory; a missing directory counts as empty
pub fn entries_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|it| it.count()).unwrap_or(0)
}

// Helper function to check a toolchain is installed before exercising it
pub fn toolchain_available(programs: &[&str]) -> bool {
    let missing: Vec<&str> = programs
        .iter()
        .copied()
        .filter(|program| Command::new(program).arg("--version").output().is_err())
        .collect();

    if !missing.is_empty() {
        eprintln!("Skipping: {} not installed", missing.join(", "));
    }
    missing.is_empty()
}

/// Whether `pid` is gone, or left only as a zombie, within a couple of seconds
#[cfg(target_os = "linux")]
pub fn exited_eventually(pid: u32) -> bool {
    for _ in 0..100 {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Err(_) => return true,
            Ok(stat) => {
                let state = stat.rsplit_once(") ").map(|(_, rest)| rest.chars().next());
                if matches!(state, Some(Some('Z' | 'X'))) {
                    return true;
                }
            }
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    false
}

/// First existing path among common locations of a system utility
pub fn system_binary(name: &str) -> Option<PathBuf> {
    ["/bin", "/usr/bin"]
        .iter()
        .map(|dir| Path::new(dir).join(name))
        .find(|path| path.is_file())
}
