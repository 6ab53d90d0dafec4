use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::workspace::WorkspaceManager;

/// Environment variable forwarded to the execution backend
pub const EXECUTOR_MODE_VAR: &str = "EXECUTOR_MODE";

/// Backend mode used when neither the config nor the environment sets one
pub const DEFAULT_EXECUTOR_MODE: &str = "docker";

#[derive(Parser)]
#[command(name = "ceesar", version = "1.0", about, long_about = None)]
pub struct CliArgs {
    /// Path to the configuration file
    #[arg(long = "config", short = 'c')]
    pub config_path: Option<String>,

    /// Overrides `server.bind_address` from the configuration file
    #[arg(long = "bind-address")]
    pub bind_address: Option<String>,

    /// Overrides `server.bind_port` from the configuration file
    #[arg(long = "bind-port", short = 'p')]
    pub bind_port: Option<u16>,
}

impl CliArgs {
    /// Load the configuration from the specified file, falling back to defaults
    pub fn to_config(&self) -> std::io::Result<Config> {
        let mut config = match &self.config_path {
            Some(path) => {
                let file = std::fs::File::open(path)?;
                let reader = std::io::BufReader::new(file);
                serde_json::from_reader(reader)?
            }
            None => Config::default(),
        };

        if let Some(address) = &self.bind_address {
            config.server.bind_address = Some(address.clone());
        }
        if let Some(port) = self.bind_port {
            config.server.bind_port = Some(port);
        }

        Ok(config)
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub executor: ExecutorConfig,
    pub execution: ExecutionConfig,
    pub toolchains: HashMap<String, ToolchainConfig>,
}

impl Config {
    /// Workspaces for the direct "run with input" path
    pub fn run_workspaces(&self) -> WorkspaceManager {
        WorkspaceManager::new(self.paths.scratch_root.join("run"))
    }

    /// Workspaces handed over to the execution backend
    pub fn submission_workspaces(&self) -> WorkspaceManager {
        WorkspaceManager::new(self.paths.scratch_root.join("submissions"))
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ServerConfig {
    pub bind_address: Option<String>,
    pub bind_port: Option<u16>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PathsConfig {
    /// Parent of every ephemeral workspace
    pub scratch_root: PathBuf,
    /// Directory holding one bundle directory per problem
    pub data_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            scratch_root: std::env::temp_dir().join("ceesarcode"),
            data_root: PathBuf::from("../../dist/data/problems"),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Probed in order, the first existing file is invoked
    pub candidates: Vec<PathBuf>,
    pub mode: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            candidates: vec![
                PathBuf::from("./release/executor"),
                PathBuf::from("../../src/executor/target/release/executor"),
                PathBuf::from("../../src/executor/target/debug/executor"),
            ],
            mode: executor_mode_from_env(),
        }
    }
}

fn executor_mode_from_env() -> String {
    std::env::var(EXECUTOR_MODE_VAR)
        .ok()
        .filter(|mode| !mode.is_empty())
        .unwrap_or_else(|| DEFAULT_EXECUTOR_MODE.to_string())
}

/// Optional bounds applied to every spawned process
///
/// Nothing is bounded by default: a submission that never exits blocks its
/// handling task until the process is killed externally.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ExecutionConfig {
    pub timeout_ms: Option<u64>,
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Per-language program overrides, e.g. `{"python": {"run": "python3.12"}}`
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ToolchainConfig {
    pub compile: Option<String>,
    pub run: Option<String>,
}
