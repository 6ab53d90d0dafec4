pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handoff;
pub mod routes;
pub mod sandbox;
pub mod web_server;
pub mod workspace;

pub use dispatcher::{Dispatcher, ExecutionRequest, ExecutionResult};
pub use error::ExecError;
pub use handoff::{HandoffClient, Job};
