mod compiled;
mod interpreted;
mod placeholder;
pub mod process;
mod registry;
mod runner;

// Re-export the trait and common types
pub use compiled::{Java, Native, TypeScript};
pub use interpreted::Interpreted;
pub use placeholder::Placeholder;
pub use registry::Registry;
pub use runner::{Attribution, Context, RunFailure, Runner, SourcePattern};
