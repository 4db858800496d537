// Public modules
pub mod archive;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod guard;
pub mod install;
pub mod models;
pub mod resolver;
pub mod runner;
pub mod vars;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::SetupConfig;
pub use error::{ErrorKind, SetupError, SetupResult};
pub use models::*;
pub use runner::{RunOptions, RunOutcome, run_setup};
