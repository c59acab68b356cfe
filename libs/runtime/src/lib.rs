//! Process-level plumbing shared by the job board binaries: layered
//! configuration, logging setup, home directory resolution and shutdown
//! signals.

pub mod config;
pub mod logging;
pub mod paths;
pub mod shutdown;

pub use config::{
    default_logging_config, AppConfig, CliArgs, LoggingConfig, Section, ServerConfig,
};
