//! Logging utilities.
//!
//! Centralizes logger initialization. Engine code logs through the `log`
//! facade only; `env_logger` is installed here for binaries that want it.

mod init;

pub use init::{LoggingConfig, init_logging};
