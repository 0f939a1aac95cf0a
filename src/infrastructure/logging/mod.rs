//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout output
//! - JSON log files with rotation

pub mod logger;

pub use logger::{LoggerImpl, LOG_FILE_NAME};
