//! Logging utilities
//!
//! Provides logging setup and configuration.

/// Setup logging for the server (env_logger picks up RUST_LOG)
pub fn setup_logging() {
    env_logger::init();
}
