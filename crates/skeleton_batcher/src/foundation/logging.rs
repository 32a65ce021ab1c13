//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace, LevelFilter};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a default level
///
/// `RUST_LOG` directives still apply on top of `level`.
pub fn init_with_default(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Initialize the logging system, ignoring a logger that is already installed
///
/// Returns `true` when this call installed the logger.
pub fn try_init() -> bool {
    env_logger::try_init().is_ok()
}
