//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable. Calling it twice is harmless.
///
/// # Example
/// ```
/// voxcore::core::logging::init();
/// log::info!("Engine started");
/// ```
pub fn init() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}

/// Initialize logging with an explicit default filter, typically
/// [`EngineConfig::log_filter`](crate::config::EngineConfig::log_filter).
/// RUST_LOG still wins when set.
pub fn init_with_filter(filter: &str) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(filter)
    ).try_init();
}
