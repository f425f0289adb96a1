//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Log target used by the script scheduler and host
pub const SCRIPTING_TARGET: &str = "scripting";

/// Initialize the logging system with a default filter
///
/// `RUST_LOG` still wins when it is set. Calling this more than once is
/// harmless; later calls are ignored.
pub fn init_with_filter(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
