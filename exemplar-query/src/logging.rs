//! Logging setup for Exemplar.
//!
//! The crates log through `tracing`. Criteria building emits `debug!` per
//! built specification and `trace!` per skipped property; sessions log each
//! executed operation.
//!
//! # Environment Variables
//!
//! - `EXEMPLAR_DEBUG=true|1|yes` - Enable debug logging
//! - `EXEMPLAR_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `EXEMPLAR_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use exemplar_query::logging;
//!
//! // Call once at startup; needs the `tracing-subscriber` feature to print anything.
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `EXEMPLAR_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("EXEMPLAR_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `EXEMPLAR_LOG_LEVEL`.
///
/// Defaults to "debug" if `EXEMPLAR_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("EXEMPLAR_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Get the configured log format from `EXEMPLAR_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    env::var("EXEMPLAR_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize the logging system.
///
/// Subsequent calls are no-ops. Nothing is installed unless `EXEMPLAR_DEBUG`
/// or `EXEMPLAR_LOG_LEVEL` is set.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("EXEMPLAR_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "exemplar={},exemplar_query={},exemplar_schema={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match get_log_format() {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "Exemplar logging initialized"
                );
            }
        }
    });
}

/// Initialize logging with a specific level.
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call it before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: documented as a startup-only call.
    unsafe {
        env::set_var("EXEMPLAR_LOG_LEVEL", level);
    }
    init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_defaults() {
        // SAFETY: no other test in this crate touches these variables.
        unsafe {
            env::remove_var("EXEMPLAR_DEBUG");
            env::remove_var("EXEMPLAR_LOG_LEVEL");
            env::remove_var("EXEMPLAR_LOG_FORMAT");
        }
        assert!(!is_debug_enabled());
        assert_eq!(get_log_level(), "warn");
        assert_eq!(get_log_format(), "json");
    }
}
