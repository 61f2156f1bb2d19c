//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; binaries decide where they go.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "STREAMTAP_LOG";

/// Filter used when `STREAMTAP_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber with the default filter.
pub fn init() {
    init_with(DEFAULT_FILTER);
}

/// Install the global subscriber, falling back to `default_filter` when
/// `STREAMTAP_LOG` is unset or cannot be parsed.
///
/// Output goes to stderr so stdout stays free for stream data. Calling this
/// more than once is a no-op.
pub fn init_with(default_filter: &str) {
    let filter = build_filter(std::env::var(LOG_ENV).ok().as_deref(), default_filter);

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Map a `-v` count to a default filter.
pub fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => DEFAULT_FILTER,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_filter(directives: Option<&str>, default_filter: &str) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filter() {
        assert_eq!(verbosity_filter(0), "warn");
        assert_eq!(verbosity_filter(1), "info");
        assert_eq!(verbosity_filter(2), "debug");
        assert_eq!(verbosity_filter(9), "trace");
    }

    #[test]
    fn test_build_filter_prefers_env_directives() {
        let filter = build_filter(Some("streamtap=debug"), "warn");
        assert_eq!(filter.to_string(), "streamtap=debug");
    }

    #[test]
    fn test_build_filter_falls_back_to_default() {
        assert_eq!(build_filter(None, "info").to_string(), "info");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init();
        init_with("debug");
    }
}
