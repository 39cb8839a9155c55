//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// How log output is filtered and rendered.
///
/// `RUST_LOG` always wins over `default_filter` when it is set and valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Filter directives used when `RUST_LOG` is absent (e.g. `"info"`,
    /// `"fruitcart_cart=debug"`).
    pub default_filter: String,
    /// JSON lines when true, human-readable output otherwise.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            json: true,
        }
    }
}

impl ObservabilityConfig {
    /// Human-readable output with the given default filter.
    pub fn pretty(default_filter: impl Into<String>) -> Self {
        Self {
            default_filter: default_filter.into(),
            json: false,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        resolve_filter(
            std::env::var(EnvFilter::DEFAULT_ENV).ok(),
            &self.default_filter,
        )
    }
}

/// Level used when neither `RUST_LOG` nor the configured default parses.
const FALLBACK_FILTER: &str = "info";

/// Pick the first usable filter: `env_directives`, then `default_filter`,
/// then [`FALLBACK_FILTER`]. Blank or unparsable directives are skipped.
fn resolve_filter(env_directives: Option<String>, default_filter: &str) -> EnvFilter {
    env_directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(default_filter).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_FILTER))
}

/// Install the global subscriber for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops and return `false`).
pub fn init(config: &ObservabilityConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
