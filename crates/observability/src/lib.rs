//! Tracing/logging setup shared by every process that drives a cart.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::ObservabilityConfig;

/// Initialize process-wide observability with the default configuration.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&ObservabilityConfig::default());
}

/// Initialize process-wide observability with an explicit configuration.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_with(config: &ObservabilityConfig) -> bool {
    tracing::init(config)
}
