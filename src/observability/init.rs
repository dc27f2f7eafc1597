//! Tracing initialization and subscriber setup.

use crate::ModalConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG` or the
/// configured trace level.
///
/// # Initialization Behavior
///
/// - An unparsable `RUST_LOG` falls back to `config.trace_level`
/// - Idempotent: safe to call multiple times (only the first call takes effect)
/// - Never panics if another global subscriber is already set
///
/// # Example
///
/// ```rust
/// use modalkit::observability::init_tracing;
/// use modalkit::ModalConfig;
///
/// let config = ModalConfig {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &ModalConfig) {
    let level = config.trace_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr),
    );

    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_harmless() {
        let config = ModalConfig {
            trace_level: Some("debug".to_string()),
            ..ModalConfig::default()
        };
        init_tracing(&config);
        init_tracing(&config);
        tracing::debug!("still logging");
    }
}
