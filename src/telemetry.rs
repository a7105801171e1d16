use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so command
/// output on stdout stays machine readable.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    tracing::debug!(json = config.json_logs, "Onboarding telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the log lines of one request
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one service operation on a business
pub fn create_business_span(operation: &str, fein: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "business_onboarding",
        operation = operation,
        business.fein = fein,
        correlation.id = correlation_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_ids_are_unique() {
        let first = generate_correlation_id();
        let second = generate_correlation_id();
        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }
}
