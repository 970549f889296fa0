use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter '{value}': {source}")]
    Filter { value: String, source: ParseError },

    #[error("Could not install log subscriber: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Filter from RUST_LOG when set, otherwise from `--log-level`.
fn resolve_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => parse_filter(log_level),
    }
}

fn parse_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(log_level).map_err(|source| TelemetryError::Filter {
        value: log_level.to_string(),
        source,
    })
}

/// Install the stderr subscriber.
pub fn init(log_level: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(resolve_filter(log_level)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names_accepted() {
        for level in ["error", "warn", "info", "debug", "trace", "sasu_fiscal_core=debug"] {
            assert!(parse_filter(level).is_ok(), "level {level}");
        }
    }

    #[test]
    fn test_unknown_level_reported() {
        let err = parse_filter("sasu_fiscal_core=loud").unwrap_err();
        assert!(matches!(err, TelemetryError::Filter { .. }));
        assert!(err.to_string().contains("sasu_fiscal_core=loud"));
    }
}
