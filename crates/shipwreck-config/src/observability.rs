/// Logging and telemetry settings.
///
/// OpenTelemetry export is only attempted when `OTEL_EXPORTER_OTLP_ENDPOINT`
/// is set; console and file logging are always on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservabilityConfig {
    pub enabled: bool,
    pub log_dir: String,
    pub otlp_endpoint: Option<String>,
    pub environment: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_dir: "storage/logs".to_string(),
            otlp_endpoint: None,
            environment: "development".to_string(),
        }
    }
}

impl ObservabilityConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(crate::env_lookup)
    }

    #[must_use]
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            enabled: crate::flag_or(&lookup, "OBSERVABILITY_ENABLED", defaults.enabled),
            log_dir: lookup("LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_dir),
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty()),
            environment: lookup("ENVIRONMENT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.environment),
        }
    }
}
