use std::env;

use serde::Deserialize;

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    pub filter: String,
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "kakao-skill".into(),
            service_version: env!("CARGO_PKG_VERSION").into(),
            environment: "dev".into(),
            filter: DEFAULT_FILTER.into(),
            json_logs: true,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env(default_service_name: &str, default_service_version: &str) -> Self {
        Self::from_lookup(default_service_name, default_service_version, |key| {
            env::var(key).ok()
        })
    }

    /// Same as [`TelemetryConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(
        default_service_name: &str,
        default_service_version: &str,
        lookup: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_name = lookup("SERVICE_NAME")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default_service_name.to_string());
        let service_version = lookup("SERVICE_VERSION")
            .unwrap_or_else(|| default_service_version.to_string());
        let environment = lookup("OTEL_RESOURCE_ATTRIBUTES")
            .and_then(parse_environment_from_resource)
            .or_else(|| lookup("DEPLOYMENT_ENV"))
            .unwrap_or_else(|| "dev".into());
        let filter = lookup("RUST_LOG")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.into());
        let json_logs = lookup("LOG_FORMAT")
            .map(|v| !matches!(v.to_lowercase().as_str(), "text" | "pretty" | "plain"))
            .unwrap_or(true);

        Self {
            service_name,
            service_version,
            environment,
            filter,
            json_logs,
        }
    }
}

fn parse_environment_from_resource(value: String) -> Option<String> {
    value.split(',').find_map(|kv| {
        let (key, val) = kv.split_once('=')?;
        (key.trim() == "deployment.environment").then(|| val.trim().to_string())
    })
}
