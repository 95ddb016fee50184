//! Tracing setup shared by the CRM binaries: an env-filtered console layer
//! (text or JSON) plus an optional OTLP span exporter.

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{self as sdk, Resource};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

static INIT: OnceCell<()> = OnceCell::new();

pub const DEFAULT_SERVICE: &str = "crm-server";
pub const DEFAULT_FILTER: &str = "info,crm=info,tower_http=warn,sqlx=warn,sea_orm=warn";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: String,
    pub service_version: &'static str,
    /// Reported as `deployment.environment` on exported spans.
    pub environment: Option<String>,
    pub env_filter: Option<String>,
    pub otlp_endpoint: Option<String>,
    pub log_format: LogFormat,
    /// Log a line with timings whenever a `crm.*` span closes.
    pub span_timings: bool,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE.to_string(),
            service_version: env!("CARGO_PKG_VERSION"),
            environment: None,
            env_filter: None,
            otlp_endpoint: None,
            log_format: LogFormat::Text,
            span_timings: false,
        }
    }
}

impl ObsConfig {
    /// Reads `OTEL_SERVICE_NAME`, `APP_ENV`, `LOG_FORMAT`, `LOG_SPAN_TIMINGS`
    /// and `OTLP_ENDPOINT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            service_name: non_blank("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
            environment: non_blank("APP_ENV"),
            otlp_endpoint: non_blank("OTLP_ENDPOINT"),
            log_format: non_blank("LOG_FORMAT")
                .map(|raw| LogFormat::parse(&raw))
                .unwrap_or_default(),
            span_timings: non_blank("LOG_SPAN_TIMINGS")
                .is_some_and(|raw| matches!(raw.trim(), "1" | "true" | "yes")),
            ..Self::default()
        }
    }

    fn resource(&self) -> Resource {
        let mut builder = Resource::builder()
            .with_service_name(self.service_name.clone())
            .with_attribute(KeyValue::new("service.version", self.service_version));
        if let Some(environment) = &self.environment {
            builder =
                builder.with_attribute(KeyValue::new("deployment.environment", environment.clone()));
        }
        builder.build()
    }
}

fn resolve_filter(explicit: Option<String>, from_env: Option<String>) -> String {
    explicit
        .or(from_env)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Installs the global subscriber once; later calls are no-ops.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let filter = resolve_filter(config.env_filter.clone(), std::env::var("RUST_LOG").ok());
    let env_filter = EnvFilter::try_new(filter)?;
    let span_events = if config.span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let (text_layer, json_layer) = match config.log_format {
        LogFormat::Text => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_span_events(span_events),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_span_events(span_events),
            ),
        ),
    };

    let otel_layer = match &config.otlp_endpoint {
        Some(endpoint) => {
            let exporter = SpanExporter::builder()
                .with_http()
                .with_protocol(Protocol::HttpBinary)
                .with_endpoint(endpoint.clone())
                .build()?;
            let provider = sdk::trace::SdkTracerProvider::builder()
                .with_resource(config.resource())
                .with_batch_exporter(exporter)
                .build();
            let tracer = provider.tracer(config.service_name.clone());
            opentelemetry::global::set_tracer_provider(provider);
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .with(otel_layer)
        .try_init()?;

    INIT.set(())
        .map_err(|_| anyhow!("tracing already initialized"))?;
    tracing::debug!(
        service = %config.service_name,
        format = ?config.log_format,
        otlp = config.otlp_endpoint.is_some(),
        "tracing initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn explicit_filter_wins_over_env() {
        let filter = resolve_filter(Some("debug".into()), Some("warn".into()));
        assert_eq!(filter, "debug");
    }

    #[test]
    fn blank_filter_falls_back_to_default() {
        assert_eq!(resolve_filter(None, Some("  ".into())), DEFAULT_FILTER);
        assert_eq!(resolve_filter(None, None), DEFAULT_FILTER);
    }

    #[test]
    fn env_overrides_service_and_format() {
        let config = ObsConfig::from_lookup(lookup(&[
            ("OTEL_SERVICE_NAME", "crm-worker"),
            ("APP_ENV", "staging"),
            ("LOG_FORMAT", " JSON "),
            ("LOG_SPAN_TIMINGS", "true"),
            ("OTLP_ENDPOINT", "  "),
        ]));
        assert_eq!(config.service_name, "crm-worker");
        assert_eq!(config.environment.as_deref(), Some("staging"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.span_timings);
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn missing_env_keeps_defaults() {
        let config = ObsConfig::from_lookup(lookup(&[("LOG_FORMAT", "logfmt")]));
        assert_eq!(config.service_name, DEFAULT_SERVICE);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(!config.span_timings);
        assert!(config.environment.is_none());
    }

    #[test]
    fn init_is_idempotent() {
        init_tracing(ObsConfig::default()).expect("first init");
        init_tracing(ObsConfig::default()).expect("second init");
    }
}
