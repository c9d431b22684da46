//! Service configuration read from the environment.

use std::net::SocketAddr;
use std::num::NonZeroUsize;

use changefeed_core::builder::validate_event_source;
use changefeed_eventbridge::cache::ClientReuse;
use changefeed_eventbridge::provider::{DetailTypeFormat, EVENTBRIDGE_MAX_ENTRIES};
use changefeed_stream::domain::stream_event::DEFAULT_KEY_ATTRIBUTE;

use crate::error::AppError;

/// Settings for one processor instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// `EVENT_BUS`: target bus name.
    pub event_bus: String,
    /// `EVENT_SOURCE`: source stamped on every envelope.
    pub event_source: String,
    /// `EVENTBRIDGE_ENDPOINT`: URL `PutEvents` calls are posted to.
    pub eventbridge_endpoint: String,
    /// `HOST`
    pub host: String,
    /// `PORT`
    pub port: u16,
    /// `STREAM_KEY_ATTRIBUTE`: key attribute holding the entity id.
    pub key_attribute: String,
    /// `CLIENT_CACHE_TTL_SECS`
    pub client_reuse: ClientReuse,
    /// `DETAIL_TYPE_FORMAT`: `name` or `name_with_version`.
    pub detail_type_format: DetailTypeFormat,
    /// `MAX_BATCH_SIZE`
    pub max_batch_size: NonZeroUsize,
    /// `LOG_LEVEL`: tracing filter directive overriding `RUST_LOG`.
    pub log_level: Option<String>,
}

impl ProcessorConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value is invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable or `None` when it is unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            optional(key)
                .ok_or_else(|| AppError::Config(format!("{key} environment variable must be set")))
        };

        let event_bus = required("EVENT_BUS")?;
        let event_source = required("EVENT_SOURCE")?;
        validate_event_source(&event_source)
            .map_err(|e| AppError::Config(format!("EVENT_SOURCE: {e}")))?;

        let eventbridge_endpoint = required("EVENTBRIDGE_ENDPOINT")?;
        if !(eventbridge_endpoint.starts_with("http://")
            || eventbridge_endpoint.starts_with("https://"))
        {
            return Err(AppError::Config(format!(
                "EVENTBRIDGE_ENDPOINT must be an http(s) URL, got {eventbridge_endpoint:?}"
            )));
        }

        let host = optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match optional("PORT") {
            Some(port) => port
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };

        let key_attribute =
            optional("STREAM_KEY_ATTRIBUTE").unwrap_or_else(|| DEFAULT_KEY_ATTRIBUTE.to_string());

        let client_reuse = match optional("CLIENT_CACHE_TTL_SECS") {
            Some(secs) => ClientReuse::from_secs(secs.parse().map_err(|e| {
                AppError::Config(format!("CLIENT_CACHE_TTL_SECS must be a whole number: {e}"))
            })?),
            None => ClientReuse::default(),
        };

        let detail_type_format = match optional("DETAIL_TYPE_FORMAT").as_deref() {
            None | Some("name") => DetailTypeFormat::EventName,
            Some("name_with_version") => DetailTypeFormat::EventNameWithVersion,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "DETAIL_TYPE_FORMAT must be `name` or `name_with_version`, got {other:?}"
                )));
            }
        };

        let max_batch_size = match optional("MAX_BATCH_SIZE") {
            Some(size) => size
                .parse::<usize>()
                .ok()
                .and_then(NonZeroUsize::new)
                .filter(|size| *size <= EVENTBRIDGE_MAX_ENTRIES)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "MAX_BATCH_SIZE must be between 1 and {EVENTBRIDGE_MAX_ENTRIES}, got {size:?}"
                    ))
                })?,
            None => EVENTBRIDGE_MAX_ENTRIES,
        };

        Ok(Self {
            event_bus,
            event_source,
            eventbridge_endpoint,
            host,
            port,
            key_attribute,
            client_reuse,
            detail_type_format,
            max_batch_size,
            log_level: optional("LOG_LEVEL"),
        })
    }

    /// The socket address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST` and `PORT` do not form a valid
    /// socket address.
    pub fn bind_address(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use chrono::TimeDelta;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("EVENT_BUS", "products"),
        ("EVENT_SOURCE", "myorg.product.stream"),
        ("EVENTBRIDGE_ENDPOINT", "http://localhost:4566"),
    ];

    fn with_required(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        REQUIRED.iter().chain(extra).copied().collect()
    }

    #[test]
    fn test_defaults_apply_when_only_required_vars_are_set() {
        // Act
        let config = ProcessorConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();

        // Assert
        assert_eq!(config.event_bus, "products");
        assert_eq!(config.event_source, "myorg.product.stream");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.key_attribute, "id");
        assert_eq!(config.client_reuse, ClientReuse::default());
        assert_eq!(config.detail_type_format, DetailTypeFormat::EventName);
        assert_eq!(config.max_batch_size.get(), 10);
        assert_eq!(config.log_level, None);
        assert_eq!(
            config.bind_address().unwrap(),
            "0.0.0.0:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_optional_vars_override_defaults() {
        let vars = with_required(&[
            ("PORT", "8080"),
            ("STREAM_KEY_ATTRIBUTE", "sku"),
            ("CLIENT_CACHE_TTL_SECS", "60"),
            ("DETAIL_TYPE_FORMAT", "name_with_version"),
            ("MAX_BATCH_SIZE", "4"),
            ("LOG_LEVEL", "debug"),
        ]);

        let config = ProcessorConfig::from_lookup(lookup_from(&vars)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.key_attribute, "sku");
        assert_eq!(
            config.client_reuse,
            ClientReuse::Cached {
                ttl: TimeDelta::seconds(60)
            }
        );
        assert_eq!(config.detail_type_format, DetailTypeFormat::EventNameWithVersion);
        assert_eq!(config.max_batch_size.get(), 4);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_zero_ttl_builds_a_client_per_call() {
        let vars = with_required(&[("CLIENT_CACHE_TTL_SECS", "0")]);

        let config = ProcessorConfig::from_lookup(lookup_from(&vars)).unwrap();

        assert_eq!(config.client_reuse, ClientReuse::PerCall);
    }

    #[test]
    fn test_missing_event_bus_is_a_config_error() {
        let result = ProcessorConfig::from_lookup(lookup_from(&REQUIRED[1..]));

        match result {
            Err(AppError::Config(message)) => assert!(message.contains("EVENT_BUS")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for extra in [
            ("EVENT_SOURCE", "my source"),
            ("EVENTBRIDGE_ENDPOINT", "localhost:4566"),
            ("PORT", "not-a-port"),
            ("CLIENT_CACHE_TTL_SECS", "-5"),
            ("DETAIL_TYPE_FORMAT", "upper"),
            ("MAX_BATCH_SIZE", "0"),
            ("MAX_BATCH_SIZE", "11"),
        ] {
            // later entries win in the lookup map
            let vars = with_required(&[extra]);

            let result = ProcessorConfig::from_lookup(lookup_from(&vars));

            assert!(
                matches!(result, Err(AppError::Config(_))),
                "expected {extra:?} to be rejected"
            );
        }
    }
}
