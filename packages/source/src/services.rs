//! Compile-time registry of upstream service configurations.
//!
//! Each upstream is defined in a TOML file under `services/`. The registry
//! embeds these at compile time; [`Services::load`] resolves them into the
//! endpoints the client talks to, applying `EONET_BASE_URL` and
//! `IPAPI_BASE_URL` overrides from the environment.

use std::time::Duration;

use serde::Deserialize;

use crate::SourceError;

/// Environment variable overriding the EONET base URL.
pub const EONET_BASE_URL_ENV: &str = "EONET_BASE_URL";

/// Environment variable overriding the ipapi base URL.
pub const IPAPI_BASE_URL_ENV: &str = "IPAPI_BASE_URL";

/// An upstream service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Unique identifier (`"eonet"`, `"ipapi"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry attempts for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// NASA EONET v3.
    Eonet {
        /// API root (e.g. `"https://eonet.gsfc.nasa.gov/api/v3"`).
        base_url: String,
        /// Path of the `GeoJSON` events endpoint below `base_url`.
        events_path: String,
    },
    /// ipapi.co IP geolocation.
    Ipapi {
        /// API root (e.g. `"https://ipapi.co"`).
        base_url: String,
        /// `User-Agent` header sent with every lookup.
        user_agent: String,
    },
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    3
}

impl ServiceConfig {
    /// Returns the provider's base URL regardless of variant.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Eonet { base_url, .. } | ProviderConfig::Ipapi { base_url, .. } => {
                base_url
            }
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Compile-time embedded TOML files

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("eonet", include_str!("../services/eonet.toml")),
    ("ipapi", include_str!("../services/ipapi.toml")),
];

/// Returns every configured upstream service.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<ServiceConfig> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse service '{name}': {e}"))
        })
        .collect()
}

/// Resolved EONET endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EonetService {
    /// API root without a trailing slash.
    pub base_url: String,
    /// Path of the events endpoint below `base_url`.
    pub events_path: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry attempts for transient failures.
    pub max_retries: u32,
}

impl EonetService {
    /// Full URL of the `GeoJSON` events endpoint.
    #[must_use]
    pub fn events_endpoint(&self) -> String {
        format!("{}/{}", self.base_url, self.events_path.trim_start_matches('/'))
    }

    /// Full URL of a reference catalog endpoint (`sources`, `categories`,
    /// `magnitudes`).
    #[must_use]
    pub fn catalog_endpoint(&self, segment: &str) -> String {
        format!("{}/{segment}", self.base_url)
    }
}

/// Resolved ipapi endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpapiService {
    /// API root without a trailing slash.
    pub base_url: String,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry attempts for transient failures.
    pub max_retries: u32,
}

impl IpapiService {
    /// Lookup URL for `ip`, or for the caller's own address when `ip` is
    /// `None` or blank.
    #[must_use]
    pub fn lookup_url(&self, ip: Option<&str>) -> String {
        match ip.map(str::trim).filter(|ip| !ip.is_empty()) {
            Some(ip) => format!("{}/{ip}/json", self.base_url),
            None => format!("{}/json", self.base_url),
        }
    }
}

/// The two upstreams the viewer needs, resolved from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Services {
    /// Event and catalog source.
    pub eonet: EonetService,
    /// IP geolocation.
    pub ipapi: IpapiService,
}

impl Services {
    /// Resolves the embedded configurations, applying environment
    /// overrides for the base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if a provider type is missing from
    /// the registry.
    pub fn load() -> Result<Self, SourceError> {
        Self::from_configs(&all_services(), |key| std::env::var(key).ok())
    }

    /// Resolves `configs`, looking up overrides through `env`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if a provider type is missing from
    /// `configs`.
    pub fn from_configs(
        configs: &[ServiceConfig],
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SourceError> {
        let mut eonet = None;
        let mut ipapi = None;

        for config in configs {
            log::debug!("Configured service {} at {}", config.id, config.base_url());
            match &config.provider {
                ProviderConfig::Eonet {
                    base_url,
                    events_path,
                } => {
                    eonet = Some(EonetService {
                        base_url: resolve_base_url(base_url, EONET_BASE_URL_ENV, &env),
                        events_path: events_path.clone(),
                        timeout: config.timeout(),
                        max_retries: config.max_retries,
                    });
                }
                ProviderConfig::Ipapi {
                    base_url,
                    user_agent,
                } => {
                    ipapi = Some(IpapiService {
                        base_url: resolve_base_url(base_url, IPAPI_BASE_URL_ENV, &env),
                        user_agent: user_agent.clone(),
                        timeout: config.timeout(),
                        max_retries: config.max_retries,
                    });
                }
            }
        }

        Ok(Self {
            eonet: eonet.ok_or_else(|| SourceError::Config {
                message: "no service of type \"eonet\" is configured".to_string(),
            })?,
            ipapi: ipapi.ok_or_else(|| SourceError::Config {
                message: "no service of type \"ipapi\" is configured".to_string(),
            })?,
        })
    }
}

fn resolve_base_url(
    configured: &str,
    env_key: &str,
    env: impl Fn(&str) -> Option<String>,
) -> String {
    let url = match env(env_key).filter(|v| !v.trim().is_empty()) {
        Some(overridden) => {
            log::info!("Using {env_key}={overridden}");
            overridden
        }
        None => configured.to_string(),
    };
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_services() {
        assert_eq!(all_services().len(), SERVICE_TOMLS.len());
    }

    #[test]
    fn service_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for svc in &all_services() {
            assert!(seen.insert(svc.id.clone()), "Duplicate service ID: {}", svc.id);
        }
    }

    #[test]
    fn all_services_have_required_fields() {
        for svc in &all_services() {
            assert!(!svc.name.is_empty(), "Service {} has empty name", svc.id);
            assert!(
                svc.base_url().starts_with("https://"),
                "Service {} has no https base_url",
                svc.id
            );
            assert_eq!(svc.timeout_secs, 30);
            assert_eq!(svc.max_retries, 3);
        }
    }

    #[test]
    fn resolves_default_endpoints() {
        let services = Services::from_configs(&all_services(), |_| None).unwrap();
        assert_eq!(
            services.eonet.events_endpoint(),
            "https://eonet.gsfc.nasa.gov/api/v3/events/geojson"
        );
        assert_eq!(
            services.eonet.catalog_endpoint("sources"),
            "https://eonet.gsfc.nasa.gov/api/v3/sources"
        );
        assert_eq!(services.ipapi.lookup_url(None), "https://ipapi.co/json");
        assert_eq!(
            services.ipapi.lookup_url(Some("8.8.8.8")),
            "https://ipapi.co/8.8.8.8/json"
        );
        assert_eq!(services.ipapi.lookup_url(Some("  ")), "https://ipapi.co/json");
        assert!(services.ipapi.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn env_overrides_base_urls() {
        let services = Services::from_configs(&all_services(), |key| match key {
            EONET_BASE_URL_ENV => Some("http://localhost:8080/api/v3/".to_string()),
            IPAPI_BASE_URL_ENV => Some("http://localhost:9090".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(
            services.eonet.events_endpoint(),
            "http://localhost:8080/api/v3/events/geojson"
        );
        assert_eq!(services.ipapi.lookup_url(None), "http://localhost:9090/json");
    }

    #[test]
    fn missing_provider_is_a_config_error() {
        let only_eonet: Vec<ServiceConfig> = all_services()
            .into_iter()
            .filter(|s| matches!(s.provider, ProviderConfig::Eonet { .. }))
            .collect();
        let err = Services::from_configs(&only_eonet, |_| None).unwrap_err();
        assert!(matches!(err, SourceError::Config { .. }));
    }
}
