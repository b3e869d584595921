//! Process configuration.
//!
//! Built once at startup, from the environment or a YAML file, and passed by
//! value into the components that need it. Nothing else in the crate reads the
//! environment.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

pub const ENV_KV_URL: &str = "UPSTASH_REDIS_REST_URL";
pub const ENV_KV_TOKEN: &str = "UPSTASH_REDIS_REST_TOKEN";
pub const ENV_AI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_AI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_AI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_AI_TIMEOUT_SECS: &str = "AI_TIMEOUT_SECS";
pub const ENV_QUERY_COST: &str = "QUERY_CREDIT_COST";
pub const ENV_QUERY_TTL_SECS: &str = "QUERY_CACHE_TTL_SECS";
pub const ENV_QUERY_HIT_DELAY_MS: &str = "QUERY_HIT_DELAY_MS";

/// Connection details for the REST key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvStoreConfig {
    pub url: String,
    pub token: String,
    #[serde(default = "default_kv_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_kv_timeout_ms() -> u64 {
    2_000
}

impl KvStoreConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            timeout_ms: default_kv_timeout_ms(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Model provider settings (OpenAI-compatible chat completions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: f64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ai_timeout_secs() -> u64 {
    30
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            timeout_secs: default_ai_timeout_secs(),
            temperature: 0.0,
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Billing and caching policy for natural-language queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Credits charged per computed (uncached) query.
    #[serde(default = "default_credit_cost")]
    pub credit_cost: i64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Pause applied before returning a cached answer.
    #[serde(default = "default_hit_delay_ms")]
    pub hit_delay_ms: u64,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_credit_cost() -> i64 {
    1
}

fn default_cache_ttl_secs() -> u64 {
    30 * 60
}

fn default_hit_delay_ms() -> u64 {
    500
}

fn default_key_prefix() -> String {
    "AI job attributes".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            credit_cost: default_credit_cost(),
            cache_ttl_secs: default_cache_ttl_secs(),
            hit_delay_ms: default_hit_delay_ms(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl QueryConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn hit_delay(&self) -> Duration {
        Duration::from_millis(self.hit_delay_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// `None` disables caching process-wide.
    #[serde(default)]
    pub kv_store: Option<KvStoreConfig>,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let kv_store = match (get(ENV_KV_URL), get(ENV_KV_TOKEN)) {
            (Some(url), Some(token)) => Some(KvStoreConfig::new(url.trim(), token.trim())),
            _ => None,
        };

        let defaults = GeneratorConfig::default();
        let generator = GeneratorConfig {
            base_url: get(ENV_AI_BASE_URL).unwrap_or(defaults.base_url),
            api_key: get(ENV_AI_API_KEY),
            model: get(ENV_AI_MODEL).unwrap_or(defaults.model),
            timeout_secs: parse_var(ENV_AI_TIMEOUT_SECS, get(ENV_AI_TIMEOUT_SECS))?
                .unwrap_or(defaults.timeout_secs),
            temperature: defaults.temperature,
        };

        let defaults = QueryConfig::default();
        let query = QueryConfig {
            credit_cost: parse_var(ENV_QUERY_COST, get(ENV_QUERY_COST))?
                .unwrap_or(defaults.credit_cost),
            cache_ttl_secs: parse_var(ENV_QUERY_TTL_SECS, get(ENV_QUERY_TTL_SECS))?
                .unwrap_or(defaults.cache_ttl_secs),
            hit_delay_ms: parse_var(ENV_QUERY_HIT_DELAY_MS, get(ENV_QUERY_HIT_DELAY_MS))?
                .unwrap_or(defaults.hit_delay_ms),
            key_prefix: defaults.key_prefix,
        };

        let mut config = Self {
            kv_store,
            generator,
            query,
        };
        config.disable_unusable_kv_store();
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid YAML: {}", e),
                ErrorContext::new().with_source("config"),
            )
        })?;
        config.disable_unusable_kv_store();
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {}", e),
                ErrorContext::new().with_details(path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&content)
    }

    /// A KV store without a usable http(s) endpoint or token counts as not
    /// configured: caching is turned off and startup continues.
    fn disable_unusable_kv_store(&mut self) {
        let Some(kv) = &self.kv_store else {
            return;
        };
        let problem = match check_http_url(&kv.url, "kv_store.url") {
            Err(e) => e.to_string(),
            Ok(()) if kv.token.trim().is_empty() => "kv_store.token is empty".to_string(),
            Ok(()) => return,
        };
        warn!(error = %problem, "kv store configuration unusable; caching disabled");
        self.kv_store = None;
    }

    /// Checks settings that have no safe fallback.
    pub fn validate(&self) -> Result<()> {
        check_http_url(&self.generator.base_url, "generator.base_url")?;
        if self.query.credit_cost < 0 {
            return Err(Error::configuration_with_context(
                "credit cost must not be negative",
                ErrorContext::new()
                    .with_field_path("query.credit_cost")
                    .with_details(self.query.credit_cost.to_string()),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    raw.map(|v| {
        v.trim().parse::<T>().map_err(|e| {
            Error::configuration_with_context(
                format!("invalid value: {}", e),
                ErrorContext::new().with_field_path(name).with_details(v.clone()),
            )
        })
    })
    .transpose()
}

fn check_http_url(raw: &str, field: &str) -> Result<()> {
    let parsed = url::Url::parse(raw).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid URL: {}", e),
            ErrorContext::new().with_field_path(field),
        )
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::configuration_with_context(
            format!("unsupported URL scheme '{}'", other),
            ErrorContext::new().with_field_path(field),
        )),
    }
}
