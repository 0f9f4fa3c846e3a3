//! Record-store REST API client.
//!
//! The managed backend exposes the key/value table through a PostgREST-style
//! surface. This client speaks exactly the contract the rest of the system
//! relies on: point get, upsert set, and prefix scan. Scan order is
//! unspecified at this layer; callers sort.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{KvError, KvResult};
use crate::metrics::record_request;
use crate::retry::{with_retry, RetryConfig};

/// Record-store client configuration.
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Base URL of the managed backend project.
    pub base_url: String,
    /// Service-role key used for both auth headers.
    pub service_key: String,
    /// Key/value table name.
    pub table: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Retry configuration.
    pub retry: RetryConfig,
}

impl KvConfig {
    /// Create config from environment variables.
    pub fn from_env() -> KvResult<Self> {
        let base_url = std::env::var("SUPABASE_URL")
            .map_err(|_| KvError::auth_error("SUPABASE_URL must be set to reach the record store"))?;
        if base_url.is_empty() {
            return Err(KvError::auth_error("SUPABASE_URL cannot be empty"));
        }

        let service_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .map_err(|_| KvError::auth_error("SUPABASE_SERVICE_ROLE_KEY must be set"))?;
        if service_key.is_empty() {
            return Err(KvError::auth_error("SUPABASE_SERVICE_ROLE_KEY cannot be empty"));
        }

        let connect_timeout_secs: u64 = std::env::var("KV_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            base_url,
            service_key,
            table: std::env::var("KV_TABLE").unwrap_or_else(|_| "kv_store".to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
        })
    }
}

/// Row shape returned by value-only selects.
#[derive(Deserialize)]
struct ValueRow {
    value: Value,
}

/// Record-store REST client.
#[derive(Clone)]
pub struct KvClient {
    http: Client,
    config: KvConfig,
    table_url: String,
}

impl KvClient {
    /// Create a new record-store client.
    pub fn new(config: KvConfig) -> KvResult<Self> {
        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(&config.service_key)
            .map_err(|_| KvError::auth_error("service key is not a valid header value"))?;
        key_value.set_sensitive(true);
        headers.insert("apikey", key_value);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|_| KvError::auth_error("service key is not a valid header value"))?;
        bearer.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, bearer);

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .default_headers(headers)
            .user_agent(concat!("cutcraft-kv/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(KvError::Network)?;

        let table_url = format!(
            "{}/rest/v1/{}",
            config.base_url.trim_end_matches('/'),
            config.table
        );

        Ok(Self {
            http,
            config,
            table_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> KvResult<Self> {
        Self::new(KvConfig::from_env()?)
    }

    /// Get the value stored at `key`, if any.
    pub async fn get(&self, key: &str) -> KvResult<Option<Value>> {
        let filter = format!("eq.{key}");
        self.instrumented("get", || async {
            let response = self
                .http
                .get(&self.table_url)
                .query(&[("select", "value"), ("key", filter.as_str())])
                .send()
                .await?;

            let mut rows: Vec<ValueRow> = Self::parse_rows(response).await?;
            Ok(rows.pop().map(|r| r.value))
        })
        .await
    }

    /// Set `key` to `value`, inserting or overwriting.
    pub async fn set(&self, key: &str, value: &Value) -> KvResult<()> {
        let body = serde_json::json!([{ "key": key, "value": value }]);

        self.instrumented("set", || async {
            let response = self
                .http
                .post(&self.table_url)
                .query(&[("on_conflict", "key")])
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Self::error_from_response(status, response).await);
            }
            debug!(key = %key, "record stored");
            Ok(())
        })
        .await
    }

    /// Fetch every value whose key starts with `prefix`.
    ///
    /// Order is unspecified; callers sort.
    pub async fn get_by_prefix(&self, prefix: &str) -> KvResult<Vec<Value>> {
        let pattern = format!("like.{prefix}*");
        self.instrumented("get_by_prefix", || async {
            let response = self
                .http
                .get(&self.table_url)
                .query(&[("select", "value"), ("key", pattern.as_str())])
                .send()
                .await?;

            let rows: Vec<ValueRow> = Self::parse_rows(response).await?;
            Ok(rows.into_iter().map(|r| r.value).collect())
        })
        .await
    }

    /// Get and deserialize the value stored at `key`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> KvResult<Option<T>> {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store `value` at `key`.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> KvResult<()> {
        self.set(key, &serde_json::to_value(value)?).await
    }

    /// Cheap connectivity probe for readiness checks.
    pub async fn check_connectivity(&self) -> KvResult<()> {
        let response = self
            .http
            .get(&self.table_url)
            .query(&[("select", "key"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(status, response).await);
        }
        Ok(())
    }

    async fn parse_rows<T: DeserializeOwned>(response: reqwest::Response) -> KvResult<Vec<T>> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(status, response).await);
        }
        Ok(response.json().await?)
    }

    async fn error_from_response(status: StatusCode, response: reqwest::Response) -> KvError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return KvError::RateLimited(after_ms);
        }

        let body = response.text().await.unwrap_or_default();
        KvError::from_http_status(status.as_u16(), body)
    }

    /// Run `op` under the retry policy, recording request metrics.
    async fn instrumented<T, F, Fut>(&self, operation: &'static str, op: F) -> KvResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = KvResult<T>>,
    {
        let start = Instant::now();
        let result = with_retry(&self.config.retry, operation, op).await;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(0),
        };
        record_request(operation, status, start.elapsed().as_secs_f64() * 1000.0);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_from_env_requires_url() {
        std::env::remove_var("SUPABASE_URL");
        std::env::set_var("SUPABASE_SERVICE_ROLE_KEY", "key");
        assert!(KvConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_config_from_env_requires_service_key() {
        std::env::set_var("SUPABASE_URL", "https://project.example.com");
        std::env::remove_var("SUPABASE_SERVICE_ROLE_KEY");
        assert!(KvConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        std::env::set_var("SUPABASE_URL", "https://project.example.com");
        std::env::set_var("SUPABASE_SERVICE_ROLE_KEY", "service-key");
        std::env::remove_var("KV_TABLE");
        std::env::remove_var("KV_CONNECT_TIMEOUT_SECS");

        let config = KvConfig::from_env().unwrap();
        assert_eq!(config.table, "kv_store");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let config = KvConfig {
            base_url: "https://project.example.com/".to_string(),
            service_key: "key".to_string(),
            table: "kv_store".to_string(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            retry: RetryConfig::default(),
        };
        let client = KvClient::new(config).unwrap();
        assert_eq!(
            client.table_url,
            "https://project.example.com/rest/v1/kv_store"
        );
    }
}
