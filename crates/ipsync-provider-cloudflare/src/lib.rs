// # Cloudflare DNS Provider
//
// Implements `DnsProvider` against the Cloudflare API v4.
//
// ## Behavior
//
// - One HTTP request per trait call, no retries and no caching
// - Every request carries `Authorization: Bearer <token>`
// - A call succeeds only on a 2xx status AND an envelope with `success: true`
// - HTTP timeout of 30 seconds
// - Status codes map onto the shared error kinds (401/403, 404, 429, 5xx)
// - Response bodies in error messages are truncated
//
// ## Security
//
// - The API token never appears in logs, errors or Debug output
// - Construction fails on an empty token
//
// ## API Reference
//
// - List Zones: GET `/zones?per_page=50`
// - List DNS Records: GET `/zones/:zone_id/dns_records?per_page=5000&type=...`
// - Overwrite DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`

use async_trait::async_trait;
use ipsync_core::config::{ApiToken, RunConfig};
use ipsync_core::{DnsProvider, DnsRecord, Error, RecordPayload, RecordType, Result, Zone};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for zone listing
const ZONES_PER_PAGE: u32 = 50;

/// Page size for record listing
const RECORDS_PER_PAGE: u32 = 5000;

/// Response bodies longer than this are cut in error messages
const MAX_ERROR_BODY: usize = 300;

const PROVIDER_NAME: &str = "cloudflare";

/// Standard Cloudflare response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Cloudflare DNS provider
///
/// Stateless apart from the HTTP client; all decisions about what to
/// change are made by the caller.
pub struct CloudflareProvider {
    /// ⚠️ NEVER log this value
    api_token: ApiToken,

    /// API root without a trailing slash
    base_url: String,

    client: reqwest::Client,
}

impl fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a provider
    ///
    /// `base_url` overrides [`CLOUDFLARE_API_BASE`], mainly for tests.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the token is empty
    /// - `Error::Transport` if the HTTP client cannot be built
    pub fn new(api_token: ApiToken, base_url: Option<String>) -> Result<Self> {
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| CLOUDFLARE_API_BASE.to_string());

        Ok(Self {
            api_token,
            base_url,
            client,
        })
    }

    /// Create a provider from the run configuration
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        Self::new(config.api_token.clone(), config.api_base.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }

    /// Send `request` and unwrap the envelope
    ///
    /// `action` names the operation in error messages.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> Result<Option<T>> {
        let response = request
            .bearer_auth(self.api_token.expose())
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::transport(format!("{}: HTTP request failed: {}", action, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());

        if !status.is_success() {
            return Err(status_error(status, action, &body));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            Error::data(format!(
                "{}: failed to parse response: {} - {}",
                action,
                e,
                truncate(&body)
            ))
        })?;

        if !envelope.success {
            return Err(Error::provider(
                PROVIDER_NAME,
                format!("{} rejected: {}", action, describe_errors(&envelope.errors)),
            ));
        }

        Ok(envelope.result)
    }
}

/// Map a non-2xx status onto an error kind
fn status_error(status: StatusCode, action: &str, body: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{}: invalid API token or insufficient permissions. Status: {}",
            action, status
        )),
        404 => Error::not_found(format!("{}: {} - {}", action, status, truncate(body))),
        429 => Error::rate_limited(format!(
            "{}: rate limit exceeded. Status: {}",
            action, status
        )),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!(
                "{}: Cloudflare server error (transient): {} - {}",
                action,
                status,
                truncate(body)
            ),
        ),
        _ => Error::provider(
            PROVIDER_NAME,
            format!("{} failed: {} - {}", action, status, truncate(body)),
        ),
    }
}

fn describe_errors(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "success=false with no error details".to_string();
    }
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(MAX_ERROR_BODY).collect();
    cut.push_str("...");
    cut
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn list_zones(&self, filter_name: Option<&str>) -> Result<Vec<Zone>> {
        let url = format!("{}/zones", self.base_url);
        tracing::debug!("GET /zones");

        let request = self
            .client
            .get(&url)
            .query(&[("per_page", ZONES_PER_PAGE)]);
        let zones: Vec<Zone> = self.send(request, "List zones").await?.unwrap_or_default();

        Ok(match filter_name {
            Some(name) => zones.into_iter().filter(|z| z.name == name).collect(),
            None => zones,
        })
    }

    async fn list_records(
        &self,
        zone_id: &str,
        record_type: Option<&RecordType>,
    ) -> Result<Vec<DnsRecord>> {
        let url = self.records_url(zone_id);
        tracing::debug!(
            "GET /zones/:zone_id/dns_records (type: {:?})",
            record_type.map(RecordType::as_str)
        );

        let mut query = vec![("per_page", RECORDS_PER_PAGE.to_string())];
        if let Some(record_type) = record_type {
            query.push(("type", record_type.as_str().to_string()));
        }

        let request = self.client.get(&url).query(&query);
        let records: Vec<DnsRecord> = self
            .send(request, "List DNS records")
            .await?
            .unwrap_or_default();

        // Newer API responses omit zone_id on records
        Ok(records
            .into_iter()
            .map(|record| {
                if record.zone_id.is_empty() {
                    record.with_zone_id(zone_id)
                } else {
                    record
                }
            })
            .collect())
    }

    async fn replace_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<()> {
        let url = format!("{}/{}", self.records_url(zone_id), record_id);
        tracing::debug!("PUT /zones/:zone_id/dns_records/:record_id");

        let request = self.client.put(&url).json(payload);
        self.send::<Value>(request, "Update DNS record").await?;
        Ok(())
    }

    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<()> {
        let url = self.records_url(zone_id);
        tracing::debug!("POST /zones/:zone_id/dns_records");

        let request = self.client.post(&url).json(payload);
        self.send::<Value>(request, "Create DNS record").await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: &str) -> ApiToken {
        ApiToken::new(value)
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let result = CloudflareProvider::new(token(""), None);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_default_and_custom_base_url() {
        let provider = CloudflareProvider::new(token("t"), None).unwrap();
        assert_eq!(provider.base_url(), CLOUDFLARE_API_BASE);

        let provider =
            CloudflareProvider::new(token("t"), Some("http://127.0.0.1:8080/v4/".to_string()))
                .unwrap();
        assert_eq!(provider.base_url(), "http://127.0.0.1:8080/v4");

        let provider = CloudflareProvider::new(token("t"), Some("  ".to_string())).unwrap();
        assert_eq!(provider.base_url(), CLOUDFLARE_API_BASE);
    }

    #[test]
    fn test_provider_name() {
        let provider = CloudflareProvider::new(token("t"), None).unwrap();
        assert_eq!(provider.provider_name(), "cloudflare");
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = CloudflareProvider::new(token("secret_token_12345"), None).unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("CloudflareProvider"));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "x", ""),
            Error::Authentication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "x", ""),
            Error::Authentication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "x", ""),
            Error::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "x", ""),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "x", ""),
            Error::Provider { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "x", ""),
            Error::Provider { .. }
        ));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY + 50);
        let message = status_error(StatusCode::BAD_REQUEST, "Update", &body).to_string();
        assert!(message.ends_with("..."));
        assert_eq!(truncate(&body).chars().count(), MAX_ERROR_BODY + 3);

        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_envelope_errors_are_described() {
        let envelope: Envelope<Value> = serde_json::from_str(
            r#"{"success":false,"errors":[{"code":9109,"message":"Invalid access token"}],"result":null}"#,
        )
        .unwrap();
        assert!(!envelope.success);
        assert_eq!(
            describe_errors(&envelope.errors),
            "[9109] Invalid access token"
        );
        assert_eq!(
            describe_errors(&[]),
            "success=false with no error details"
        );
    }
}
