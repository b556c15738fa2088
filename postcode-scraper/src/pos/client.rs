//! Pos Malaysia postcode API client.

use crate::domain::{Postcode, Record};
use crate::fetch::PostcodeSource;

use super::error::PosError;

/// Default base URL for the postcode API.
const DEFAULT_BASE_URL: &str = "https://api.pos.com.my";

/// Path of the postcode lookup endpoint, relative to the base URL.
const LOOKUP_PATH: &str = "/PostcodeWebApi/api/Postcode";

/// Configuration for the postcode API client.
#[derive(Debug, Clone)]
pub struct PosClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl PosClientConfig {
    /// Create a new config pointing at the production API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for PosClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the postcode lookup API.
#[derive(Debug, Clone)]
pub struct PosClient {
    http: reqwest::Client,
    base_url: String,
}

impl PosClient {
    /// Create a new postcode API client.
    pub fn new(config: PosClientConfig) -> Result<Self, PosError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the lookup endpoint, without the query string.
    fn lookup_url(&self) -> String {
        format!("{}{}", self.base_url, LOOKUP_PATH)
    }

    /// Fetch every record registered under a postcode.
    ///
    /// An empty list is a successful answer: no locations use this postcode.
    pub async fn lookup(&self, postcode: &Postcode) -> Result<Vec<Record>, PosError> {
        let response = self
            .http
            .get(self.lookup_url())
            .query(&[("Postcode", postcode.as_str())])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PosError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        decode_records(&body)
    }
}

impl PostcodeSource for PosClient {
    async fn lookup(&self, postcode: &Postcode) -> Result<Vec<Record>, PosError> {
        PosClient::lookup(self, postcode).await
    }
}

/// Decode a lookup response body.
///
/// The service answers `null` instead of `[]` for some unassigned postcodes;
/// both mean "no records".
fn decode_records(body: &str) -> Result<Vec<Record>, PosError> {
    let records: Option<Vec<Record>> =
        serde_json::from_str(body).map_err(|e| PosError::Json {
            message: format!("{e} (body: {})", body.chars().take(200).collect::<String>()),
        })?;
    Ok(records.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = PosClientConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_with_overrides() {
        let config = PosClientConfig::new()
            .with_base_url("http://localhost:8080")
            .with_timeout(5);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn lookup_url_ignores_trailing_slash() {
        let client =
            PosClient::new(PosClientConfig::new().with_base_url("http://localhost:8080/")).unwrap();
        assert_eq!(
            client.lookup_url(),
            "http://localhost:8080/PostcodeWebApi/api/Postcode"
        );
    }

    #[test]
    fn decode_list() {
        let body = r#"[{"Postcode":"01000","Location":"Kangar","Post_Office":"Kangar","State":"Perlis"}]"#;
        let records = decode_records(body).unwrap();
        assert_eq!(records, vec![Record::new("01000", "Kangar", "Kangar", "Perlis")]);
    }

    #[test]
    fn decode_empty_and_null() {
        assert!(decode_records("[]").unwrap().is_empty());
        assert!(decode_records("null").unwrap().is_empty());
    }

    #[test]
    fn decode_garbage_is_an_error() {
        let err = decode_records("<html>oops</html>").unwrap_err();
        assert!(matches!(err, PosError::Json { .. }));
        assert!(err.to_string().contains("<html>"));
    }
}
