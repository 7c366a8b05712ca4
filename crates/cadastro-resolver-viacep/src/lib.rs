// # ViaCEP Address Resolver
//
// This crate provides the ViaCEP implementation of the AddressResolver
// capability for the cadastro system.
//
// ## Behavior
//
// - Format check before any network I/O (a malformed code never produces
//   an outbound request)
// - One HTTP request per invocation, bounded by the configured timeout
// - NO retry logic (callers decide whether to re-invoke)
// - NO caching (each call reflects the service's current answer)
//
// ## API Reference
//
// - ViaCEP: GET `https://viacep.com.br/ws/{code}/json/`
// - Unknown codes answer HTTP 200 with an `erro` marker in the body
//   (historically a boolean, more recently the string "true")
// - Known codes answer the address fields; `logradouro` may be empty for
//   codes that cover a whole locality

use async_trait::async_trait;
use cadastro_core::config::LookupConfig;
use cadastro_core::traits::{ADDRESS_NOT_INFORMED, AddressResolver, normalize_postal_code};
use cadastro_core::{Error, LookupError};
use serde::Deserialize;
use std::time::Duration;

/// ViaCEP API base URL
pub const VIACEP_API_BASE: &str = "https://viacep.com.br/ws";

/// ViaCEP resolver
///
/// Stateless and single-shot: every call issues exactly one request and
/// maps the response to the resolver outcome taxonomy.
#[derive(Debug, Clone)]
pub struct ViaCepResolver {
    base_url: String,
    client: reqwest::Client,
}

/// Subset of the ViaCEP response body consumed by the resolver
#[derive(Debug, Clone, Deserialize)]
struct ViaCepResponse {
    /// Not-found marker; absent for known codes
    #[serde(default)]
    erro: Option<serde_json::Value>,

    /// Street line; may be absent or empty for known codes
    #[serde(default)]
    logradouro: Option<String>,
}

impl ViaCepResponse {
    /// ViaCEP has answered both `"erro": true` and `"erro": "true"` over
    /// the years; treat either as the not-found marker.
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        }
    }
}

impl ViaCepResolver {
    /// Create a resolver from lookup configuration
    pub fn new(config: &LookupConfig) -> Result<Self, Error> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Resolver against the public ViaCEP endpoint with default settings
    pub fn new_default() -> Result<Self, Error> {
        Self::new(&LookupConfig::default())
    }
}

#[async_trait]
impl AddressResolver for ViaCepResolver {
    async fn resolve(&self, raw_code: &str) -> Result<String, LookupError> {
        // Format check happens before any network I/O
        let code = normalize_postal_code(raw_code)?;

        let url = format!("{}/{}/json/", self.base_url, code);
        tracing::debug!(%code, "querying ViaCEP");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Unavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(LookupError::Unavailable(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let body: ViaCepResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Unavailable(format!("failed to parse response: {}", e)))?;

        map_response(body)
    }

    fn resolver_name(&self) -> &'static str {
        "viacep"
    }
}

/// Map a decoded ViaCEP body to the resolver outcome
fn map_response(body: ViaCepResponse) -> Result<String, LookupError> {
    if body.is_not_found() {
        tracing::debug!("ViaCEP answered with its not-found marker");
        return Err(LookupError::NotFound);
    }

    match body.logradouro {
        Some(line) if !line.trim().is_empty() => Ok(line),
        // A known code without a street line is a success, not an error
        _ => Ok(ADDRESS_NOT_INFORMED.to_string()),
    }
}
