//! HTTP client for the hosted media API.
//!
//! ## Endpoints
//!
//! | Call | Request |
//! |---|---|
//! | List | `POST {api_base}/{cloud_name}/resources/search`, basic auth, JSON body |
//! | Fetch | `GET {delivery_base}/{cloud_name}/image/upload/{transformation}/{public_id}.{format}` |
//!
//! Requests are built and executed separately so tests can inspect exactly
//! what would go on the wire without a server.

use super::backend::{FetchError, MediaService, ServiceError};
use super::params::{FetchParams, ListQuery};
use crate::config::ServiceConfig;
use crate::types::RawAssetDescriptor;
use reqwest::blocking::{Client, Request};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::debug;

pub const ENV_API_KEY: &str = "CLOUDINARY_API_KEY";
pub const ENV_API_SECRET: &str = "CLOUDINARY_API_SECRET";

/// API key and secret. Read from the environment only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve credentials through an arbitrary lookup. Empty values count
    /// as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServiceError> {
        let get = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ServiceError::MissingCredential(key))
        };
        Ok(Self::new(get(ENV_API_KEY)?, get(ENV_API_SECRET)?))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    expression: String,
    sort_by: Vec<BTreeMap<&'a str, &'a str>>,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    resources: Vec<RawAssetDescriptor>,
}

/// Parse a search response body.
pub fn parse_search_response(body: &str) -> Result<Vec<RawAssetDescriptor>, ServiceError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::Malformed(e.to_string()))?;
    Ok(response.resources)
}

/// Blocking client for the search and delivery APIs.
#[derive(Debug)]
pub struct CloudinaryService {
    client: Client,
    cloud_name: String,
    api_base: String,
    delivery_base: String,
    credentials: Credentials,
}

impl CloudinaryService {
    pub fn new(config: &ServiceConfig, credentials: Credentials) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("gallery-prep/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            cloud_name: config.cloud_name.trim().to_string(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            delivery_base: config.delivery_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn search_url(&self) -> String {
        format!("{}/{}/resources/search", self.api_base, self.cloud_name)
    }

    /// Public URL of a transformed asset.
    pub fn delivery_url(&self, params: &FetchParams) -> String {
        format!(
            "{}/{}/image/upload/{}",
            self.delivery_base,
            self.cloud_name,
            params.asset_path()
        )
    }

    pub fn search_request(&self, query: &ListQuery) -> Result<Request, ServiceError> {
        let body = SearchRequest {
            expression: query.expression(),
            sort_by: vec![BTreeMap::from([(
                query.sort_by.as_str(),
                query.direction.as_str(),
            )])],
            max_results: query.max_results,
        };
        Ok(self
            .client
            .post(self.search_url())
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .json(&body)
            .build()?)
    }

    pub fn fetch_request(&self, params: &FetchParams) -> Result<Request, reqwest::Error> {
        self.client.get(self.delivery_url(params)).build()
    }
}

impl MediaService for CloudinaryService {
    fn list(&self, query: &ListQuery) -> Result<Vec<RawAssetDescriptor>, ServiceError> {
        let request = self.search_request(query)?;
        debug!(url = %request.url(), expression = %query.expression(), "searching folder");

        let response = self.client.execute(request)?;
        let status = response.status();
        let body = response.text()?;
        debug!(status = status.as_u16(), bytes = body.len(), "search response");

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_search_response(&body)
    }

    fn fetch(&self, params: &FetchParams) -> Result<Vec<u8>, FetchError> {
        let http_err = |source| FetchError::Http {
            public_id: params.public_id.clone(),
            source,
        };

        let request = self.fetch_request(params).map_err(http_err)?;
        debug!(url = %request.url(), "fetching placeholder source");

        let response = self.client.execute(request).map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                public_id: params.public_id.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(http_err)?;
        debug!(public_id = %params.public_id, bytes = bytes.len(), "fetched");
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody {
                public_id: params.public_id.clone(),
            });
        }
        Ok(bytes.to_vec())
    }
}
