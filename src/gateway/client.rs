use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::config::AppConfig;
use crate::models::facets::FacetCounts;
use crate::models::filter::Filter;
use crate::models::host::Host;
use crate::models::null_as_default;
use crate::utils::error::{AppError, AppResult};

/// Limit sent by [`ApiClient::search`] when the caller passes none
pub const DEFAULT_LIMIT: usize = 20;

/// Search endpoint response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hosts: Vec<Host>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<FacetCounts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FacetsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    facets: FacetCounts,
}

/// Read-only client for the external host search API.
///
/// No retries and no client-side timeout: callers re-trigger failed requests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Self::with_base_url(&config.api_base_url)
    }

    pub fn with_base_url(base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::ConfigError(format!("'{}' cannot be used as an API base URL", base_url)));
        }

        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Hosts matching `filter`, in the order the API returns them
    pub async fn search(
        &self,
        filter: &Filter,
        limit: Option<usize>,
        page_token: Option<&str>,
    ) -> AppResult<SearchResponse> {
        let mut query = vec![
            ("filter", filter.to_param()),
            ("limit", limit.unwrap_or(DEFAULT_LIMIT).to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("page_token", token.to_string()));
        }

        let response: SearchResponse = self.get_json(&["api", "hosts", "search"], &query).await?;
        for host in response.hosts.iter().filter(|h| !h.is_consistent()) {
            warn!("Host {} reports first_seen after last_seen", host.ip);
        }
        Ok(response)
    }

    /// Facet counts over the hosts matching `filter`
    pub async fn facets(&self, filter: &Filter) -> AppResult<FacetCounts> {
        let query = [("filter", filter.to_param())];
        let response: FacetsResponse = self.get_json(&["api", "facets"], &query).await?;
        Ok(response.facets)
    }

    /// One host by address; a 404 becomes [`AppError::NotFoundError`]
    pub async fn host(&self, ip: &str) -> AppResult<Host> {
        match self.get_json(&["api", "hosts", ip], &[] as &[(&str, String)]).await {
            Err(AppError::RequestError { status }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(AppError::NotFoundError(format!("host {}", ip)))
            }
            other => other,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = self.endpoint(segments);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!("GET {} answered {}", url, status);
            return Err(AppError::RequestError { status: status.as_u16() });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| AppError::ParseError(format!("unexpected response from {}: {}", url, e)))
    }
}
