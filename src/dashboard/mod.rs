use log::{info, warn};
use serde::Serialize;

use crate::gateway::client::ApiClient;
use crate::models::facets::FacetCounts;
use crate::models::host::Host;
use crate::models::navigation::NavigableQuery;
use crate::search::builder::build_filter;
use crate::search::facet_panel::{FacetPanel, FacetPanelView};
use crate::search::paginator::{PageLink, Paginator};

/// State of one asynchronous operation as shown by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Everything one refresh fetched for a navigable state
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub hosts: Vec<Host>,
    pub facets: FacetCounts,
    pub next_page_token: Option<String>,
    /// Banner text when the search or facets request failed
    pub error: Option<String>,
    pub search_failed: bool,
    pub facets_failed: bool,
}

impl DashboardData {
    pub fn search_state(&self) -> LoadState {
        if self.search_failed {
            LoadState::Failed
        } else {
            LoadState::Ready
        }
    }

    pub fn facets_state(&self) -> LoadState {
        if self.facets_failed {
            LoadState::Failed
        } else {
            LoadState::Ready
        }
    }

    fn failed(banner: String, search_failed: bool, facets_failed: bool) -> Self {
        Self {
            error: Some(banner),
            search_failed,
            facets_failed,
            ..Self::default()
        }
    }
}

/// Marker on the world map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDot {
    pub lat: f64,
    pub lng: f64,
    pub label: String,
}

/// Result list section
#[derive(Debug, Clone, Serialize)]
pub struct ResultsView {
    pub hosts: Vec<Host>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub pages: Vec<PageLink>,
    pub has_previous: bool,
    pub has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LoadStatus {
    pub search: LoadState,
    pub facets: LoadState,
}

/// Full dashboard payload
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub query: Option<String>,
    pub href: String,
    pub results: ResultsView,
    pub facets: FacetPanelView,
    pub map: Vec<MapDot>,
    pub status: LoadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build the filter, then run Search and Facets concurrently with that same filter.
///
/// Never fails: any error leaves empty results and a banner so the page still renders.
pub async fn load(client: &ApiClient, nav: &NavigableQuery, limit: usize) -> DashboardData {
    let filter = match build_filter(nav) {
        Ok(filter) => filter,
        Err(e) => {
            warn!("Rejected dashboard selections: {}", e);
            return DashboardData::failed(e.to_string(), true, true);
        }
    };

    let (search, facets) = tokio::join!(client.search(&filter, Some(limit), None), client.facets(&filter));

    match (search, facets) {
        (Ok(search), Ok(facets)) => {
            info!(
                "Loaded {} hosts for filter {} (next page: {})",
                search.hosts.len(),
                filter.to_param(),
                search.next_page_token.is_some()
            );
            DashboardData {
                hosts: search.hosts,
                facets,
                next_page_token: search.next_page_token,
                ..DashboardData::default()
            }
        }
        (search, facets) => {
            let search_failed = search.is_err();
            let facets_failed = facets.is_err();
            let message = search
                .err()
                .or_else(|| facets.err())
                .map(|e| e.to_string())
                .unwrap_or_default();
            warn!(
                "Dashboard load failed (search failed: {}, facets failed: {}): {}",
                search_failed, facets_failed, message
            );
            DashboardData::failed(unavailable_banner(&message, client), search_failed, facets_failed)
        }
    }
}

fn unavailable_banner(message: &str, client: &ApiClient) -> String {
    format!(
        "{}. Make sure the API is running at {}",
        message,
        client.base_url().as_str().trim_end_matches('/')
    )
}

/// Map markers for hosts with a known location
pub fn map_dots(hosts: &[Host]) -> Vec<MapDot> {
    hosts
        .iter()
        .filter(|host| host.has_location())
        .map(|host| MapDot {
            lat: host.latitude(),
            lng: host.longitude(),
            label: host.ip.clone(),
        })
        .collect()
}

/// Assemble the payload for one page of a loaded dashboard
pub fn render(
    nav: &NavigableQuery,
    data: &DashboardData,
    paginator: &Paginator,
    panel: &FacetPanel,
    status: LoadStatus,
) -> DashboardView {
    DashboardView {
        query: nav.query.clone(),
        href: nav.href(),
        results: ResultsView {
            hosts: paginator.slice(&data.hosts).to_vec(),
            total: data.hosts.len(),
            page: paginator.current_page(),
            total_pages: paginator.total_pages(),
            pages: paginator.window(),
            has_previous: paginator.has_previous(),
            has_next: paginator.has_next(),
            next_page_token: data.next_page_token.clone(),
        },
        facets: panel.view(&data.facets),
        map: map_dots(&data.hosts),
        status,
        error: data.error.clone(),
    }
}
