use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dashboard::{self, DashboardData, DashboardView, LoadState, LoadStatus};
use crate::models::host::Host;
use crate::models::navigation::{FacetCategory, NavigableQuery};
use crate::search::facet_panel::{FacetPanel, FacetPanelView};
use crate::search::paginator::{Paginator, Viewport};
use crate::search::parser::parse_query;

const EVENT_CAPACITY: usize = 32;

/// Events pushed to WebSocket subscribers of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionEvent {
    Loading { generation: u64 },
    Loaded { generation: u64, total: usize },
    Failed { generation: u64, message: String },
}

/// What a refresh needs once the session lock is released
#[derive(Debug, Clone)]
pub struct RefreshTicket {
    pub generation: u64,
    pub nav: NavigableQuery,
}

/// Continuation request for the next batch of the current result set
#[derive(Debug, Clone)]
pub struct MoreTicket {
    pub generation: u64,
    pub nav: NavigableQuery,
    pub page_token: String,
}

/// View state of one dashboard tab.
///
/// Every refresh bumps `generation`; results carrying an older generation are
/// dropped on arrival so the latest request always wins. At most one
/// continuation is in flight, and only while no refresh is.
#[derive(Debug)]
pub struct DashboardSession {
    id: Uuid,
    nav: NavigableQuery,
    panel: FacetPanel,
    paginator: Paginator,
    data: DashboardData,
    search_state: LoadState,
    facets_state: LoadState,
    generation: u64,
    /// Token of the continuation currently being fetched
    more_in_flight: Option<String>,
    touched_at: DateTime<Utc>,
    events: broadcast::Sender<SessionEvent>,
}

impl DashboardSession {
    pub fn new(nav: NavigableQuery) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            panel: FacetPanel::new(nav.selections.clone()),
            nav,
            paginator: Paginator::default(),
            data: DashboardData::default(),
            search_state: LoadState::Idle,
            facets_state: LoadState::Idle,
            generation: 0,
            more_in_flight: None,
            touched_at: now,
            events,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn nav(&self) -> &NavigableQuery {
        &self.nav
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn hosts(&self) -> &[Host] {
        &self.data.hosts
    }

    pub fn touched_at(&self) -> DateTime<Utc> {
        self.touched_at
    }

    pub fn touch(&mut self) {
        self.touched_at = Utc::now();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Start a refresh: mark both requests pending and hand out a new generation
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.generation += 1;
        self.data.next_page_token = None;
        self.more_in_flight = None;
        self.search_state = LoadState::Loading;
        self.facets_state = LoadState::Loading;
        self.touch();
        self.emit(SessionEvent::Loading { generation: self.generation });

        RefreshTicket {
            generation: self.generation,
            nav: self.nav.clone(),
        }
    }

    /// Apply refresh results unless a newer refresh started meanwhile.
    ///
    /// Returns false when the results were stale and dropped.
    pub fn complete_refresh(&mut self, generation: u64, data: DashboardData) -> bool {
        if generation != self.generation {
            return false;
        }

        self.search_state = data.search_state();
        self.facets_state = data.facets_state();
        self.paginator.sync(data.hosts.len());
        self.emit(match &data.error {
            Some(message) => SessionEvent::Failed { generation, message: message.clone() },
            None => SessionEvent::Loaded { generation, total: data.hosts.len() },
        });
        self.data = data;
        true
    }

    /// Continuation token for the current result set, if the API offered one.
    ///
    /// None while a refresh or another continuation is still loading.
    pub fn begin_more(&mut self) -> Option<MoreTicket> {
        if self.search_state == LoadState::Loading || self.more_in_flight.is_some() {
            return None;
        }
        let page_token = self.data.next_page_token.clone()?;
        self.more_in_flight = Some(page_token.clone());
        self.search_state = LoadState::Loading;
        self.touch();
        Some(MoreTicket {
            generation: self.generation,
            nav: self.nav.clone(),
            page_token,
        })
    }

    /// Append a continuation batch.
    ///
    /// Dropped when a refresh replaced the result set or the ticket is not the
    /// continuation in flight.
    pub fn complete_more(
        &mut self,
        ticket: &MoreTicket,
        result: Result<(Vec<Host>, Option<String>), String>,
    ) -> bool {
        if ticket.generation != self.generation
            || self.more_in_flight.as_deref() != Some(ticket.page_token.as_str())
        {
            return false;
        }
        self.more_in_flight = None;

        let generation = ticket.generation;
        match result {
            Ok((hosts, next_page_token)) => {
                self.data.hosts.extend(hosts);
                self.data.next_page_token = next_page_token;
                self.search_state = LoadState::Ready;
                self.paginator.sync(self.data.hosts.len());
                self.emit(SessionEvent::Loaded { generation, total: self.data.hosts.len() });
            }
            Err(message) => {
                self.search_state = LoadState::Failed;
                self.emit(SessionEvent::Failed { generation, message });
            }
        }
        true
    }

    /// Replace the search box clause; facet selections stay, page goes back to 1
    pub fn submit_query(&mut self, text: &str) {
        let text = text.trim();
        self.nav.filters = parse_query(text)
            .map(|fragment| vec![fragment.to_filter_param()])
            .unwrap_or_default();
        self.nav.query = if text.is_empty() { None } else { Some(text.to_string()) };
        self.paginator.reset();
    }

    /// Replace the whole navigable state, as on a page load
    pub fn navigate(&mut self, nav: NavigableQuery) {
        self.panel.reset_committed(nav.selections.clone());
        self.nav = nav;
        self.paginator.reset();
    }

    pub fn toggle_facet(&mut self, category: FacetCategory, value: &str) -> FacetPanelView {
        self.panel.toggle(category, value);
        self.touch();
        self.panel.view(&self.data.facets)
    }

    pub fn discard_facets(&mut self) -> FacetPanelView {
        self.panel.discard();
        self.panel.view(&self.data.facets)
    }

    /// Commit staged facets; true when a new search is needed
    pub fn apply_facets(&mut self) -> bool {
        let changed = self.panel.apply(&mut self.nav);
        if changed {
            self.paginator.reset();
        }
        changed
    }

    pub fn go_to_page(&mut self, page: i64, viewport: &mut dyn Viewport) -> usize {
        self.touch();
        self.paginator.go_to(page, viewport)
    }

    pub fn view(&self) -> DashboardView {
        dashboard::render(
            &self.nav,
            &self.data,
            &self.paginator,
            &self.panel,
            LoadStatus {
                search: self.search_state,
                facets: self.facets_state,
            },
        )
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
