use chrono::Utc;
use dashmap::DashMap;
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dashboard::{self, DashboardView};
use crate::gateway::client::ApiClient;
use crate::models::config::AppConfig;
use crate::models::navigation::{FacetCategory, NavigableQuery};
use crate::search::builder::build_filter;
use crate::search::facet_panel::FacetPanelView;
use crate::search::paginator::Viewport;
use crate::session::state::{DashboardSession, SessionEvent};
use crate::utils::error::{AppError, AppResult};

/// Owns the API client and every open dashboard session.
///
/// Session locks are never held across an await: a refresh takes a ticket,
/// releases the lock for the network round-trip, then re-locks to apply.
pub struct SessionManager {
    /// Application configuration
    config: AppConfig,

    /// Client for the external search API
    client: ApiClient,

    /// Open sessions keyed by id
    sessions: DashMap<Uuid, Arc<Mutex<DashboardSession>>>,
}

impl SessionManager {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let client = ApiClient::new(&config)?;
        Ok(Self {
            config,
            client,
            sessions: DashMap::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Open a session for `nav` and run its first refresh
    pub async fn create(&self, nav: NavigableQuery) -> AppResult<(Uuid, DashboardView)> {
        let session = DashboardSession::new(nav);
        let id = session.id();
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        info!("Opened dashboard session {} ({} open)", id, self.sessions.len());

        let view = self.refresh(id).await?;
        Ok((id, view))
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            info!("Closed dashboard session {}", id);
        }
        removed
    }

    pub fn view(&self, id: Uuid) -> AppResult<DashboardView> {
        self.with_session(id, |session| {
            session.touch();
            session.view()
        })
    }

    pub fn subscribe(&self, id: Uuid) -> AppResult<broadcast::Receiver<SessionEvent>> {
        self.with_session(id, |session| session.subscribe())
    }

    /// Re-run Search and Facets for the session's current state
    pub async fn refresh(&self, id: Uuid) -> AppResult<DashboardView> {
        let session = self.get(id)?;
        let ticket = session.lock().begin_refresh();

        let data = dashboard::load(&self.client, &ticket.nav, self.config.search_limit).await;

        let mut session = session.lock();
        if !session.complete_refresh(ticket.generation, data) {
            debug!(
                "Dropped stale results for session {} (generation {} < {})",
                id,
                ticket.generation,
                session.generation()
            );
        }
        Ok(session.view())
    }

    /// Replace the page's navigable state and refresh
    pub async fn navigate(&self, id: Uuid, nav: NavigableQuery) -> AppResult<DashboardView> {
        self.with_session(id, |session| session.navigate(nav))?;
        self.refresh(id).await
    }

    /// Run a search box submission
    pub async fn search(&self, id: Uuid, text: &str) -> AppResult<DashboardView> {
        self.with_session(id, |session| session.submit_query(text))?;
        self.refresh(id).await
    }

    /// Stage a facet toggle; no request is issued
    pub fn toggle_facet(&self, id: Uuid, category: FacetCategory, value: &str) -> AppResult<FacetPanelView> {
        self.with_session(id, |session| session.toggle_facet(category, value))
    }

    pub fn discard_facets(&self, id: Uuid) -> AppResult<FacetPanelView> {
        self.with_session(id, |session| session.discard_facets())
    }

    /// Commit staged facets; refreshes only when the selection changed
    pub async fn apply_facets(&self, id: Uuid) -> AppResult<DashboardView> {
        let changed = self.with_session(id, |session| session.apply_facets())?;
        if changed {
            self.refresh(id).await
        } else {
            self.view(id)
        }
    }

    pub fn go_to_page(&self, id: Uuid, page: i64, viewport: &mut dyn Viewport) -> AppResult<DashboardView> {
        self.with_session(id, |session| {
            session.go_to_page(page, viewport);
            session.view()
        })
    }

    /// Fetch the next batch through the continuation token and append it
    pub async fn load_more(&self, id: Uuid) -> AppResult<DashboardView> {
        let session = self.get(id)?;
        let ticket = session.lock().begin_more();
        let ticket = match ticket {
            Some(ticket) => ticket,
            None => return Ok(session.lock().view()),
        };

        let result = match build_filter(&ticket.nav) {
            Ok(filter) => self
                .client
                .search(&filter, Some(self.config.search_limit), Some(&ticket.page_token))
                .await
                .map(|response| (response.hosts, response.next_page_token))
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let mut session = session.lock();
        if !session.complete_more(&ticket, result) {
            debug!("Dropped stale continuation batch for session {}", id);
        }
        Ok(session.view())
    }

    /// Drop sessions idle for longer than `ttl`; returns how many went away
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365));
        let cutoff = Utc::now() - ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.lock().touched_at() >= cutoff);

        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            info!("Evicted {} idle dashboard sessions", evicted);
        }
        evicted
    }

    fn get(&self, id: Uuid) -> AppResult<Arc<Mutex<DashboardSession>>> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AppError::NotFoundError(format!("session {}", id)))
    }

    fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut DashboardSession) -> R) -> AppResult<R> {
        let session = self.get(id)?;
        let mut guard = session.lock();
        Ok(f(&mut guard))
    }
}
