use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::info;
use serde::Deserialize;

use crate::dashboard::{self, LoadStatus};
use crate::models::navigation::NavigableQuery;
use crate::search::facet_panel::FacetPanel;
use crate::search::paginator::{Paginator, ScrollHint};
use crate::session::manager::SessionManager;

/// Page number on top of the navigable parameters
#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    page: i64,
}

fn default_page() -> i64 { 1 }

/// Compose one dashboard page from the URL state, without a session
pub async fn get_dashboard(
    manager: web::Data<SessionManager>,
    req: HttpRequest,
) -> impl Responder {
    let nav = NavigableQuery::parse(req.query_string());
    let page = web::Query::<PageQuery>::from_query(req.query_string())
        .map(|q| q.page)
        .unwrap_or_else(|_| default_page());

    let data = dashboard::load(manager.client(), &nav, manager.config().search_limit).await;

    let mut paginator = Paginator::default();
    paginator.sync(data.hosts.len());
    paginator.go_to(page, &mut ScrollHint::default());

    let panel = FacetPanel::new(nav.selections.clone());
    let status = LoadStatus {
        search: data.search_state(),
        facets: data.facets_state(),
    };
    let view = dashboard::render(&nav, &data, &paginator, &panel, status);

    info!("Dashboard page {} of {} for {}", view.results.page, view.results.total_pages, view.href);

    HttpResponse::Ok().json(view)
}
