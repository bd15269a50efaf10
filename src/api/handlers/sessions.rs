use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::handlers::error_response;
use crate::dashboard::DashboardView;
use crate::models::navigation::{FacetCategory, NavigableQuery};
use crate::search::paginator::ScrollHint;
use crate::session::manager::SessionManager;

/// Request for opening a dashboard session
#[derive(Deserialize, Default)]
pub struct CreateSessionRequest {
    /// Navigable query string the tab was opened with (`?countries=...`)
    #[serde(default)]
    pub location: Option<String>,
}

/// Search box submission
#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Facet checkbox click
#[derive(Deserialize)]
pub struct ToggleRequest {
    pub category: FacetCategory,
    pub value: String,
}

/// Page button click
#[derive(Deserialize)]
pub struct PageRequest {
    pub page: i64,
}

/// Response for a newly opened session
#[derive(Serialize)]
struct SessionCreatedResponse {
    session_id: Uuid,
    view: DashboardView,
}

/// Response for a page change
#[derive(Serialize)]
struct PageResponse {
    #[serde(flatten)]
    hint: ScrollHint,
    view: DashboardView,
}

/// Open a session and run its first search
pub async fn create_session(
    manager: web::Data<SessionManager>,
    request: Option<web::Json<CreateSessionRequest>>,
) -> impl Responder {
    let location = request.and_then(|r| r.into_inner().location).unwrap_or_default();
    let nav = NavigableQuery::parse(&location);

    match manager.create(nav).await {
        Ok((session_id, view)) => HttpResponse::Created().json(SessionCreatedResponse { session_id, view }),
        Err(e) => error_response(&e),
    }
}

/// Get the current view of a session
pub async fn get_session(
    manager: web::Data<SessionManager>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match manager.view(path.into_inner()) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

/// Close a session
pub async fn delete_session(
    manager: web::Data<SessionManager>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let id = path.into_inner();
    if manager.remove(id) {
        HttpResponse::Ok().json(serde_json::json!({
            "status": "success",
            "message": format!("Session {} closed", id)
        }))
    } else {
        HttpResponse::NotFound().json(serde_json::json!({
            "status": "error",
            "message": format!("Session {} not found", id)
        }))
    }
}

/// Replace the session's URL state, as when the browser navigates
pub async fn navigate_session(
    manager: web::Data<SessionManager>,
    path: web::Path<Uuid>,
    request: web::Json<CreateSessionRequest>,
) -> impl Responder {
    let nav = NavigableQuery::parse(request.location.as_deref().unwrap_or_default());

    match manager.navigate(path.into_inner(), nav).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

/// Submit the search box
pub async fn search(
    manager: web::Data<SessionManager>,
    path: web::Path<Uuid>,
    request: web::Json<SearchRequest>,
) -> impl Responder {
    let id = path.into_inner();
    info!("Session {} searching for {:?}", id, request.query);

    match manager.search(id, &request.query).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

/// Stage a facet toggle without searching
pub async fn toggle_facet(
    manager: web::Data<SessionManager>,
    path: web::Path<Uuid>,
    request: web::Json<ToggleRequest>,
) -> impl Responder {
    match manager.toggle_facet(path.into_inner(), request.category, &request.value) {
        Ok(panel) => HttpResponse::Ok().json(panel),
        Err(e) => error_response(&e),
    }
}

/// Throw away staged facet changes
pub async fn reset_facets(
    manager: web::Data<SessionManager>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match manager.discard_facets(path.into_inner()) {
        Ok(panel) => HttpResponse::Ok().json(panel),
        Err(e) => error_response(&e),
    }
}

/// Commit staged facets and search again
pub async fn apply_facets(
    manager: web::Data<SessionManager>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match manager.apply_facets(path.into_inner()).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

/// Move to another result page
pub async fn go_to_page(
    manager: web::Data<SessionManager>,
    path: web::Path<Uuid>,
    request: web::Json<PageRequest>,
) -> impl Responder {
    let mut hint = ScrollHint::default();

    match manager.go_to_page(path.into_inner(), request.page, &mut hint) {
        Ok(view) => HttpResponse::Ok().json(PageResponse { hint, view }),
        Err(e) => error_response(&e),
    }
}

/// Append the next batch from the search API
pub async fn load_more(
    manager: web::Data<SessionManager>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match manager.load_more(path.into_inner()).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}
