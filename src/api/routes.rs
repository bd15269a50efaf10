use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use crate::api::handlers::{
    dashboard::get_dashboard,
    hosts::get_host,
    sessions::{
        apply_facets,
        create_session,
        delete_session,
        get_session,
        go_to_page,
        load_more,
        navigate_session,
        reset_facets,
        search,
        toggle_facet,
    },
};
use crate::api::websocket::ws_session;

/// Root endpoint to provide information about the API
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "hostlens",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Dashboard backend for searching and inspecting internet-connected hosts",
        "endpoints": [
            {
                "path": "/api/dashboard",
                "method": "GET",
                "description": "Compose a dashboard page from countries, asns, services, filter, query and page parameters"
            },
            {
                "path": "/api/hosts/{ip}",
                "method": "GET",
                "description": "Get details of a single host"
            },
            {
                "path": "/api/sessions",
                "method": "POST",
                "description": "Open a dashboard session"
            },
            {
                "path": "/api/sessions/{id}",
                "method": "GET",
                "description": "Get the current view of a session"
            },
            {
                "path": "/api/sessions/{id}",
                "method": "DELETE",
                "description": "Close a session"
            },
            {
                "path": "/api/sessions/{id}/navigate",
                "method": "POST",
                "description": "Replace the session's URL state"
            },
            {
                "path": "/api/sessions/{id}/search",
                "method": "POST",
                "description": "Submit a field: value search"
            },
            {
                "path": "/api/sessions/{id}/facets/toggle",
                "method": "POST",
                "description": "Stage a facet selection change"
            },
            {
                "path": "/api/sessions/{id}/facets/reset",
                "method": "POST",
                "description": "Discard staged facet changes"
            },
            {
                "path": "/api/sessions/{id}/facets/apply",
                "method": "POST",
                "description": "Apply staged facet changes and search again"
            },
            {
                "path": "/api/sessions/{id}/page",
                "method": "POST",
                "description": "Go to a result page"
            },
            {
                "path": "/api/sessions/{id}/more",
                "method": "GET",
                "description": "Fetch the next batch of results"
            },
            {
                "path": "/api/sessions/{id}/ws",
                "method": "GET",
                "description": "WebSocket endpoint for load state updates"
            }
        ]
    }))
}

/// Configure API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Root endpoint
        .route("/", web::get().to(index))
        .service(
            web::scope("/api")
                .route("/dashboard", web::get().to(get_dashboard))
                .route("/hosts/{ip}", web::get().to(get_host))
                .service(
                    web::scope("/sessions")
                        .route("", web::post().to(create_session))
                        .route("/{id}", web::get().to(get_session))
                        .route("/{id}", web::delete().to(delete_session))
                        .route("/{id}/navigate", web::post().to(navigate_session))
                        .route("/{id}/search", web::post().to(search))
                        .route("/{id}/facets/toggle", web::post().to(toggle_facet))
                        .route("/{id}/facets/reset", web::post().to(reset_facets))
                        .route("/{id}/facets/apply", web::post().to(apply_facets))
                        .route("/{id}/page", web::post().to(go_to_page))
                        .route("/{id}/more", web::get().to(load_more))
                        // WebSocket route for load state updates
                        .route("/{id}/ws", web::get().to(ws_session))
                )
        );
}
