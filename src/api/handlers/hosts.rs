use actix_web::{web, HttpResponse, Responder};
use log::info;

use crate::gateway::detail::{fetch_host_detail, HostLookup};
use crate::session::manager::SessionManager;

/// Get the detail view for one host
pub async fn get_host(
    manager: web::Data<SessionManager>,
    path: web::Path<String>,
) -> impl Responder {
    let ip = path.into_inner();

    match fetch_host_detail(manager.client(), &ip).await {
        found @ HostLookup::Found(_) => {
            info!("Served host detail for {}", ip);
            HttpResponse::Ok().json(found)
        }
        not_found @ HostLookup::NotFound { .. } => HttpResponse::NotFound().json(not_found),
    }
}
