pub mod dashboard;
pub mod hosts;
pub mod sessions;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use log::{error, warn};

use crate::utils::error::AppError;

/// JSON error body with the status matching the error kind
pub fn error_response(err: &AppError) -> HttpResponse {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }

    HttpResponse::build(status).json(serde_json::json!({
        "status": "error",
        "message": err.to_string()
    }))
}
