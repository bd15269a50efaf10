#![allow(dead_code)]

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Arc;

/// Requests seen by the fake API, as (path, decoded query pairs)
#[derive(Default)]
pub struct Recorded {
    pub requests: Mutex<Vec<(String, HashMap<String, String>)>>,
    pub fail_with: Mutex<Option<u16>>,
    pub hosts: Mutex<Vec<Value>>,
    pub next_page_token: Mutex<Option<String>>,
    /// Answer searches with `"hosts": null`, as the API does for no matches
    pub null_hosts: Mutex<bool>,
    pub facets_fail_with: Mutex<Option<u16>>,
}

impl Recorded {
    pub fn requests_to(&self, path: &str) -> Vec<HashMap<String, String>> {
        self.requests
            .lock()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, q)| q.clone())
            .collect()
    }
}

pub fn host_json(ip: &str, country: &str, asn: u32, city: &str) -> Value {
    json!({
        "id": format!("id-{}", ip),
        "ip": ip,
        "ip_int": 1,
        "asn": { "number": asn, "organization": "Example Org", "country": country },
        "location": { "coordinates": [13.405, 52.52], "city": city, "timezone": "Europe/Berlin" },
        "first_seen": "2025-12-27T08:15:22Z",
        "last_seen": "2025-12-28T14:22:33Z",
        "services": [
            { "port": 22, "protocol": "ssh", "transport": "tcp", "tls": false,
              "last_scan": "2025-12-28T14:22:33Z", "ssh": { "banner": "SSH-2.0-OpenSSH_9.6" } }
        ]
    })
}

fn record(state: &Recorded, req: &HttpRequest) -> Option<HttpResponse> {
    let query = web::Query::<HashMap<String, String>>::from_query(req.query_string())
        .map(|q| q.into_inner())
        .unwrap_or_default();
    state.requests.lock().push((req.path().to_string(), query));

    let fail_with = *state.fail_with.lock();
    fail_with.map(|status| HttpResponse::build(actix_web::http::StatusCode::from_u16(status).unwrap()).finish())
}

async fn search(req: HttpRequest, state: web::Data<Arc<Recorded>>) -> HttpResponse {
    if let Some(failure) = record(&state, &req) {
        return failure;
    }
    let hosts = if *state.null_hosts.lock() {
        Value::Null
    } else {
        json!(state.hosts.lock().clone())
    };
    let mut body = json!({ "hosts": hosts });
    if let Some(token) = state.next_page_token.lock().take() {
        body["next_page_token"] = json!(token);
    }
    HttpResponse::Ok().json(body)
}

async fn facets(req: HttpRequest, state: web::Data<Arc<Recorded>>) -> HttpResponse {
    if let Some(failure) = record(&state, &req) {
        return failure;
    }
    if let Some(status) = *state.facets_fail_with.lock() {
        return HttpResponse::build(actix_web::http::StatusCode::from_u16(status).unwrap()).finish();
    }
    HttpResponse::Ok().json(json!({
        "facets": {
            "countries": { "Germany": 2, "France": 1 },
            "asns": { "3320-Deutsche Telekom AG": 2, "3215-Orange S.A.": 1 },
            "services": { "ssh": 3 }
        }
    }))
}

async fn host(req: HttpRequest, path: web::Path<String>, state: web::Data<Arc<Recorded>>) -> HttpResponse {
    if let Some(failure) = record(&state, &req) {
        return failure;
    }
    let ip = path.into_inner();
    let found = state.hosts.lock().iter().find(|h| h["ip"] == ip.as_str()).cloned();
    match found {
        Some(host) => HttpResponse::Ok().json(host),
        None => HttpResponse::NotFound().json(json!({ "error": "Host not found" })),
    }
}

/// Start the fake search API on an ephemeral port
pub fn spawn_upstream() -> (String, Arc<Recorded>) {
    let state = Arc::new(Recorded::default());
    let data = web::Data::new(state.clone());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/api/hosts/search", web::get().to(search))
            .route("/api/hosts/{ip}", web::get().to(host))
            .route("/api/facets", web::get().to(facets))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());

    (format!("http://{}", addr), state)
}

/// Base URL of a port nothing listens on
pub fn dead_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
