use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::{self, Message};
use futures_util::StreamExt;
use log::{debug, info, warn};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::interval;
use uuid::Uuid;

use crate::api::handlers::error_response;
use crate::session::manager::SessionManager;
use crate::session::state::SessionEvent;

// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

// Clients silent for this long are dropped
const CLIENT_TIMEOUT: Duration = Duration::from_secs(15);

/// Messages sent to clients besides session events
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WsOutMessage {
    Ping { timestamp: i64 },
    Lagged { skipped: u64 },
}

/// Stream load-state events of one dashboard session
pub async fn ws_session(
    req: HttpRequest,
    body: web::Payload,
    path: web::Path<Uuid>,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, Error> {
    let id = path.into_inner();
    let mut events = match manager.subscribe(id) {
        Ok(events) => events,
        Err(e) => return Ok(error_response(&e)),
    };

    let addr = req
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    info!("WebSocket for session {} from {}", id, addr);

    let (response, session, mut msg_stream) = actix_ws::handle(&req, body)?;

    actix_web::rt::spawn(async move {
        let mut heartbeat = interval(HEARTBEAT_INTERVAL);
        let mut last_seen = Instant::now();
        let mut session = session;

        loop {
            tokio::select! {
                msg = msg_stream.next() => {
                    match msg {
                        Some(Ok(Message::Ping(bytes))) => {
                            last_seen = Instant::now();
                            if session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Pong(_))) => last_seen = Instant::now(),
                        Some(Ok(Message::Text(text))) => {
                            last_seen = Instant::now();
                            debug!("Ignoring text from session {} client: {}", id, text);
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Client of session {} closed the socket", id);
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!("WebSocket error on session {}: {}", id, e);
                            break;
                        }
                    }
                }
                event = events.recv() => {
                    let json = match event {
                        Ok(event) => encode_event(&event),
                        Err(RecvError::Lagged(skipped)) => {
                            serde_json::to_string(&WsOutMessage::Lagged { skipped })
                        }
                        Err(RecvError::Closed) => {
                            info!("Session {} closed, ending WebSocket", id);
                            let _ = session.close(None).await;
                            break;
                        }
                    };
                    if let Ok(json) = json {
                        if session.text(json).await.is_err() {
                            break;
                        }
                    }
                }
                _ = heartbeat.tick() => {
                    if last_seen.elapsed() > CLIENT_TIMEOUT {
                        warn!("WebSocket client of session {} timed out", id);
                        let _ = session.close(None).await;
                        break;
                    }

                    let ping = WsOutMessage::Ping { timestamp: chrono::Utc::now().timestamp() };
                    if let Ok(json) = serde_json::to_string(&ping) {
                        if session.text(json).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        info!("WebSocket for session {} finished", id);
    });

    Ok(response)
}

/// Event payload as it goes over the socket
pub fn encode_event(event: &SessionEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_type_tagged() {
        let json = encode_event(&SessionEvent::Loaded { generation: 3, total: 12 }).unwrap();
        assert_eq!(json, r#"{"type":"loaded","generation":3,"total":12}"#);

        let ping = serde_json::to_string(&WsOutMessage::Ping { timestamp: 7 }).unwrap();
        assert_eq!(ping, r#"{"type":"ping","timestamp":7}"#);
    }
}
