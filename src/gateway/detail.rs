use log::warn;
use serde::Serialize;

use crate::gateway::client::ApiClient;
use crate::models::host::Host;

/// Per-service line of the host detail view
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSummary {
    pub port: u16,
    pub protocol: String,
    pub transport: String,
    pub tls: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

/// Host detail view payload
#[derive(Debug, Clone, Serialize)]
pub struct HostDetail {
    pub host: Host,
    pub open_ports: Vec<u16>,
    pub protocols: Vec<String>,
    pub services: Vec<ServiceSummary>,
}

/// Outcome of a detail lookup: the record, or "not found" for any failure
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HostLookup {
    Found(Box<HostDetail>),
    NotFound { ip: String },
}

impl HostDetail {
    pub fn from_host(host: Host) -> Self {
        let services = host
            .services
            .iter()
            .map(|service| ServiceSummary {
                port: service.port,
                protocol: service.protocol.clone(),
                transport: service.transport.clone(),
                tls: service.tls,
                http_status: service.http_details().map(|d| d.status_code),
                server: service.header("server").and_then(|v| v.first()).cloned(),
                banner: service.ssh.as_ref().map(|s| s.banner.clone()),
            })
            .collect();

        Self {
            open_ports: host.open_ports(),
            protocols: host.protocols().into_iter().map(str::to_string).collect(),
            services,
            host,
        }
    }
}

/// Fetch exactly one host; transport failures and error statuses both come
/// back as [`HostLookup::NotFound`].
pub async fn fetch_host_detail(client: &ApiClient, ip: &str) -> HostLookup {
    let ip = ip.trim();
    if ip.is_empty() {
        return HostLookup::NotFound { ip: String::new() };
    }

    match client.host(ip).await {
        Ok(host) => HostLookup::Found(Box::new(HostDetail::from_host(host))),
        Err(e) => {
            warn!("Host lookup for {} failed: {}", ip, e);
            HostLookup::NotFound { ip: ip.to_string() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::host::tests::BERLIN_HOST;

    #[test]
    fn summarizes_services() {
        let host: Host = serde_json::from_str(BERLIN_HOST).unwrap();
        let detail = HostDetail::from_host(host);

        assert_eq!(detail.open_ports, vec![22, 80]);
        assert_eq!(detail.protocols, vec!["ssh", "http"]);
        assert_eq!(detail.services[0].banner.as_deref(), Some("SSH-2.0-OpenSSH_8.2p1 Ubuntu-4ubuntu0.5"));
        assert_eq!(detail.services[1].http_status, Some(200));
        assert_eq!(detail.services[1].server.as_deref(), Some("nginx/1.18.0"));
    }

    #[test]
    fn not_found_serializes_with_status_tag() {
        let lookup = HostLookup::NotFound { ip: "10.0.0.1".to_string() };
        assert_eq!(
            serde_json::to_value(&lookup).unwrap(),
            serde_json::json!({ "status": "not_found", "ip": "10.0.0.1" })
        );
    }
}
