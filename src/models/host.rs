use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::null_as_default;

/// City value the API uses when a host has no known location
pub const UNKNOWN_CITY: &str = "Unknown";

/// A discovered network endpoint, as returned by the search API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// Stable record identifier
    pub id: String,

    /// Dotted or colon address string
    pub ip: String,

    /// Integer encoding of the address
    pub ip_int: u64,

    /// Autonomous system attribution
    pub asn: Asn,

    /// Geolocation
    pub location: Location,

    pub first_seen: DateTime<Utc>,

    pub last_seen: DateTime<Utc>,

    /// Services in the order the API reported them
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asn {
    pub number: u32,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// (longitude, latitude) in degrees
    pub coordinates: (f64, f64),
    pub city: String,
    #[serde(default)]
    pub timezone: String,
}

/// One network service observed on a host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub port: u16,
    pub protocol: String,
    pub transport: String,
    #[serde(default)]
    pub tls: bool,
    pub last_scan: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<HttpDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshDetails>,
}

/// HTTP(S) response captured by the scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpDetails {
    pub status: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Header values keep their multiplicity and order
    #[serde(rename = "responseHeaders", default)]
    pub response_headers: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshDetails {
    pub banner: String,
}

impl Host {
    /// Whether the host carries a usable location
    pub fn has_location(&self) -> bool {
        self.location.city != UNKNOWN_CITY
    }

    pub fn latitude(&self) -> f64 {
        self.location.coordinates.1
    }

    pub fn longitude(&self) -> f64 {
        self.location.coordinates.0
    }

    /// `first_seen <= last_seen`
    pub fn is_consistent(&self) -> bool {
        self.first_seen <= self.last_seen
    }

    /// Ports in reporting order, duplicates removed
    pub fn open_ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = Vec::with_capacity(self.services.len());
        for service in &self.services {
            if !ports.contains(&service.port) {
                ports.push(service.port);
            }
        }
        ports
    }

    /// Distinct protocol tags in reporting order
    pub fn protocols(&self) -> Vec<&str> {
        let mut protocols: Vec<&str> = Vec::new();
        for service in &self.services {
            if !protocols.contains(&service.protocol.as_str()) {
                protocols.push(&service.protocol);
            }
        }
        protocols
    }
}

impl Service {
    /// The HTTP response block, preferring the TLS one
    pub fn http_details(&self) -> Option<&HttpDetails> {
        self.https.as_ref().or(self.http.as_ref())
    }

    /// Header values by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.http_details()?
            .response_headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }
}
