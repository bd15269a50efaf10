//! Dashboard backend for searching and inspecting internet-connected hosts.
//!
//! Serves dashboard view state as JSON and talks to an external host search API.

pub mod api;
pub mod dashboard;
pub mod gateway;
pub mod models;
pub mod search;
pub mod session;
pub mod utils;
