pub mod client;
pub mod detail;
