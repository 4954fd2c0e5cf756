//! Client-side orchestration for the resume matching service: match
//! submission, dashboard collection loads, deadlines and the session cache.

pub mod api_client;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod models;
pub mod store;
pub mod timing;

#[cfg(test)]
mod test_support;

pub use api_client::MatchClient;
pub use auth::{AuthTokenProvider, StaticTokenProvider};
pub use dashboard::{Dashboard, Tab};
pub use store::DashboardResourceStore;
