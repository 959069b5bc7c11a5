pub mod api;
pub mod config;
pub mod eloverblik;
pub mod error;
pub mod metrics_server;
pub mod observability;
pub mod transform;

pub use error::ApiError;
