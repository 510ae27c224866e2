pub mod api;
pub mod config;
pub mod error;
pub mod metrics_server;
pub mod observability;
pub mod source;

pub use api::{router, AppState};
pub use error::ApiError;
