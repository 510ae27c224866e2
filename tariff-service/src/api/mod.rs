//! REST surface over the billing and insights engines.

mod bill;
mod insights;
mod meters;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{error::ApiError, source::UsageSource, source::Window};

pub use insights::{collect_insights, BudgetInput, InsightsRequest};

/// Length of the window used when a request gives no `start`.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn UsageSource>,
    clock: fn() -> OffsetDateTime,
}

impl AppState {
    pub fn new(source: Arc<dyn UsageSource>) -> Self {
        Self {
            source,
            clock: OffsetDateTime::now_utc,
        }
    }

    /// Replace the wall clock, e.g. to pin the billing reference date.
    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/bill", post(bill::calculate))
        .route("/api/insights", post(insights::evaluate))
        .route("/api/meters/:meter_id/bill", get(meters::bill))
        .route("/api/meters/:meter_id/insights", get(meters::insights))
        .route("/api/meters/:meter_id/readings", get(meters::readings))
        .with_state(state)
}

/// `start` / `end` query parameters, RFC 3339.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
}

impl WindowQuery {
    /// Defaults to the trailing 30 days ending now.
    fn resolve(&self, now: OffsetDateTime) -> Result<Window, ApiError> {
        let end = self.end.unwrap_or(now);
        match self.start {
            Some(start) => Window::new(start, end)
                .ok_or_else(|| ApiError::BadRequest("start must be before end".to_string())),
            None => Ok(Window::trailing_days(end, DEFAULT_WINDOW_DAYS)),
        }
    }
}
