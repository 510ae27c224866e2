//! Storage seam between the REST layer and QuestDB.

use meter_client::{
    db::{self, UsageSummary},
    domain::{MeterReading, PhaseContribution, UsageStats},
};
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};

/// Half-open reporting window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl Window {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn trailing_days(end: OffsetDateTime, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    /// The window of equal length immediately before this one.
    pub fn prior(&self) -> Self {
        let len = self.end - self.start;
        Self {
            start: self.start - len,
            end: self.start,
        }
    }
}

/// Everything the engines need about one meter and window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSnapshot {
    pub summary: UsageSummary,
    pub prior_energy_kwh: f64,
    pub night_load_kw: Option<f64>,
    pub phases: Option<[PhaseContribution; 3]>,
}

impl UsageSnapshot {
    pub fn has_readings(&self) -> bool {
        self.summary.readings > 0
    }

    /// Missing aggregates become zero, which the insight rules treat as
    /// "no data".
    pub fn stats(&self) -> UsageStats {
        let s = &self.summary;
        UsageStats {
            current_energy_kwh: s.total_energy_kwh.unwrap_or(0.0),
            prior_energy_kwh: self.prior_energy_kwh,
            average_voltage: s.average_voltage.unwrap_or(0.0),
            min_voltage: s.min_voltage.unwrap_or(0.0),
            max_voltage: s.max_voltage.unwrap_or(0.0),
            night_load_kw: self.night_load_kw.unwrap_or(0.0),
            peak_power_w: s.peak_power_w.unwrap_or(0.0),
            power_factor: s.average_power_factor.unwrap_or(0.0),
        }
    }
}

#[async_trait::async_trait]
pub trait UsageSource: Send + Sync {
    async fn snapshot(&self, meter_id: &str, window: Window) -> anyhow::Result<UsageSnapshot>;

    async fn readings(&self, meter_id: &str, window: Window) -> anyhow::Result<Vec<MeterReading>>;
}

pub struct QuestDbUsageSource {
    pool: PgPool,
}

impl QuestDbUsageSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UsageSource for QuestDbUsageSource {
    async fn snapshot(&self, meter_id: &str, window: Window) -> anyhow::Result<UsageSnapshot> {
        let prior = window.prior();
        let (summary, prior_energy_kwh, night_load_kw, phase_totals) = tokio::try_join!(
            db::usage_summary(&self.pool, meter_id, window.start, window.end),
            db::total_energy(&self.pool, meter_id, prior.start, prior.end),
            db::night_base_load(&self.pool, meter_id, window.start, window.end),
            db::phase_totals(&self.pool, meter_id, window.start, window.end),
        )?;

        tracing::debug!(
            meter_id,
            readings = summary.readings,
            phases = phase_totals.len(),
            "usage snapshot loaded"
        );

        Ok(UsageSnapshot {
            summary,
            prior_energy_kwh,
            night_load_kw,
            phases: db::phase_contributions(&phase_totals),
        })
    }

    async fn readings(&self, meter_id: &str, window: Window) -> anyhow::Result<Vec<MeterReading>> {
        db::load_profile(&self.pool, meter_id, window.start, window.end).await
    }
}
