use time::OffsetDateTime;

/// One raw telemetry sample as stored in the `meter_readings` table.
///
/// `phase` is `None` for single-phase meters and 1..=3 otherwise.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct MeterReading {
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    pub meter_id: String,
    pub phase: Option<i32>,
    pub voltage: f64,
    pub current: f64,
    pub power_w: f64,
    pub energy_kwh: f64,
    pub power_factor: Option<f64>,
}
