use anyhow::Result;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::{MeterReading, PhaseContribution};

/// Window aggregates for one meter. Every column is `NULL` when the window
/// holds no readings, hence the options.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct UsageSummary {
    pub readings: i64,
    pub total_energy_kwh: Option<f64>,
    pub average_voltage: Option<f64>,
    pub min_voltage: Option<f64>,
    pub max_voltage: Option<f64>,
    pub peak_power_w: Option<f64>,
    pub average_power_factor: Option<f64>,
    pub max_demand_kva: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PhaseTotal {
    pub phase: i32,
    pub energy_kwh: f64,
    pub voltage: f64,
    pub current: f64,
    pub power_w: f64,
}

/// Fetch a time-ordered load profile for a single meter.
pub async fn load_profile(
    pool: &PgPool,
    meter_id: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<Vec<MeterReading>> {
    let rows = sqlx::query_as::<_, MeterReading>(
        r#"
        SELECT
            ts,
            meter_id,
            phase,
            voltage,
            current,
            power_w,
            energy_kwh,
            power_factor
        FROM meter_readings
        WHERE meter_id = $1
          AND ts >= $2
          AND ts <  $3
        ORDER BY ts
        "#,
    )
    .bind(meter_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Aggregate the statistics the billing and insights engines consume.
///
/// Apparent power per reading is `power_w / power_factor` when a power
/// factor was reported, otherwise the real power is taken as-is.
pub async fn usage_summary(
    pool: &PgPool,
    meter_id: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<UsageSummary> {
    let row = sqlx::query_as::<_, UsageSummary>(
        r#"
        SELECT
            COUNT(*)               AS readings,
            SUM(energy_kwh)        AS total_energy_kwh,
            AVG(voltage)           AS average_voltage,
            MIN(voltage)           AS min_voltage,
            MAX(voltage)           AS max_voltage,
            MAX(power_w)           AS peak_power_w,
            AVG(power_factor)      AS average_power_factor,
            MAX(
                CASE WHEN power_factor > 0 THEN power_w / power_factor
                     ELSE power_w
                END
            ) / 1000.0             AS max_demand_kva
        FROM meter_readings
        WHERE meter_id = $1
          AND ts >= $2
          AND ts <  $3
        "#,
    )
    .bind(meter_id)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Total energy over a window, zero when there are no readings.
pub async fn total_energy(
    pool: &PgPool,
    meter_id: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<f64> {
    let total: Option<f64> = sqlx::query_scalar(
        r#"
        SELECT SUM(energy_kwh)
        FROM meter_readings
        WHERE meter_id = $1
          AND ts >= $2
          AND ts <  $3
        "#,
    )
    .bind(meter_id)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(total.unwrap_or(0.0))
}

/// Average load in kW between 00:00 and 05:00 UTC.
///
/// Per-phase rows sharing a timestamp are summed first so that three-phase
/// meters report the whole-premise load.
pub async fn night_base_load(
    pool: &PgPool,
    meter_id: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<Option<f64>> {
    let kw: Option<f64> = sqlx::query_scalar(
        r#"
        SELECT AVG(load_w) / 1000.0
        FROM (
            SELECT ts, SUM(power_w) AS load_w
            FROM meter_readings
            WHERE meter_id = $1
              AND ts >= $2
              AND ts <  $3
              AND hour(ts) < 5
            GROUP BY ts
        )
        "#,
    )
    .bind(meter_id)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(kw)
}

/// Per-phase energy and electrical averages, ordered by phase.
pub async fn phase_totals(
    pool: &PgPool,
    meter_id: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<Vec<PhaseTotal>> {
    let rows = sqlx::query_as::<_, PhaseTotal>(
        r#"
        SELECT
            phase,
            SUM(energy_kwh) AS energy_kwh,
            AVG(voltage)    AS voltage,
            AVG(current)    AS current,
            AVG(power_w)    AS power_w
        FROM meter_readings
        WHERE meter_id = $1
          AND ts >= $2
          AND ts <  $3
          AND phase IS NOT NULL
        GROUP BY phase
        ORDER BY phase
        "#,
    )
    .bind(meter_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Convert per-phase energy totals into contribution percentages.
///
/// Returns `None` unless exactly phases 1, 2 and 3 are present and their
/// combined energy is positive.
pub fn phase_contributions(totals: &[PhaseTotal]) -> Option<[PhaseContribution; 3]> {
    let [a, b, c] = totals else {
        return None;
    };
    if (a.phase, b.phase, c.phase) != (1, 2, 3) {
        return None;
    }

    let sum = a.energy_kwh + b.energy_kwh + c.energy_kwh;
    if !sum.is_finite() || sum <= 0.0 {
        return None;
    }

    Some([a, b, c].map(|t| PhaseContribution {
        phase_id: t.phase as u8,
        contribution_percent: t.energy_kwh / sum * 100.0,
        voltage: t.voltage,
        current: t.current,
        power: t.power_w,
    }))
}
