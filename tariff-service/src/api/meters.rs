//! Per-meter endpoints that pull aggregates from storage before running the
//! engines.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use meter_client::{
    calculate_bill,
    domain::{Bill, BillRequest, Insight, MeterReading},
};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use super::{bill::record_bill, insights::collect_insights, AppState, BudgetInput, WindowQuery};
use crate::{
    error::ApiError,
    source::{UsageSnapshot, Window},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MeterBillQuery {
    category: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    end: Option<OffsetDateTime>,
    max_demand: Option<f64>,
    power_factor: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MeterInsightsQuery {
    #[serde(default, with = "time::serde::rfc3339::option")]
    start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    end: Option<OffsetDateTime>,
    /// Enables the budget check together with `category`.
    monthly_budget: Option<f64>,
    category: Option<String>,
}

async fn load_snapshot(state: &AppState, meter_id: &str, window: Window) -> Result<UsageSnapshot, ApiError> {
    let snapshot = state
        .source
        .snapshot(meter_id, window)
        .await
        .map_err(|e| ApiError::Storage(format!("{e:#}")))?;

    if !snapshot.has_readings() {
        return Err(ApiError::MeterNotFound(meter_id.to_string()));
    }
    Ok(snapshot)
}

/// Last calendar day covered by a half-open window.
fn last_day(window: &Window) -> time::Date {
    (window.end - Duration::nanoseconds(1)).date()
}

/// Explicit demand and power factor win over the measured ones; a measured
/// power factor outside (0, 1] is ignored.
fn bill_request(
    snapshot: &UsageSnapshot,
    category: String,
    max_demand: Option<f64>,
    power_factor: Option<f64>,
) -> BillRequest {
    let measured_pf = snapshot
        .summary
        .average_power_factor
        .filter(|pf| *pf > 0.0 && *pf <= 1.0);

    BillRequest {
        total_energy: snapshot.summary.total_energy_kwh.unwrap_or(0.0),
        connection_category: category,
        max_demand: max_demand.or(snapshot.summary.max_demand_kva),
        average_power_factor: power_factor.or(measured_pf),
    }
}

pub(super) async fn bill(
    State(state): State<AppState>,
    Path(meter_id): Path<String>,
    Query(query): Query<MeterBillQuery>,
) -> Result<Json<Bill>, ApiError> {
    metrics::counter!("api_requests_total", "route" => "meter_bill").increment(1);

    let window = WindowQuery {
        start: query.start,
        end: query.end,
    }
    .resolve(state.now())?;
    let snapshot = load_snapshot(&state, &meter_id, window).await?;

    let request = bill_request(&snapshot, query.category, query.max_demand, query.power_factor);
    let bill = calculate_bill(&request, last_day(&window))?;
    record_bill(&bill);
    Ok(Json(bill))
}

pub(super) async fn insights(
    State(state): State<AppState>,
    Path(meter_id): Path<String>,
    Query(query): Query<MeterInsightsQuery>,
) -> Result<Json<Vec<Insight>>, ApiError> {
    metrics::counter!("api_requests_total", "route" => "meter_insights").increment(1);

    let window = WindowQuery {
        start: query.start,
        end: query.end,
    }
    .resolve(state.now())?;
    let snapshot = load_snapshot(&state, &meter_id, window).await?;

    let budget = match (query.monthly_budget, query.category) {
        (Some(monthly_budget), Some(category)) => {
            let bill = calculate_bill(&bill_request(&snapshot, category, None, None), last_day(&window))?;
            Some(BudgetInput {
                current_cost: bill.total_amount,
                monthly_budget,
                day_of_month: u32::from(last_day(&window).day()),
            })
        }
        _ => None,
    };

    let insights = collect_insights(&snapshot.stats(), snapshot.phases.as_ref(), budget.as_ref());
    tracing::debug!(meter_id = %meter_id, count = insights.len(), "meter insights evaluated");
    Ok(Json(insights))
}

pub(super) async fn readings(
    State(state): State<AppState>,
    Path(meter_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<MeterReading>>, ApiError> {
    metrics::counter!("api_requests_total", "route" => "meter_readings").increment(1);

    let window = query.resolve(state.now())?;
    let readings = state
        .source
        .readings(&meter_id, window)
        .await
        .map_err(|e| ApiError::Storage(format!("{e:#}")))?;
    Ok(Json(readings))
}
