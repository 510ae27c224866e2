use axum::{extract::rejection::JsonRejection, Json};
use meter_client::{
    check_budget_status,
    domain::{Insight, PhaseContribution, UsageStats},
    generate_insights,
    insights::phase_imbalance_from,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    pub current_cost: f64,
    pub monthly_budget: f64,
    pub day_of_month: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsightsRequest {
    #[serde(default)]
    pub stats: UsageStats,
    #[serde(default)]
    pub phases: Option<[PhaseContribution; 3]>,
    #[serde(default)]
    pub budget: Option<BudgetInput>,
}

/// Rule insights first, then phase imbalance, then budget status.
pub fn collect_insights(
    stats: &UsageStats,
    phases: Option<&[PhaseContribution; 3]>,
    budget: Option<&BudgetInput>,
) -> Vec<Insight> {
    let mut insights = generate_insights(stats);
    insights.extend(phases.and_then(phase_imbalance_from));
    insights.extend(budget.and_then(|b| check_budget_status(b.current_cost, b.monthly_budget, b.day_of_month)));

    for insight in &insights {
        metrics::counter!("insights_emitted_total", "severity" => insight.severity.as_str()).increment(1);
    }
    insights
}

pub(super) async fn evaluate(
    payload: Result<Json<InsightsRequest>, JsonRejection>,
) -> Result<Json<Vec<Insight>>, ApiError> {
    metrics::counter!("api_requests_total", "route" => "insights").increment(1);

    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let insights = collect_insights(&request.stats, request.phases.as_ref(), request.budget.as_ref());
    tracing::debug!(count = insights.len(), "insights evaluated");
    Ok(Json(insights))
}
