use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use meter_client::{
    calculate_bill,
    domain::{Bill, BillRequest},
    BillingError,
};

use super::AppState;
use crate::error::ApiError;

pub(super) async fn calculate(
    State(state): State<AppState>,
    payload: Result<Json<BillRequest>, JsonRejection>,
) -> Result<Json<Bill>, ApiError> {
    metrics::counter!("api_requests_total", "route" => "bill").increment(1);

    // Missing or non-numeric fields are an input error, not a framework error.
    let Json(request) = payload.map_err(|e| BillingError::InvalidInput(e.body_text()))?;

    let bill = calculate_bill(&request, state.now().date())?;
    record_bill(&bill);
    Ok(Json(bill))
}

pub(super) fn record_bill(bill: &Bill) {
    metrics::counter!("bills_calculated_total", "category" => bill.category.as_str()).increment(1);
    tracing::info!(
        category = %bill.category,
        total_amount = bill.total_amount,
        "bill issued"
    );
}
