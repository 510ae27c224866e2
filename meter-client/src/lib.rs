pub mod billing;
pub mod db;
pub mod domain;
pub mod insights;
pub mod numeric;

pub use billing::{calculate_bill, BillingError};
pub use insights::{check_budget_status, detect_phase_imbalance, generate_insights};
