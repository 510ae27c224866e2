pub mod bill;
pub mod insight;
pub mod meter_reading;

pub use bill::{Bill, BillRequest, ConnectionCategory, DailyCost, SlabBreakdownEntry};
pub use insight::{Insight, PhaseContribution, Severity, UsageStats};
pub use meter_reading::MeterReading;
