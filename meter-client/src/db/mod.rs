pub mod meter_reading_queries;

pub use meter_reading_queries::{
    load_profile, night_base_load, phase_contributions, phase_totals, total_energy, usage_summary, PhaseTotal,
    UsageSummary,
};
