pub mod engine;
pub mod error;
pub mod params;
pub mod time_value;
pub mod types;

#[cfg(feature = "simulation")]
pub mod simulation;

#[cfg(feature = "narrative")]
pub mod narrative;

pub use engine::model::{BalanceSheet, BreakEven, YearInput, YearState};
pub use engine::valuation::calculate_npv;
pub use engine::year::{calculate_year, recompute_from, simulate_years};
pub use error::FinSimError;
pub use params::SimulationParameters;
pub use types::*;

/// Standard result type for all simulation operations
pub type FinSimResult<T> = Result<T, FinSimError>;
