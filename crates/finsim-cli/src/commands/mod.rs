pub mod narrative;
pub mod params;
pub mod simulation;
pub mod valuation;

use finsim_core::engine::model::{YearInput, YearState};
use serde::Deserialize;

/// A plan of yearly decisions, either bare or as `{"years": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Plan {
    Wrapped { years: Vec<YearInput> },
    Bare(Vec<YearInput>),
}

impl Plan {
    pub fn into_inputs(self) -> Vec<YearInput> {
        match self {
            Plan::Wrapped { years } => years,
            Plan::Bare(years) => years,
        }
    }
}

/// Computed years, either bare or wrapped the way `simulate` prints them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum History {
    Wrapped { results: Vec<YearState> },
    Bare(Vec<YearState>),
}

impl History {
    pub fn into_states(self) -> Vec<YearState> {
        match self {
            History::Wrapped { results } => results,
            History::Bare(results) => results,
        }
    }
}
