//! The running simulation as a value.
//!
//! A `SimulationState` is never edited in place: every transition borrows the
//! current state and returns the next one, so a driver (CLI, web handler,
//! test) can keep, compare or discard older states freely.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::model::{YearInput, YearState};
use crate::engine::valuation::calculate_npv;
use crate::engine::year::{calculate_year, recompute_from};
use crate::error::FinSimError;
use crate::params::SimulationParameters;
use crate::types::Money;
use crate::FinSimResult;

pub const MIN_YEARS: u32 = 1;
pub const MAX_YEARS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub total_years: u32,
    /// Year the next decisions apply to (1-based). Stays at
    /// `total_years + 1` once the run is complete.
    pub current_year: u32,
    pub is_finished: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub config: SimulationConfig,
    /// Decisions entered so far, year `n` at index `n - 1`
    pub inputs: Vec<YearInput>,
    /// Computed history, same indexing as `inputs`
    pub results: Vec<YearState>,
    /// Narrative feedback per year, when it arrived
    pub feedback: BTreeMap<u32, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_feedback: Option<String>,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::fresh(MIN_YEARS)
    }
}

impl SimulationState {
    /// Begin a run of `total_years` years.
    pub fn start(total_years: u32) -> FinSimResult<Self> {
        if !(MIN_YEARS..=MAX_YEARS).contains(&total_years) {
            return Err(FinSimError::invalid(
                "total_years",
                format!("Must be between {MIN_YEARS} and {MAX_YEARS}, got {total_years}"),
            ));
        }
        info!(total_years, "simulation started");
        Ok(Self::fresh(total_years))
    }

    /// Discard everything and go back to a one-year blank run.
    pub fn restart(&self) -> Self {
        info!("simulation restarted");
        Self::default()
    }

    fn fresh(total_years: u32) -> Self {
        SimulationState {
            config: SimulationConfig {
                total_years,
                current_year: 1,
                is_finished: false,
            },
            inputs: Vec::new(),
            results: Vec::new(),
            feedback: BTreeMap::new(),
            final_feedback: None,
        }
    }

    /// Compute the current year from `input` and return the next state.
    pub fn advance(&self, input: YearInput, params: &SimulationParameters) -> FinSimResult<Self> {
        if self.config.is_finished {
            return Err(FinSimError::SimulationFinished {
                total_years: self.config.total_years,
            });
        }

        let year = self.config.current_year;
        let result = calculate_year(&input, year, self.results.last(), params)?;

        let mut next = self.clone();
        next.inputs.push(input);
        next.results.push(result);
        next.config.current_year = year + 1;
        next.config.is_finished = year >= self.config.total_years;

        info!(year, finished = next.config.is_finished, "year simulated");
        Ok(next)
    }

    /// Replace the decisions of an already-simulated year and rebuild that
    /// year and every later one. Feedback for rebuilt years no longer applies
    /// and is dropped, as is the final report feedback.
    pub fn amend_year(
        &self,
        year: u32,
        input: YearInput,
        params: &SimulationParameters,
    ) -> FinSimResult<Self> {
        if year == 0 || year as usize > self.inputs.len() {
            return Err(FinSimError::invalid(
                "year",
                format!(
                    "Only simulated years 1..={} can be amended, got {year}",
                    self.inputs.len()
                ),
            ));
        }

        let mut inputs = self.inputs.clone();
        inputs[year as usize - 1] = input;
        let results = recompute_from(&self.results, &inputs, year, params)?;

        let mut next = self.clone();
        next.inputs = inputs;
        next.results = results;
        next.feedback.retain(|y, _| *y < year);
        next.final_feedback = None;

        let recomputed = next.results.len().saturating_sub(year as usize - 1);
        info!(year, recomputed, "year amended");
        Ok(next)
    }

    /// Attach narrative feedback for `year`.
    pub fn with_feedback(&self, year: u32, text: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.feedback.insert(year, text.into());
        next
    }

    /// Attach the end-of-run narrative.
    pub fn with_final_feedback(&self, text: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.final_feedback = Some(text.into());
        next
    }

    /// Most recent computed year, if any.
    pub fn latest(&self) -> Option<&YearState> {
        self.results.last()
    }

    pub fn feedback_for(&self, year: u32) -> Option<&str> {
        self.feedback.get(&year).map(String::as_str)
    }

    /// NPV of everything simulated so far.
    pub fn npv(&self, params: &SimulationParameters) -> FinSimResult<Money> {
        calculate_npv(&self.results, params)
    }
}
