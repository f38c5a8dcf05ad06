use napi::Result as NapiResult;
use napi_derive::napi;

use finsim_core::engine::model::{YearInput, YearState};
use finsim_core::narrative::prompt::{FeedbackRequest, SYSTEM_PROMPT};
use finsim_core::params::SimulationParameters;
use serde::Serialize;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parameters from an optional JSON document; omitted fields keep defaults.
fn parse_params(params_json: Option<String>) -> NapiResult<SimulationParameters> {
    let params = match params_json {
        Some(json) => serde_json::from_str::<SimulationParameters>(&json).map_err(to_napi_error)?,
        None => SimulationParameters::default(),
    };
    params.validate().map_err(to_napi_error)?;
    Ok(params)
}

fn parse_history(history_json: &str) -> NapiResult<Vec<YearState>> {
    serde_json::from_str(history_json).map_err(to_napi_error)
}

fn to_json<T: Serialize>(value: &T) -> NapiResult<String> {
    serde_json::to_string(value).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// One fiscal year. `year` defaults to the previous year + 1, or 1.
#[napi]
pub fn calculate_year(
    input_json: String,
    previous_json: Option<String>,
    year: Option<u32>,
    params_json: Option<String>,
) -> NapiResult<String> {
    let input = YearInput::from_json(&input_json).map_err(to_napi_error)?;
    let previous: Option<YearState> = match previous_json {
        Some(json) => Some(serde_json::from_str(&json).map_err(to_napi_error)?),
        None => None,
    };
    let params = parse_params(params_json)?;

    let year = year.unwrap_or_else(|| previous.as_ref().map_or(1, |p| p.year + 1));
    let state = finsim_core::engine::year::calculate_year(&input, year, previous.as_ref(), &params)
        .map_err(to_napi_error)?;
    to_json(&state)
}

#[napi]
pub fn calculate_npv(history_json: String, params_json: Option<String>) -> NapiResult<String> {
    let history = parse_history(&history_json)?;
    let params = parse_params(params_json)?;
    let npv = finsim_core::engine::valuation::calculate_npv(&history, &params)
        .map_err(to_napi_error)?;
    to_json(&npv)
}

/// Project a list of yearly decisions; returns the list of year states.
#[napi]
pub fn simulate(plan_json: String, params_json: Option<String>) -> NapiResult<String> {
    let inputs: Vec<YearInput> = serde_json::from_str(&plan_json).map_err(to_napi_error)?;
    let params = parse_params(params_json)?;
    let history =
        finsim_core::engine::year::simulate_years(&inputs, &params).map_err(to_napi_error)?;
    to_json(&history)
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[napi]
pub fn final_report(history_json: String, params_json: Option<String>) -> NapiResult<String> {
    let history = parse_history(&history_json)?;
    let params = parse_params(params_json)?;
    let report = finsim_core::simulation::report::build_final_report(&history, &params)
        .map_err(to_napi_error)?;
    to_json(&report)
}

#[napi]
pub fn default_parameters() -> NapiResult<String> {
    to_json(&SimulationParameters::default())
}

/// Body for the feedback endpoint plus the prompts it should use: the
/// annual request for `year`, or the final request when no year is given.
#[napi]
pub fn feedback_request(history_json: String, year: Option<u32>) -> NapiResult<String> {
    let history = parse_history(&history_json)?;
    let request = match year {
        Some(year) => {
            let state = history
                .iter()
                .find(|s| s.year == year)
                .ok_or_else(|| to_napi_error(format!("year {} not found in history", year)))?;
            FeedbackRequest::annual(state)
        }
        None => FeedbackRequest::final_report(&history),
    };

    let mut value = serde_json::to_value(&request).map_err(to_napi_error)?;
    if let serde_json::Value::Object(ref mut map) = value {
        map.insert("system_prompt".into(), SYSTEM_PROMPT.into());
        map.insert("prompt".into(), request.prompt().into());
    }
    to_json(&value)
}
