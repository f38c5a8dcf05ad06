use clap::Args;
use serde_json::Value;

use finsim_core::narrative::prompt::{FeedbackRequest, SYSTEM_PROMPT};

use super::History;
use crate::input;

/// Arguments for building a feedback request
#[derive(Args)]
pub struct PromptArgs {
    /// Path to JSON history (output of `simulate`, or an array of year states)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual request for this year; without it the final request is built
    #[arg(long)]
    pub year: Option<u32>,
}

pub fn run_prompt(args: PromptArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let history: History = input::stdin::read_input(args.input.as_deref())?
        .ok_or("--input <history.json> or stdin required for prompt")?;
    let states = history.into_states();

    let request = match args.year {
        Some(year) => {
            let state = states
                .iter()
                .find(|s| s.year == year)
                .ok_or_else(|| format!("year {} not found in history", year))?;
            FeedbackRequest::annual(state)
        }
        None if states.is_empty() => return Err("history is empty".into()),
        None => FeedbackRequest::final_report(&states),
    };

    let mut value = serde_json::to_value(&request)?;
    if let Value::Object(ref mut map) = value {
        map.insert("system_prompt".into(), Value::String(SYSTEM_PROMPT.into()));
        map.insert("prompt".into(), Value::String(request.prompt()));
    }
    Ok(value)
}
