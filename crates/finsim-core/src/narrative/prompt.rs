//! What gets sent to the feedback service.
//!
//! The service receives a condensed view of the figures, never the full
//! `YearState`. The JSON body keeps the field names and types the web
//! endpoint reads (`{"type": "annual", "data": {"netIncome": 3750.0, ...}}`):
//! figures travel as JSON numbers, and an unreachable break-even as `null`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::model::YearState;
use crate::types::{Money, Rate, Units};

pub const SYSTEM_PROMPT: &str = "You are an experienced corporate finance lecturer giving \
     educational feedback to university business students.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualMetrics {
    pub year: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_income: Money,
    /// `None` when break-even cannot be reached
    #[serde(with = "rust_decimal::serde::float_option")]
    pub break_even_units: Option<Units>,
    #[serde(with = "rust_decimal::serde::float")]
    pub roa: Rate,
    #[serde(with = "rust_decimal::serde::float")]
    pub roe: Rate,
    #[serde(with = "rust_decimal::serde::float")]
    pub leverage: Rate,
    #[serde(with = "rust_decimal::serde::float")]
    pub liquidity_ratio: Rate,
}

impl AnnualMetrics {
    pub fn from_state(state: &YearState) -> Self {
        AnnualMetrics {
            year: state.year,
            revenue: state.revenue,
            net_income: state.net_income,
            break_even_units: state.break_even_units.finite(),
            roa: state.roa,
            roe: state.roe,
            leverage: state.leverage,
            liquidity_ratio: state.liquidity_ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalMetrics {
    /// Free-text trajectory, one line per year
    pub summary: String,
}

impl FinalMetrics {
    pub fn from_history(history: &[YearState]) -> Self {
        FinalMetrics {
            summary: trajectory_summary(history),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum FeedbackRequest {
    Annual(AnnualMetrics),
    Final(FinalMetrics),
}

impl FeedbackRequest {
    pub fn annual(state: &YearState) -> Self {
        FeedbackRequest::Annual(AnnualMetrics::from_state(state))
    }

    pub fn final_report(history: &[YearState]) -> Self {
        FeedbackRequest::Final(FinalMetrics::from_history(history))
    }

    /// User prompt for the language model.
    pub fn prompt(&self) -> String {
        match self {
            FeedbackRequest::Annual(m) => build_annual_prompt(m),
            FeedbackRequest::Final(m) => build_final_prompt(m),
        }
    }
}

/// One line per year with the figures the final feedback comments on.
pub fn trajectory_summary(history: &[YearState]) -> String {
    history
        .iter()
        .map(|s| {
            format!(
                "Year {}: revenue {}, net income {}, ROA {}, ROE {}, liquidity {}, solvency {}",
                s.year,
                s.revenue.round_dp(2),
                s.net_income.round_dp(2),
                percent(s.roa),
                percent(s.roe),
                s.liquidity_ratio.round_dp(2),
                s.solvency_ratio.round_dp(2),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_annual_prompt(m: &AnnualMetrics) -> String {
    let break_even = match m.break_even_units {
        Some(units) => units.round_dp(2).to_string(),
        None => "unreachable (price does not cover unit variable cost)".into(),
    };
    format!(
        "Analyse year {} of a company run by a student in a business simulation:\n\
         - Revenue: {}\n\
         - Net income: {}\n\
         - Break-even point (units): {}\n\
         - ROA: {}\n\
         - ROE: {}\n\
         - Leverage: {}\n\
         - Liquidity: {}\n\n\
         Write short teaching feedback (at most 3 paragraphs) explaining why the student \
         obtained these results and what they should improve.",
        m.year,
        m.revenue.round_dp(2),
        m.net_income.round_dp(2),
        break_even,
        percent(m.roa),
        percent(m.roe),
        m.leverage.round_dp(2),
        m.liquidity_ratio.round_dp(2),
    )
}

pub fn build_final_prompt(m: &FinalMetrics) -> String {
    format!(
        "Write a final executive report on the trajectory of the student's company.\n\
         Trajectory:\n{}\n\n\
         Judge whether management was successful from the evolution of profitability and \
         solvency, and close with a short summary of what the student has learned.",
        m.summary
    )
}

fn percent(rate: Rate) -> String {
    match rate.checked_mul(Decimal::ONE_HUNDRED) {
        Some(pct) => format!("{}%", pct.round_dp(2)),
        None => format!("{} (as a ratio)", rate.round_dp(2)),
    }
}
