use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::engine::checked;
use crate::engine::model::{BreakEven, YearState};
use crate::engine::valuation::calculate_npv;
use crate::params::SimulationParameters;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FinSimResult;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

const ROE_GOOD: Rate = dec!(0.15);
const ROE_BAD: Rate = dec!(0.05);
const ROA_GOOD: Rate = dec!(0.10);
const ROA_BAD: Rate = dec!(0.03);
const COVERAGE_GOOD: Decimal = dec!(1.5);
const COVERAGE_BAD: Decimal = dec!(1.0);

// ---------------------------------------------------------------------------
// Metric classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Roe,
    Roa,
    Liquidity,
    Solvency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Good,
    Neutral,
    Bad,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Roe => "ROE",
            Metric::Roa => "ROA",
            Metric::Liquidity => "liquidity ratio",
            Metric::Solvency => "solvency ratio",
        }
    }

    /// `(good at or above, bad below)`
    pub fn thresholds(&self) -> (Decimal, Decimal) {
        match self {
            Metric::Roe => (ROE_GOOD, ROE_BAD),
            Metric::Roa => (ROA_GOOD, ROA_BAD),
            Metric::Liquidity | Metric::Solvency => (COVERAGE_GOOD, COVERAGE_BAD),
        }
    }

    /// Traffic-light reading of a ratio.
    pub fn classify(&self, value: Decimal) -> MetricStatus {
        let (good, bad) = self.thresholds();
        if value >= good {
            MetricStatus::Good
        } else if value < bad {
            MetricStatus::Bad
        } else {
            MetricStatus::Neutral
        }
    }

    fn value_in(&self, state: &YearState) -> Decimal {
        match self {
            Metric::Roe => state.roe,
            Metric::Roa => state.roa,
            Metric::Liquidity => state.liquidity_ratio,
            Metric::Solvency => state.solvency_ratio,
        }
    }
}

// ---------------------------------------------------------------------------
// Output structs
// ---------------------------------------------------------------------------

/// One row of the end-of-run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub revenue: Money,
    pub net_income: Money,
    pub roa: Rate,
    pub roe: Rate,
    pub leverage: Rate,
    pub liquidity_ratio: Rate,
    pub solvency_ratio: Rate,
    pub cash_flow: Money,
    pub break_even_units: BreakEven,
    /// Share of revenue above break-even; `None` when break-even is
    /// unreachable
    pub safety_margin: Option<Rate>,
    pub roe_status: MetricStatus,
    pub roa_status: MetricStatus,
    pub liquidity_status: MetricStatus,
    pub solvency_status: MetricStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub npv: Money,
    pub cumulative_net_income: Money,
    pub average_roe: Rate,
    pub years: Vec<YearSummary>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// How far revenue sits above break-even revenue, as a share of revenue.
///
/// Zero when there is no revenue to compare with; `None` when break-even
/// cannot be reached at all or the margin is not representable.
pub fn safety_margin(state: &YearState) -> Option<Rate> {
    if state.revenue <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    state
        .break_even_revenue
        .finite()
        .and_then(|be| state.revenue.checked_sub(be))
        .and_then(|gap| gap.checked_div(state.revenue))
}

pub fn summarise_year(state: &YearState) -> YearSummary {
    YearSummary {
        year: state.year,
        revenue: state.revenue,
        net_income: state.net_income,
        roa: state.roa,
        roe: state.roe,
        leverage: state.leverage,
        liquidity_ratio: state.liquidity_ratio,
        solvency_ratio: state.solvency_ratio,
        cash_flow: state.cash_flow,
        break_even_units: state.break_even_units,
        safety_margin: safety_margin(state),
        roe_status: Metric::Roe.classify(state.roe),
        roa_status: Metric::Roa.classify(state.roa),
        liquidity_status: Metric::Liquidity.classify(state.liquidity_ratio),
        solvency_status: Metric::Solvency.classify(state.solvency_ratio),
    }
}

/// End-of-run report: valuation, totals and a per-year scorecard.
pub fn build_final_report(
    history: &[YearState],
    params: &SimulationParameters,
) -> FinSimResult<ComputationOutput<FinalReport>> {
    let start = Instant::now();

    let npv = calculate_npv(history, params)?;
    let cumulative_net_income = checked::sum(history.iter().map(|s| s.net_income), "net_income")?;
    let roe_sum = checked::sum(history.iter().map(|s| s.roe), "roe")?;
    let average_roe = roe_sum / Decimal::from(history.len().max(1) as u64);

    let years: Vec<YearSummary> = history.iter().map(summarise_year).collect();
    let warnings = collect_warnings(history, npv);

    let report = FinalReport {
        npv,
        cumulative_net_income,
        average_roe,
        years,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Year-over-year simulation with NPV of yearly cash flows against the initial outlay",
        params,
        warnings,
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn collect_warnings(history: &[YearState], npv: Money) -> Vec<String> {
    let mut warnings = Vec::new();

    for state in history {
        let year = state.year;
        if state.break_even_units.is_infinite() {
            warnings.push(format!(
                "Year {year}: price does not exceed unit variable cost, break-even unreachable"
            ));
        }
        let imbalance = state.balance_sheet.imbalance();
        if !imbalance.is_zero() {
            warnings.push(format!(
                "Year {year}: funding short of assets by {}, cash floored at zero",
                (-imbalance).round_dp(2)
            ));
        }
        for metric in [Metric::Roe, Metric::Roa, Metric::Liquidity, Metric::Solvency] {
            let value = metric.value_in(state);
            if metric.classify(value) == MetricStatus::Bad {
                warnings.push(format!(
                    "Year {year}: {} {} below the {} threshold",
                    metric.label(),
                    value.round_dp(4),
                    metric.thresholds().1
                ));
            }
        }
    }

    if npv < Decimal::ZERO {
        warnings.push(format!("NPV is negative ({})", npv.round_dp(2)));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
