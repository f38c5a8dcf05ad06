use rust_decimal::Decimal;
use tracing::debug;

use crate::engine::checked::{add, div, mul, sub};
use crate::engine::model::{
    Assets, BalanceSheet, BreakEven, Equity, Liabilities, OperatingCycle, YearInput, YearState,
};
use crate::error::FinSimError;
use crate::params::SimulationParameters;
use crate::types::Money;
use crate::FinSimResult;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute one year's statements, break-even, operating cycle and ratios.
///
/// `previous` is the state of the year before (`None` for year 1). Loans,
/// fixed assets, social capital and reserves carry over from it; everything
/// else is recomputed from this year's decisions.
pub fn calculate_year(
    input: &YearInput,
    year: u32,
    previous: Option<&YearState>,
    params: &SimulationParameters,
) -> FinSimResult<YearState> {
    if year == 0 {
        return Err(FinSimError::invalid("year", "Years are numbered from 1"));
    }
    params.validate()?;

    let prior = previous.map(|p| &p.balance_sheet);

    // ---------------------------------------------------------------
    // Income statement
    // ---------------------------------------------------------------
    let revenue = mul(input.units_sold, input.unit_price, "revenue")?;
    let total_variable_costs =
        mul(input.units_sold, input.unit_variable_cost, "total_variable_costs")?;
    let total_costs = add(total_variable_costs, input.fixed_costs, "total_costs")?;
    let ebit = sub(revenue, total_costs, "ebit")?;

    let prior_loans = prior.map_or(Decimal::ZERO, |bs| bs.liabilities.loans);
    let total_loans = add(prior_loans, input.new_loans, "loans")?;
    let interest = mul(total_loans, params.interest_rate, "interest")?;

    let ebt = sub(ebit, interest, "ebt")?;
    // Losses are not taxed and create no tax credit
    let tax = if ebt > Decimal::ZERO {
        mul(ebt, params.tax_rate, "tax")?
    } else {
        Decimal::ZERO
    };
    let net_income = sub(ebt, tax, "net_income")?;

    // ---------------------------------------------------------------
    // Break-even
    // ---------------------------------------------------------------
    let margin_per_unit = sub(input.unit_price, input.unit_variable_cost, "margin_per_unit")?;
    let break_even_units = if margin_per_unit > Decimal::ZERO {
        BreakEven::Finite(div(input.fixed_costs, margin_per_unit, "break_even_units")?)
    } else {
        BreakEven::Unreachable
    };
    let break_even_revenue = break_even_units.scale(input.unit_price)?;

    // ---------------------------------------------------------------
    // Operating cycle (payment days deliberately excluded)
    // ---------------------------------------------------------------
    let pmm = OperatingCycle {
        storage: params.storage_days,
        mfg: params.manufacturing_days,
        sales: params.sales_days,
        collection: input.collection_days,
        total: add(params.fixed_cycle_days(), input.collection_days, "pmm")?,
    };

    // ---------------------------------------------------------------
    // Balance sheet
    // ---------------------------------------------------------------
    let prior_fixed = prior.map_or(Decimal::ZERO, |bs| bs.assets.fixed);
    let fixed_assets = add(prior_fixed, input.new_investment, "fixed_assets")?;

    let daily_revenue = div(revenue, params.days_in_year, "receivables")?;
    let receivables = mul(daily_revenue, input.collection_days, "receivables")?;
    let daily_costs = div(total_costs, params.days_in_year, "payables")?;
    let payables = mul(daily_costs, input.payment_days, "payables")?;

    let prior_capital = prior.map_or(params.initial_cash, |bs| bs.equity.social_capital);
    let social_capital = add(prior_capital, input.new_equity, "social_capital")?;
    let prior_reserves = prior.map_or(Decimal::ZERO, |bs| bs.equity.reserves);
    let reserves = add(prior_reserves, net_income, "reserves")?;

    let equity_total = add(social_capital, reserves, "equity")?;
    let liabilities_total = add(total_loans, payables, "liabilities")?;
    let funding = add(equity_total, liabilities_total, "total_funding")?;
    let operating_assets = add(fixed_assets, receivables, "total_assets")?;

    // Cash is the balancing item, floored at zero. A negative plug leaves
    // assets above liabilities + equity.
    let cash_plug = sub(funding, operating_assets, "cash")?;
    let (cash, total_assets) = if cash_plug >= Decimal::ZERO {
        (cash_plug, add(liabilities_total, equity_total, "total_assets")?)
    } else {
        debug!(year, shortfall = %(-cash_plug), "cash plug negative, flooring cash at zero");
        (Decimal::ZERO, operating_assets)
    };

    // ---------------------------------------------------------------
    // Ratios
    // ---------------------------------------------------------------
    let productivity = div(revenue, guarded(total_costs), "productivity")?;
    let roa = div(ebit, guarded(total_assets), "roa")?;
    let roe = div(net_income, guarded(equity_total), "roe")?;
    // roa == 0 falls back to leverage == roe
    let leverage = div(roe, guarded(roa), "leverage")?;
    let liquid_assets = add(receivables, cash, "liquidity_ratio")?;
    let liquidity_ratio = div(liquid_assets, guarded(payables), "liquidity_ratio")?;
    let solvency_ratio = div(total_assets, guarded(liabilities_total), "solvency_ratio")?;

    // Investment is added back, not subtracted, for valuation purposes
    let cash_flow = add(net_income, input.new_investment, "cash_flow")?;

    debug!(year, %revenue, %net_income, %cash, "year computed");

    Ok(YearState {
        year,
        revenue,
        total_variable_costs,
        fixed_costs: input.fixed_costs,
        ebit,
        interest,
        ebt,
        tax,
        net_income,
        break_even_units,
        break_even_revenue,
        productivity,
        roa,
        roe,
        leverage,
        liquidity_ratio,
        solvency_ratio,
        pmm,
        balance_sheet: BalanceSheet {
            assets: Assets {
                fixed: fixed_assets,
                receivables,
                cash,
                total: total_assets,
            },
            liabilities: Liabilities {
                payables,
                loans: total_loans,
                total: liabilities_total,
            },
            equity: Equity {
                social_capital,
                reserves,
                total: equity_total,
            },
        },
        cash_flow,
    })
}

/// Run a whole sequence of yearly decisions from a blank company.
pub fn simulate_years(
    inputs: &[YearInput],
    params: &SimulationParameters,
) -> FinSimResult<Vec<YearState>> {
    extend_history(Vec::with_capacity(inputs.len()), inputs, params)
}

/// Recompute the history from `from_year` onward after an earlier year's
/// decisions changed.
///
/// `inputs` holds the decisions for every year of the run (year `n` at index
/// `n - 1`). States before `from_year` are kept as they are; every state from
/// `from_year` on is rebuilt, since each one depends on all of its
/// predecessors.
pub fn recompute_from(
    history: &[YearState],
    inputs: &[YearInput],
    from_year: u32,
    params: &SimulationParameters,
) -> FinSimResult<Vec<YearState>> {
    if from_year == 0 || from_year as usize > inputs.len() {
        return Err(FinSimError::invalid(
            "from_year",
            format!("Must be between 1 and {}, got {from_year}", inputs.len()),
        ));
    }
    let keep = (from_year as usize - 1).min(history.len());
    extend_history(history[..keep].to_vec(), &inputs[keep..], params)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn extend_history(
    mut history: Vec<YearState>,
    inputs: &[YearInput],
    params: &SimulationParameters,
) -> FinSimResult<Vec<YearState>> {
    for input in inputs {
        let year = history.len() as u32 + 1;
        let state = calculate_year(input, year, history.last(), params)?;
        history.push(state);
    }
    Ok(history)
}

/// Zero denominators are replaced by one so ratios stay finite.
fn guarded(denominator: Money) -> Money {
    if denominator.is_zero() {
        Decimal::ONE
    } else {
        denominator
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
