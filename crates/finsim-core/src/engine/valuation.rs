use tracing::debug;

use crate::engine::model::YearState;
use crate::params::SimulationParameters;
use crate::time_value;
use crate::types::Money;
use crate::FinSimResult;

/// Net present value of a run.
///
/// The initial cash is the outlay at period 0; the cash flow of the i-th
/// state in `history` (1-based position, not its `year` field) is discounted
/// over i periods. An empty history is worth `-initial_cash`.
pub fn calculate_npv(history: &[YearState], params: &SimulationParameters) -> FinSimResult<Money> {
    let mut flows = Vec::with_capacity(history.len() + 1);
    flows.push(-params.initial_cash);
    flows.extend(history.iter().map(|s| s.cash_flow));

    let npv = time_value::npv(params.discount_rate, &flows)?;
    debug!(years = history.len(), %npv, "npv computed");
    Ok(npv)
}
