use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::engine::checked;
use crate::error::FinSimError;
use crate::types::{Money, Rate};
use crate::FinSimResult;

/// Net Present Value of a series of yearly cash flows.
///
/// The first element sits at period 0 (undiscounted), element `t` is divided
/// by `(1 + rate)^t`.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> FinSimResult<Money> {
    let one_plus_r = one_plus_rate(rate)?;

    let mut result = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = checked::mul(discount, one_plus_r, "discount_rate")?;
        }
        let term = checked::div(*cf, discount, "npv")?;
        result = checked::add(result, term, "npv")?;
    }

    Ok(result)
}

fn one_plus_rate(rate: Rate) -> FinSimResult<Decimal> {
    if rate <= dec!(-1) {
        return Err(FinSimError::invalid(
            "discount_rate",
            "Discount rate must be greater than -100%",
        ));
    }
    Ok(Decimal::ONE + rate)
}
