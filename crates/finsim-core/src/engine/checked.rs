//! Overflow-checked decimal arithmetic.
//!
//! `Decimal` panics when a product or quotient leaves its 96-bit range. Every
//! step of the yearly model goes through these helpers instead, so an
//! out-of-range decision surfaces as `InvalidInput` naming the figure that
//! could not be represented.

use rust_decimal::Decimal;

use crate::error::FinSimError;
use crate::FinSimResult;

fn out_of_range(field: &str) -> FinSimError {
    FinSimError::invalid(field, "Value out of range for decimal arithmetic")
}

pub(crate) fn add(a: Decimal, b: Decimal, field: &str) -> FinSimResult<Decimal> {
    a.checked_add(b).ok_or_else(|| out_of_range(field))
}

pub(crate) fn sub(a: Decimal, b: Decimal, field: &str) -> FinSimResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| out_of_range(field))
}

pub(crate) fn mul(a: Decimal, b: Decimal, field: &str) -> FinSimResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| out_of_range(field))
}

pub(crate) fn div(a: Decimal, b: Decimal, field: &str) -> FinSimResult<Decimal> {
    a.checked_div(b).ok_or_else(|| out_of_range(field))
}

pub(crate) fn sum(values: impl IntoIterator<Item = Decimal>, field: &str) -> FinSimResult<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| add(acc, v, field))
}
