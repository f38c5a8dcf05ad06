use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::engine::checked;
use crate::error::FinSimError;
use crate::types::{Days, Money, Rate, Units};
use crate::FinSimResult;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The decisions a student takes for one simulated year.
///
/// Values are taken as given: negative figures are not rejected and simply
/// flow through the arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearInput {
    #[serde(alias = "unitsSold")]
    pub units_sold: Units,
    #[serde(alias = "unitPrice")]
    pub unit_price: Money,
    #[serde(alias = "unitVariableCost")]
    pub unit_variable_cost: Money,
    #[serde(alias = "fixedCosts")]
    pub fixed_costs: Money,
    /// Additions to fixed assets this year
    #[serde(alias = "newInvestment")]
    pub new_investment: Money,
    /// New borrowing, added to the outstanding loan balance
    #[serde(alias = "newLoans")]
    pub new_loans: Money,
    /// Capital increase, added to social capital
    #[serde(alias = "newEquity")]
    pub new_equity: Money,
    /// Average days customers take to pay
    #[serde(alias = "collectionDays")]
    pub collection_days: Days,
    /// Average days taken to pay suppliers
    #[serde(alias = "paymentDays")]
    pub payment_days: Days,
}

impl YearInput {
    /// Parse a year's decisions from a JSON document.
    ///
    /// Any structural problem (missing field, non-numeric value) is reported
    /// as a single `InvalidInput` error; nothing is computed from a partial
    /// document.
    pub fn from_json(json: &str) -> FinSimResult<Self> {
        serde_json::from_str(json).map_err(|e| FinSimError::invalid("year_input", e.to_string()))
    }

    /// Same as [`YearInput::from_json`] for an already-parsed value.
    pub fn from_value(value: serde_json::Value) -> FinSimResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| FinSimError::invalid("year_input", e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Break-even
// ---------------------------------------------------------------------------

/// A break-even figure, or the marker that break-even cannot be reached
/// because each unit sold does not contribute a positive margin.
///
/// `Unreachable` plays the role of positive infinity: it compares greater
/// than any finite value and serialises as the string `"Infinity"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakEven {
    Finite(Decimal),
    Unreachable,
}

const INFINITY_LABEL: &str = "Infinity";

impl BreakEven {
    pub fn is_infinite(&self) -> bool {
        matches!(self, BreakEven::Unreachable)
    }

    pub fn finite(&self) -> Option<Decimal> {
        match self {
            BreakEven::Finite(v) => Some(*v),
            BreakEven::Unreachable => None,
        }
    }

    /// Scale a break-even volume by a price. Infinity stays infinite
    /// whatever the factor.
    pub fn scale(&self, factor: Decimal) -> FinSimResult<BreakEven> {
        match self {
            BreakEven::Finite(v) => Ok(BreakEven::Finite(checked::mul(*v, factor, "break_even")?)),
            BreakEven::Unreachable => Ok(BreakEven::Unreachable),
        }
    }
}

impl PartialOrd for BreakEven {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering;
        match (self, other) {
            (BreakEven::Finite(a), BreakEven::Finite(b)) => a.partial_cmp(b),
            (BreakEven::Finite(_), BreakEven::Unreachable) => Some(Ordering::Less),
            (BreakEven::Unreachable, BreakEven::Finite(_)) => Some(Ordering::Greater),
            (BreakEven::Unreachable, BreakEven::Unreachable) => Some(Ordering::Equal),
        }
    }
}

impl std::fmt::Display for BreakEven {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakEven::Finite(v) => write!(f, "{v}"),
            BreakEven::Unreachable => f.write_str(INFINITY_LABEL),
        }
    }
}

impl Serialize for BreakEven {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BreakEven::Finite(v) => Serialize::serialize(v, serializer),
            BreakEven::Unreachable => serializer.serialize_str(INFINITY_LABEL),
        }
    }
}

impl<'de> Deserialize<'de> for BreakEven {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(Decimal),
            Label(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(BreakEven::Finite(v)),
            Repr::Label(s) if s.eq_ignore_ascii_case(INFINITY_LABEL) || s == "inf" => {
                Ok(BreakEven::Unreachable)
            }
            Repr::Label(s) => Err(serde::de::Error::custom(format!(
                "expected a decimal or \"{INFINITY_LABEL}\", got \"{s}\""
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Operating cycle
// ---------------------------------------------------------------------------

/// Days from buying materials to collecting cash from customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingCycle {
    pub storage: Days,
    pub mfg: Days,
    pub sales: Days,
    pub collection: Days,
    pub total: Days,
}

// ---------------------------------------------------------------------------
// Balance sheet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assets {
    pub fixed: Money,
    pub receivables: Money,
    pub cash: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liabilities {
    pub payables: Money,
    pub loans: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equity {
    pub social_capital: Money,
    pub reserves: Money,
    pub total: Money,
}

/// Year-end balance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub assets: Assets,
    pub liabilities: Liabilities,
    pub equity: Equity,
}

impl BalanceSheet {
    /// Liabilities plus equity.
    pub fn total_funding(&self) -> Money {
        self.liabilities.total + self.equity.total
    }

    /// `(liabilities + equity) - assets`. Zero for a balanced sheet, negative
    /// when cash had to be floored at zero (assets then exceed funding).
    pub fn imbalance(&self) -> Money {
        self.total_funding() - self.assets.total
    }

    pub fn is_balanced(&self) -> bool {
        self.imbalance().is_zero()
    }
}

// ---------------------------------------------------------------------------
// Year state
// ---------------------------------------------------------------------------

/// Everything computed for one simulated year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearState {
    /// 1-based position in the run
    pub year: u32,

    // Income statement
    pub revenue: Money,
    pub total_variable_costs: Money,
    pub fixed_costs: Money,
    pub ebit: Money,
    pub interest: Money,
    pub ebt: Money,
    pub tax: Money,
    pub net_income: Money,

    // Break-even
    pub break_even_units: BreakEven,
    pub break_even_revenue: BreakEven,

    // Ratios
    pub productivity: Rate,
    pub roa: Rate,
    pub roe: Rate,
    pub leverage: Rate,
    pub liquidity_ratio: Rate,
    pub solvency_ratio: Rate,

    pub pmm: OperatingCycle,
    pub balance_sheet: BalanceSheet,

    /// Contribution of this year to the NPV
    pub cash_flow: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_break_even_serialises_infinity_label() {
        let json = serde_json::to_string(&BreakEven::Unreachable).unwrap();
        assert_eq!(json, "\"Infinity\"");
        let back: BreakEven = serde_json::from_str(&json).unwrap();
        assert!(back.is_infinite());
    }

    #[test]
    fn test_finite_break_even_serialises_as_decimal() {
        let json = serde_json::to_string(&BreakEven::Finite(dec!(500))).unwrap();
        assert_eq!(json, "\"500\"");
        let back: BreakEven = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BreakEven::Finite(dec!(500)));
    }

    #[test]
    fn test_break_even_reads_plain_numbers() {
        let be: BreakEven = serde_json::from_str("500").unwrap();
        assert_eq!(be, BreakEven::Finite(dec!(500)));
        let be: BreakEven = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(be, BreakEven::Finite(dec!(12.5)));
    }

    #[test]
    fn test_break_even_rejects_other_labels() {
        assert!(serde_json::from_str::<BreakEven>("\"NaN\"").is_err());
    }

    #[test]
    fn test_unreachable_orders_above_finite() {
        assert!(BreakEven::Unreachable > BreakEven::Finite(dec!(1000000)));
        assert_eq!(BreakEven::Unreachable.scale(Decimal::ZERO).unwrap(), BreakEven::Unreachable);
        assert!(BreakEven::Finite(Decimal::MAX).scale(dec!(2)).is_err());
    }

    #[test]
    fn test_year_input_accepts_camel_case() {
        let json = r#"{
            "unitsSold": 1000, "unitPrice": 20, "unitVariableCost": 10,
            "fixedCosts": 5000, "newInvestment": 0, "newLoans": 0,
            "newEquity": 0, "collectionDays": 30, "paymentDays": 30
        }"#;
        let input = YearInput::from_json(json).unwrap();
        assert_eq!(input.units_sold, dec!(1000));
        assert_eq!(input.payment_days, dec!(30));
    }

    #[test]
    fn test_year_input_missing_field_is_invalid_input() {
        let err = YearInput::from_json(r#"{ "units_sold": 10 }"#).unwrap_err();
        assert!(matches!(err, FinSimError::InvalidInput { .. }));
    }

    #[test]
    fn test_year_input_non_numeric_is_invalid_input() {
        let json = r#"{
            "units_sold": "lots", "unit_price": 20, "unit_variable_cost": 10,
            "fixed_costs": 5000, "new_investment": 0, "new_loans": 0,
            "new_equity": 0, "collection_days": 30, "payment_days": 30
        }"#;
        let err = YearInput::from_json(json).unwrap_err();
        assert!(matches!(err, FinSimError::InvalidInput { .. }));
    }
}
