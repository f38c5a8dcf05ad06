//! Fixed economic constants of a simulation run.
//!
//! Every run shares one set of parameters: the starting cash contributed as
//! share capital, the flat tax and interest rates, the discount rate used for
//! valuation and the three operating-cycle periods students do not control.
//! They default to the classroom values and can be overridden as a whole or
//! field by field (missing fields in a config file fall back to the defaults).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinSimError;
use crate::types::{Days, Money, Rate};
use crate::FinSimResult;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const INITIAL_CASH: Money = dec!(10000);
pub const TAX_RATE: Rate = dec!(0.25);
pub const INTEREST_RATE: Rate = dec!(0.04);
pub const DISCOUNT_RATE: Rate = dec!(0.05);

pub const DEFAULT_STORAGE_DAYS: Days = dec!(15);
pub const DEFAULT_MFG_DAYS: Days = dec!(10);
pub const DEFAULT_SALES_DAYS: Days = dec!(5);

pub const DAYS_IN_YEAR: Days = dec!(365);

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Cash contributed by the founders in year 1; also the social capital
    /// before any equity increase and the initial outlay for NPV.
    pub initial_cash: Money,
    /// Flat corporate tax rate, applied to positive EBT only
    pub tax_rate: Rate,
    /// Annual interest rate on the outstanding loan balance
    pub interest_rate: Rate,
    /// Discount rate for the multi-year NPV
    pub discount_rate: Rate,
    pub storage_days: Days,
    pub manufacturing_days: Days,
    pub sales_days: Days,
    /// Day-count convention for receivables and payables
    pub days_in_year: Days,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            initial_cash: INITIAL_CASH,
            tax_rate: TAX_RATE,
            interest_rate: INTEREST_RATE,
            discount_rate: DISCOUNT_RATE,
            storage_days: DEFAULT_STORAGE_DAYS,
            manufacturing_days: DEFAULT_MFG_DAYS,
            sales_days: DEFAULT_SALES_DAYS,
            days_in_year: DAYS_IN_YEAR,
        }
    }
}

impl SimulationParameters {
    /// Reject parameter sets the formulas cannot evaluate.
    ///
    /// Rates are otherwise unconstrained: a negative interest rate or a tax
    /// rate above 100% is odd but arithmetically fine.
    pub fn validate(&self) -> FinSimResult<()> {
        if self.days_in_year <= Decimal::ZERO {
            return Err(FinSimError::invalid(
                "days_in_year",
                format!("Must be positive, got {}", self.days_in_year),
            ));
        }
        if self.discount_rate <= dec!(-1) {
            return Err(FinSimError::invalid(
                "discount_rate",
                format!("Must be greater than -100%, got {}", self.discount_rate),
            ));
        }
        Ok(())
    }

    /// Storage + manufacturing + sales, the part of the operating cycle
    /// that does not depend on the year's decisions.
    pub fn fixed_cycle_days(&self) -> Days {
        self.storage_days + self.manufacturing_days + self.sales_days
    }
}
