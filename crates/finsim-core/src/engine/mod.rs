pub(crate) mod checked;
pub mod model;
pub mod valuation;
pub mod year;
