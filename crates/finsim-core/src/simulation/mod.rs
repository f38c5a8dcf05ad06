pub mod report;
pub mod state;
