pub mod advisory;
pub mod retirement;
pub mod scenario;
pub mod schedule;
pub mod waterfall;

pub use scenario::{MaritalStatus, TaxScenario};
pub use waterfall::{compute_taxation, compute_taxation_with_table, run_pipeline, FiscalResult};
