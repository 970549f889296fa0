pub mod registry;
pub mod table;

pub use registry::{rate_table, RateRegistry};
pub use table::RateTable;
