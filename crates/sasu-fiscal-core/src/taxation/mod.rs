pub mod corporate_tax;
pub mod dividend_tax;
pub mod income_tax;
pub mod social_charges;
pub mod vat;

use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Base and tax for one slice of a progressive schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketSlice {
    pub lower: Money,
    pub upper: Option<Money>,
    pub rate: Rate,
    pub base: Money,
    pub tax: Money,
}
