use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rates::RateTable;
use crate::types::Money;

pub const MAX_QUARTERS: u8 = 4;

/// Base-pension quarters validated by the year's salary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementValidation {
    /// Gross salary validating one quarter (150 hours of SMIC).
    pub quarter_threshold: Money,
    pub salary_for_full_year: Money,
    pub quarters_validated: u8,
    /// Extra gross salary needed to reach four quarters, if any.
    pub shortfall: Option<Money>,
}

pub fn validate_quarters(gross_compensation: Money, table: &RateTable) -> RetirementValidation {
    let quarter_threshold = table.quarter_threshold();
    let salary_for_full_year = quarter_threshold * Decimal::from(MAX_QUARTERS);

    let quarters_validated = if quarter_threshold > Decimal::ZERO {
        (gross_compensation / quarter_threshold)
            .floor()
            .min(Decimal::from(MAX_QUARTERS))
            .to_u8()
            .unwrap_or(0)
    } else {
        0
    };

    let missing = salary_for_full_year - gross_compensation;
    let shortfall = if missing > Decimal::ZERO {
        Some(missing)
    } else {
        None
    };

    RetirementValidation {
        quarter_threshold,
        salary_for_full_year,
        quarters_validated,
        shortfall,
    }
}

/// Smallest gross salary validating `quarters` quarters.
pub fn salary_for_quarters(quarters: u8, table: &RateTable) -> Money {
    table.quarter_threshold() * Decimal::from(quarters.min(MAX_QUARTERS))
}
