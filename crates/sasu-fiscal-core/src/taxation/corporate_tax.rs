use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rates::table::CorporateTaxSchedule;
use crate::taxation::BracketSlice;
use crate::types::{round_cents, safe_ratio, Money, Rate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorporateTaxBreakdown {
    pub pre_tax_profit: Money,
    pub reduced_rate_available: bool,
    pub brackets: Vec<BracketSlice>,
    pub total: Money,
    pub effective_rate: Rate,
}

/// Corporate income tax (IS) on pre-tax profit.
///
/// Reduced rate up to the threshold, standard rate above. A loss or zero
/// profit gives zero tax; no carry-back is modelled. When revenue reaches the
/// reduced-rate cap the whole profit falls in the standard bracket.
pub fn compute_corporate_tax(
    pre_tax_profit: Money,
    revenue: Money,
    schedule: &CorporateTaxSchedule,
) -> CorporateTaxBreakdown {
    let reduced_rate_available = revenue < schedule.reduced_rate_revenue_cap;
    let taxable = pre_tax_profit.max(Decimal::ZERO);

    let reduced_base = if reduced_rate_available {
        taxable.min(schedule.reduced_rate_threshold)
    } else {
        Decimal::ZERO
    };
    let standard_base = taxable - reduced_base;

    let reduced_tax = round_cents(reduced_base * schedule.reduced_rate);
    let standard_tax = round_cents(standard_base * schedule.standard_rate);
    let total = reduced_tax + standard_tax;

    let brackets = vec![
        BracketSlice {
            lower: Decimal::ZERO,
            upper: Some(schedule.reduced_rate_threshold),
            rate: schedule.reduced_rate,
            base: reduced_base,
            tax: reduced_tax,
        },
        BracketSlice {
            lower: schedule.reduced_rate_threshold,
            upper: None,
            rate: schedule.standard_rate,
            base: standard_base,
            tax: standard_tax,
        },
    ];

    CorporateTaxBreakdown {
        pre_tax_profit,
        reduced_rate_available,
        brackets,
        total,
        effective_rate: safe_ratio(total, taxable),
    }
}
