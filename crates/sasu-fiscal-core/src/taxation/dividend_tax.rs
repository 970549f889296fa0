use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SasuError;
use crate::rates::RateTable;
use crate::taxation::income_tax::compute_income_tax;
use crate::types::{round_cents, safe_ratio, Money, Rate};
use crate::SasuResult;

/// How distributed dividends are taxed in the president's hands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendElection {
    /// Flat withholding (PFU): one composite rate.
    #[default]
    Flat,
    /// Progressive income-tax schedule after the 40% allowance.
    Progressive,
}

/// The household's income-tax position before any dividend is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdContext {
    pub taxable_income: Money,
    pub household_parts: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendTaxBreakdown {
    pub election: DividendElection,
    pub distributed: Money,
    pub allowance: Money,
    /// Amount entering the income-tax computation.
    pub taxable_base: Money,
    pub social_levies: Money,
    pub income_tax: Money,
    pub total_levies: Money,
    pub net_received: Money,
    pub effective_rate: Rate,
    /// Household tax without / with the dividend base (progressive election only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_tax_without_dividend: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_tax_with_dividend: Option<Money>,
}

/// Tax a distributed dividend under the chosen election.
///
/// Under the progressive election the income-tax part is the difference
/// between two household computations, one with the dividend base and one
/// without it. Social levies always apply to the full distributed amount.
pub fn compute_dividend_tax(
    distributed: Money,
    election: DividendElection,
    household: &HouseholdContext,
    table: &RateTable,
) -> SasuResult<DividendTaxBreakdown> {
    if distributed < Decimal::ZERO {
        return Err(SasuError::InvalidScenario {
            field: "distributed_dividend".into(),
            reason: "Distributed dividend cannot be negative".into(),
        });
    }

    let rates = &table.dividends;
    let social_levies = round_cents(distributed * rates.social_levy_rate);

    let (allowance, taxable_base, income_tax, without, with) = match election {
        DividendElection::Flat => {
            let income_tax = round_cents(distributed * rates.flat_income_tax_rate);
            (Decimal::ZERO, distributed, income_tax, None, None)
        }
        DividendElection::Progressive => {
            let allowance = distributed * rates.progressive_allowance_rate;
            let taxable_base = distributed - allowance;

            let without = compute_income_tax(
                household.taxable_income,
                household.household_parts,
                &table.income_tax,
            )?
            .net_tax;
            let with = compute_income_tax(
                household.taxable_income + taxable_base,
                household.household_parts,
                &table.income_tax,
            )?
            .net_tax;

            let income_tax = (with - without).max(Decimal::ZERO);
            (allowance, taxable_base, income_tax, Some(without), Some(with))
        }
    };

    let total_levies = social_levies + income_tax;

    Ok(DividendTaxBreakdown {
        election,
        distributed,
        allowance,
        taxable_base,
        social_levies,
        income_tax,
        total_levies,
        net_received: distributed - total_levies,
        effective_rate: safe_ratio(total_levies, distributed),
        household_tax_without_dividend: without,
        household_tax_with_dividend: with,
    })
}
