use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SasuError;
use crate::rates::table::{IncomeTaxSchedule, TaxBracket};
use crate::taxation::BracketSlice;
use crate::types::{round_cents, safe_ratio, Money, Rate};
use crate::SasuResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeTaxBreakdown {
    pub taxable_income: Money,
    pub household_parts: Decimal,
    /// Taxable income per household part, the amount the schedule is applied to.
    pub quotient: Money,
    /// Household-level base and tax per bracket (per-part slice times parts).
    pub brackets: Vec<BracketSlice>,
    pub gross_tax: Money,
    /// Low-income discount, present only when the household qualifies.
    pub discount: Option<Money>,
    pub net_tax: Money,
    pub marginal_rate: Rate,
    pub effective_rate: Rate,
}

/// Progressive personal income tax with family quotient and low-income discount.
pub fn compute_income_tax(
    taxable_income: Money,
    household_parts: Decimal,
    schedule: &IncomeTaxSchedule,
) -> SasuResult<IncomeTaxBreakdown> {
    if taxable_income < Decimal::ZERO {
        return Err(SasuError::InvalidScenario {
            field: "taxable_income".into(),
            reason: "Taxable income cannot be negative".into(),
        });
    }
    if household_parts < Decimal::ONE {
        return Err(SasuError::InvalidScenario {
            field: "household_parts".into(),
            reason: "A household has at least one part".into(),
        });
    }

    let quotient = taxable_income / household_parts;
    // Household income up to a per-part bound, in cents; the full income once the quotient is reached.
    let household_up_to = |bound: Option<Money>| match bound {
        Some(bound) if bound < quotient => round_cents(bound * household_parts),
        _ => taxable_income,
    };

    let brackets: Vec<BracketSlice> = schedule
        .brackets
        .iter()
        .map(|bracket| {
            let slice = slice_in_bracket(quotient, bracket);
            BracketSlice {
                lower: bracket.lower,
                upper: bracket.upper,
                rate: bracket.rate,
                base: household_up_to(bracket.upper) - household_up_to(Some(bracket.lower)),
                tax: round_cents(slice * bracket.rate * household_parts),
            }
        })
        .collect();

    let gross_tax: Money = brackets.iter().map(|b| b.tax).sum();

    let discount = if household_parts == Decimal::ONE
        && gross_tax < schedule.discount.gross_tax_ceiling
    {
        let raw = schedule.discount.fixed_allowance - gross_tax * schedule.discount.factor;
        Some(round_cents(raw.min(gross_tax).max(Decimal::ZERO)))
    } else {
        None
    };

    let net_tax = gross_tax - discount.unwrap_or(Decimal::ZERO);

    Ok(IncomeTaxBreakdown {
        taxable_income,
        household_parts,
        quotient,
        brackets,
        gross_tax,
        discount,
        net_tax,
        marginal_rate: marginal_rate(quotient, &schedule.brackets),
        effective_rate: safe_ratio(net_tax, taxable_income),
    })
}

/// Rate of the bracket holding the quotient. Upper bounds are inclusive.
pub fn marginal_rate(quotient: Money, brackets: &[TaxBracket]) -> Rate {
    brackets
        .iter()
        .find(|b| b.upper.map_or(true, |upper| quotient <= upper))
        .map(|b| b.rate)
        .unwrap_or(Decimal::ZERO)
}

fn slice_in_bracket(quotient: Money, bracket: &TaxBracket) -> Money {
    let capped = match bracket.upper {
        Some(upper) => quotient.min(upper),
        None => quotient,
    };
    (capped - bracket.lower).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::rate_table;
    use rust_decimal_macros::dec;

    fn schedule() -> IncomeTaxSchedule {
        rate_table(2024).unwrap().income_tax
    }

    #[test]
    fn test_zero_income_is_zero_tax() {
        for parts in [dec!(1), dec!(2.5), dec!(4)] {
            let result = compute_income_tax(Decimal::ZERO, parts, &schedule()).unwrap();
            assert_eq!(result.net_tax, Decimal::ZERO);
            assert_eq!(result.gross_tax, Decimal::ZERO);
            assert_eq!(result.effective_rate, Decimal::ZERO);
            assert_eq!(result.marginal_rate, Decimal::ZERO);
        }
    }

    #[test]
    fn test_single_thirty_thousand() {
        let result = compute_income_tax(dec!(30000), dec!(1), &schedule()).unwrap();
        // 17 503 at 11% + 1 203 at 30%
        assert_eq!(result.gross_tax, dec!(2286.23));
        assert_eq!(result.discount, None);
        assert_eq!(result.net_tax, dec!(2286.23));
        assert_eq!(result.marginal_rate, dec!(0.30));
    }

    #[test]
    fn test_discount_for_modest_single_income() {
        let result = compute_income_tax(dec!(20000), dec!(1), &schedule()).unwrap();
        assert_eq!(result.gross_tax, dec!(957.66));
        assert_eq!(result.discount, Some(dec!(439.66)));
        assert_eq!(result.net_tax, dec!(518.00));
    }

    #[test]
    fn test_discount_never_exceeds_gross_tax() {
        let result = compute_income_tax(dec!(13000), dec!(1), &schedule()).unwrap();
        assert_eq!(result.discount, Some(result.gross_tax));
        assert_eq!(result.net_tax, Decimal::ZERO);
    }

    #[test]
    fn test_family_quotient_doubles_per_part_tax() {
        let couple = compute_income_tax(dec!(60000), dec!(2), &schedule()).unwrap();
        assert_eq!(couple.quotient, dec!(30000));
        assert_eq!(couple.gross_tax, dec!(4572.46));
        assert_eq!(couple.discount, None);
        assert_eq!(couple.marginal_rate, dec!(0.30));
        let bases: Money = couple.brackets.iter().map(|b| b.base).sum();
        assert_eq!(bases, dec!(60000));
    }

    #[test]
    fn test_fractional_parts_bases_in_cents_sum_to_income() {
        let result = compute_income_tax(dec!(100000), dec!(1.5), &schedule()).unwrap();
        let bases: Vec<Money> = result.brackets.iter().map(|b| b.base).collect();
        assert_eq!(
            bases,
            vec![
                dec!(16941.00),
                dec!(26254.50),
                dec!(56804.50),
                Decimal::ZERO,
                Decimal::ZERO
            ]
        );
        assert_eq!(bases.iter().copied().sum::<Money>(), dec!(100000));
        for base in &bases {
            assert_eq!(*base, base.round_dp(2));
        }
    }

    #[test]
    fn test_marginal_rate_at_bracket_boundary() {
        let s = schedule();
        assert_eq!(marginal_rate(dec!(28797), &s.brackets), dec!(0.11));
        assert_eq!(marginal_rate(dec!(28797.01), &s.brackets), dec!(0.30));
        assert_eq!(marginal_rate(dec!(500000), &s.brackets), dec!(0.45));
    }

    #[test]
    fn test_invalid_parts_rejected() {
        let err = compute_income_tax(dec!(10000), dec!(0.5), &schedule()).unwrap_err();
        assert!(matches!(err, SasuError::InvalidScenario { .. }));
    }
}
