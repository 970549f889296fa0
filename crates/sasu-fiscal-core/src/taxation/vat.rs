use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{round_cents, Money, Rate};

/// Simplified VAT position: output VAT on revenue less input VAT on operating expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatSummary {
    pub rate: Rate,
    pub collected: Money,
    pub deductible: Money,
    pub payable: Money,
    /// Input VAT exceeding output VAT, carried as a credit.
    pub credit: Money,
}

pub fn compute_vat(revenue: Money, operating_expenses: Money, rate: Rate) -> VatSummary {
    let collected = round_cents(revenue * rate);
    let deductible = round_cents(operating_expenses * rate);
    VatSummary {
        rate,
        collected,
        deductible,
        payable: (collected - deductible).max(Decimal::ZERO),
        credit: (deductible - collected).max(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_vat_payable() {
        let vat = compute_vat(dec!(100000), dec!(20000), dec!(0.20));
        assert_eq!(vat.collected, dec!(20000.00));
        assert_eq!(vat.deductible, dec!(4000.00));
        assert_eq!(vat.payable, dec!(16000.00));
        assert_eq!(vat.credit, Decimal::ZERO);
    }

    #[test]
    fn test_vat_credit_when_expenses_exceed_revenue() {
        let vat = compute_vat(dec!(10000), dec!(15000), dec!(0.10));
        assert_eq!(vat.payable, Decimal::ZERO);
        assert_eq!(vat.credit, dec!(500.00));
    }
}
