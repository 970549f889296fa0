use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SasuError;
use crate::taxation::social_charges::SocialChargeTotals;
use crate::types::{round_cents, Money};
use crate::SasuResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionInstallment {
    pub quarter: u8,
    pub label: String,
    pub due_date: NaiveDate,
    pub employer: Money,
    pub employee: Money,
    pub total: Money,
}

/// Quarterly payment plan for the year's social contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionSchedule {
    pub annual_total: Money,
    pub monthly_provision: Money,
    pub installments: Vec<ContributionInstallment>,
}

/// Split annual charges into four quarterly installments.
///
/// Each quarter is due on the 15th of the month following it; the fourth
/// falls in January of the next year. Rounding residue goes to the last
/// installment so the installments sum to the annual figures.
pub fn build_schedule(totals: &SocialChargeTotals, fiscal_year: i32) -> SasuResult<ContributionSchedule> {
    let quarterly_employer = round_cents(totals.employer / dec!(4));
    let quarterly_employee = round_cents(totals.employee / dec!(4));

    let mut installments = Vec::with_capacity(4);
    for quarter in 1u8..=4 {
        let (year, month) = match quarter {
            1 => (fiscal_year, 4),
            2 => (fiscal_year, 7),
            3 => (fiscal_year, 10),
            _ => (fiscal_year + 1, 1),
        };
        let due_date =
            NaiveDate::from_ymd_opt(year, month, 15).ok_or(SasuError::UnknownFiscalYear(fiscal_year))?;

        let (employer, employee) = if quarter == 4 {
            (
                totals.employer - quarterly_employer * dec!(3),
                totals.employee - quarterly_employee * dec!(3),
            )
        } else {
            (quarterly_employer, quarterly_employee)
        };

        installments.push(ContributionInstallment {
            quarter,
            label: format!("Q{quarter} {fiscal_year}"),
            due_date,
            employer,
            employee,
            total: employer + employee,
        });
    }

    Ok(ContributionSchedule {
        annual_total: totals.total,
        monthly_provision: round_cents(totals.total / dec!(12)),
        installments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn totals(employer: Money, employee: Money) -> SocialChargeTotals {
        SocialChargeTotals {
            employer,
            employee,
            total: employer + employee,
            net_salary: Decimal::ZERO,
            total_employer_cost: Decimal::ZERO,
        }
    }

    #[test]
    fn test_due_dates() {
        let schedule = build_schedule(&totals(dec!(1000), dec!(500)), 2024).unwrap();
        let dates: Vec<NaiveDate> = schedule.installments.iter().map(|i| i.due_date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 4, 15).unwrap(),
                NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
                NaiveDate::from_ymd_opt(2024, 10, 15).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            ]
        );
        assert_eq!(schedule.installments[0].label, "Q1 2024");
    }

    #[test]
    fn test_installments_sum_to_annual() {
        let t = totals(dec!(10000.01), dec!(3333.33));
        let schedule = build_schedule(&t, 2025).unwrap();
        let sum: Money = schedule.installments.iter().map(|i| i.total).sum();
        assert_eq!(sum, t.total);
        assert_eq!(schedule.installments[0].employer, dec!(2500.00));
        assert_eq!(schedule.installments[3].employer, dec!(2500.01));
        assert_eq!(schedule.monthly_provision, dec!(1111.11));
    }
}
