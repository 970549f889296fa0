use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SasuError;
use crate::taxation::dividend_tax::DividendElection;
use crate::taxation::social_charges::EmployerProfile;
use crate::types::{Money, Rate};
use crate::SasuResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    #[default]
    Single,
    Married,
    CivilPartnership,
    Divorced,
    Widowed,
}

/// One year of company activity and president remuneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxScenario {
    pub revenue: Money,
    pub operating_expenses: Money,
    #[serde(default)]
    pub deductible_expenses: Money,
    pub gross_salary: Money,
    #[serde(default)]
    pub bonuses: Money,
    #[serde(default)]
    pub benefits_in_kind: Money,
    /// Gross dividend the president would like; clamped to distributable capacity.
    #[serde(default)]
    pub desired_dividend: Money,
    #[serde(default)]
    pub dividend_election: DividendElection,
    #[serde(default)]
    pub marital_status: MaritalStatus,
    #[serde(default)]
    pub dependents: u32,
    /// Other taxable income of the household (spouse salary, rents...).
    #[serde(default)]
    pub other_household_income: Money,
    #[serde(default)]
    pub startup_relief_eligible: bool,
    #[serde(default = "default_headcount")]
    pub headcount: u32,
    /// VAT rate for the informational VAT block; the table's standard rate when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<Rate>,
}

fn default_headcount() -> u32 {
    1
}

impl TaxScenario {
    /// Salary plus bonuses: everything subject to social contributions.
    pub fn gross_compensation(&self) -> Money {
        self.gross_salary + self.bonuses
    }

    /// Family-quotient parts: 1 or 2 for the couple, then half a part for
    /// the first dependent, one for two, and one more per dependent beyond two.
    pub fn household_parts(&self) -> Decimal {
        let adults = match self.marital_status {
            MaritalStatus::Married | MaritalStatus::CivilPartnership => dec!(2),
            MaritalStatus::Single | MaritalStatus::Divorced | MaritalStatus::Widowed => dec!(1),
        };
        let dependents = match self.dependents {
            0 => Decimal::ZERO,
            1 => dec!(0.5),
            2 => Decimal::ONE,
            n => Decimal::ONE + Decimal::from(n - 2),
        };
        adults + dependents
    }

    pub fn employer_profile(&self) -> EmployerProfile {
        EmployerProfile {
            startup_relief_eligible: self.startup_relief_eligible,
            headcount: self.headcount,
        }
    }

    pub fn validate(&self) -> SasuResult<()> {
        let monetary = [
            ("revenue", self.revenue),
            ("operating_expenses", self.operating_expenses),
            ("deductible_expenses", self.deductible_expenses),
            ("gross_salary", self.gross_salary),
            ("bonuses", self.bonuses),
            ("benefits_in_kind", self.benefits_in_kind),
            ("desired_dividend", self.desired_dividend),
            ("other_household_income", self.other_household_income),
        ];
        for (field, value) in monetary {
            if value < Decimal::ZERO {
                return Err(SasuError::InvalidScenario {
                    field: field.into(),
                    reason: "Monetary amounts cannot be negative".into(),
                });
            }
        }
        if let Some(rate) = self.vat_rate {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(SasuError::InvalidScenario {
                    field: "vat_rate".into(),
                    reason: "VAT rate must be between 0 and 1".into(),
                });
            }
        }
        if self.household_parts() < Decimal::ONE {
            return Err(SasuError::InvalidScenario {
                field: "household_parts".into(),
                reason: "A household has at least one part".into(),
            });
        }
        Ok(())
    }
}
