use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::pipeline::waterfall::FiscalResult;
use crate::rates::RateTable;
use crate::types::{Money, Rate};

/// Marginal rate from which deductible retirement savings are worth flagging.
const DEDUCTION_MARGINAL_RATE: Rate = dec!(0.30);

/// Overall levy ratio considered high pressure.
const HIGH_LEVY_RATIO: Rate = dec!(0.45);

/// Situational flags attached to a result. Consumers render them; no text is generated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    BelowMinimumWage {
        salary: Money,
        minimum_wage_annual: Money,
    },
    QuarterShortfall {
        quarters_validated: u8,
        shortfall: Money,
    },
    /// Salary above 3 ceilings: pension rights accrue more slowly than charges.
    DiminishingReturns { salary: Money, threshold: Money },
    /// Salary above 4 ceilings: only uncapped contributions remain.
    AboveFourCeilings { salary: Money, threshold: Money },
    /// Dividends paid while salary stays below one ceiling.
    SalaryBelowCeiling { salary: Money, ceiling: Money },
    MarginalRateDeduction { marginal_rate: Rate },
    HighLevyRatio { ratio: Rate },
    UndistributedProfit { retained: Money },
}

pub fn collect_advisories(result: &FiscalResult, table: &RateTable) -> Vec<Advisory> {
    let mut flags = Vec::new();
    let salary = result.salary.charges.gross_compensation;
    let ceiling = table.social_security_ceiling();
    let minimum_wage_annual = table.minimum_wage_annual();

    if salary < minimum_wage_annual {
        flags.push(Advisory::BelowMinimumWage {
            salary,
            minimum_wage_annual,
        });
    }

    if let Some(shortfall) = result.retirement.shortfall {
        flags.push(Advisory::QuarterShortfall {
            quarters_validated: result.retirement.quarters_validated,
            shortfall,
        });
    }

    let three_ceilings = ceiling * dec!(3);
    let four_ceilings = ceiling * dec!(4);
    if salary > three_ceilings {
        flags.push(Advisory::DiminishingReturns {
            salary,
            threshold: three_ceilings,
        });
    }
    if salary > four_ceilings {
        flags.push(Advisory::AboveFourCeilings {
            salary,
            threshold: four_ceilings,
        });
    }

    if result.dividend.actual > Decimal::ZERO && salary < ceiling {
        flags.push(Advisory::SalaryBelowCeiling { salary, ceiling });
    }

    let marginal_rate = result.income_tax.breakdown.marginal_rate;
    if marginal_rate >= DEDUCTION_MARGINAL_RATE {
        flags.push(Advisory::MarginalRateDeduction { marginal_rate });
    }

    if result.synthesis.overall_levy_ratio > HIGH_LEVY_RATIO {
        flags.push(Advisory::HighLevyRatio {
            ratio: result.synthesis.overall_levy_ratio,
        });
    }

    let retained = result.accounting.distributable - result.dividend.actual;
    if result.accounting.distributable > result.dividend.actual * dec!(2) && retained > Decimal::ZERO {
        flags.push(Advisory::UndistributedProfit { retained });
    }

    flags
}
