use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::optimizer::preferences::{ScoreScaling, ScoreWeights};
use crate::pipeline::waterfall::FiscalResult;
use crate::types::{safe_ratio, Money, Rate};

/// Unweighted value of each criterion for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub net_income: Decimal,
    pub tax_efficiency: Decimal,
    pub retirement: Decimal,
    pub liquidity: Decimal,
    pub stability: Decimal,
}

impl ScoreComponents {
    pub fn weighted(&self, weights: &ScoreWeights) -> Decimal {
        weights.net_income * self.net_income
            + weights.tax_efficiency * self.tax_efficiency
            + weights.retirement * self.retirement
            + weights.liquidity * self.liquidity
            + weights.stability * self.stability
    }
}

pub fn score_components(
    result: &FiscalResult,
    ceiling: Money,
    scaling: &ScoreScaling,
) -> ScoreComponents {
    let salary = result.salary.charges.gross_compensation;
    let synthesis = &result.synthesis;
    ScoreComponents {
        net_income: synthesis.personal_net_total,
        tax_efficiency: (Decimal::ONE - synthesis.overall_levy_ratio) * scaling.tax_efficiency,
        retirement: safe_ratio(salary, ceiling).min(Decimal::ONE) * scaling.retirement,
        liquidity: result.dividend.actual,
        stability: synthesis.salary_share * scaling.stability,
    }
}

/// Salary/dividend mix, from `r = salary / (salary + dividend)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    AllDividend,
    MostlyDividend,
    DividendLeaning,
    Balanced,
    SalaryLeaning,
    MostlySalary,
    AllSalary,
}

impl Strategy {
    pub const ALL: [Strategy; 7] = [
        Strategy::AllDividend,
        Strategy::MostlyDividend,
        Strategy::DividendLeaning,
        Strategy::Balanced,
        Strategy::SalaryLeaning,
        Strategy::MostlySalary,
        Strategy::AllSalary,
    ];

    /// Nothing paid at all counts as all-dividend (r = 0).
    pub fn classify(salary_share: Rate) -> Strategy {
        if salary_share <= Decimal::ZERO {
            Strategy::AllDividend
        } else if salary_share < dec!(0.25) {
            Strategy::MostlyDividend
        } else if salary_share < dec!(0.45) {
            Strategy::DividendLeaning
        } else if salary_share <= dec!(0.55) {
            Strategy::Balanced
        } else if salary_share <= dec!(0.75) {
            Strategy::SalaryLeaning
        } else if salary_share < Decimal::ONE {
            Strategy::MostlySalary
        } else {
            Strategy::AllSalary
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::AllDividend => "all-dividend",
            Strategy::MostlyDividend => "mostly-dividend",
            Strategy::DividendLeaning => "dividend-leaning",
            Strategy::Balanced => "balanced",
            Strategy::SalaryLeaning => "salary-leaning",
            Strategy::MostlySalary => "mostly-salary",
            Strategy::AllSalary => "all-salary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::scenario::TaxScenario;
    use crate::pipeline::waterfall::{run_pipeline, DividendPolicy};
    use crate::rates::rate_table;

    #[test]
    fn test_classification_boundaries() {
        let cases = [
            (dec!(0), Strategy::AllDividend),
            (dec!(0.01), Strategy::MostlyDividend),
            (dec!(0.25), Strategy::DividendLeaning),
            (dec!(0.45), Strategy::Balanced),
            (dec!(0.55), Strategy::Balanced),
            (dec!(0.56), Strategy::SalaryLeaning),
            (dec!(0.75), Strategy::SalaryLeaning),
            (dec!(0.99), Strategy::MostlySalary),
            (dec!(1), Strategy::AllSalary),
        ];
        for (share, expected) in cases {
            assert_eq!(Strategy::classify(share), expected, "share {share}");
        }
    }

    #[test]
    fn test_components_follow_result() {
        let table = rate_table(2024).unwrap();
        let scenario: TaxScenario = serde_json::from_value(serde_json::json!({
            "revenue": "200000",
            "operating_expenses": "40000",
            "gross_salary": "92736",
        }))
        .unwrap();
        let result = run_pipeline(&scenario, &table, DividendPolicy::FullDistribution).unwrap();
        let components =
            score_components(&result, table.social_security_ceiling(), &ScoreScaling::default());

        assert_eq!(components.net_income, result.synthesis.personal_net_total);
        assert_eq!(components.liquidity, result.dividend.actual);
        // Two ceilings of salary: the retirement criterion is capped
        assert_eq!(components.retirement, dec!(50000));
        assert_eq!(
            components.stability,
            result.synthesis.salary_share * dec!(30000)
        );
    }

    #[test]
    fn test_weighted_sum() {
        let components = ScoreComponents {
            net_income: dec!(40000),
            tax_efficiency: dec!(60000),
            retirement: dec!(25000),
            liquidity: dec!(10000),
            stability: dec!(15000),
        };
        let weights = ScoreWeights {
            net_income: dec!(0.4),
            tax_efficiency: dec!(0.2),
            retirement: dec!(0.2),
            liquidity: dec!(0.1),
            stability: dec!(0.1),
        };
        assert_eq!(components.weighted(&weights), dec!(35500));
    }
}
