use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::SasuError;
use crate::optimizer::preferences::Preferences;
use crate::pipeline::retirement::{salary_for_quarters, MAX_QUARTERS};
use crate::pipeline::scenario::TaxScenario;
use crate::rates::table::ContributionBase;
use crate::rates::RateTable;
use crate::types::{round_cents, Money};
use crate::SasuResult;

/// Share of EBITDA the salary search may consume at most.
const MAX_SALARY_SHARE_OF_EBITDA: Decimal = dec!(0.8);

/// Ceiling multiples probed around one PASS.
const FAN_OUT_LOW: Decimal = dec!(0.80);
const FAN_OUT_HIGH: Decimal = dec!(1.20);
const FAN_OUT_STEP: Decimal = dec!(0.05);

/// A salary level where some rate, bracket or threshold changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedBreakpoint {
    pub label: String,
    pub salary: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchBounds {
    pub min_salary: Money,
    pub max_salary: Money,
    pub ebitda: Money,
}

impl SearchBounds {
    pub fn contains(&self, salary: Money) -> bool {
        salary >= self.min_salary && salary <= self.max_salary
    }
}

pub fn resolve_bounds(
    baseline: &TaxScenario,
    preferences: &Preferences,
    table: &RateTable,
) -> SasuResult<SearchBounds> {
    let ebitda = baseline.revenue - baseline.operating_expenses - baseline.deductible_expenses;
    let cap = round_cents(ebitda.max(Decimal::ZERO) * MAX_SALARY_SHARE_OF_EBITDA);

    let quarter_floor = preferences
        .min_retirement_quarters
        .map(|q| salary_for_quarters(q, table))
        .unwrap_or(Decimal::ZERO);
    let min_salary = preferences
        .min_salary
        .unwrap_or(Decimal::ZERO)
        .max(quarter_floor);
    let max_salary = preferences.max_salary.map_or(cap, |m| m.min(cap));

    if min_salary > max_salary {
        return Err(SasuError::InvalidRange {
            min: min_salary,
            max: max_salary,
        });
    }

    Ok(SearchBounds {
        min_salary,
        max_salary,
        ebitda,
    })
}

/// Every salary level where the marginal cost of salary changes, inside the bounds.
pub fn breakpoints(
    baseline: &TaxScenario,
    bounds: &SearchBounds,
    table: &RateTable,
) -> Vec<NamedBreakpoint> {
    let ceiling = table.social_security_ceiling();
    let smic = table.minimum_wage_annual();

    let mut points: Vec<(String, Money)> = vec![
        ("zero".into(), Decimal::ZERO),
        (
            "four_quarters".into(),
            salary_for_quarters(MAX_QUARTERS, table),
        ),
        ("minimum_wage".into(), smic),
        ("half_ceiling".into(), ceiling * dec!(0.5)),
        ("ceiling".into(), ceiling),
        ("two_ceilings".into(), ceiling * dec!(2)),
        ("three_ceilings".into(), ceiling * dec!(3)),
        (
            "corporate_tax_threshold".into(),
            table.corporate_tax.reduced_rate_threshold,
        ),
    ];

    for bracket in &table.income_tax.brackets {
        if bracket.lower > Decimal::ZERO {
            points.push((
                format!("income_tax_{}pct", (bracket.rate * dec!(100)).normalize()),
                bracket.lower,
            ));
        }
    }

    for line in &table.social.contributions {
        if let Some(tier) = &line.reduced {
            if line.base == ContributionBase::Total {
                points.push((
                    format!("reduced_rate_switch ({})", line.name),
                    round_cents(smic * tier.minimum_wage_multiple),
                ));
            }
        }
    }

    if baseline.startup_relief_eligible {
        let relief = &table.social.startup_relief;
        points.push((
            "startup_relief_full".into(),
            ceiling * relief.full_relief_ceiling_multiple,
        ));
        points.push((
            "startup_relief_end".into(),
            ceiling * relief.phase_out_ceiling_multiple,
        ));
    }

    points.push(("min_bound".into(), bounds.min_salary));
    points.push(("max_bound".into(), bounds.max_salary));

    let mut kept: Vec<NamedBreakpoint> = points
        .into_iter()
        .filter(|(_, salary)| bounds.contains(*salary))
        .map(|(label, salary)| NamedBreakpoint { label, salary })
        .collect();
    kept.sort_by(|a, b| a.salary.cmp(&b.salary));
    kept
}

/// Break-points, midpoints between consecutive ones, and a fan-out around one PASS,
/// sorted ascending without duplicates.
pub fn candidate_salaries(
    breakpoints: &[NamedBreakpoint],
    bounds: &SearchBounds,
    table: &RateTable,
) -> Vec<Money> {
    let mut salaries: BTreeSet<Money> = breakpoints.iter().map(|b| b.salary).collect();

    let sorted: Vec<Money> = salaries.iter().copied().collect();
    for pair in sorted.windows(2) {
        salaries.insert(round_cents((pair[0] + pair[1]) / dec!(2)));
    }

    let ceiling = table.social_security_ceiling();
    let mut multiple = FAN_OUT_LOW;
    while multiple <= FAN_OUT_HIGH {
        let salary = round_cents(ceiling * multiple);
        if bounds.contains(salary) {
            salaries.insert(salary);
        }
        multiple += FAN_OUT_STEP;
    }

    salaries.into_iter().collect()
}

/// The baseline with a given salary, no bonus and the dividend left to full distribution.
pub fn candidate_scenario(baseline: &TaxScenario, salary: Money) -> TaxScenario {
    TaxScenario {
        gross_salary: salary,
        bonuses: Decimal::ZERO,
        desired_dividend: Decimal::ZERO,
        ..baseline.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::rate_table;

    fn baseline() -> TaxScenario {
        serde_json::from_value(serde_json::json!({
            "revenue": "300000",
            "operating_expenses": "50000",
            "gross_salary": "40000",
            "bonuses": "5000",
            "desired_dividend": "10000",
        }))
        .unwrap()
    }

    #[test]
    fn test_bounds_default_to_eighty_percent_of_ebitda() {
        let table = rate_table(2024).unwrap();
        let bounds = resolve_bounds(&baseline(), &Preferences::default(), &table).unwrap();
        assert_eq!(bounds.min_salary, Decimal::ZERO);
        assert_eq!(bounds.max_salary, dec!(200000.00));
        assert_eq!(bounds.ebitda, dec!(250000));
    }

    #[test]
    fn test_quarter_constraint_raises_minimum() {
        let table = rate_table(2024).unwrap();
        let mut prefs = Preferences::default();
        prefs.min_retirement_quarters = Some(4);
        prefs.min_salary = Some(dec!(1000));
        let bounds = resolve_bounds(&baseline(), &prefs, &table).unwrap();
        assert_eq!(bounds.min_salary, dec!(6990.00));
    }

    #[test]
    fn test_empty_range_rejected() {
        let table = rate_table(2024).unwrap();
        let mut prefs = Preferences::default();
        prefs.min_salary = Some(dec!(90000));
        prefs.max_salary = Some(dec!(60000));
        match resolve_bounds(&baseline(), &prefs, &table) {
            Err(SasuError::InvalidRange { min, max }) => {
                assert_eq!(min, dec!(90000));
                assert_eq!(max, dec!(60000));
            }
            other => panic!("Expected InvalidRange, got {other:?}"),
        }
    }

    #[test]
    fn test_loss_making_company_caps_salary_at_zero() {
        let table = rate_table(2024).unwrap();
        let mut scenario = baseline();
        scenario.operating_expenses = dec!(400000);
        let bounds = resolve_bounds(&scenario, &Preferences::default(), &table).unwrap();
        assert_eq!(bounds.max_salary, Decimal::ZERO);
        let points = breakpoints(&scenario, &bounds, &table);
        assert!(points.iter().all(|p| p.salary == Decimal::ZERO));
        assert_eq!(
            candidate_salaries(&points, &bounds, &table),
            vec![Decimal::ZERO]
        );
    }

    #[test]
    fn test_candidates_sorted_unique_and_in_range() {
        let table = rate_table(2024).unwrap();
        let bounds = resolve_bounds(&baseline(), &Preferences::default(), &table).unwrap();
        let points = breakpoints(&baseline(), &bounds, &table);
        let salaries = candidate_salaries(&points, &bounds, &table);

        assert!(salaries.windows(2).all(|w| w[0] < w[1]));
        assert!(salaries.iter().all(|s| bounds.contains(*s)));
        assert!(salaries.contains(&Decimal::ZERO));
        assert!(salaries.contains(&dec!(46368)));
        assert!(salaries.contains(&dec!(42500)));
        assert!(salaries.contains(&dec!(200000.00)));
        // Fan-out 0.80 x PASS
        assert!(salaries.contains(&dec!(37094.40)));
        // Health reduced-rate switch at 2.5 SMIC
        assert!(points.iter().any(|p| p.salary == dec!(53007.50)));
    }

    #[test]
    fn test_relief_thresholds_only_when_eligible() {
        let table = rate_table(2024).unwrap();
        let mut scenario = baseline();
        let bounds = resolve_bounds(&scenario, &Preferences::default(), &table).unwrap();
        let has_relief = |points: &[NamedBreakpoint]| {
            points.iter().any(|p| p.label.starts_with("startup_relief"))
        };
        assert!(!has_relief(&breakpoints(&scenario, &bounds, &table)));
        scenario.startup_relief_eligible = true;
        assert!(has_relief(&breakpoints(&scenario, &bounds, &table)));
    }

    #[test]
    fn test_candidate_scenario_clears_bonus_and_dividend() {
        let candidate = candidate_scenario(&baseline(), dec!(25000));
        assert_eq!(candidate.gross_salary, dec!(25000));
        assert_eq!(candidate.bonuses, Decimal::ZERO);
        assert_eq!(candidate.desired_dividend, Decimal::ZERO);
        assert_eq!(candidate.revenue, dec!(300000));
    }
}
