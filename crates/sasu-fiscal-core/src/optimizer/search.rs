use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SasuError;
use crate::optimizer::candidates::{
    breakpoints, candidate_salaries, candidate_scenario, resolve_bounds, NamedBreakpoint,
    SearchBounds,
};
use crate::optimizer::preferences::{Preferences, ScoreWeights};
use crate::optimizer::scoring::{score_components, ScoreComponents, Strategy};
use crate::pipeline::advisory::Advisory;
use crate::pipeline::retirement::salary_for_quarters;
use crate::pipeline::scenario::TaxScenario;
use crate::pipeline::waterfall::{run_pipeline, DividendPolicy, FiscalResult};
use crate::rates::{rate_table, RateTable};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::SasuResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One evaluated salary/dividend split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// 1-based position in the ranking; 0 for splits outside it.
    pub rank: usize,
    pub salary: Money,
    pub dividend: Money,
    pub score: Decimal,
    pub components: ScoreComponents,
    pub strategy: Strategy,
    pub personal_net: Money,
    pub aggregate_levies: Money,
    pub overall_levy_ratio: Rate,
    pub quarters_validated: u8,
    pub is_baseline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    pub bounds: SearchBounds,
    pub breakpoints: Vec<NamedBreakpoint>,
    pub candidates_evaluated: usize,
}

/// Best candidate found for one strategy bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub strategy: Strategy,
    pub candidates: usize,
    pub best: ScoredCandidate,
}

/// How the optimum compares with another split. Positive means the optimum is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub salary: Money,
    pub dividend: Money,
    pub personal_net: Money,
    pub aggregate_levies: Money,
    pub net_income_gain: Money,
    pub levy_savings: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Savings {
    pub versus_baseline: Comparison,
    pub versus_all_salary: Comparison,
    pub versus_all_dividend: Comparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub profile: String,
    pub weights: ScoreWeights,
    pub search_space: SearchSpace,
    pub optimal: ScoredCandidate,
    pub optimal_result: FiscalResult,
    pub strategy: Strategy,
    pub alternatives: Vec<ScoredCandidate>,
    pub baseline: ScoredCandidate,
    /// Whether some candidate reached the target net income, when one was set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_met: Option<bool>,
    pub strategies: Vec<StrategySummary>,
    pub savings: Savings,
    pub advisories: Vec<Advisory>,
    pub ranking: Vec<ScoredCandidate>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Search the salary/dividend split with the built-in table for `fiscal_year`.
pub fn optimize_distribution(
    baseline: &TaxScenario,
    preferences: &Preferences,
    fiscal_year: i32,
) -> SasuResult<ComputationOutput<OptimizationResult>> {
    let table = rate_table(fiscal_year)?;
    optimize_distribution_with_table(baseline, preferences, &table)
}

pub fn optimize_distribution_with_table(
    baseline: &TaxScenario,
    preferences: &Preferences,
    table: &RateTable,
) -> SasuResult<ComputationOutput<OptimizationResult>> {
    let start = Instant::now();

    let result = search(baseline, preferences, table)?;

    let mut warnings: Vec<String> = Vec::new();
    if let (Some(false), Some(target)) = (result.target_met, preferences.target_net_income) {
        warnings.push(format!(
            "No candidate reaches the target net income of {target}; all candidates were ranked."
        ));
    }
    if result.baseline.rank == 0 {
        warnings.push(format!(
            "Current salary of {} breaks the salary, retirement or target constraints; it was not ranked.",
            result.baseline.salary
        ));
    }
    if result.search_space.bounds.ebitda <= Decimal::ZERO {
        warnings.push(
            "EBITDA is not positive; the only salary searched is zero.".to_string(),
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Break-point salary search with full distribution of the residual profit, \
         ranked by a weighted multi-criteria score",
        &serde_json::json!({
            "fiscal_year": table.fiscal_year,
            "profile": preferences.profile.name(),
            "weights": result.weights,
            "scaling": preferences.scaling,
            "dividend_election": baseline.dividend_election,
            "alternatives": preferences.alternatives,
        }),
        warnings,
        table.fiscal_year,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

struct Evaluated {
    candidate: ScoredCandidate,
    result: FiscalResult,
    order: usize,
}

fn evaluate(
    scenario: &TaxScenario,
    policy: DividendPolicy,
    weights: &ScoreWeights,
    preferences: &Preferences,
    table: &RateTable,
    order: usize,
) -> SasuResult<Evaluated> {
    let result = run_pipeline(scenario, table, policy)?;
    let components = score_components(
        &result,
        table.social_security_ceiling(),
        &preferences.scaling,
    );
    let candidate = ScoredCandidate {
        rank: 0,
        salary: result.salary.charges.gross_compensation,
        dividend: result.dividend.actual,
        score: components.weighted(weights),
        strategy: Strategy::classify(result.synthesis.salary_share),
        personal_net: result.synthesis.personal_net_total,
        aggregate_levies: result.synthesis.aggregate_levies,
        overall_levy_ratio: result.synthesis.overall_levy_ratio,
        quarters_validated: result.retirement.quarters_validated,
        is_baseline: false,
        components,
    };
    Ok(Evaluated {
        candidate,
        result,
        order,
    })
}

fn compare(optimal: &ScoredCandidate, other: &ScoredCandidate) -> Comparison {
    Comparison {
        salary: other.salary,
        dividend: other.dividend,
        personal_net: other.personal_net,
        aggregate_levies: other.aggregate_levies,
        net_income_gain: optimal.personal_net - other.personal_net,
        levy_savings: other.aggregate_levies - optimal.aggregate_levies,
    }
}

/// Explicit salary and retirement limits. The EBITDA cap on the search range does not apply.
fn meets_user_constraints(
    candidate: &ScoredCandidate,
    preferences: &Preferences,
    table: &RateTable,
) -> bool {
    let quarter_floor = preferences
        .min_retirement_quarters
        .map(|q| salary_for_quarters(q, table))
        .unwrap_or(Decimal::ZERO);
    let above_floor = preferences
        .min_salary
        .map_or(true, |min| candidate.salary >= min)
        && candidate.salary >= quarter_floor;
    let below_cap = preferences
        .max_salary
        .map_or(true, |max| candidate.salary <= max);
    above_floor && below_cap
}

/// Evaluate every candidate salary, rank them and report the optimum.
pub fn search(
    baseline: &TaxScenario,
    preferences: &Preferences,
    table: &RateTable,
) -> SasuResult<OptimizationResult> {
    preferences.validate()?;
    baseline.validate()?;

    let weights = preferences.profile.weights();
    let bounds = resolve_bounds(baseline, preferences, table)?;
    let named = breakpoints(baseline, &bounds, table);
    let salaries = candidate_salaries(&named, &bounds, table);

    let mut pool: Vec<Evaluated> = salaries
        .iter()
        .enumerate()
        .map(|(order, salary)| {
            evaluate(
                &candidate_scenario(baseline, *salary),
                DividendPolicy::FullDistribution,
                &weights,
                preferences,
                table,
                order,
            )
        })
        .collect::<SasuResult<_>>()?;
    let candidates_evaluated = pool.len();

    let mut current = evaluate(
        baseline,
        DividendPolicy::AsRequested,
        &weights,
        preferences,
        table,
        pool.len(),
    )?;
    current.candidate.is_baseline = true;
    let mut baseline_candidate = current.candidate.clone();
    if meets_user_constraints(&current.candidate, preferences, table) {
        pool.push(current);
    }

    let target_met = preferences.target_net_income.map(|target| {
        let met = pool.iter().any(|e| e.candidate.personal_net >= target);
        if met {
            pool.retain(|e| e.candidate.personal_net >= target);
        }
        met
    });

    // Highest score first; ties go to the lower salary, then to generation order.
    pool.sort_by(|a, b| {
        b.candidate
            .score
            .cmp(&a.candidate.score)
            .then(a.candidate.salary.cmp(&b.candidate.salary))
            .then(a.order.cmp(&b.order))
    });
    for (i, e) in pool.iter_mut().enumerate() {
        e.candidate.rank = i + 1;
    }

    let mut ranked = pool.into_iter();
    let Some(best) = ranked.next() else {
        return Err(SasuError::InvalidRange {
            min: bounds.min_salary,
            max: bounds.max_salary,
        });
    };
    let ranking: Vec<ScoredCandidate> = std::iter::once(best.candidate.clone())
        .chain(ranked.map(|e| e.candidate))
        .collect();
    if let Some(ranked_baseline) = ranking.iter().find(|c| c.is_baseline) {
        baseline_candidate.rank = ranked_baseline.rank;
    }

    let strategies = Strategy::ALL
        .iter()
        .filter_map(|strategy| {
            let mut members = ranking.iter().filter(|c| c.strategy == *strategy);
            let best = members.next()?.clone();
            Some(StrategySummary {
                strategy: *strategy,
                candidates: 1 + members.count(),
                best,
            })
        })
        .collect();

    let all_salary = evaluate(
        &TaxScenario {
            gross_salary: bounds.max_salary,
            bonuses: Decimal::ZERO,
            desired_dividend: Decimal::ZERO,
            ..baseline.clone()
        },
        DividendPolicy::AsRequested,
        &weights,
        preferences,
        table,
        0,
    )?;
    let all_dividend = evaluate(
        &candidate_scenario(baseline, Decimal::ZERO),
        DividendPolicy::FullDistribution,
        &weights,
        preferences,
        table,
        0,
    )?;

    let optimal = best.candidate;
    let savings = Savings {
        versus_baseline: compare(&optimal, &baseline_candidate),
        versus_all_salary: compare(&optimal, &all_salary.candidate),
        versus_all_dividend: compare(&optimal, &all_dividend.candidate),
    };

    let advisories = best
        .result
        .advisories
        .iter()
        .filter(|a| {
            matches!(
                a,
                Advisory::QuarterShortfall { .. }
                    | Advisory::DiminishingReturns { .. }
                    | Advisory::AboveFourCeilings { .. }
                    | Advisory::MarginalRateDeduction { .. }
                    | Advisory::HighLevyRatio { .. }
            )
        })
        .cloned()
        .collect();

    let alternatives = ranking
        .iter()
        .skip(1)
        .take(preferences.alternatives)
        .cloned()
        .collect();

    tracing::debug!(
        fiscal_year = table.fiscal_year,
        profile = preferences.profile.name(),
        candidates = candidates_evaluated,
        optimal_salary = %optimal.salary,
        optimal_score = %optimal.score,
        "distribution search completed"
    );

    Ok(OptimizationResult {
        profile: preferences.profile.name().to_string(),
        weights,
        search_space: SearchSpace {
            bounds,
            breakpoints: named,
            candidates_evaluated,
        },
        strategy: optimal.strategy,
        optimal,
        optimal_result: best.result,
        alternatives,
        baseline: baseline_candidate,
        target_met,
        strategies,
        savings,
        advisories,
        ranking,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::preferences::PreferenceProfile;
    use rust_decimal_macros::dec;

    fn baseline() -> TaxScenario {
        serde_json::from_value(serde_json::json!({
            "revenue": "180000",
            "operating_expenses": "30000",
            "gross_salary": "40000",
            "desired_dividend": "15000",
        }))
        .unwrap()
    }

    fn run(profile: PreferenceProfile) -> OptimizationResult {
        let table = rate_table(2024).unwrap();
        search(&baseline(), &Preferences::for_profile(profile), &table).unwrap()
    }

    #[test]
    fn test_optimum_tops_the_ranking() {
        let result = run(PreferenceProfile::Balanced);
        assert_eq!(result.optimal.rank, 1);
        assert_eq!(result.ranking[0], result.optimal);
        assert!(result.ranking.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(result.alternatives.len() <= 5);
        for alt in &result.alternatives {
            assert!(alt.score <= result.optimal.score);
        }
        assert_eq!(result.strategy, result.optimal.strategy);
    }

    #[test]
    fn test_baseline_is_ranked_and_never_beats_optimum() {
        let result = run(PreferenceProfile::MaximizeNet);
        assert!(result.baseline.rank >= 1);
        assert!(result.optimal.score >= result.baseline.score);
        assert!(result.savings.versus_baseline.net_income_gain >= Decimal::ZERO);
    }

    #[test]
    fn test_maximize_net_score_is_personal_net() {
        let result = run(PreferenceProfile::MaximizeNet);
        for candidate in &result.ranking {
            assert_eq!(candidate.score, candidate.personal_net);
        }
    }

    #[test]
    fn test_candidates_distribute_everything() {
        let result = run(PreferenceProfile::MaximizeLiquidity);
        let optimal = &result.optimal_result;
        if !result.optimal.is_baseline {
            assert_eq!(optimal.dividend.actual, optimal.accounting.distributable);
            assert_eq!(optimal.salary.bonuses, Decimal::ZERO);
        }
        assert_eq!(result.optimal.salary, optimal.salary.charges.gross_compensation);
    }

    #[test]
    fn test_strategy_buckets_cover_ranking() {
        let result = run(PreferenceProfile::Balanced);
        let total: usize = result.strategies.iter().map(|s| s.candidates).sum();
        assert_eq!(total, result.ranking.len());
        assert!(result
            .strategies
            .iter()
            .any(|s| s.strategy == Strategy::AllDividend));
        for summary in &result.strategies {
            assert_eq!(summary.best.strategy, summary.strategy);
        }
    }

    #[test]
    fn test_unreachable_target_keeps_all_candidates() {
        let table = rate_table(2024).unwrap();
        let mut prefs = Preferences::for_profile(PreferenceProfile::MaximizeNet);
        prefs.target_net_income = Some(dec!(10000000));
        let output = optimize_distribution_with_table(&baseline(), &prefs, &table).unwrap();
        assert_eq!(output.result.target_met, Some(false));
        assert_eq!(
            output.result.ranking.len(),
            output.result.search_space.candidates_evaluated + 1
        );
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn test_reachable_target_filters_ranking() {
        let table = rate_table(2024).unwrap();
        let unfiltered = run(PreferenceProfile::Balanced);
        let target = unfiltered.optimal.personal_net;
        let mut prefs = Preferences::for_profile(PreferenceProfile::Balanced);
        prefs.target_net_income = Some(target);
        let result = search(&baseline(), &prefs, &table).unwrap();
        assert_eq!(result.target_met, Some(true));
        assert!(result.ranking.iter().all(|c| c.personal_net >= target));
    }

    #[test]
    fn test_baseline_above_ebitda_cap_still_ranked() {
        let table = rate_table(2024).unwrap();
        let scenario: TaxScenario = serde_json::from_value(serde_json::json!({
            "revenue": "100000",
            "operating_expenses": "0",
            "gross_salary": "90000",
        }))
        .unwrap();
        let prefs = Preferences::for_profile(PreferenceProfile::MaximizeNet);
        let output = optimize_distribution_with_table(&scenario, &prefs, &table).unwrap();
        let result = &output.result;

        assert!(!result.search_space.bounds.contains(dec!(90000)));
        assert!(result.baseline.rank >= 1);
        assert!(result.ranking.iter().any(|c| c.is_baseline));
        assert!(result.optimal.score >= result.baseline.score);
        assert!(result.savings.versus_baseline.net_income_gain >= Decimal::ZERO);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_baseline_outside_explicit_cap_not_ranked() {
        let table = rate_table(2024).unwrap();
        let mut prefs = Preferences::for_profile(PreferenceProfile::MaximizeNet);
        prefs.max_salary = Some(dec!(30000));
        let output = optimize_distribution_with_table(&baseline(), &prefs, &table).unwrap();
        assert_eq!(output.result.baseline.rank, 0);
        assert!(output.result.ranking.iter().all(|c| !c.is_baseline));
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn test_salary_floor_above_cap_rejected() {
        let table = rate_table(2024).unwrap();
        let mut prefs = Preferences::default();
        prefs.min_salary = Some(dec!(200000));
        assert!(matches!(
            search(&baseline(), &prefs, &table),
            Err(SasuError::InvalidRange { .. })
        ));
    }
}
