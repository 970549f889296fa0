use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sasu_fiscal_core::pipeline::waterfall::{run_pipeline, DividendPolicy};
use sasu_fiscal_core::pipeline::{compute_taxation, MaritalStatus, TaxScenario};
use sasu_fiscal_core::rates::{rate_table, RateRegistry};
use sasu_fiscal_core::taxation::dividend_tax::DividendElection;
use sasu_fiscal_core::{round_cents, SasuError};

fn scenario(revenue: Decimal, salary: Decimal, dividend: Decimal) -> TaxScenario {
    TaxScenario {
        revenue,
        operating_expenses: dec!(20_000),
        deductible_expenses: Decimal::ZERO,
        gross_salary: salary,
        bonuses: Decimal::ZERO,
        benefits_in_kind: Decimal::ZERO,
        desired_dividend: dividend,
        dividend_election: DividendElection::Flat,
        marital_status: MaritalStatus::Single,
        dependents: 0,
        other_household_income: Decimal::ZERO,
        startup_relief_eligible: false,
        headcount: 1,
        vat_rate: None,
    }
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_small_company_flat_single() {
    let mut input = scenario(dec!(100_000), dec!(30_000), dec!(20_000));
    input.deductible_expenses = dec!(5_000);

    let output = compute_taxation(&input, 2024).unwrap();
    let r = &output.result;

    assert_eq!(r.accounting.ebitda, dec!(75_000));
    let employer = r.salary.charges.totals.employer;
    assert_eq!(r.accounting.pre_tax_profit, dec!(75_000) - (dec!(30_000) + employer));

    // Profit below 42 500: everything at the reduced rate
    assert!(r.accounting.pre_tax_profit < dec!(42_500));
    assert_eq!(r.corporate_tax.brackets[1].base, Decimal::ZERO);
    assert_eq!(
        r.corporate_tax.total,
        round_cents(r.accounting.pre_tax_profit * dec!(0.15))
    );

    assert!(r.accounting.distributable >= dec!(20_000));
    assert_eq!(r.dividend.actual, dec!(20_000));
    assert!(!r.dividend.clamped);
    assert_eq!(r.dividend.taxation.total_levies, dec!(6_000.00));
    assert!(output.warnings.is_empty());
    assert_eq!(output.metadata.fiscal_year, 2024);
}

#[test]
fn test_all_dividend_president() {
    let input = scenario(dec!(120_000), Decimal::ZERO, dec!(50_000));
    let r = compute_taxation(&input, 2025).unwrap().result;

    assert_eq!(r.retirement.quarters_validated, 0);
    assert_eq!(r.salary.charges.totals.employer, Decimal::ZERO);
    assert_eq!(r.salary.charges.totals.employee, Decimal::ZERO);
    assert_eq!(r.salary.charges.totals.total, Decimal::ZERO);
    assert_eq!(r.income_tax.salary_branch_tax, Decimal::ZERO);
    assert_eq!(r.dividend.actual, dec!(50_000));
    assert_eq!(r.synthesis.personal_net_total, dec!(35_000.00));
    assert_eq!(r.synthesis.salary_share, Decimal::ZERO);
}

#[test]
fn test_profit_exactly_at_reduced_threshold() {
    let table = rate_table(2024).unwrap();
    let input = scenario(dec!(62_500), Decimal::ZERO, Decimal::ZERO);
    let r = run_pipeline(&input, &table, DividendPolicy::AsRequested).unwrap();
    assert_eq!(r.accounting.pre_tax_profit, dec!(42_500));
    assert_eq!(r.corporate_tax.brackets[0].base, dec!(42_500));
    assert_eq!(r.corporate_tax.total, dec!(6_375.00));
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_identical_scenario_identical_result() {
    let mut input = scenario(dec!(240_000), dec!(55_000), dec!(30_000));
    input.dividend_election = DividendElection::Progressive;
    input.marital_status = MaritalStatus::Married;
    input.dependents = 2;

    let first = compute_taxation(&input, 2024).unwrap().result;
    let second = compute_taxation(&input, 2024).unwrap().result;
    assert_eq!(first, second);
}

#[test]
fn test_fiscal_years_side_by_side() {
    let input = scenario(dec!(150_000), dec!(45_000), dec!(10_000));
    let y2024 = compute_taxation(&input, 2024).unwrap().result;
    let y2025 = compute_taxation(&input, 2025).unwrap().result;
    assert_eq!(y2024.fiscal_year, 2024);
    assert_eq!(y2025.fiscal_year, 2025);
    assert_eq!(
        y2024.contribution_schedule.installments[0].label,
        "Q1 2024"
    );
    assert_eq!(
        y2025.contribution_schedule.installments[0].label,
        "Q1 2025"
    );
}

#[test]
fn test_social_totals_monotonic_through_pipeline() {
    let table = rate_table(2024).unwrap();
    let mut previous = Decimal::ZERO;
    for step in 0..=40 {
        let salary = Decimal::from(step * 5_000);
        let input = scenario(dec!(500_000), salary, Decimal::ZERO);
        let r = run_pipeline(&input, &table, DividendPolicy::AsRequested).unwrap();
        assert!(r.salary.charges.totals.total >= previous, "salary {salary}");
        previous = r.salary.charges.totals.total;
    }
}

#[test]
fn test_custom_table_registered_for_new_year() {
    let mut registry = RateRegistry::builtin();
    let mut table = registry.get(2025).unwrap().clone();
    table.fiscal_year = 2026;
    table.dividends.social_levy_rate = dec!(0.186);
    registry.register(table);

    let table = registry.get(2026).unwrap();
    let input = scenario(dec!(120_000), Decimal::ZERO, dec!(10_000));
    let r = run_pipeline(&input, table, DividendPolicy::AsRequested).unwrap();
    assert_eq!(r.dividend.taxation.social_levies, dec!(1_860.00));
}

#[test]
fn test_errors_are_atomic() {
    assert!(matches!(
        compute_taxation(&scenario(dec!(100_000), dec!(-1), Decimal::ZERO), 2024),
        Err(SasuError::InvalidScenario { .. })
    ));
    assert!(matches!(
        compute_taxation(&scenario(dec!(100_000), dec!(1), Decimal::ZERO), 2019),
        Err(SasuError::UnknownFiscalYear(2019))
    ));
}
