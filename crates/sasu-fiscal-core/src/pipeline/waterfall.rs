use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::pipeline::advisory::{collect_advisories, Advisory};
use crate::pipeline::retirement::{validate_quarters, RetirementValidation};
use crate::pipeline::scenario::TaxScenario;
use crate::pipeline::schedule::{build_schedule, ContributionSchedule};
use crate::rates::{rate_table, RateTable};
use crate::taxation::corporate_tax::{compute_corporate_tax, CorporateTaxBreakdown};
use crate::taxation::dividend_tax::{
    compute_dividend_tax, DividendElection, DividendTaxBreakdown, HouseholdContext,
};
use crate::taxation::income_tax::{compute_income_tax, IncomeTaxBreakdown};
use crate::taxation::social_charges::{compute_social_charges, SocialChargeBreakdown};
use crate::taxation::vat::{compute_vat, VatSummary};
use crate::types::{round_cents, safe_ratio, with_metadata, ComputationOutput, Money, Rate};
use crate::SasuResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingSummary {
    pub revenue: Money,
    pub operating_expenses: Money,
    pub deductible_expenses: Money,
    pub ebitda: Money,
    /// Salary, bonuses and employer charges.
    pub compensation_cost: Money,
    pub pre_tax_profit: Money,
    pub corporate_tax: Money,
    pub net_profit: Money,
    pub distributable: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalarySummary {
    pub gross_salary: Money,
    pub bonuses: Money,
    pub charges: SocialChargeBreakdown,
    pub net_salary: Money,
    /// Net salary after the flat professional-expense deduction.
    pub taxable_salary: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendOutcome {
    pub requested: Money,
    pub actual: Money,
    /// Requested amount that distributable capacity could not cover.
    pub unmet: Money,
    pub clamped: bool,
    pub taxation: DividendTaxBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdIncomeTax {
    pub household_parts: Decimal,
    /// Household tax, dividend base included under the progressive election.
    pub breakdown: IncomeTaxBreakdown,
    /// Household tax without any dividend base.
    pub salary_branch_tax: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    /// Employer plus employee social contributions.
    pub aggregate_charges: Money,
    /// Charges, corporate tax, dividend levies and salary-branch income tax.
    pub aggregate_levies: Money,
    pub personal_net_total: Money,
    pub company_residual_cash: Money,
    pub overall_levy_ratio: Rate,
    /// salary / (salary + dividend); zero when both are zero.
    pub salary_share: Rate,
}

/// Everything computed for one scenario and one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalResult {
    pub fiscal_year: i32,
    pub accounting: AccountingSummary,
    pub salary: SalarySummary,
    pub corporate_tax: CorporateTaxBreakdown,
    pub dividend: DividendOutcome,
    pub income_tax: HouseholdIncomeTax,
    pub synthesis: Synthesis,
    pub retirement: RetirementValidation,
    pub vat: VatSummary,
    pub contribution_schedule: ContributionSchedule,
    pub advisories: Vec<Advisory>,
}

/// Which dividend the waterfall distributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividendPolicy {
    /// The scenario's desired dividend, clamped to capacity.
    AsRequested,
    /// Everything distributable.
    FullDistribution,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Compute the full taxation of a scenario with the built-in table for `fiscal_year`.
pub fn compute_taxation(
    scenario: &TaxScenario,
    fiscal_year: i32,
) -> SasuResult<ComputationOutput<FiscalResult>> {
    let table = rate_table(fiscal_year)?;
    compute_taxation_with_table(scenario, &table)
}

/// Compute the full taxation of a scenario against an explicit rate table.
pub fn compute_taxation_with_table(
    scenario: &TaxScenario,
    table: &RateTable,
) -> SasuResult<ComputationOutput<FiscalResult>> {
    let start = Instant::now();

    let result = run_pipeline(scenario, table, DividendPolicy::AsRequested)?;

    let mut warnings: Vec<String> = Vec::new();
    if result.dividend.clamped {
        warnings.push(format!(
            "Requested dividend of {} exceeds distributable capacity of {}; {} distributed.",
            result.dividend.requested, result.accounting.distributable, result.dividend.actual
        ));
    }
    if result.accounting.pre_tax_profit < Decimal::ZERO {
        warnings.push(format!(
            "Compensation cost leaves a pre-tax loss of {}; no dividend can be paid.",
            result.accounting.pre_tax_profit.abs()
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "SASU fiscal waterfall: social charges, corporate tax, dividend taxation, \
         household income tax and retirement-quarter validation",
        &serde_json::json!({
            "fiscal_year": table.fiscal_year,
            "social_security_ceiling": table.social_security_ceiling().to_string(),
            "minimum_wage_hourly": table.wages.minimum_wage_hourly.to_string(),
            "dividend_election": scenario.dividend_election,
            "household_parts": scenario.household_parts().to_string(),
            "professional_deduction_rate": table.income_tax.professional_deduction_rate.to_string(),
        }),
        warnings,
        table.fiscal_year,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Waterfall
// ---------------------------------------------------------------------------

/// Run the ordered waterfall from revenue to personal net and residual cash.
pub fn run_pipeline(
    scenario: &TaxScenario,
    table: &RateTable,
    policy: DividendPolicy,
) -> SasuResult<FiscalResult> {
    scenario.validate()?;

    // 1. Social charges on salary + bonus
    let compensation = scenario.gross_compensation();
    let charges = compute_social_charges(compensation, &scenario.employer_profile(), table)?;

    // 2-3. Operating result and pre-tax profit
    let ebitda = scenario.revenue - scenario.operating_expenses - scenario.deductible_expenses;
    let compensation_cost = charges.totals.total_employer_cost;
    let pre_tax_profit = ebitda - compensation_cost;

    // 4. Corporate tax
    let corporate_tax = compute_corporate_tax(pre_tax_profit, scenario.revenue, &table.corporate_tax);
    let net_profit = pre_tax_profit - corporate_tax.total;

    // 5. Distributable capacity and the dividend actually paid
    let distributable = net_profit.max(Decimal::ZERO);
    let requested = match policy {
        DividendPolicy::AsRequested => scenario.desired_dividend,
        DividendPolicy::FullDistribution => distributable,
    };
    let actual = requested.min(distributable);

    // 6. Dividend taxation; the household position excludes the dividend here
    let net_salary = charges.totals.net_salary;
    let taxable_salary =
        round_cents(net_salary * (Decimal::ONE - table.income_tax.professional_deduction_rate));
    let household_parts = scenario.household_parts();
    let household = HouseholdContext {
        taxable_income: taxable_salary + scenario.benefits_in_kind + scenario.other_household_income,
        household_parts,
    };
    let dividend_tax = compute_dividend_tax(actual, scenario.dividend_election, &household, table)?;

    // 7. Household income tax
    let household_taxable = match scenario.dividend_election {
        DividendElection::Flat => household.taxable_income,
        DividendElection::Progressive => household.taxable_income + dividend_tax.taxable_base,
    };
    let income_tax = compute_income_tax(household_taxable, household_parts, &table.income_tax)?;
    let salary_branch_tax = match dividend_tax.household_tax_without_dividend {
        Some(without) => without,
        None => income_tax.net_tax,
    };

    // 8. Retirement quarters
    let retirement = validate_quarters(compensation, table);

    // 9. Synthesis
    let aggregate_charges = charges.totals.total;
    let aggregate_levies =
        aggregate_charges + corporate_tax.total + dividend_tax.total_levies + salary_branch_tax;
    let personal_net_total = net_salary - salary_branch_tax + dividend_tax.net_received;
    let synthesis = Synthesis {
        aggregate_charges,
        aggregate_levies,
        personal_net_total,
        company_residual_cash: net_profit - actual,
        overall_levy_ratio: safe_ratio(aggregate_levies, scenario.revenue),
        salary_share: safe_ratio(compensation, compensation + actual),
    };

    // Informational blocks
    let vat = compute_vat(
        scenario.revenue,
        scenario.operating_expenses,
        scenario.vat_rate.unwrap_or(table.vat_standard_rate),
    );
    let contribution_schedule = build_schedule(&charges.totals, table.fiscal_year)?;

    let accounting = AccountingSummary {
        revenue: scenario.revenue,
        operating_expenses: scenario.operating_expenses,
        deductible_expenses: scenario.deductible_expenses,
        ebitda,
        compensation_cost,
        pre_tax_profit,
        corporate_tax: corporate_tax.total,
        net_profit,
        distributable,
    };

    let mut result = FiscalResult {
        fiscal_year: table.fiscal_year,
        accounting,
        salary: SalarySummary {
            gross_salary: scenario.gross_salary,
            bonuses: scenario.bonuses,
            charges,
            net_salary,
            taxable_salary,
        },
        corporate_tax,
        dividend: DividendOutcome {
            requested,
            actual,
            unmet: requested - actual,
            clamped: actual < requested,
            taxation: dividend_tax,
        },
        income_tax: HouseholdIncomeTax {
            household_parts,
            breakdown: income_tax,
            salary_branch_tax,
        },
        synthesis,
        retirement,
        vat,
        contribution_schedule,
        advisories: Vec::new(),
    };
    result.advisories = collect_advisories(&result, table);

    tracing::debug!(
        fiscal_year = table.fiscal_year,
        salary = %compensation,
        dividend = %actual,
        personal_net = %result.synthesis.personal_net_total,
        levy_ratio = %result.synthesis.overall_levy_ratio,
        "fiscal waterfall computed"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SasuError;
    use crate::pipeline::scenario::MaritalStatus;
    use rust_decimal_macros::dec;

    fn base_scenario() -> TaxScenario {
        TaxScenario {
            revenue: dec!(100000),
            operating_expenses: dec!(20000),
            deductible_expenses: dec!(5000),
            gross_salary: dec!(30000),
            bonuses: Decimal::ZERO,
            benefits_in_kind: Decimal::ZERO,
            desired_dividend: dec!(20000),
            dividend_election: DividendElection::Flat,
            marital_status: MaritalStatus::Single,
            dependents: 0,
            other_household_income: Decimal::ZERO,
            startup_relief_eligible: false,
            headcount: 1,
            vat_rate: None,
        }
    }

    #[test]
    fn test_accounting_waterfall() {
        let table = rate_table(2024).unwrap();
        let result = run_pipeline(&base_scenario(), &table, DividendPolicy::AsRequested).unwrap();
        let employer = result.salary.charges.totals.employer;
        assert_eq!(result.accounting.ebitda, dec!(75000));
        assert_eq!(result.accounting.pre_tax_profit, dec!(75000) - dec!(30000) - employer);
        assert_eq!(
            result.accounting.net_profit,
            result.accounting.pre_tax_profit - result.corporate_tax.total
        );
        assert_eq!(
            result.synthesis.company_residual_cash,
            result.accounting.net_profit - result.dividend.actual
        );
    }

    #[test]
    fn test_dividend_clamped_to_capacity() {
        let table = rate_table(2024).unwrap();
        let mut scenario = base_scenario();
        scenario.desired_dividend = dec!(500000);
        let output = compute_taxation_with_table(&scenario, &table).unwrap();
        let dividend = &output.result.dividend;
        assert!(dividend.clamped);
        assert_eq!(dividend.actual, output.result.accounting.distributable);
        assert_eq!(dividend.unmet, dec!(500000) - dividend.actual);
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn test_full_distribution_policy() {
        let table = rate_table(2024).unwrap();
        let mut scenario = base_scenario();
        scenario.desired_dividend = Decimal::ZERO;
        let result = run_pipeline(&scenario, &table, DividendPolicy::FullDistribution).unwrap();
        assert_eq!(result.dividend.actual, result.accounting.distributable);
        assert!(!result.dividend.clamped);
        assert_eq!(result.synthesis.company_residual_cash, Decimal::ZERO);
    }

    #[test]
    fn test_progressive_household_tax_split() {
        let table = rate_table(2024).unwrap();
        let mut scenario = base_scenario();
        scenario.dividend_election = DividendElection::Progressive;
        let result = run_pipeline(&scenario, &table, DividendPolicy::AsRequested).unwrap();
        let dividend = &result.dividend.taxation;
        assert_eq!(
            result.income_tax.breakdown.net_tax,
            dividend.household_tax_with_dividend.unwrap()
        );
        assert_eq!(
            result.income_tax.salary_branch_tax,
            dividend.household_tax_without_dividend.unwrap()
        );
        assert_eq!(
            result.income_tax.salary_branch_tax + dividend.income_tax,
            result.income_tax.breakdown.net_tax
        );
    }

    #[test]
    fn test_personal_net_identity() {
        let table = rate_table(2025).unwrap();
        let result = run_pipeline(&base_scenario(), &table, DividendPolicy::AsRequested).unwrap();
        assert_eq!(
            result.synthesis.personal_net_total,
            result.salary.net_salary - result.income_tax.salary_branch_tax
                + result.dividend.taxation.net_received
        );
    }

    #[test]
    fn test_zero_revenue_ratio_guard() {
        let table = rate_table(2024).unwrap();
        let mut scenario = base_scenario();
        scenario.revenue = Decimal::ZERO;
        scenario.operating_expenses = Decimal::ZERO;
        scenario.deductible_expenses = Decimal::ZERO;
        scenario.gross_salary = Decimal::ZERO;
        let result = run_pipeline(&scenario, &table, DividendPolicy::AsRequested).unwrap();
        assert_eq!(result.synthesis.overall_levy_ratio, Decimal::ZERO);
        assert_eq!(result.synthesis.salary_share, Decimal::ZERO);
        assert_eq!(result.salary.charges.effective_rates.total, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_scenario_is_atomic_error() {
        let mut scenario = base_scenario();
        scenario.revenue = dec!(-1);
        assert!(matches!(
            compute_taxation(&scenario, 2024),
            Err(SasuError::InvalidScenario { .. })
        ));
        assert!(matches!(
            compute_taxation(&base_scenario(), 1990),
            Err(SasuError::UnknownFiscalYear(1990))
        ));
    }
}
