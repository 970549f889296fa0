use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use sasu_fiscal_core::pipeline::{compute_taxation_with_table, MaritalStatus, TaxScenario};
use sasu_fiscal_core::taxation::dividend_tax::DividendElection;

use super::TableSource;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ElectionArg {
    Flat,
    Progressive,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MaritalArg {
    Single,
    Married,
    CivilPartnership,
    Divorced,
    Widowed,
}

/// Scenario given on the command line, used when no input file or stdin is provided
#[derive(Args)]
pub struct ScenarioArgs {
    /// Path to JSON or YAML scenario file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual revenue excluding VAT
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Operating expenses
    #[arg(long, alias = "opex")]
    pub operating_expenses: Option<Decimal>,

    /// Other deductible expenses
    #[arg(long)]
    pub deductible_expenses: Option<Decimal>,

    /// President's gross salary
    #[arg(long)]
    pub salary: Option<Decimal>,

    /// Bonuses on top of the salary
    #[arg(long)]
    pub bonuses: Option<Decimal>,

    /// Benefits in kind
    #[arg(long)]
    pub benefits_in_kind: Option<Decimal>,

    /// Requested gross dividend
    #[arg(long)]
    pub dividend: Option<Decimal>,

    /// Dividend taxation election
    #[arg(long, default_value = "flat")]
    pub election: ElectionArg,

    /// Marital status of the household
    #[arg(long, default_value = "single")]
    pub marital_status: MaritalArg,

    /// Number of dependent children
    #[arg(long, default_value_t = 0)]
    pub dependents: u32,

    /// Other taxable income of the household
    #[arg(long)]
    pub other_income: Option<Decimal>,

    /// Company qualifies for start-up relief on social contributions
    #[arg(long)]
    pub startup_relief: bool,

    /// Company headcount
    #[arg(long, default_value_t = 1)]
    pub headcount: u32,

    /// VAT rate for the VAT summary (defaults to the table's standard rate)
    #[arg(long)]
    pub vat_rate: Option<Decimal>,
}

/// Arguments for the fiscal waterfall
#[derive(Args)]
pub struct ComputeArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

impl ScenarioArgs {
    /// Read the scenario from --input, then stdin, then the individual flags.
    pub fn resolve(&self) -> Result<TaxScenario, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_document(path);
        }
        if let Some(data) = input::stdin::read_stdin()? {
            return Ok(serde_json::from_value(data)?);
        }

        Ok(TaxScenario {
            revenue: self
                .revenue
                .ok_or("--revenue is required (or provide --input)")?,
            operating_expenses: self
                .operating_expenses
                .ok_or("--operating-expenses is required (or provide --input)")?,
            deductible_expenses: self.deductible_expenses.unwrap_or_default(),
            gross_salary: self
                .salary
                .ok_or("--salary is required (or provide --input)")?,
            bonuses: self.bonuses.unwrap_or_default(),
            benefits_in_kind: self.benefits_in_kind.unwrap_or_default(),
            desired_dividend: self.dividend.unwrap_or_default(),
            dividend_election: match self.election {
                ElectionArg::Flat => DividendElection::Flat,
                ElectionArg::Progressive => DividendElection::Progressive,
            },
            marital_status: match self.marital_status {
                MaritalArg::Single => MaritalStatus::Single,
                MaritalArg::Married => MaritalStatus::Married,
                MaritalArg::CivilPartnership => MaritalStatus::CivilPartnership,
                MaritalArg::Divorced => MaritalStatus::Divorced,
                MaritalArg::Widowed => MaritalStatus::Widowed,
            },
            dependents: self.dependents,
            other_household_income: self.other_income.unwrap_or_default(),
            startup_relief_eligible: self.startup_relief,
            headcount: self.headcount,
            vat_rate: self.vat_rate,
        })
    }
}

pub fn run_compute(
    args: ComputeArgs,
    tables: &TableSource,
) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = args.scenario.resolve()?;
    let table = tables.load()?;
    let result = compute_taxation_with_table(&scenario, &table)?;
    Ok(serde_json::to_value(result)?)
}
