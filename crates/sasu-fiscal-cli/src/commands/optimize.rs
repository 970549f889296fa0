use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use sasu_fiscal_core::optimizer::{
    optimize_distribution_with_table, PreferenceProfile, Preferences,
};

use super::compute::ScenarioArgs;
use super::TableSource;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProfileArg {
    MaximizeNet,
    MinimizeTaxes,
    Balanced,
    MaximizeRetirement,
    MaximizeLiquidity,
}

/// Arguments for the salary/dividend search
#[derive(Args)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Path to JSON or YAML preferences file (flags below override it)
    #[arg(long)]
    pub preferences: Option<String>,

    /// Preference profile
    #[arg(long)]
    pub profile: Option<ProfileArg>,

    /// Minimum retirement quarters to validate (0-4)
    #[arg(long)]
    pub min_quarters: Option<u8>,

    /// Lowest salary to consider
    #[arg(long)]
    pub min_salary: Option<Decimal>,

    /// Highest salary to consider
    #[arg(long)]
    pub max_salary: Option<Decimal>,

    /// Drop splits netting less than this amount
    #[arg(long)]
    pub target_net: Option<Decimal>,

    /// Number of alternatives to report
    #[arg(long)]
    pub alternatives: Option<usize>,
}

impl OptimizeArgs {
    fn resolve_preferences(&self) -> Result<Preferences, Box<dyn std::error::Error>> {
        let mut preferences: Preferences = match self.preferences {
            Some(ref path) => input::file::read_document(path)?,
            None => Preferences::default(),
        };

        if let Some(profile) = self.profile {
            preferences.profile = match profile {
                ProfileArg::MaximizeNet => PreferenceProfile::MaximizeNet,
                ProfileArg::MinimizeTaxes => PreferenceProfile::MinimizeTaxes,
                ProfileArg::Balanced => PreferenceProfile::Balanced,
                ProfileArg::MaximizeRetirement => PreferenceProfile::MaximizeRetirement,
                ProfileArg::MaximizeLiquidity => PreferenceProfile::MaximizeLiquidity,
            };
        }
        if self.min_quarters.is_some() {
            preferences.min_retirement_quarters = self.min_quarters;
        }
        if self.min_salary.is_some() {
            preferences.min_salary = self.min_salary;
        }
        if self.max_salary.is_some() {
            preferences.max_salary = self.max_salary;
        }
        if self.target_net.is_some() {
            preferences.target_net_income = self.target_net;
        }
        if let Some(n) = self.alternatives {
            preferences.alternatives = n;
        }
        Ok(preferences)
    }
}

pub fn run_optimize(
    args: OptimizeArgs,
    tables: &TableSource,
) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = args.scenario.resolve()?;
    let preferences = args.resolve_preferences()?;
    let table = tables.load()?;
    let result = optimize_distribution_with_table(&scenario, &preferences, &table)?;
    Ok(serde_json::to_value(result)?)
}
