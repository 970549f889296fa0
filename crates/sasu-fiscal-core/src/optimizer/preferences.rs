use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SasuError;
use crate::pipeline::retirement::MAX_QUARTERS;
use crate::types::Money;
use crate::SasuResult;

/// Weight of each scoring criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub net_income: Decimal,
    pub tax_efficiency: Decimal,
    pub retirement: Decimal,
    pub liquidity: Decimal,
    pub stability: Decimal,
}

impl ScoreWeights {
    pub fn sum(&self) -> Decimal {
        self.net_income + self.tax_efficiency + self.retirement + self.liquidity + self.stability
    }
}

/// Scaling constants that put ratio criteria on a currency-like scale.
///
/// Only relative magnitudes matter, and only within one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreScaling {
    pub tax_efficiency: Decimal,
    pub retirement: Decimal,
    pub stability: Decimal,
}

impl Default for ScoreScaling {
    fn default() -> Self {
        ScoreScaling {
            tax_efficiency: dec!(100000),
            retirement: dec!(50000),
            stability: dec!(30000),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceProfile {
    MaximizeNet,
    MinimizeTaxes,
    #[default]
    Balanced,
    MaximizeRetirement,
    MaximizeLiquidity,
    Custom(ScoreWeights),
}

impl PreferenceProfile {
    pub fn weights(&self) -> ScoreWeights {
        let w = |net_income, tax_efficiency, retirement, liquidity, stability| ScoreWeights {
            net_income,
            tax_efficiency,
            retirement,
            liquidity,
            stability,
        };
        match self {
            PreferenceProfile::MaximizeNet => w(dec!(1), dec!(0), dec!(0), dec!(0), dec!(0)),
            PreferenceProfile::MinimizeTaxes => w(dec!(0.2), dec!(0.8), dec!(0), dec!(0), dec!(0)),
            PreferenceProfile::Balanced => w(dec!(0.4), dec!(0.2), dec!(0.2), dec!(0.1), dec!(0.1)),
            PreferenceProfile::MaximizeRetirement => {
                w(dec!(0.3), dec!(0.1), dec!(0.4), dec!(0), dec!(0.2))
            }
            PreferenceProfile::MaximizeLiquidity => {
                w(dec!(0.3), dec!(0.1), dec!(0), dec!(0.6), dec!(0))
            }
            PreferenceProfile::Custom(weights) => weights.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PreferenceProfile::MaximizeNet => "maximize_net",
            PreferenceProfile::MinimizeTaxes => "minimize_taxes",
            PreferenceProfile::Balanced => "balanced",
            PreferenceProfile::MaximizeRetirement => "maximize_retirement",
            PreferenceProfile::MaximizeLiquidity => "maximize_liquidity",
            PreferenceProfile::Custom(_) => "custom",
        }
    }
}

/// What the president wants from the salary/dividend split, plus search constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub profile: PreferenceProfile,
    /// Minimum retirement quarters the salary must validate (0-4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_retirement_quarters: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_salary: Option<Money>,
    /// Candidates netting less than this are left out of the ranking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_net_income: Option<Money>,
    /// Number of runner-up candidates to report.
    #[serde(default = "default_alternatives")]
    pub alternatives: usize,
    #[serde(default)]
    pub scaling: ScoreScaling,
}

fn default_alternatives() -> usize {
    5
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences::for_profile(PreferenceProfile::default())
    }
}

impl Preferences {
    pub fn for_profile(profile: PreferenceProfile) -> Self {
        Preferences {
            profile,
            min_retirement_quarters: None,
            min_salary: None,
            max_salary: None,
            target_net_income: None,
            alternatives: default_alternatives(),
            scaling: ScoreScaling::default(),
        }
    }

    pub fn validate(&self) -> SasuResult<()> {
        let weights = self.profile.weights();
        if weights.sum() <= Decimal::ZERO {
            return Err(SasuError::InvalidPreferences(format!(
                "Score weights must sum to a positive value, got {}",
                weights.sum()
            )));
        }
        if let Some(quarters) = self.min_retirement_quarters {
            if quarters > MAX_QUARTERS {
                return Err(SasuError::InvalidPreferences(format!(
                    "At most {MAX_QUARTERS} retirement quarters can be validated per year, got {quarters}"
                )));
            }
        }
        for (name, bound) in [
            ("min_salary", self.min_salary),
            ("max_salary", self.max_salary),
            ("target_net_income", self.target_net_income),
        ] {
            if matches!(bound, Some(v) if v < Decimal::ZERO) {
                return Err(SasuError::InvalidPreferences(format!(
                    "{name} cannot be negative"
                )));
            }
        }
        Ok(())
    }
}
