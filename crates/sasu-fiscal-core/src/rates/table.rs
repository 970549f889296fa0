use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Wage reference figures the contribution and retirement rules are tied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageThresholds {
    /// Annual social-security ceiling (PASS).
    pub social_security_ceiling: Money,
    /// Hourly statutory minimum wage (SMIC).
    pub minimum_wage_hourly: Money,
    /// Hours per year used to annualise the SMIC (35h x 52 weeks).
    pub annual_hours: Decimal,
    /// SMIC hours needed to validate one retirement quarter.
    pub hours_per_quarter: Decimal,
}

// ---------------------------------------------------------------------------
// Personal income tax
// ---------------------------------------------------------------------------

/// One tier of a progressive schedule. `upper` is inclusive; `None` is open-ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower: Money,
    pub upper: Option<Money>,
    pub rate: Rate,
}

/// Low-income discount (décote) for single-part households.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRule {
    /// Gross tax below which the discount applies.
    pub gross_tax_ceiling: Money,
    pub fixed_allowance: Money,
    pub factor: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeTaxSchedule {
    pub brackets: Vec<TaxBracket>,
    pub discount: DiscountRule,
    /// Flat deduction for professional expenses applied to net salary.
    pub professional_deduction_rate: Rate,
}

// ---------------------------------------------------------------------------
// Corporate tax
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorporateTaxSchedule {
    pub reduced_rate: Rate,
    /// Profit up to (and including) this amount is taxed at the reduced rate.
    pub reduced_rate_threshold: Money,
    pub standard_rate: Rate,
    /// Companies at or above this revenue lose the reduced rate.
    pub reduced_rate_revenue_cap: Money,
}

// ---------------------------------------------------------------------------
// Social contributions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Payer {
    Employer,
    Employee,
}

/// Slice of gross compensation a contribution is assessed on.
///
/// Tranche A is [0, 1 PASS], B is (1, 4 PASS], C is (4, 8 PASS]. The
/// supplementary pension uses T1 = [0, 1 PASS] and T2 = (1, 8 PASS].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContributionBase {
    Total,
    TrancheA,
    TrancheB,
    TrancheC,
    TranchesAB,
    T1,
    T2,
    /// T1 + T2, only once compensation exceeds one ceiling.
    T1T2AboveCeiling,
    /// 98.25% of compensation up to 4 PASS, 100% beyond.
    CsgCrds,
}

/// Reduced rate used while compensation stays at or below `minimum_wage_multiple` annual SMIC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedTier {
    pub rate: Rate,
    pub minimum_wage_multiple: Decimal,
}

/// Rate applied once the company reaches `min_headcount` employees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadcountTier {
    pub min_headcount: u32,
    pub rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionRate {
    pub name: String,
    pub payer: Payer,
    pub base: ContributionBase,
    pub rate: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced: Option<ReducedTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headcount_tier: Option<HeadcountTier>,
    /// Whether start-up relief reduces this line.
    #[serde(default)]
    pub startup_relief: bool,
}

impl ContributionRate {
    pub(crate) fn new(name: &str, payer: Payer, base: ContributionBase, rate: Rate) -> Self {
        ContributionRate {
            name: name.to_string(),
            payer,
            base,
            rate,
            reduced: None,
            headcount_tier: None,
            startup_relief: false,
        }
    }

    pub(crate) fn reduced_below(mut self, rate: Rate, minimum_wage_multiple: Decimal) -> Self {
        self.reduced = Some(ReducedTier {
            rate,
            minimum_wage_multiple,
        });
        self
    }

    pub(crate) fn from_headcount(mut self, min_headcount: u32, rate: Rate) -> Self {
        self.headcount_tier = Some(HeadcountTier {
            min_headcount,
            rate,
        });
        self
    }

    pub(crate) fn with_relief(mut self) -> Self {
        self.startup_relief = true;
        self
    }
}

/// Start-up relief: full reduction at or below the lower ceiling multiple,
/// linear phase-out to nothing at the upper one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupRelief {
    pub max_reduction: Rate,
    pub full_relief_ceiling_multiple: Decimal,
    pub phase_out_ceiling_multiple: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialContributionTable {
    pub contributions: Vec<ContributionRate>,
    /// Share of compensation kept in the CSG/CRDS base below the abatement cap.
    pub csg_base_share: Rate,
    /// Ceiling multiple beyond which the CSG/CRDS abatement stops.
    pub csg_abatement_ceiling_multiple: Decimal,
    pub startup_relief: StartupRelief,
}

// ---------------------------------------------------------------------------
// Dividends
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendRates {
    /// Income-tax component of the flat withholding.
    pub flat_income_tax_rate: Rate,
    /// Social levies, due under both elections.
    pub social_levy_rate: Rate,
    /// Allowance deducted before the progressive schedule.
    pub progressive_allowance_rate: Rate,
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Every rate and threshold needed for one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub fiscal_year: i32,
    pub wages: WageThresholds,
    pub income_tax: IncomeTaxSchedule,
    pub corporate_tax: CorporateTaxSchedule,
    pub social: SocialContributionTable,
    pub dividends: DividendRates,
    pub vat_standard_rate: Rate,
}

impl RateTable {
    pub fn social_security_ceiling(&self) -> Money {
        self.wages.social_security_ceiling
    }

    pub fn ceiling_multiple(&self, multiple: Decimal) -> Money {
        self.wages.social_security_ceiling * multiple
    }

    pub fn minimum_wage_annual(&self) -> Money {
        self.wages.minimum_wage_hourly * self.wages.annual_hours
    }

    /// Gross salary needed to validate one retirement quarter.
    pub fn quarter_threshold(&self) -> Money {
        self.wages.minimum_wage_hourly * self.wages.hours_per_quarter
    }
}
