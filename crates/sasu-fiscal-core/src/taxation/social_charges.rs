use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SasuError;
use crate::rates::table::{ContributionBase, ContributionRate, Payer, StartupRelief};
use crate::rates::RateTable;
use crate::types::{round_cents, safe_ratio, Money, Rate};
use crate::SasuResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Company facts that change which rates apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployerProfile {
    pub startup_relief_eligible: bool,
    pub headcount: u32,
}

/// Gross compensation split across the contribution tranches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tranches {
    pub tranche_a: Money,
    pub tranche_b: Money,
    pub tranche_c: Money,
    pub t1: Money,
    pub t2: Money,
    pub csg_crds_base: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionLine {
    pub name: String,
    pub payer: Payer,
    pub base_kind: ContributionBase,
    pub base: Money,
    /// Rate actually applied, after reduced tiers and start-up relief.
    pub rate: Rate,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialChargeTotals {
    pub employer: Money,
    pub employee: Money,
    pub total: Money,
    pub net_salary: Money,
    pub total_employer_cost: Money,
}

/// Charges as a share of gross compensation. All zero when compensation is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveRates {
    pub employer: Rate,
    pub employee: Rate,
    pub total: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialChargeBreakdown {
    pub gross_compensation: Money,
    pub tranches: Tranches,
    pub employer_lines: Vec<ContributionLine>,
    pub employee_lines: Vec<ContributionLine>,
    pub totals: SocialChargeTotals,
    pub effective_rates: EffectiveRates,
    /// Share by which relief-eligible rates were cut (0 when no relief).
    pub startup_relief_share: Rate,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Employer and employee contributions on the president's gross compensation.
pub fn compute_social_charges(
    gross_compensation: Money,
    profile: &EmployerProfile,
    table: &RateTable,
) -> SasuResult<SocialChargeBreakdown> {
    if gross_compensation < Decimal::ZERO {
        return Err(SasuError::InvalidScenario {
            field: "gross_compensation".into(),
            reason: "Gross compensation cannot be negative".into(),
        });
    }

    let tranches = split_tranches(gross_compensation, table);
    let minimum_wage_annual = table.minimum_wage_annual();
    let relief_share = if profile.startup_relief_eligible {
        startup_relief_share(
            gross_compensation,
            &table.social.startup_relief,
            table.social_security_ceiling(),
        )
    } else {
        Decimal::ZERO
    };

    let mut employer_lines = Vec::new();
    let mut employee_lines = Vec::new();

    for contribution in &table.social.contributions {
        let base = base_amount(contribution.base, gross_compensation, &tranches, table);
        let rate = applicable_rate(
            contribution,
            gross_compensation,
            minimum_wage_annual,
            profile.headcount,
            relief_share,
        );
        let line = ContributionLine {
            name: contribution.name.clone(),
            payer: contribution.payer,
            base_kind: contribution.base,
            base,
            rate,
            amount: round_cents(base * rate),
        };
        match contribution.payer {
            Payer::Employer => employer_lines.push(line),
            Payer::Employee => employee_lines.push(line),
        }
    }

    let employer: Money = employer_lines.iter().map(|l| l.amount).sum();
    let employee: Money = employee_lines.iter().map(|l| l.amount).sum();

    let totals = SocialChargeTotals {
        employer,
        employee,
        total: employer + employee,
        net_salary: gross_compensation - employee,
        total_employer_cost: gross_compensation + employer,
    };

    let effective_rates = EffectiveRates {
        employer: safe_ratio(employer, gross_compensation),
        employee: safe_ratio(employee, gross_compensation),
        total: safe_ratio(employer + employee, gross_compensation),
    };

    Ok(SocialChargeBreakdown {
        gross_compensation,
        tranches,
        employer_lines,
        employee_lines,
        totals,
        effective_rates,
        startup_relief_share: relief_share,
    })
}

/// Partition compensation into tranches A/B/C, pension T1/T2 and the CSG/CRDS base.
pub fn split_tranches(gross: Money, table: &RateTable) -> Tranches {
    let pass = table.social_security_ceiling();
    let four_pass = pass * dec!(4);
    let eight_pass = pass * dec!(8);

    let tranche_a = gross.min(pass);
    let tranche_b = (gross.min(four_pass) - pass).max(Decimal::ZERO);
    let tranche_c = (gross.min(eight_pass) - four_pass).max(Decimal::ZERO);
    let t2 = (gross.min(eight_pass) - pass).max(Decimal::ZERO);

    let abatement_cap = table.ceiling_multiple(table.social.csg_abatement_ceiling_multiple);
    let csg_crds_base = gross.min(abatement_cap) * table.social.csg_base_share
        + (gross - abatement_cap).max(Decimal::ZERO);

    Tranches {
        tranche_a,
        tranche_b,
        tranche_c,
        t1: tranche_a,
        t2,
        csg_crds_base,
    }
}

fn base_amount(kind: ContributionBase, gross: Money, tranches: &Tranches, table: &RateTable) -> Money {
    match kind {
        ContributionBase::Total => gross,
        ContributionBase::TrancheA => tranches.tranche_a,
        ContributionBase::TrancheB => tranches.tranche_b,
        ContributionBase::TrancheC => tranches.tranche_c,
        ContributionBase::TranchesAB => tranches.tranche_a + tranches.tranche_b,
        ContributionBase::T1 => tranches.t1,
        ContributionBase::T2 => tranches.t2,
        ContributionBase::T1T2AboveCeiling => {
            if gross > table.social_security_ceiling() {
                tranches.t1 + tranches.t2
            } else {
                Decimal::ZERO
            }
        }
        ContributionBase::CsgCrds => tranches.csg_crds_base,
    }
}

/// The reduced tier switches on the whole base, not only the part below the threshold.
fn applicable_rate(
    contribution: &ContributionRate,
    gross: Money,
    minimum_wage_annual: Money,
    headcount: u32,
    relief_share: Rate,
) -> Rate {
    let mut rate = contribution.rate;

    if let Some(ref tier) = contribution.headcount_tier {
        if headcount >= tier.min_headcount {
            rate = tier.rate;
        }
    }

    if let Some(ref reduced) = contribution.reduced {
        if gross <= minimum_wage_annual * reduced.minimum_wage_multiple {
            rate = reduced.rate;
        }
    }

    if contribution.startup_relief && relief_share > Decimal::ZERO {
        rate *= Decimal::ONE - relief_share;
    }

    rate
}

/// Relief share for a given compensation: the maximum up to the lower
/// threshold, linear down to zero at the upper one.
pub fn startup_relief_share(gross: Money, relief: &StartupRelief, ceiling: Money) -> Rate {
    let lower = ceiling * relief.full_relief_ceiling_multiple;
    let upper = ceiling * relief.phase_out_ceiling_multiple;

    if gross <= lower {
        relief.max_reduction
    } else if gross >= upper || upper <= lower {
        Decimal::ZERO
    } else {
        relief.max_reduction * (upper - gross) / (upper - lower)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
