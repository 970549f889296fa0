use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SasuError;
use crate::rates::table::*;
use crate::types::{Money, Rate};
use crate::SasuResult;

/// Year-keyed collection of rate tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateRegistry {
    tables: BTreeMap<i32, RateTable>,
}

impl RateRegistry {
    pub fn empty() -> Self {
        RateRegistry::default()
    }

    /// Registry pre-loaded with the published 2024 and 2025 tables.
    pub fn builtin() -> Self {
        let mut registry = RateRegistry::empty();
        registry.register(table_2024());
        registry.register(table_2025());
        registry
    }

    /// Add or replace the table for its fiscal year.
    pub fn register(&mut self, table: RateTable) {
        self.tables.insert(table.fiscal_year, table);
    }

    pub fn get(&self, fiscal_year: i32) -> SasuResult<&RateTable> {
        self.tables
            .get(&fiscal_year)
            .ok_or(SasuError::UnknownFiscalYear(fiscal_year))
    }

    pub fn years(&self) -> Vec<i32> {
        self.tables.keys().copied().collect()
    }
}

/// Look up one of the built-in tables.
pub fn rate_table(fiscal_year: i32) -> SasuResult<RateTable> {
    RateRegistry::builtin().get(fiscal_year).cloned()
}

// ---------------------------------------------------------------------------
// Published tables
// ---------------------------------------------------------------------------

fn table_2024() -> RateTable {
    RateTable {
        fiscal_year: 2024,
        wages: WageThresholds {
            social_security_ceiling: dec!(46368),
            minimum_wage_hourly: dec!(11.65),
            annual_hours: dec!(1820),
            hours_per_quarter: dec!(150),
        },
        income_tax: IncomeTaxSchedule {
            brackets: brackets(&[
                (dec!(11294), dec!(0.11)),
                (dec!(28797), dec!(0.30)),
                (dec!(82341), dec!(0.41)),
                (dec!(177106), dec!(0.45)),
            ]),
            discount: DiscountRule {
                gross_tax_ceiling: dec!(1929),
                fixed_allowance: dec!(873),
                factor: dec!(0.4525),
            },
            professional_deduction_rate: dec!(0.10),
        },
        corporate_tax: corporate_schedule(),
        social: social_table(dec!(2.02), dec!(2.5), dec!(3.5)),
        dividends: dividend_rates(),
        vat_standard_rate: dec!(0.20),
    }
}

fn table_2025() -> RateTable {
    RateTable {
        fiscal_year: 2025,
        wages: WageThresholds {
            social_security_ceiling: dec!(47100),
            minimum_wage_hourly: dec!(11.88),
            annual_hours: dec!(1820),
            hours_per_quarter: dec!(150),
        },
        income_tax: IncomeTaxSchedule {
            brackets: brackets(&[
                (dec!(11497), dec!(0.11)),
                (dec!(29315), dec!(0.30)),
                (dec!(83823), dec!(0.41)),
                (dec!(180294), dec!(0.45)),
            ]),
            discount: DiscountRule {
                gross_tax_ceiling: dec!(1964),
                fixed_allowance: dec!(889),
                factor: dec!(0.4525),
            },
            professional_deduction_rate: dec!(0.10),
        },
        corporate_tax: corporate_schedule(),
        social: social_table(dec!(2.11), dec!(2.25), dec!(3.3)),
        dividends: dividend_rates(),
        vat_standard_rate: dec!(0.20),
    }
}

/// Build the five-tier schedule from the lower bound and rate of each taxed tier.
/// The first tier, from zero, is always at 0%.
fn brackets(taxed_tiers: &[(Money, Rate)]) -> Vec<TaxBracket> {
    let mut out = Vec::with_capacity(taxed_tiers.len() + 1);
    let mut lower = Decimal::ZERO;
    let mut rate = Decimal::ZERO;
    for (next_lower, next_rate) in taxed_tiers {
        out.push(TaxBracket {
            lower,
            upper: Some(*next_lower),
            rate,
        });
        lower = *next_lower;
        rate = *next_rate;
    }
    out.push(TaxBracket {
        lower,
        upper: None,
        rate,
    });
    out
}

fn corporate_schedule() -> CorporateTaxSchedule {
    CorporateTaxSchedule {
        reduced_rate: dec!(0.15),
        reduced_rate_threshold: dec!(42500),
        standard_rate: dec!(0.25),
        reduced_rate_revenue_cap: dec!(10_000_000),
    }
}

fn dividend_rates() -> DividendRates {
    DividendRates {
        flat_income_tax_rate: dec!(0.128),
        social_levy_rate: dec!(0.172),
        progressive_allowance_rate: dec!(0.40),
    }
}

/// Contribution lines for a president assimilated to an employee (cadre).
///
/// Rates are given in percent here and stored as decimals. There is no
/// unemployment insurance and no AGS line: the president is outside the
/// unemployment scheme.
fn social_table(
    uncapped_old_age_employer_pct: Decimal,
    health_reduced_smic_multiple: Decimal,
    family_reduced_smic_multiple: Decimal,
) -> SocialContributionTable {
    use ContributionBase::*;
    use Payer::*;

    let pct = |p: Decimal| p / dec!(100);
    let line = |name: &str, payer: Payer, base: ContributionBase, p: Decimal| {
        ContributionRate::new(name, payer, base, pct(p))
    };

    let contributions = vec![
        // Employer
        line("Assurance maladie", Employer, Total, dec!(13.00))
            .reduced_below(pct(dec!(7.00)), health_reduced_smic_multiple)
            .with_relief(),
        line("Contribution solidarité autonomie", Employer, Total, dec!(0.30)),
        line("Vieillesse plafonnée", Employer, TrancheA, dec!(8.55)).with_relief(),
        line(
            "Vieillesse déplafonnée",
            Employer,
            Total,
            uncapped_old_age_employer_pct,
        )
        .with_relief(),
        line("Allocations familiales", Employer, Total, dec!(5.25))
            .reduced_below(pct(dec!(3.45)), family_reduced_smic_multiple)
            .with_relief(),
        line("Accidents du travail", Employer, Total, dec!(0.70)),
        line("FNAL", Employer, TrancheA, dec!(0.10)),
        line("Contribution au dialogue social", Employer, Total, dec!(0.016)),
        line("Formation professionnelle", Employer, Total, dec!(0.55))
            .from_headcount(11, pct(dec!(1.00))),
        line("Taxe d'apprentissage", Employer, Total, dec!(0.68)),
        line("Retraite complémentaire T1", Employer, T1, dec!(4.72)),
        line("Retraite complémentaire T2", Employer, T2, dec!(12.95)),
        line("CEG T1", Employer, T1, dec!(1.29)),
        line("CEG T2", Employer, T2, dec!(1.62)),
        line("CET", Employer, T1T2AboveCeiling, dec!(0.21)),
        line("APEC", Employer, TranchesAB, dec!(0.036)),
        line("Prévoyance cadres", Employer, TrancheA, dec!(1.50)),
        // Employee
        line("Vieillesse plafonnée", Employee, TrancheA, dec!(6.90)).with_relief(),
        line("Vieillesse déplafonnée", Employee, Total, dec!(0.40)).with_relief(),
        line("Retraite complémentaire T1", Employee, T1, dec!(3.15)),
        line("Retraite complémentaire T2", Employee, T2, dec!(8.64)),
        line("CEG T1", Employee, T1, dec!(0.86)),
        line("CEG T2", Employee, T2, dec!(1.08)),
        line("CET", Employee, T1T2AboveCeiling, dec!(0.14)),
        line("APEC", Employee, TranchesAB, dec!(0.024)),
        line("CSG déductible", Employee, CsgCrds, dec!(6.80)),
        line("CSG non déductible", Employee, CsgCrds, dec!(2.40)),
        line("CRDS", Employee, CsgCrds, dec!(0.50)),
    ];

    SocialContributionTable {
        contributions,
        csg_base_share: dec!(0.9825),
        csg_abatement_ceiling_multiple: dec!(4),
        startup_relief: StartupRelief {
            max_reduction: dec!(0.50),
            full_relief_ceiling_multiple: dec!(0.75),
            phase_out_ceiling_multiple: dec!(1),
        },
    }
}
