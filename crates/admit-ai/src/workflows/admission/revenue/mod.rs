mod advantage;
mod family_care;
mod medicaid;
mod medicare;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::classification::CaseMixClassification;
use super::domain::{FacilityProfile, PayerType};
use super::rates::{RateRecord, RateTerms};

/// Default stay ceiling, aligned with the 100-day Medicare benefit period.
pub const DEFAULT_LOS_CEILING: u16 = 100;

/// Revenue line-item categories across all payer families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueComponentKind {
    PhysicalTherapy,
    OccupationalTherapy,
    SpeechTherapy,
    Nursing,
    NonTherapyAncillary,
    NonCaseMix,
    ContractPerDiem,
    DayTier,
    BaseRate,
    AcuityAddOn,
}

/// Discrete contribution to projected revenue, kept itemized so the
/// explanation layer can show the full breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueComponent {
    pub component: RevenueComponentKind,
    pub amount: Decimal,
    pub detail: String,
}

/// Projected contractual revenue for one stay. The component amounts are
/// rounded to cents and the total is their exact sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueBreakdown {
    pub payer_type: PayerType,
    pub components: Vec<RevenueComponent>,
    pub total: Decimal,
    pub per_diem: Decimal,
    pub los: u16,
}

impl RevenueBreakdown {
    fn assemble(payer_type: PayerType, components: Vec<RevenueComponent>, los: u16) -> Self {
        let components: Vec<RevenueComponent> = components
            .into_iter()
            .map(|component| RevenueComponent {
                amount: component.amount.round_dp(2),
                ..component
            })
            .collect();
        let total: Decimal = components.iter().map(|component| component.amount).sum();
        let per_diem = (total / Decimal::from(los.max(1))).round_dp(2);

        Self {
            payer_type,
            components,
            total,
            per_diem,
            los,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RevenueError {
    #[error("length of stay {los} is outside the allowed range 1..={ceiling}")]
    InvalidLos { los: u16, ceiling: u16 },
    #[error("rate table has no {component} rate for {key}")]
    MissingComponentRate { component: &'static str, key: String },
    #[error("no contract day tier covers stay day {day}")]
    MissingDayTier { day: u16 },
}

/// Project contractual revenue for one stay, dispatching to the payer
/// family's calculation strategy. Fails on an out-of-range LOS or an
/// incomplete rate table; business outcomes such as low totals are not
/// errors.
pub fn project_revenue(
    case_mix: &CaseMixClassification,
    record: &RateRecord,
    los: u16,
    facility: &FacilityProfile,
    ceiling: u16,
) -> Result<RevenueBreakdown, RevenueError> {
    if los < 1 || los > ceiling {
        return Err(RevenueError::InvalidLos { los, ceiling });
    }

    let components = match &record.terms {
        RateTerms::MedicareFfs(rates) => medicare::project(
            case_mix,
            rates,
            los,
            facility.wage_index,
            facility.vbp_multiplier,
        )?,
        RateTerms::MedicareAdvantage(contract) => advantage::project(case_mix, contract, los)?,
        RateTerms::Medicaid(rates) => medicaid::project(case_mix, rates, los),
        RateTerms::FamilyCare(matrix) => family_care::project(case_mix, matrix, los)?,
    };

    Ok(RevenueBreakdown::assemble(
        record.payer_type(),
        components,
        los,
    ))
}

pub(crate) fn component_rate<K: Ord>(
    table: &BTreeMap<K, Decimal>,
    key: &K,
    component: &'static str,
    code: &str,
) -> Result<Decimal, RevenueError> {
    table
        .get(key)
        .copied()
        .ok_or_else(|| RevenueError::MissingComponentRate {
            component,
            key: code.to_string(),
        })
}
