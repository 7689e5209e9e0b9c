use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::classification::{NtaBand, NursingGroup, SlpGroup, TherapyGroup};
use super::domain::{FacilityId, PayerType};

/// Half-open effectivity interval `[from, to)`. A `None` end date means the
/// record is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    pub from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl DateInterval {
    pub fn new(from: NaiveDate, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && self.to.map_or(true, |end| date < end)
    }

    pub fn overlaps(&self, other: &DateInterval) -> bool {
        let self_ends_before = self.to.map_or(false, |end| end <= other.from);
        let other_ends_before = other.to.map_or(false, |end| end <= self.from);
        !(self_ends_before || other_ends_before)
    }
}

/// Variable per-diem schedule for therapy components: day-indexed step
/// factors, ending with the terminal factor that holds for the remainder
/// of the stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpdSchedule {
    steps: Vec<VpdStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpdStep {
    pub from_day: u16,
    pub factor: Decimal,
}

impl VpdSchedule {
    pub fn new(mut steps: Vec<VpdStep>) -> Self {
        steps.sort_by_key(|step| step.from_day);
        Self { steps }
    }

    /// CMS-style therapy taper: full rate for days 1-3, stepping down to
    /// 0.85 from day 19 onward.
    pub fn standard_therapy() -> Self {
        Self::new(vec![
            VpdStep { from_day: 1, factor: dec!(1.00) },
            VpdStep { from_day: 4, factor: dec!(0.98) },
            VpdStep { from_day: 7, factor: dec!(0.95) },
            VpdStep { from_day: 11, factor: dec!(0.92) },
            VpdStep { from_day: 15, factor: dec!(0.88) },
            VpdStep { from_day: 19, factor: dec!(0.85) },
        ])
    }

    pub fn factor_for(&self, day: u16) -> Decimal {
        self.steps
            .iter()
            .rev()
            .find(|step| day >= step.from_day)
            .map(|step| step.factor)
            .unwrap_or(Decimal::ONE)
    }
}

/// NTA variable per-diem policy: the component pays its full table value
/// for an initial window and a reduced fraction of it thereafter. The day
/// boundary and taper are payment-policy data, not code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NtaVpdPolicy {
    pub full_days: u16,
    pub taper: Decimal,
}

impl Default for NtaVpdPolicy {
    fn default() -> Self {
        // Published PDPM policy: the NTA add-on triples the base rate for
        // the first three days, equivalently full table value through day 3
        // and one third of it afterwards.
        Self {
            full_days: 3,
            taper: Decimal::ONE / Decimal::from(3),
        }
    }
}

impl NtaVpdPolicy {
    pub fn factor_for(&self, day: u16) -> Decimal {
        if day <= self.full_days {
            Decimal::ONE
        } else {
            self.taper
        }
    }
}

/// Medicare FFS component rate tables, keyed by case-mix group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FfsRateTable {
    pub pt: BTreeMap<TherapyGroup, Decimal>,
    pub ot: BTreeMap<TherapyGroup, Decimal>,
    pub slp: BTreeMap<SlpGroup, Decimal>,
    pub nursing: BTreeMap<NursingGroup, Decimal>,
    pub nta: BTreeMap<NtaBand, Decimal>,
    pub non_case_mix: Decimal,
    /// Labor-related share of the therapy and nursing components that the
    /// wage index applies to.
    pub labor_share: Decimal,
    pub therapy_vpd: VpdSchedule,
    pub nta_vpd: NtaVpdPolicy,
}

impl FfsRateTable {
    pub const DEFAULT_LABOR_SHARE: Decimal = dec!(0.713);
}

/// Medicare Advantage / commercial contract structures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "contract_type", rename_all = "snake_case")]
pub enum MaContract {
    /// One negotiated rate for every covered day.
    FlatPerDiem { rate: Decimal },
    /// Day-range tiers; each stay-day is paid at the rate of the tier it
    /// falls into.
    DayTiers { tiers: Vec<DayTier> },
    /// PDPM-mapped contract reusing the FFS component math with a plan
    /// multiplier and no wage adjustment.
    PdpmMapped {
        rates: FfsRateTable,
        multiplier: Decimal,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTier {
    pub from_day: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_day: Option<u16>,
    pub rate: Decimal,
}

impl DayTier {
    pub fn covers(&self, day: u16) -> bool {
        day >= self.from_day && self.to_day.map_or(true, |end| day <= end)
    }
}

/// Case-mix conditions that trigger Medicaid high-acuity add-ons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOnCondition {
    Ventilator,
    Bariatric,
    IvAntibiotics,
}

impl AddOnCondition {
    pub const fn label(self) -> &'static str {
        match self {
            AddOnCondition::Ventilator => "ventilator",
            AddOnCondition::Bariatric => "bariatric",
            AddOnCondition::IvAntibiotics => "IV antibiotics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcuityAddOn {
    pub condition: AddOnCondition,
    pub per_diem: Decimal,
}

/// Medicaid base-plus-add-ons rate structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicaidRates {
    pub base_per_diem: Decimal,
    pub add_ons: Vec<AcuityAddOn>,
}

/// Family Care MCO rate matrix keyed by nursing group and NTA band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyCareMatrix {
    pub nursing: BTreeMap<NursingGroup, Decimal>,
    pub nta: BTreeMap<NtaBand, Decimal>,
}

/// Payer-specific rate terms; the variant determines which calculation
/// strategy the reimbursement calculator dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "payer", rename_all = "snake_case")]
pub enum RateTerms {
    MedicareFfs(FfsRateTable),
    MedicareAdvantage(MaContract),
    Medicaid(MedicaidRates),
    FamilyCare(FamilyCareMatrix),
}

impl RateTerms {
    pub const fn payer_type(&self) -> PayerType {
        match self {
            RateTerms::MedicareFfs(_) => PayerType::MedicareFfs,
            RateTerms::MedicareAdvantage(_) => PayerType::MedicareAdvantage,
            RateTerms::Medicaid(_) => PayerType::Medicaid,
            RateTerms::FamilyCare(_) => PayerType::FamilyCare,
        }
    }
}

/// Versioned reimbursement contract for one facility and payer. Created by
/// the administrative collaborator; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    pub facility_id: FacilityId,
    pub effective: DateInterval,
    pub terms: RateTerms,
}

impl RateRecord {
    pub fn payer_type(&self) -> PayerType {
        self.terms.payer_type()
    }
}

/// Rate selection failures. `AmbiguousRate` signals corrupt configuration,
/// not a normal runtime condition.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RateResolutionError {
    #[error("no active {payer:?} rate for facility {facility} on {as_of}")]
    NoActiveRate {
        facility: String,
        payer: PayerType,
        as_of: NaiveDate,
    },
    #[error("{matches} overlapping {payer:?} rates for facility {facility} on {as_of}; rate configuration requires repair")]
    AmbiguousRate {
        facility: String,
        payer: PayerType,
        as_of: NaiveDate,
        matches: usize,
    },
}

/// Select the single rate record whose interval contains `as_of`.
/// Selection is containment-only; a newer record whose window has lapsed
/// is never substituted.
pub fn resolve<'a>(
    records: &'a [RateRecord],
    facility: &FacilityId,
    payer: PayerType,
    as_of: NaiveDate,
) -> Result<&'a RateRecord, RateResolutionError> {
    let mut matches = records.iter().filter(|record| {
        record.facility_id == *facility
            && record.payer_type() == payer
            && record.effective.contains(as_of)
    });

    let first = matches.next().ok_or_else(|| RateResolutionError::NoActiveRate {
        facility: facility.0.clone(),
        payer,
        as_of,
    })?;

    let extra = matches.count();
    if extra > 0 {
        return Err(RateResolutionError::AmbiguousRate {
            facility: facility.0.clone(),
            payer,
            as_of,
            matches: extra + 1,
        });
    }

    Ok(first)
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RateBookError {
    #[error("overlapping {payer:?} rate intervals for facility {facility}")]
    OverlappingIntervals { facility: String, payer: PayerType },
}

/// Validated collection of rate records. Construction rejects overlapping
/// intervals per (facility, payer) so resolution cannot be ambiguous.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateBook {
    records: Vec<RateRecord>,
}

impl RateBook {
    pub fn new(records: Vec<RateRecord>) -> Result<Self, RateBookError> {
        for (index, record) in records.iter().enumerate() {
            for other in &records[index + 1..] {
                if record.facility_id == other.facility_id
                    && record.payer_type() == other.payer_type()
                    && record.effective.overlaps(&other.effective)
                {
                    return Err(RateBookError::OverlappingIntervals {
                        facility: record.facility_id.0.clone(),
                        payer: record.payer_type(),
                    });
                }
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[RateRecord] {
        &self.records
    }

    pub fn resolve(
        &self,
        facility: &FacilityId,
        payer: PayerType,
        as_of: NaiveDate,
    ) -> Result<&RateRecord, RateResolutionError> {
        resolve(&self.records, facility, payer, as_of)
    }
}
