//! CSV rate-schedule importer.
//!
//! Administrative teams maintain the per-diem style contracts (Medicaid,
//! Medicare Advantage, Family Care) in spreadsheet exports; this module
//! turns such an export into a validated [`RateBook`]. Medicare FFS
//! component tables come from CMS rate files and are loaded separately.
//!
//! Expected columns: `facility_id, payer_type, effective_from,
//! effective_to, entry, amount`, one entry per row. Rows sharing the same
//! facility, payer, and effectivity window assemble into one rate record.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::classification::{NtaBand, NursingGroup};
use super::domain::{FacilityId, PayerType};
use super::rates::{
    AcuityAddOn, AddOnCondition, DateInterval, DayTier, FamilyCareMatrix, MaContract,
    MedicaidRates, RateBook, RateBookError, RateRecord, RateTerms,
};

#[derive(Debug, thiserror::Error)]
pub enum RateImportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown payer type '{value}'")]
    UnknownPayer { row: usize, value: String },
    #[error("row {row}: payer '{value}' is not supported by the schedule import")]
    UnsupportedPayer { row: usize, value: String },
    #[error("row {row}: '{value}' is not a YYYY-MM-DD date")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: '{value}' is not a currency amount")]
    InvalidAmount { row: usize, value: String },
    #[error("row {row}: unknown entry '{value}'")]
    UnknownEntry { row: usize, value: String },
    #[error("{payer} schedule for facility {facility} is missing its '{entry}' entry")]
    MissingEntry {
        facility: String,
        payer: &'static str,
        entry: &'static str,
    },
    #[error("{payer} schedule for facility {facility} mixes flat and tiered entries")]
    ConflictingEntries {
        facility: String,
        payer: &'static str,
    },
    #[error(transparent)]
    Book(#[from] RateBookError),
}

/// Parse a rate-schedule CSV export into a validated rate book.
pub fn import_rate_schedules<R: Read>(reader: R) -> Result<RateBook, RateImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut contracts: BTreeMap<ContractKey, Vec<ScheduleEntry>> = BTreeMap::new();

    for (index, record) in csv_reader.deserialize::<ScheduleRow>().enumerate() {
        let row = index + 2; // one-based, after the header row
        let raw = record?;

        let payer = parse_payer(&raw.payer_type, row)?;
        let from = parse_date(&raw.effective_from, row)?;
        let to = raw
            .effective_to
            .as_deref()
            .map(|value| parse_date(value, row))
            .transpose()?;
        let amount = raw
            .amount
            .parse::<Decimal>()
            .map_err(|_| RateImportError::InvalidAmount {
                row,
                value: raw.amount.clone(),
            })?;
        let entry = parse_entry(&raw.entry, row, amount)?;

        let key = ContractKey {
            facility: FacilityId(raw.facility_id),
            payer,
            from,
            to,
        };
        contracts.entry(key).or_default().push(entry);
    }

    let mut records = Vec::new();
    for (key, entries) in contracts {
        let terms = assemble_terms(&key, entries)?;
        records.push(RateRecord {
            facility_id: key.facility,
            effective: DateInterval::new(key.from, key.to),
            terms,
        });
    }

    Ok(RateBook::new(records)?)
}

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    facility_id: String,
    payer_type: String,
    effective_from: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    effective_to: Option<String>,
    entry: String,
    amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ContractKey {
    facility: FacilityId,
    payer: PayerType,
    from: NaiveDate,
    to: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
enum ScheduleEntry {
    Base(Decimal),
    AddOn(AddOnCondition, Decimal),
    Flat(Decimal),
    Tier(DayTier),
    Nursing(NursingGroup, Decimal),
    Nta(NtaBand, Decimal),
}

fn parse_payer(value: &str, row: usize) -> Result<PayerType, RateImportError> {
    match value.to_ascii_lowercase().as_str() {
        "medicaid" => Ok(PayerType::Medicaid),
        "medicare_advantage" | "ma_commercial" => Ok(PayerType::MedicareAdvantage),
        "family_care" => Ok(PayerType::FamilyCare),
        "medicare_ffs" => Err(RateImportError::UnsupportedPayer {
            row,
            value: value.to_string(),
        }),
        _ => Err(RateImportError::UnknownPayer {
            row,
            value: value.to_string(),
        }),
    }
}

fn parse_date(value: &str, row: usize) -> Result<NaiveDate, RateImportError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| RateImportError::InvalidDate {
        row,
        value: value.to_string(),
    })
}

fn parse_entry(value: &str, row: usize, amount: Decimal) -> Result<ScheduleEntry, RateImportError> {
    let unknown = || RateImportError::UnknownEntry {
        row,
        value: value.to_string(),
    };

    if value.eq_ignore_ascii_case("base") {
        return Ok(ScheduleEntry::Base(amount));
    }
    if value.eq_ignore_ascii_case("flat") {
        return Ok(ScheduleEntry::Flat(amount));
    }

    if let Some(condition) = value.strip_prefix("addon:") {
        let condition = match condition.to_ascii_lowercase().as_str() {
            "ventilator" => AddOnCondition::Ventilator,
            "bariatric" => AddOnCondition::Bariatric,
            "iv_antibiotics" => AddOnCondition::IvAntibiotics,
            _ => return Err(unknown()),
        };
        return Ok(ScheduleEntry::AddOn(condition, amount));
    }

    if let Some(range) = value.strip_prefix("tier:") {
        if let Some(from) = range.strip_suffix('+') {
            let from_day = from.parse::<u16>().map_err(|_| unknown())?;
            return Ok(ScheduleEntry::Tier(DayTier {
                from_day,
                to_day: None,
                rate: amount,
            }));
        }
        let (from, to) = range.split_once('-').ok_or_else(unknown)?;
        let from_day = from.parse::<u16>().map_err(|_| unknown())?;
        let to_day = to.parse::<u16>().map_err(|_| unknown())?;
        return Ok(ScheduleEntry::Tier(DayTier {
            from_day,
            to_day: Some(to_day),
            rate: amount,
        }));
    }

    if let Some(code) = value.strip_prefix("nursing:") {
        let group = match code.to_ascii_uppercase().as_str() {
            "ES1" => NursingGroup::ES1,
            "ES2" => NursingGroup::ES2,
            "HBS1" => NursingGroup::HBS1,
            "HBS2" => NursingGroup::HBS2,
            "LBS1" => NursingGroup::LBS1,
            "LBS2" => NursingGroup::LBS2,
            _ => return Err(unknown()),
        };
        return Ok(ScheduleEntry::Nursing(group, amount));
    }

    if let Some(label) = value.strip_prefix("nta:") {
        let band = match label {
            "0-5" => NtaBand::Low,
            "6-11" => NtaBand::Moderate,
            "12+" => NtaBand::High,
            _ => return Err(unknown()),
        };
        return Ok(ScheduleEntry::Nta(band, amount));
    }

    Err(unknown())
}

fn assemble_terms(
    key: &ContractKey,
    entries: Vec<ScheduleEntry>,
) -> Result<RateTerms, RateImportError> {
    match key.payer {
        PayerType::Medicaid => {
            let mut base = None;
            let mut add_ons = Vec::new();
            for entry in entries {
                match entry {
                    ScheduleEntry::Base(amount) => base = Some(amount),
                    ScheduleEntry::AddOn(condition, per_diem) => {
                        add_ons.push(AcuityAddOn { condition, per_diem })
                    }
                    _ => {}
                }
            }
            let base_per_diem = base.ok_or_else(|| RateImportError::MissingEntry {
                facility: key.facility.0.clone(),
                payer: "medicaid",
                entry: "base",
            })?;
            Ok(RateTerms::Medicaid(MedicaidRates {
                base_per_diem,
                add_ons,
            }))
        }
        PayerType::MedicareAdvantage => {
            let mut flat = None;
            let mut tiers = Vec::new();
            for entry in entries {
                match entry {
                    ScheduleEntry::Flat(rate) => flat = Some(rate),
                    ScheduleEntry::Tier(tier) => tiers.push(tier),
                    _ => {}
                }
            }
            match (flat, tiers.is_empty()) {
                (Some(_), false) => Err(RateImportError::ConflictingEntries {
                    facility: key.facility.0.clone(),
                    payer: "medicare_advantage",
                }),
                (Some(rate), true) => {
                    Ok(RateTerms::MedicareAdvantage(MaContract::FlatPerDiem { rate }))
                }
                (None, false) => {
                    tiers.sort_by_key(|tier| tier.from_day);
                    Ok(RateTerms::MedicareAdvantage(MaContract::DayTiers { tiers }))
                }
                (None, true) => Err(RateImportError::MissingEntry {
                    facility: key.facility.0.clone(),
                    payer: "medicare_advantage",
                    entry: "flat or tier",
                }),
            }
        }
        PayerType::FamilyCare => {
            let mut nursing = BTreeMap::new();
            let mut nta = BTreeMap::new();
            for entry in entries {
                match entry {
                    ScheduleEntry::Nursing(group, rate) => {
                        nursing.insert(group, rate);
                    }
                    ScheduleEntry::Nta(band, rate) => {
                        nta.insert(band, rate);
                    }
                    _ => {}
                }
            }
            if nursing.is_empty() {
                return Err(RateImportError::MissingEntry {
                    facility: key.facility.0.clone(),
                    payer: "family_care",
                    entry: "nursing",
                });
            }
            if nta.is_empty() {
                return Err(RateImportError::MissingEntry {
                    facility: key.facility.0.clone(),
                    payer: "family_care",
                    entry: "nta",
                });
            }
            Ok(RateTerms::FamilyCare(FamilyCareMatrix { nursing, nta }))
        }
        PayerType::MedicareFfs => unreachable!("rejected during row parsing"),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
