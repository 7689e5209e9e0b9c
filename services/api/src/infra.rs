use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use admit_ai::workflows::admission::{
    AcuityBand, AdmissionEvaluationService, AdmissionId, AlertError, AlertPublisher,
    ConfigStore, ConfigStoreError, CostModelRecord, DateInterval, EvaluationRecord,
    EvaluationRepository, FacilityId, FacilityProfile, FfsRateTable, IntakeAlert, MedicaidRates,
    NtaBand, NtaVpdPolicy, NursingGroup, PayerType, RateRecord, RateTerms, RepositoryError,
    SlpGroup, TherapyGroup, VpdSchedule,
};
use admit_ai::workflows::admission::rates::{AcuityAddOn, AddOnCondition, DayTier, FamilyCareMatrix, MaContract};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type DemoService =
    AdmissionEvaluationService<InMemoryConfigStore, InMemoryEvaluationRepository, InMemoryAlertPublisher>;

pub(crate) fn build_demo_service() -> Arc<DemoService> {
    Arc::new(AdmissionEvaluationService::new(
        Arc::new(InMemoryConfigStore::seeded()),
        Arc::new(InMemoryEvaluationRepository::default()),
        Arc::new(InMemoryAlertPublisher::default()),
    ))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryConfigStore {
    facilities: Vec<FacilityProfile>,
    rates: Vec<RateRecord>,
    cost_models: Vec<CostModelRecord>,
}

impl InMemoryConfigStore {
    /// Seeded with one demo facility and one contract per payer family so
    /// the serve and demo commands work out of the box.
    pub(crate) fn seeded() -> Self {
        Self {
            facilities: vec![demo_facility()],
            rates: seed_rate_records(),
            cost_models: seed_cost_models(),
        }
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn facility(&self, id: &FacilityId) -> Result<Option<FacilityProfile>, ConfigStoreError> {
        Ok(self
            .facilities
            .iter()
            .find(|profile| profile.facility_id == *id)
            .cloned())
    }

    fn rate_records(
        &self,
        facility: &FacilityId,
        payer: PayerType,
    ) -> Result<Vec<RateRecord>, ConfigStoreError> {
        Ok(self
            .rates
            .iter()
            .filter(|record| record.facility_id == *facility && record.payer_type() == payer)
            .cloned()
            .collect())
    }

    fn cost_model(
        &self,
        facility: &FacilityId,
        band: AcuityBand,
    ) -> Result<Option<CostModelRecord>, ConfigStoreError> {
        Ok(self
            .cost_models
            .iter()
            .find(|model| model.facility_id == *facility && model.acuity_band == band)
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationRepository {
    records: Arc<Mutex<HashMap<AdmissionId, EvaluationRecord>>>,
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.admission_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.admission_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: EvaluationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.admission_id) {
            guard.insert(record.admission_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &AdmissionId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertPublisher {
    events: Arc<Mutex<Vec<IntakeAlert>>>,
}

impl AlertPublisher for InMemoryAlertPublisher {
    fn publish(&self, alert: IntakeAlert) -> Result<(), AlertError> {
        let mut guard = self.events.lock().expect("alert mutex poisoned");
        guard.push(alert);
        Ok(())
    }
}

pub(crate) fn demo_facility() -> FacilityProfile {
    FacilityProfile {
        facility_id: FacilityId("maple-grove".to_string()),
        name: "Maple Grove Post-Acute".to_string(),
        wage_index: dec!(1.0234),
        vbp_multiplier: dec!(0.98),
    }
}

fn effective_2025() -> DateInterval {
    DateInterval::new(
        NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
        None,
    )
}

fn therapy_rates(values: [Decimal; 5]) -> BTreeMap<TherapyGroup, Decimal> {
    [
        (TherapyGroup::TA, values[0]),
        (TherapyGroup::TB, values[1]),
        (TherapyGroup::TC, values[2]),
        (TherapyGroup::TD, values[3]),
        (TherapyGroup::TE, values[4]),
    ]
    .into_iter()
    .collect()
}

/// Published-style PDPM component per-diems for the demo facility.
pub(crate) fn standard_ffs_table() -> FfsRateTable {
    FfsRateTable {
        pt: therapy_rates([dec!(70.52), dec!(64.89), dec!(60.10), dec!(55.70), dec!(50.23)]),
        ot: therapy_rates([dec!(69.14), dec!(64.38), dec!(59.45), dec!(55.02), dec!(49.81)]),
        slp: [(SlpGroup::SL1, dec!(26.43)), (SlpGroup::SL2, dec!(31.80))]
            .into_iter()
            .collect(),
        nursing: [
            (NursingGroup::ES1, dec!(180.00)),
            (NursingGroup::ES2, dec!(165.25)),
            (NursingGroup::HBS1, dec!(105.81)),
            (NursingGroup::HBS2, dec!(98.40)),
            (NursingGroup::LBS1, dec!(92.75)),
            (NursingGroup::LBS2, dec!(87.60)),
        ]
        .into_iter()
        .collect(),
        nta: [
            (NtaBand::Low, dec!(45.12)),
            (NtaBand::Moderate, dec!(65.30)),
            (NtaBand::High, dec!(86.72)),
        ]
        .into_iter()
        .collect(),
        non_case_mix: dec!(98.13),
        labor_share: FfsRateTable::DEFAULT_LABOR_SHARE,
        therapy_vpd: VpdSchedule::standard_therapy(),
        nta_vpd: NtaVpdPolicy::default(),
    }
}

pub(crate) fn seed_rate_records() -> Vec<RateRecord> {
    let facility = demo_facility().facility_id;
    vec![
        RateRecord {
            facility_id: facility.clone(),
            effective: effective_2025(),
            terms: RateTerms::MedicareFfs(standard_ffs_table()),
        },
        RateRecord {
            facility_id: facility.clone(),
            effective: effective_2025(),
            terms: RateTerms::MedicareAdvantage(MaContract::DayTiers {
                tiers: vec![
                    DayTier {
                        from_day: 1,
                        to_day: Some(30),
                        rate: dec!(450.00),
                    },
                    DayTier {
                        from_day: 31,
                        to_day: Some(60),
                        rate: dec!(400.00),
                    },
                    DayTier {
                        from_day: 61,
                        to_day: None,
                        rate: dec!(375.00),
                    },
                ],
            }),
        },
        RateRecord {
            facility_id: facility.clone(),
            effective: effective_2025(),
            terms: RateTerms::Medicaid(MedicaidRates {
                base_per_diem: dec!(234.00),
                add_ons: vec![
                    AcuityAddOn {
                        condition: AddOnCondition::Ventilator,
                        per_diem: dec!(125.00),
                    },
                    AcuityAddOn {
                        condition: AddOnCondition::Bariatric,
                        per_diem: dec!(45.00),
                    },
                    AcuityAddOn {
                        condition: AddOnCondition::IvAntibiotics,
                        per_diem: dec!(60.00),
                    },
                ],
            }),
        },
        RateRecord {
            facility_id: facility,
            effective: effective_2025(),
            terms: RateTerms::FamilyCare(FamilyCareMatrix {
                nursing: [
                    (NursingGroup::ES1, dec!(340.00)),
                    (NursingGroup::ES2, dec!(315.00)),
                    (NursingGroup::HBS1, dec!(290.00)),
                    (NursingGroup::HBS2, dec!(275.00)),
                    (NursingGroup::LBS1, dec!(255.00)),
                    (NursingGroup::LBS2, dec!(240.00)),
                ]
                .into_iter()
                .collect(),
                nta: [
                    (NtaBand::Low, dec!(70.00)),
                    (NtaBand::Moderate, dec!(85.00)),
                    (NtaBand::High, dec!(100.00)),
                ]
                .into_iter()
                .collect(),
            }),
        },
    ]
}

pub(crate) fn seed_cost_models() -> Vec<CostModelRecord> {
    let facility = demo_facility().facility_id;
    [
        (AcuityBand::Low, dec!(3.2), dec!(32.00), dec!(40.00), dec!(25.00)),
        (AcuityBand::Medium, dec!(4.0), dec!(35.00), dec!(50.00), dec!(30.00)),
        (AcuityBand::High, dec!(5.5), dec!(38.00), dec!(60.00), dec!(30.00)),
        (AcuityBand::Complex, dec!(7.2), dec!(41.00), dec!(80.00), dec!(45.00)),
    ]
    .into_iter()
    .map(|(band, hours, rate, supplies, pharmacy)| CostModelRecord {
        facility_id: facility.clone(),
        acuity_band: band,
        nursing_hours_per_day: hours,
        hourly_rate: rate,
        supply_per_diem: supplies,
        pharmacy_per_diem: pharmacy,
        transport_per_stay: dec!(150.00),
        overhead_pct: dec!(0.22),
    })
    .collect()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
