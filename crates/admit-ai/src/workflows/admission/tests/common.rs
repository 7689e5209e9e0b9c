use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::workflows::admission::classification::{
    AcuityBand, NtaBand, NursingGroup, SlpGroup, TherapyGroup,
};
use crate::workflows::admission::costs::{CostEstimator, CostModelRecord};
use crate::workflows::admission::domain::{
    AdmissionId, AuthorizationStatus, ClinicalFeatures, EvaluationRequest, EvaluationSubmission,
    FacilityId, FacilityProfile, FunctionalStatus, PayerType, SpecialServices, TherapyNeeds,
};
use crate::workflows::admission::projection::FinancialProjection;
use crate::workflows::admission::rates::{
    AcuityAddOn, AddOnCondition, DateInterval, DayTier, FamilyCareMatrix, FfsRateTable,
    MaContract, MedicaidRates, NtaVpdPolicy, RateRecord, RateTerms, VpdSchedule,
};
use crate::workflows::admission::repository::{
    AlertError, AlertPublisher, ConfigStore, ConfigStoreError, EvaluationRecord,
    EvaluationRepository, IntakeAlert, RepositoryError,
};
use crate::workflows::admission::revenue::project_revenue;
use crate::workflows::admission::service::AdmissionEvaluationService;

pub(super) fn facility_id() -> FacilityId {
    FacilityId("maple-grove".to_string())
}

pub(super) fn facility() -> FacilityProfile {
    FacilityProfile {
        facility_id: facility_id(),
        name: "Maple Grove Post-Acute".to_string(),
        wage_index: dec!(1.02),
        vbp_multiplier: dec!(1.00),
    }
}

pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

fn group_rates(values: [(TherapyGroup, Decimal); 5]) -> BTreeMap<TherapyGroup, Decimal> {
    values.into_iter().collect()
}

pub(super) fn standard_ffs_table() -> FfsRateTable {
    FfsRateTable {
        pt: group_rates([
            (TherapyGroup::TA, dec!(70.52)),
            (TherapyGroup::TB, dec!(64.89)),
            (TherapyGroup::TC, dec!(60.10)),
            (TherapyGroup::TD, dec!(55.70)),
            (TherapyGroup::TE, dec!(50.23)),
        ]),
        ot: group_rates([
            (TherapyGroup::TA, dec!(69.14)),
            (TherapyGroup::TB, dec!(64.38)),
            (TherapyGroup::TC, dec!(59.45)),
            (TherapyGroup::TD, dec!(55.02)),
            (TherapyGroup::TE, dec!(49.81)),
        ]),
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

pub(super) fn open_interval() -> DateInterval {
    DateInterval::new(NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid"), None)
}

pub(super) fn ffs_record() -> RateRecord {
    RateRecord {
        facility_id: facility_id(),
        effective: open_interval(),
        terms: RateTerms::MedicareFfs(standard_ffs_table()),
    }
}

pub(super) fn medicaid_record() -> RateRecord {
    RateRecord {
        facility_id: facility_id(),
        effective: open_interval(),
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
    }
}

pub(super) fn ma_tiered_record() -> RateRecord {
    RateRecord {
        facility_id: facility_id(),
        effective: open_interval(),
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
    }
}

pub(super) fn family_care_record() -> RateRecord {
    RateRecord {
        facility_id: facility_id(),
        effective: open_interval(),
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
    }
}

pub(super) fn cost_model(band: AcuityBand) -> CostModelRecord {
    let (hours, rate, supplies, pharmacy) = match band {
        AcuityBand::Low => (dec!(3.2), dec!(32.00), dec!(40.00), dec!(25.00)),
        AcuityBand::Medium => (dec!(4.0), dec!(35.00), dec!(50.00), dec!(30.00)),
        AcuityBand::High => (dec!(5.5), dec!(38.00), dec!(60.00), dec!(30.00)),
        AcuityBand::Complex => (dec!(7.2), dec!(41.00), dec!(80.00), dec!(45.00)),
    };
    CostModelRecord {
        facility_id: facility_id(),
        acuity_band: band,
        nursing_hours_per_day: hours,
        hourly_rate: rate,
        supply_per_diem: supplies,
        pharmacy_per_diem: pharmacy,
        transport_per_stay: dec!(150.00),
        overhead_pct: dec!(0.22),
    }
}

pub(super) fn all_cost_models() -> Vec<CostModelRecord> {
    vec![
        cost_model(AcuityBand::Low),
        cost_model(AcuityBand::Medium),
        cost_model(AcuityBand::High),
        cost_model(AcuityBand::Complex),
    ]
}

/// Hip osteoarthritis rehab referral: non-surgical ortho category with
/// moderate dependency and a 12-point NTA comorbidity burden.
pub(super) fn ortho_features() -> ClinicalFeatures {
    ClinicalFeatures {
        primary_diagnosis: "M16.11".to_string(),
        comorbidities: vec!["I50.9".to_string(), "E11.9".to_string(), "J44.0".to_string()],
        medications: vec!["metoprolol".to_string(), "metformin".to_string()],
        functional_status: FunctionalStatus {
            adl_score: Some(12),
            cognitive_score: Some(13),
        },
        therapy_needs: TherapyNeeds {
            physical: true,
            occupational: true,
            speech: false,
        },
        special_services: SpecialServices::default(),
        transport: None,
        prior_readmission: false,
        observations: Vec::new(),
    }
}

/// High-acuity dementia referral: unmapped primary diagnosis, depression
/// comorbidity, heavy dependency.
pub(super) fn dementia_features() -> ClinicalFeatures {
    ClinicalFeatures {
        primary_diagnosis: "F03.90".to_string(),
        comorbidities: vec!["F32.9".to_string()],
        medications: vec!["donepezil".to_string(), "sertraline".to_string()],
        functional_status: FunctionalStatus {
            adl_score: Some(16),
            cognitive_score: Some(5),
        },
        therapy_needs: TherapyNeeds::default(),
        special_services: SpecialServices::default(),
        transport: None,
        prior_readmission: false,
        observations: vec!["Falls risk noted on intake".to_string()],
    }
}

/// Post-hemorrhage referral with extensive services and an SLP-qualifying
/// swallowing disorder.
pub(super) fn neuro_features() -> ClinicalFeatures {
    ClinicalFeatures {
        primary_diagnosis: "I61.9".to_string(),
        comorbidities: vec![
            "A41.9".to_string(),
            "N39.0".to_string(),
            "R13.10".to_string(),
        ],
        medications: vec!["vancomycin".to_string()],
        functional_status: FunctionalStatus {
            adl_score: Some(18),
            cognitive_score: Some(6),
        },
        therapy_needs: TherapyNeeds {
            physical: true,
            occupational: true,
            speech: true,
        },
        special_services: SpecialServices {
            dialysis: true,
            iv_antibiotics: true,
            wound_vac: true,
            ..SpecialServices::default()
        },
        transport: Some(crate::workflows::admission::domain::TransportMode::Ambulance),
        prior_readmission: true,
        observations: vec!["Acute exacerbation on day of referral".to_string()],
    }
}

pub(super) fn request(payer: PayerType, los: u16) -> EvaluationRequest {
    EvaluationRequest {
        facility_id: facility_id(),
        payer_type: payer,
        projected_los: los,
        authorization: AuthorizationStatus::Approved,
        census_priority: 0.5,
        as_of: as_of(),
        weights: None,
    }
}

pub(super) fn submission(payer: PayerType, los: u16) -> EvaluationSubmission {
    EvaluationSubmission {
        features: ortho_features(),
        request: request(payer, los),
    }
}

/// Assemble a projection through the real pipeline components for scoring
/// tests.
pub(super) fn projection_for(
    features: &ClinicalFeatures,
    record: &RateRecord,
    los: u16,
) -> (
    FinancialProjection,
    crate::workflows::admission::classification::CaseMixClassification,
) {
    let classifier = crate::workflows::admission::classification::CaseMixClassifier::standard();
    let (case_mix, _) = classifier.classify(features);
    let revenue =
        project_revenue(&case_mix, record, los, &facility(), 100).expect("revenue projects");
    let estimator = CostEstimator::default();
    let cost = estimator.estimate(
        &case_mix,
        &cost_model(case_mix.acuity_band()),
        los,
        AuthorizationStatus::Approved,
        record.payer_type(),
        features.transport,
        revenue.total,
    );
    (FinancialProjection::new(revenue, cost), case_mix)
}

#[derive(Default, Clone)]
pub(super) struct MemoryConfigStore {
    pub(super) facilities: Vec<FacilityProfile>,
    pub(super) rates: Vec<RateRecord>,
    pub(super) cost_models: Vec<CostModelRecord>,
}

impl MemoryConfigStore {
    pub(super) fn standard() -> Self {
        Self {
            facilities: vec![facility()],
            rates: vec![
                ffs_record(),
                medicaid_record(),
                ma_tiered_record(),
                family_care_record(),
            ],
            cost_models: all_cost_models(),
        }
    }

    pub(super) fn without_cost_models() -> Self {
        Self {
            cost_models: Vec::new(),
            ..Self::standard()
        }
    }
}

impl ConfigStore for MemoryConfigStore {
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
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AdmissionId, EvaluationRecord>>>,
}

impl EvaluationRepository for MemoryRepository {
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
        guard.insert(record.admission_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &AdmissionId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAlerts {
    events: Arc<Mutex<Vec<IntakeAlert>>>,
}

impl MemoryAlerts {
    pub(super) fn events(&self) -> Vec<IntakeAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl AlertPublisher for MemoryAlerts {
    fn publish(&self, alert: IntakeAlert) -> Result<(), AlertError> {
        self.events
            .lock()
            .expect("alert mutex poisoned")
            .push(alert);
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn insert(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: EvaluationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AdmissionId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    AdmissionEvaluationService<MemoryConfigStore, MemoryRepository, MemoryAlerts>,
    Arc<MemoryRepository>,
    Arc<MemoryAlerts>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let alerts = Arc::new(MemoryAlerts::default());
    let service = AdmissionEvaluationService::new(
        Arc::new(MemoryConfigStore::standard()),
        repository.clone(),
        alerts.clone(),
    );
    (service, repository, alerts)
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
