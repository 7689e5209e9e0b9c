//! End-to-end specifications for the admission evaluation workflow.
//!
//! Scenarios run through the public service facade and HTTP router so the
//! classification, rate resolution, projection, and scoring behavior is
//! validated without reaching into private modules.

mod common {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use admit_ai::workflows::admission::{
        AcuityBand, AdmissionEvaluationService, AdmissionId, AlertError, AlertPublisher,
        AuthorizationStatus, ClinicalFeatures, ConfigStore, ConfigStoreError, CostModelRecord,
        DateInterval, EvaluationRecord, EvaluationRepository, EvaluationRequest, FacilityId,
        FacilityProfile, FfsRateTable, FunctionalStatus, IntakeAlert, MedicaidRates, NtaBand,
        NtaVpdPolicy, NursingGroup, PayerType, RateRecord, RateTerms, RepositoryError,
        SlpGroup, SpecialServices, TherapyGroup, TherapyNeeds, VpdSchedule,
    };

    pub fn facility_id() -> FacilityId {
        FacilityId("maple-grove".to_string())
    }

    pub fn facility() -> FacilityProfile {
        FacilityProfile {
            facility_id: facility_id(),
            name: "Maple Grove Post-Acute".to_string(),
            wage_index: dec!(1.02),
            vbp_multiplier: dec!(1.00),
        }
    }

    pub fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
    }

    fn therapy(values: [Decimal; 5]) -> BTreeMap<TherapyGroup, Decimal> {
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

    /// Contract-grade FFS component table for the high-therapy referral
    /// scenario; the stay totals land in the low six figures.
    pub fn contract_ffs_table() -> FfsRateTable {
        FfsRateTable {
            pt: therapy([dec!(1290.00), dec!(1200.00), dec!(1120.00), dec!(1040.00), dec!(960.00)]),
            ot: therapy([dec!(1235.00), dec!(1150.00), dec!(1075.00), dec!(995.00), dec!(920.00)]),
            slp: [(SlpGroup::SL1, dec!(480.00)), (SlpGroup::SL2, dec!(560.00))]
                .into_iter()
                .collect(),
            nursing: [
                (NursingGroup::ES1, dec!(3400.00)),
                (NursingGroup::ES2, dec!(3100.00)),
                (NursingGroup::HBS1, dec!(2300.00)),
                (NursingGroup::HBS2, dec!(2200.00)),
                (NursingGroup::LBS1, dec!(2100.00)),
                (NursingGroup::LBS2, dec!(1950.00)),
            ]
            .into_iter()
            .collect(),
            nta: [
                (NtaBand::Low, dec!(820.00)),
                (NtaBand::Moderate, dec!(1150.00)),
                (NtaBand::High, dec!(1500.00)),
            ]
            .into_iter()
            .collect(),
            non_case_mix: dec!(1800.00),
            labor_share: FfsRateTable::DEFAULT_LABOR_SHARE,
            therapy_vpd: VpdSchedule::standard_therapy(),
            nta_vpd: NtaVpdPolicy::default(),
        }
    }

    pub fn ffs_record() -> RateRecord {
        RateRecord {
            facility_id: facility_id(),
            effective: DateInterval::new(
                NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid"),
                None,
            ),
            terms: RateTerms::MedicareFfs(contract_ffs_table()),
        }
    }

    pub fn medicaid_record() -> RateRecord {
        RateRecord {
            facility_id: facility_id(),
            effective: DateInterval::new(
                NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid"),
                None,
            ),
            terms: RateTerms::Medicaid(MedicaidRates {
                base_per_diem: dec!(234.00),
                add_ons: Vec::new(),
            }),
        }
    }

    pub fn cost_models() -> Vec<CostModelRecord> {
        [
            (AcuityBand::Low, dec!(3.2), dec!(32.00), dec!(40.00), dec!(25.00)),
            (AcuityBand::Medium, dec!(4.0), dec!(35.00), dec!(50.00), dec!(30.00)),
            (AcuityBand::High, dec!(5.5), dec!(38.00), dec!(60.00), dec!(30.00)),
            (AcuityBand::Complex, dec!(7.2), dec!(41.00), dec!(80.00), dec!(45.00)),
        ]
        .into_iter()
        .map(|(band, hours, rate, supplies, pharmacy)| CostModelRecord {
            facility_id: facility_id(),
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

    /// High-therapy rehab referral with moderate dependency.
    pub fn rehab_features() -> ClinicalFeatures {
        ClinicalFeatures {
            primary_diagnosis: "M16.11".to_string(),
            comorbidities: vec![
                "I50.9".to_string(),
                "E11.9".to_string(),
                "J44.0".to_string(),
            ],
            medications: vec!["metoprolol".to_string()],
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

    /// High-acuity dementia referral with low per-diem reimbursement.
    pub fn dementia_features() -> ClinicalFeatures {
        ClinicalFeatures {
            primary_diagnosis: "F03.90".to_string(),
            comorbidities: vec!["F32.9".to_string()],
            medications: vec!["donepezil".to_string()],
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

    pub fn request(payer: PayerType, los: u16) -> EvaluationRequest {
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

    #[derive(Default, Clone)]
    pub struct MemoryConfigStore {
        pub facilities: Vec<FacilityProfile>,
        pub rates: Vec<RateRecord>,
        pub cost_models: Vec<CostModelRecord>,
    }

    impl MemoryConfigStore {
        pub fn standard() -> Self {
            Self {
                facilities: vec![facility()],
                rates: vec![ffs_record(), medicaid_record()],
                cost_models: cost_models(),
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
                .filter(|record| {
                    record.facility_id == *facility && record.payer_type() == payer
                })
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
    pub struct MemoryRepository {
        pub records: Arc<Mutex<HashMap<AdmissionId, EvaluationRecord>>>,
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
    pub struct MemoryAlerts {
        events: Arc<Mutex<Vec<IntakeAlert>>>,
    }

    impl MemoryAlerts {
        pub fn events(&self) -> Vec<IntakeAlert> {
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

    pub fn build_service() -> (
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
}

use common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tower::ServiceExt;

use admit_ai::workflows::admission::{
    admission_router, ConfigurationError, EvaluationError, PayerType, RateResolutionError,
    Recommendation, ValidationError,
};

#[test]
fn high_therapy_medicare_stay_is_accepted_with_six_figure_revenue() {
    let (service, _repository, alerts) = build_service();

    let outcome = service
        .evaluate(rehab_features(), request(PayerType::MedicareFfs, 25))
        .expect("pipeline evaluates");

    let revenue = outcome.projection.revenue.total;
    assert!(
        revenue > dec!(100000.00) && revenue < dec!(300000.00),
        "expected low six figures, got {revenue}"
    );
    assert!(outcome.score.raw_score >= 70.0);
    assert_eq!(outcome.score.recommendation, Recommendation::Accept);
    assert_eq!(alerts.events().len(), 1);

    // The itemization is a hard requirement: components sum to the total.
    let sum: Decimal = outcome
        .projection
        .revenue
        .components
        .iter()
        .map(|component| component.amount)
        .sum();
    assert_eq!(sum, revenue);
}

#[test]
fn low_reimbursement_dementia_stay_is_declined() {
    let (service, _repository, _alerts) = build_service();

    let outcome = service
        .evaluate(dementia_features(), request(PayerType::Medicaid, 45))
        .expect("pipeline evaluates");

    assert!(outcome.projection.margin_total < Decimal::ZERO);
    assert!(outcome.score.raw_score < 50.0);
    assert_eq!(outcome.score.recommendation, Recommendation::Decline);
}

#[test]
fn out_of_range_los_fails_without_producing_a_score() {
    let (service, repository, _alerts) = build_service();

    for los in [0, 150] {
        let error = service
            .evaluate(rehab_features(), request(PayerType::MedicareFfs, los))
            .expect_err("invalid LOS aborts the pipeline");
        assert!(matches!(
            error,
            EvaluationError::Validation(ValidationError::InvalidLos { .. })
        ));
    }
    assert!(repository.records.lock().expect("mutex").is_empty());
}

#[test]
fn unconfigured_payer_dates_fail_with_no_active_rate() {
    let (service, _repository, _alerts) = build_service();

    // Family Care has no rate record at all for this facility.
    let error = service
        .evaluate(dementia_features(), request(PayerType::FamilyCare, 30))
        .expect_err("no Family Care contract is configured");
    assert!(matches!(
        error,
        EvaluationError::Configuration(ConfigurationError::Rate(
            RateResolutionError::NoActiveRate { .. }
        ))
    ));
}

#[test]
fn repeated_evaluations_are_bit_identical() {
    let (service, _repository, _alerts) = build_service();

    let features = rehab_features();
    let what_if = request(PayerType::MedicareFfs, 25);

    let first = service.what_if(&features, &what_if).expect("evaluates");
    let second = service.what_if(&features, &what_if).expect("evaluates");
    assert_eq!(first, second);
}

#[test]
fn what_if_reacts_to_length_of_stay_assumptions() {
    let (service, _repository, _alerts) = build_service();
    let features = rehab_features();

    let short = service
        .what_if(&features, &request(PayerType::MedicareFfs, 10))
        .expect("evaluates");
    let long = service
        .what_if(&features, &request(PayerType::MedicareFfs, 40))
        .expect("evaluates");

    assert!(long.projection.revenue.total > short.projection.revenue.total);
    assert!(long.projection.cost.total > short.projection.cost.total);
}

#[tokio::test]
async fn evaluation_route_round_trips() {
    let (service, _repository, _alerts) = build_service();
    let router = admission_router(Arc::new(service));

    let submission = serde_json::json!({
        "features": rehab_features(),
        "facility_id": facility_id(),
        "payer_type": "medicare_ffs",
        "projected_los": 25,
        "authorization": "approved",
        "census_priority": 0.5,
        "as_of": as_of(),
    });

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/admissions/evaluations")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(submission.to_string()))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(
        payload
            .get("score")
            .and_then(|score| score.get("recommendation"))
            .and_then(serde_json::Value::as_str),
        Some("Accept")
    );
}
