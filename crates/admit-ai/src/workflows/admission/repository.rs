use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::classification::AcuityBand;
use super::costs::CostModelRecord;
use super::domain::{
    AdmissionId, ClinicalFeatures, EvaluationRequest, EvaluationStatus, FacilityId,
    FacilityProfile, PayerType,
};
use super::rates::RateRecord;
use super::service::EvaluationOutcome;

/// Read-only view of the administrative configuration the pipeline
/// consumes: facility profiles, versioned rate records, and acuity-banded
/// cost models. The pipeline never writes configuration.
pub trait ConfigStore: Send + Sync {
    fn facility(&self, id: &FacilityId) -> Result<Option<FacilityProfile>, ConfigStoreError>;
    fn rate_records(
        &self,
        facility: &FacilityId,
        payer: PayerType,
    ) -> Result<Vec<RateRecord>, ConfigStoreError>;
    fn cost_model(
        &self,
        facility: &FacilityId,
        band: AcuityBand,
    ) -> Result<Option<CostModelRecord>, ConfigStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("configuration store unavailable: {0}")]
    Unavailable(String),
}

/// Repository record pairing the immutable evaluation inputs with the
/// outcome, persisted for audit by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub admission_id: AdmissionId,
    pub features: ClinicalFeatures,
    pub request: EvaluationRequest,
    pub status: EvaluationStatus,
    pub outcome: Option<EvaluationOutcome>,
}

impl EvaluationRecord {
    pub fn decision_rationale(&self) -> String {
        match &self.outcome {
            Some(outcome) => outcome.score.summary.clone(),
            None => "pending evaluation".to_string(),
        }
    }

    pub fn status_view(&self) -> EvaluationStatusView {
        EvaluationStatusView {
            admission_id: self.admission_id.clone(),
            status: self.status.label(),
            decision_rationale: self.decision_rationale(),
            score: self
                .outcome
                .as_ref()
                .map(|outcome| outcome.score.raw_score),
            recommendation: self
                .outcome
                .as_ref()
                .map(|outcome| outcome.score.recommendation.label()),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait EvaluationRepository: Send + Sync {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError>;
    fn update(&self, record: EvaluationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AdmissionId) -> Result<Option<EvaluationRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Trait describing outbound alert hooks (e.g. the admissions coordinator
/// work queue or an e-mail adapter).
pub trait AlertPublisher: Send + Sync {
    fn publish(&self, alert: IntakeAlert) -> Result<(), AlertError>;
}

/// Alert payload raised when an evaluation recommends acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeAlert {
    pub template: String,
    pub admission_id: AdmissionId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of an evaluation's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationStatusView {
    pub admission_id: AdmissionId,
    pub status: &'static str,
    pub decision_rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<&'static str>,
}
