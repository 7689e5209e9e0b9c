use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::classification::{CaseMixClassification, CaseMixClassifier};
use super::costs::{CostEstimator, CostPolicy, DenialRiskPolicy};
use super::domain::{
    AdmissionId, ClinicalFeatures, EvaluationRequest, EvaluationStatus, FacilityId,
    FacilityProfile,
};
use super::projection::FinancialProjection;
use super::rates::{self, RateResolutionError};
use super::repository::{
    AlertError, AlertPublisher, ConfigStore, ConfigStoreError, EvaluationRecord,
    EvaluationRepository, IntakeAlert, RepositoryError,
};
use super::revenue::{self, RevenueError, DEFAULT_LOS_CEILING};
use super::scoring::{MarginScorer, Recommendation, ScoreResult};

/// Pipeline-wide limits and policies not owned by a single component.
#[derive(Debug, Clone)]
pub struct EvaluationPolicy {
    pub los_ceiling: u16,
    pub cost_policy: CostPolicy,
    pub denial_risk: DenialRiskPolicy,
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        Self {
            los_ceiling: DEFAULT_LOS_CEILING,
            cost_policy: CostPolicy::default(),
            denial_risk: DenialRiskPolicy::default(),
        }
    }
}

/// Full result of one evaluation: classification, itemized financial
/// projection, score, and the non-fatal classification warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub admission_id: AdmissionId,
    pub case_mix: CaseMixClassification,
    pub warnings: Vec<String>,
    pub projection: FinancialProjection,
    pub score: ScoreResult,
}

/// Caller-input problems. Reported immediately; no partial result is
/// produced.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("length of stay {los} is outside the allowed range 1..={ceiling}")]
    InvalidLos { los: u16, ceiling: u16 },
    #[error("unknown facility {0}")]
    UnknownFacility(String),
}

/// Administrative-data problems, surfaced distinctly from validation so
/// the caller can direct the user to repair configuration rather than
/// their input.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    Rate(#[from] RateResolutionError),
    #[error("no cost model configured for facility {facility} acuity band {band}")]
    NoCostModel { facility: String, band: String },
    #[error("rate table incomplete: no {component} rate for {key}")]
    IncompleteRateTable { component: &'static str, key: String },
    #[error("contract day tiers leave stay day {day} uncovered")]
    UncoveredDayTier { day: u16 },
    #[error(transparent)]
    Store(#[from] ConfigStoreError),
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Alert(#[from] AlertError),
}

static ADMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_admission_id() -> AdmissionId {
    let id = ADMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AdmissionId(format!("adm-{id:06}"))
}

/// Service composing the five pipeline components over the configuration
/// store, with persistence and alerting seams for the surrounding
/// application.
pub struct AdmissionEvaluationService<S, R, A> {
    config_store: Arc<S>,
    repository: Arc<R>,
    alerts: Arc<A>,
    classifier: CaseMixClassifier,
    scorer: MarginScorer,
    policy: EvaluationPolicy,
}

impl<S, R, A> AdmissionEvaluationService<S, R, A>
where
    S: ConfigStore + 'static,
    R: EvaluationRepository + 'static,
    A: AlertPublisher + 'static,
{
    pub fn new(config_store: Arc<S>, repository: Arc<R>, alerts: Arc<A>) -> Self {
        Self::with_components(
            config_store,
            repository,
            alerts,
            CaseMixClassifier::standard(),
            MarginScorer::standard(),
            EvaluationPolicy::default(),
        )
    }

    pub fn with_components(
        config_store: Arc<S>,
        repository: Arc<R>,
        alerts: Arc<A>,
        classifier: CaseMixClassifier,
        scorer: MarginScorer,
        policy: EvaluationPolicy,
    ) -> Self {
        Self {
            config_store,
            repository,
            alerts,
            classifier,
            scorer,
            policy,
        }
    }

    pub fn classifier(&self) -> &CaseMixClassifier {
        &self.classifier
    }

    /// Evaluate a prospective admission and persist the outcome. The full
    /// pipeline is synchronous and pure over the configuration snapshot;
    /// nothing is cached between calls.
    pub fn evaluate(
        &self,
        features: ClinicalFeatures,
        request: EvaluationRequest,
    ) -> Result<EvaluationOutcome, EvaluationError> {
        let admission_id = next_admission_id();
        let outcome = self.run_pipeline(admission_id, &features, &request)?;

        let status = status_for(outcome.score.recommendation);
        let record = EvaluationRecord {
            admission_id: outcome.admission_id.clone(),
            features,
            request,
            status,
            outcome: Some(outcome.clone()),
        };
        self.repository.insert(record)?;

        if matches!(outcome.score.recommendation, Recommendation::Accept) {
            let mut details = BTreeMap::new();
            details.insert(
                "recommendation".to_string(),
                outcome.score.recommendation.label().to_string(),
            );
            details.insert(
                "score".to_string(),
                format!("{:.1}", outcome.score.raw_score),
            );
            self.alerts.publish(IntakeAlert {
                template: "admission_accept_recommended".to_string(),
                admission_id: outcome.admission_id.clone(),
                details,
            })?;
        }

        Ok(outcome)
    }

    /// Stateless what-if run: same pipeline, nothing persisted, no alerts.
    /// Used for repeated recalculations with different LOS or census
    /// assumptions.
    pub fn what_if(
        &self,
        features: &ClinicalFeatures,
        request: &EvaluationRequest,
    ) -> Result<EvaluationOutcome, EvaluationError> {
        self.run_pipeline(AdmissionId("what-if".to_string()), features, request)
    }

    /// Fetch a persisted evaluation for API responses.
    pub fn get(&self, admission_id: &AdmissionId) -> Result<EvaluationRecord, EvaluationError> {
        let record = self
            .repository
            .fetch(admission_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    fn run_pipeline(
        &self,
        admission_id: AdmissionId,
        features: &ClinicalFeatures,
        request: &EvaluationRequest,
    ) -> Result<EvaluationOutcome, EvaluationError> {
        let los = request.projected_los;
        if los < 1 || los > self.policy.los_ceiling {
            return Err(ValidationError::InvalidLos {
                los,
                ceiling: self.policy.los_ceiling,
            }
            .into());
        }

        let facility = self.facility_profile(&request.facility_id)?;

        let (case_mix, warnings) = self.classifier.classify(features);

        let records = self
            .config_store
            .rate_records(&request.facility_id, request.payer_type)
            .map_err(ConfigurationError::Store)?;
        let rate_record = rates::resolve(
            &records,
            &request.facility_id,
            request.payer_type,
            request.as_of,
        )
        .map_err(ConfigurationError::Rate)?;

        let revenue = revenue::project_revenue(
            &case_mix,
            rate_record,
            los,
            &facility,
            self.policy.los_ceiling,
        )
        .map_err(map_revenue_error)?;

        let band = case_mix.acuity_band();
        let cost_model = self
            .config_store
            .cost_model(&request.facility_id, band)
            .map_err(ConfigurationError::Store)?
            .ok_or_else(|| ConfigurationError::NoCostModel {
                facility: request.facility_id.0.clone(),
                band: band.label().to_string(),
            })?;

        let estimator = CostEstimator::new(
            self.policy.cost_policy.clone(),
            self.policy.denial_risk.clone(),
        );
        let cost = estimator.estimate(
            &case_mix,
            &cost_model,
            los,
            request.authorization,
            request.payer_type,
            features.transport,
            revenue.total,
        );

        let projection = FinancialProjection::new(revenue, cost);
        let score = self.scorer.score(
            &projection,
            &case_mix,
            features,
            request.census_priority,
            request.weights.as_ref(),
        );

        Ok(EvaluationOutcome {
            admission_id,
            case_mix,
            warnings,
            projection,
            score,
        })
    }

    fn facility_profile(&self, id: &FacilityId) -> Result<FacilityProfile, EvaluationError> {
        self.config_store
            .facility(id)
            .map_err(ConfigurationError::Store)?
            .ok_or_else(|| ValidationError::UnknownFacility(id.0.clone()).into())
    }
}

fn status_for(recommendation: Recommendation) -> EvaluationStatus {
    match recommendation {
        Recommendation::Accept => EvaluationStatus::Accepted,
        Recommendation::Defer => EvaluationStatus::Deferred,
        Recommendation::Decline => EvaluationStatus::Declined,
    }
}

fn map_revenue_error(error: RevenueError) -> EvaluationError {
    match error {
        RevenueError::InvalidLos { los, ceiling } => {
            ValidationError::InvalidLos { los, ceiling }.into()
        }
        RevenueError::MissingComponentRate { component, key } => {
            ConfigurationError::IncompleteRateTable { component, key }.into()
        }
        RevenueError::MissingDayTier { day } => {
            ConfigurationError::UncoveredDayTier { day }.into()
        }
    }
}
