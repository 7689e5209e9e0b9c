//! Admission financial evaluation pipeline.
//!
//! Structured clinical features flow strictly downward through five pure
//! components: case-mix classification, rate resolution, reimbursement
//! projection, cost estimation, and margin scoring. The service facade
//! orchestrates one synchronous evaluation per request against a read-only
//! configuration snapshot and persists the outcome through the repository
//! seam.

pub mod classification;
pub mod costs;
pub mod domain;
pub mod projection;
pub mod ratebook;
pub mod rates;
pub mod repository;
pub mod revenue;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use classification::{
    AcuityBand, CaseMixClassification, CaseMixClassifier, ClassificationTables, ClinicalCategory,
    NtaBand, NursingGroup, SlpGroup, TherapyGroup,
};
pub use costs::{
    CostBreakdown, CostComponent, CostComponentKind, CostEstimator, CostModelRecord, CostPolicy,
    DenialRiskPolicy,
};
pub use domain::{
    AdmissionId, AuthorizationStatus, ClinicalFeatures, EvaluationRequest, EvaluationStatus,
    EvaluationSubmission, FacilityId, FacilityProfile, FunctionalStatus, PayerType,
    SpecialServices, TherapyNeeds, TransportMode,
};
pub use projection::FinancialProjection;
pub use rates::{
    AcuityAddOn, AddOnCondition, DateInterval, DayTier, FamilyCareMatrix, FfsRateTable,
    MaContract, MedicaidRates, NtaVpdPolicy, RateBook, RateBookError, RateRecord,
    RateResolutionError, RateTerms, VpdSchedule, VpdStep,
};
pub use repository::{
    AlertError, AlertPublisher, ConfigStore, ConfigStoreError, EvaluationRecord,
    EvaluationRepository, EvaluationStatusView, IntakeAlert, RepositoryError,
};
pub use revenue::{RevenueBreakdown, RevenueComponent, RevenueComponentKind, RevenueError};
pub use router::admission_router;
pub use scoring::{
    BusinessWeights, MarginScorer, NormalizationCurve, Recommendation, ScoreFactor,
    ScoreFactorKind, ScoreResult, ScoreThresholds, ScoringConfig,
};
pub use service::{
    AdmissionEvaluationService, ConfigurationError, EvaluationError, EvaluationOutcome,
    EvaluationPolicy, ValidationError,
};
