use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::scoring::BusinessWeights;

/// Identifier wrapper for evaluated admissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdmissionId(pub String);

/// Identifier wrapper for facilities, issued by the administrative collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacilityId(pub String);

/// Payer families with distinct reimbursement rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayerType {
    MedicareFfs,
    MedicareAdvantage,
    Medicaid,
    FamilyCare,
}

impl PayerType {
    pub const fn label(self) -> &'static str {
        match self {
            PayerType::MedicareFfs => "Medicare FFS",
            PayerType::MedicareAdvantage => "Medicare Advantage",
            PayerType::Medicaid => "Medicaid",
            PayerType::FamilyCare => "Family Care",
        }
    }
}

/// Prior-authorization state reported by the payer at intake time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    Approved,
    Pending,
    Denied,
    Unknown,
}

impl AuthorizationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AuthorizationStatus::Approved => "approved",
            AuthorizationStatus::Pending => "pending",
            AuthorizationStatus::Denied => "denied",
            AuthorizationStatus::Unknown => "unknown",
        }
    }
}

/// Functional assessment scores extracted from the clinical record.
/// Higher ADL values indicate greater dependency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalStatus {
    pub adl_score: Option<u8>,
    pub cognitive_score: Option<u8>,
}

/// Therapy disciplines the referring provider has ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapyNeeds {
    pub physical: bool,
    pub occupational: bool,
    pub speech: bool,
}

/// Special-care flags extracted from the clinical record. Each flag carries
/// cost and, for some payers, reimbursement consequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialServices {
    pub trach: bool,
    pub dialysis: bool,
    pub ventilator: bool,
    pub iv_antibiotics: bool,
    pub wound_vac: bool,
    pub oxygen: bool,
    pub feeding_tube: bool,
    pub bariatric: bool,
}

impl SpecialServices {
    /// Trach care, dialysis, ventilator support, and IV antibiotics qualify
    /// as extensive services for nursing classification.
    pub const fn extensive(self) -> bool {
        self.trach || self.dialysis || self.ventilator || self.iv_antibiotics
    }
}

/// Transport arrangements needed at admission (one-time cost).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Ambulance,
    WheelchairVan,
}

/// Structured clinical intake data produced by the document-ingestion
/// collaborator. Assumed validated and well-typed; consumed once per
/// evaluation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalFeatures {
    pub primary_diagnosis: String,
    pub comorbidities: Vec<String>,
    pub medications: Vec<String>,
    pub functional_status: FunctionalStatus,
    pub therapy_needs: TherapyNeeds,
    pub special_services: SpecialServices,
    pub transport: Option<TransportMode>,
    pub prior_readmission: bool,
    /// Risk-relevant observation flags surfaced by the ingestion layer
    /// (e.g. "falls risk"). Structured terms, not free text.
    pub observations: Vec<String>,
}

/// Facility attributes that adjust Medicare payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityProfile {
    pub facility_id: FacilityId,
    pub name: String,
    pub wage_index: Decimal,
    pub vbp_multiplier: Decimal,
}

/// Caller-supplied parameters for a single evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub facility_id: FacilityId,
    pub payer_type: PayerType,
    pub projected_los: u16,
    pub authorization: AuthorizationStatus,
    /// How urgently the facility wants to fill beds, 0.0 (full) to 1.0
    /// (empty house). Clamped by the scorer.
    pub census_priority: f32,
    pub as_of: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BusinessWeights>,
}

/// Full submission payload accepted by the HTTP router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSubmission {
    pub features: ClinicalFeatures,
    #[serde(flatten)]
    pub request: EvaluationRequest,
}

/// High level status tracked for a persisted evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationStatus {
    Pending,
    Accepted,
    Deferred,
    Declined,
}

impl EvaluationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluationStatus::Pending => "pending",
            EvaluationStatus::Accepted => "accepted",
            EvaluationStatus::Deferred => "deferred",
            EvaluationStatus::Declined => "declined",
        }
    }
}
