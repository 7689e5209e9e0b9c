use serde::{Deserialize, Serialize};

/// Facility-tunable weights applied to the scoring adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusinessWeights {
    pub census: f32,
    pub denial_risk: f32,
    pub complexity: f32,
    pub readmit_risk: f32,
}

impl Default for BusinessWeights {
    fn default() -> Self {
        Self {
            census: 0.2,
            denial_risk: 0.3,
            complexity: 0.2,
            readmit_risk: 0.1,
        }
    }
}

/// Score cutoffs partitioning [0,100] into Decline / Defer / Accept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreThresholds {
    pub accept: f32,
    pub defer: f32,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            accept: 70.0,
            defer: 40.0,
        }
    }
}

impl ScoreThresholds {
    /// The cutoffs must be ordered so the three bands cover [0,100] with
    /// no gaps or overlaps.
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        if !(self.defer >= 0.0 && self.defer < self.accept && self.accept <= 100.0) {
            return Err(ScoringConfigError::InvalidThresholds {
                accept: self.accept,
                defer: self.defer,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ScoringConfigError {
    #[error("score thresholds must satisfy 0 <= defer < accept <= 100 (accept {accept}, defer {defer})")]
    InvalidThresholds { accept: f32, defer: f32 },
    #[error("normalization curve constants must be positive (saturation {saturation}, negative slope {negative_slope})")]
    InvalidCurve { saturation: f32, negative_slope: f32 },
}

/// Monotonic mapping from per-diem margin to a base score in [0,100].
/// Positive margins saturate toward 100; negative margins fall linearly
/// to the floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationCurve {
    /// Dollars of daily margin at which the positive branch reaches 75.
    pub saturation: f32,
    /// Dollars of negative daily margin that exhaust the 0-50 band.
    pub negative_slope: f32,
}

impl Default for NormalizationCurve {
    fn default() -> Self {
        Self {
            saturation: 200.0,
            negative_slope: 100.0,
        }
    }
}

impl NormalizationCurve {
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        if self.saturation <= 0.0 || self.negative_slope <= 0.0 {
            return Err(ScoringConfigError::InvalidCurve {
                saturation: self.saturation,
                negative_slope: self.negative_slope,
            });
        }
        Ok(())
    }

    pub fn base_score(&self, margin_per_diem: f32) -> f32 {
        let score = if margin_per_diem >= 0.0 {
            50.0 + (margin_per_diem / (margin_per_diem + self.saturation)) * 50.0
        } else {
            50.0 + (margin_per_diem / self.negative_slope) * 50.0
        };
        score.clamp(0.0, 100.0)
    }
}

/// Point values for the clinical-complexity penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityPenalties {
    pub extensive_nursing: f32,
    pub dialysis: f32,
    pub trach: f32,
    pub wound_vac: f32,
    pub iv_antibiotics: f32,
    pub cap: f32,
}

impl Default for ComplexityPenalties {
    fn default() -> Self {
        Self {
            extensive_nursing: 5.0,
            dialysis: 8.0,
            trach: 6.0,
            wound_vac: 4.0,
            iv_antibiotics: 3.0,
            cap: 20.0,
        }
    }
}

/// Point values for the readmission-risk penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadmitPenalties {
    pub prior_history: f32,
    pub per_flagged_observation: f32,
    pub cap: f32,
    /// Observation terms that count toward the penalty when flagged by the
    /// ingestion layer.
    pub risk_terms: Vec<String>,
}

impl Default for ReadmitPenalties {
    fn default() -> Self {
        Self {
            prior_history: 5.0,
            per_flagged_observation: 2.0,
            cap: 10.0,
            risk_terms: [
                "falls risk",
                "multiple readmissions",
                "poor compliance",
                "unstable",
                "acute exacerbation",
            ]
            .iter()
            .map(|term| term.to_string())
            .collect(),
        }
    }
}

/// Full scorer configuration. Defaults carry the intake team's shipped
/// values; facilities override the weights per request when desired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: BusinessWeights,
    pub thresholds: ScoreThresholds,
    pub curve: NormalizationCurve,
    /// Points available to the census adjustment at full priority.
    pub census_span: f32,
    /// Points available to the denial penalty at certain denial.
    pub denial_span: f32,
    pub complexity: ComplexityPenalties,
    pub readmit: ReadmitPenalties,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: BusinessWeights::default(),
            thresholds: ScoreThresholds::default(),
            curve: NormalizationCurve::default(),
            census_span: 10.0,
            denial_span: 15.0,
            complexity: ComplexityPenalties::default(),
            readmit: ReadmitPenalties::default(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        self.thresholds.validate()?;
        self.curve.validate()
    }
}
