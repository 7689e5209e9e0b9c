mod config;

pub use config::{
    BusinessWeights, ComplexityPenalties, NormalizationCurve, ReadmitPenalties, ScoreThresholds,
    ScoringConfig, ScoringConfigError,
};

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::classification::CaseMixClassification;
use super::domain::ClinicalFeatures;
use super::projection::FinancialProjection;

/// Advisory intake recommendation. The human coordinator retains final
/// authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Accept,
    Defer,
    Decline,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::Accept => "Accept",
            Recommendation::Defer => "Defer",
            Recommendation::Decline => "Decline",
        }
    }
}

/// Named factors appearing in the score explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactorKind {
    BaseMargin,
    CensusPriority,
    DenialRisk,
    Complexity,
    ReadmissionRisk,
}

/// Signed contribution to the final score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub factor: ScoreFactorKind,
    pub contribution: f32,
    pub rationale: String,
}

/// Scoring output: clamped 0-100 score, recommendation, and the ordered
/// factor trail that produced it. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub raw_score: f32,
    pub recommendation: Recommendation,
    pub factors: Vec<ScoreFactor>,
    pub summary: String,
}

/// Stateless scorer applying the configured curve, weights, and
/// thresholds. Never fails: garbage inputs still produce a mathematically
/// consistent, if extreme, score.
#[derive(Debug, Clone)]
pub struct MarginScorer {
    config: ScoringConfig,
}

impl MarginScorer {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn standard() -> Self {
        Self {
            config: ScoringConfig::default(),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn recommendation_for(&self, score: f32) -> Recommendation {
        if score >= self.config.thresholds.accept {
            Recommendation::Accept
        } else if score >= self.config.thresholds.defer {
            Recommendation::Defer
        } else {
            Recommendation::Decline
        }
    }

    /// Score one projected stay. `weights` overrides the configured
    /// business weights for a single what-if run.
    pub fn score(
        &self,
        projection: &FinancialProjection,
        case_mix: &CaseMixClassification,
        features: &ClinicalFeatures,
        census_priority: f32,
        weights: Option<&BusinessWeights>,
    ) -> ScoreResult {
        let weights = weights.copied().unwrap_or(self.config.weights);
        let margin_per_diem = projection.margin_per_diem.to_f32().unwrap_or(0.0);

        let base = self.config.curve.base_score(margin_per_diem);
        let mut factors = vec![ScoreFactor {
            factor: ScoreFactorKind::BaseMargin,
            contribution: base,
            rationale: format!(
                "projected margin {margin_per_diem:.2}/day ({}% of revenue) normalized to {base:.1} points",
                projection.margin_pct
            ),
        }];

        let census_priority = census_priority.clamp(0.0, 1.0);
        let census = census_priority * self.config.census_span * weights.census;
        factors.push(ScoreFactor {
            factor: ScoreFactorKind::CensusPriority,
            contribution: census,
            rationale: format!(
                "census priority {census_priority:.2} over a {:.0}-point span",
                self.config.census_span
            ),
        });

        let denial_probability = projection.cost.denial_probability.to_f32().unwrap_or(0.0);
        let denial = denial_probability * self.config.denial_span * weights.denial_risk;
        factors.push(ScoreFactor {
            factor: ScoreFactorKind::DenialRisk,
            contribution: -denial,
            rationale: format!("denial probability {:.1}%", denial_probability * 100.0),
        });

        let complexity_raw = self.complexity_penalty(case_mix);
        let complexity = complexity_raw * weights.complexity;
        factors.push(ScoreFactor {
            factor: ScoreFactorKind::Complexity,
            contribution: -complexity,
            rationale: format!("care complexity penalty {complexity_raw:.1} points"),
        });

        let readmit_raw = self.readmit_penalty(features);
        let readmit = readmit_raw * weights.readmit_risk;
        factors.push(ScoreFactor {
            factor: ScoreFactorKind::ReadmissionRisk,
            contribution: -readmit,
            rationale: format!("readmission risk penalty {readmit_raw:.1} points"),
        });

        let raw_score = factors
            .iter()
            .map(|factor| factor.contribution)
            .sum::<f32>()
            .clamp(0.0, 100.0);
        let recommendation = self.recommendation_for(raw_score);
        let summary = self.summary(projection, recommendation);

        ScoreResult {
            raw_score,
            recommendation,
            factors,
            summary,
        }
    }

    fn complexity_penalty(&self, case_mix: &CaseMixClassification) -> f32 {
        let penalties = &self.config.complexity;
        let services = case_mix.special_care;
        let mut penalty = 0.0;

        if case_mix.nursing_group.is_extensive() {
            penalty += penalties.extensive_nursing;
        }
        if services.dialysis {
            penalty += penalties.dialysis;
        }
        if services.trach {
            penalty += penalties.trach;
        }
        if services.wound_vac {
            penalty += penalties.wound_vac;
        }
        if services.iv_antibiotics {
            penalty += penalties.iv_antibiotics;
        }

        penalty.min(penalties.cap)
    }

    fn readmit_penalty(&self, features: &ClinicalFeatures) -> f32 {
        let penalties = &self.config.readmit;
        let mut penalty = 0.0;

        for observation in &features.observations {
            let observation = observation.to_lowercase();
            if penalties
                .risk_terms
                .iter()
                .any(|term| observation.contains(term.as_str()))
            {
                penalty += penalties.per_flagged_observation;
            }
        }

        if features.prior_readmission {
            penalty += penalties.prior_history;
        }

        penalty.min(penalties.cap)
    }

    fn summary(&self, projection: &FinancialProjection, recommendation: Recommendation) -> String {
        let per_diem = projection.margin_per_diem;
        let pct = projection.margin_pct;
        let total = projection.margin_total;
        let los = projection.los;

        match recommendation {
            Recommendation::Accept => format!(
                "Strong financial margin of {per_diem}/day ({pct}% margin rate). \
                 Projected net profit of {total} over {los} days."
            ),
            Recommendation::Defer => format!(
                "Moderate margin of {per_diem}/day ({pct}% margin rate). Consider \
                 negotiating rates or confirming authorization before accepting. \
                 Projected net of {total} over {los} days."
            ),
            Recommendation::Decline => {
                if total < rust_decimal::Decimal::ZERO {
                    format!(
                        "Negative margin of {per_diem}/day ({pct}% margin rate). \
                         Projected loss of {} over {los} days. Not financially \
                         viable without rate renegotiation.",
                        total.abs()
                    )
                } else {
                    format!(
                        "Low margin of {per_diem}/day ({pct}% margin rate). High \
                         complexity or denial risk reduces the overall score. \
                         Consider only if census priority is critical."
                    )
                }
            }
        }
    }
}
