use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::classification::{AcuityBand, CaseMixClassification, NtaBand};
use super::domain::{AuthorizationStatus, FacilityId, PayerType, TransportMode};

/// Facility cost assumptions for one acuity band. Created by the
/// administrative collaborator; read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostModelRecord {
    pub facility_id: FacilityId,
    pub acuity_band: AcuityBand,
    pub nursing_hours_per_day: Decimal,
    /// Loaded hourly wage rate, benefits included.
    pub hourly_rate: Decimal,
    pub supply_per_diem: Decimal,
    pub pharmacy_per_diem: Decimal,
    /// Baseline one-time transport cost when a mode-specific figure is not
    /// configured.
    pub transport_per_stay: Decimal,
    /// Overhead percentage applied to the sum of direct costs.
    pub overhead_pct: Decimal,
}

/// Per-day surcharges and one-time transport figures for special services.
/// Facility-tunable; the defaults carry the intake team's book values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostPolicy {
    pub wound_vac_supply_per_diem: Decimal,
    pub oxygen_supply_per_diem: Decimal,
    pub feeding_tube_supply_per_diem: Decimal,
    pub iv_antibiotics_pharmacy_per_diem: Decimal,
    pub wound_care_pharmacy_per_diem: Decimal,
    pub ambulance_surcharge: Decimal,
}

impl Default for CostPolicy {
    fn default() -> Self {
        Self {
            wound_vac_supply_per_diem: dec!(75.00),
            oxygen_supply_per_diem: dec!(25.00),
            feeding_tube_supply_per_diem: dec!(40.00),
            iv_antibiotics_pharmacy_per_diem: dec!(150.00),
            wound_care_pharmacy_per_diem: dec!(50.00),
            ambulance_surcharge: dec!(350.00),
        }
    }
}

/// One row of the denial-probability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialRiskRow {
    pub payer: PayerType,
    pub authorization: AuthorizationStatus,
    pub probability: Decimal,
}

/// Denial probability lookup by payer and authorization status, with
/// complexity uplifts. The coefficients are configuration supplied by the
/// administrative collaborator, not constants of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialRiskPolicy {
    pub base_probability: Vec<DenialRiskRow>,
    /// Fallback when a (payer, authorization) pair is not configured.
    pub default_probability: Decimal,
    pub nta_band_uplift: Vec<(NtaBand, Decimal)>,
    pub extensive_nursing_uplift: Decimal,
    pub max_probability: Decimal,
    /// Expected share of revenue lost when a denial lands; partial denials
    /// keep this below 1.
    pub loss_severity: Decimal,
}

impl Default for DenialRiskPolicy {
    fn default() -> Self {
        use AuthorizationStatus::{Approved, Denied, Pending, Unknown};
        use PayerType::{FamilyCare, Medicaid, MedicareAdvantage, MedicareFfs};

        let mut base_probability = Vec::new();
        let rows: &[(PayerType, [(AuthorizationStatus, Decimal); 4])] = &[
            (
                MedicareFfs,
                [
                    (Approved, dec!(0.02)),
                    (Pending, dec!(0.15)),
                    (Unknown, dec!(0.25)),
                    (Denied, dec!(0.60)),
                ],
            ),
            (
                MedicareAdvantage,
                [
                    (Approved, dec!(0.05)),
                    (Pending, dec!(0.20)),
                    (Unknown, dec!(0.35)),
                    (Denied, dec!(0.70)),
                ],
            ),
            (
                Medicaid,
                [
                    (Approved, dec!(0.03)),
                    (Pending, dec!(0.10)),
                    (Unknown, dec!(0.15)),
                    (Denied, dec!(0.50)),
                ],
            ),
            (
                FamilyCare,
                [
                    (Approved, dec!(0.03)),
                    (Pending, dec!(0.12)),
                    (Unknown, dec!(0.18)),
                    (Denied, dec!(0.50)),
                ],
            ),
        ];
        for (payer, cells) in rows {
            for (authorization, probability) in cells {
                base_probability.push(DenialRiskRow {
                    payer: *payer,
                    authorization: *authorization,
                    probability: *probability,
                });
            }
        }

        Self {
            base_probability,
            default_probability: dec!(0.25),
            nta_band_uplift: vec![
                (NtaBand::Low, Decimal::ZERO),
                (NtaBand::Moderate, dec!(0.02)),
                (NtaBand::High, dec!(0.05)),
            ],
            extensive_nursing_uplift: dec!(0.05),
            max_probability: dec!(0.95),
            loss_severity: dec!(0.30),
        }
    }
}

impl DenialRiskPolicy {
    /// Probability of a denial, rising with clinical complexity and
    /// falling when prior authorization is already granted.
    pub fn probability(
        &self,
        payer: PayerType,
        authorization: AuthorizationStatus,
        case_mix: &CaseMixClassification,
    ) -> Decimal {
        let mut probability = self
            .base_probability
            .iter()
            .find(|row| row.payer == payer && row.authorization == authorization)
            .map(|row| row.probability)
            .unwrap_or(self.default_probability);

        probability += self
            .nta_band_uplift
            .iter()
            .find(|(band, _)| *band == case_mix.nta_band)
            .map(|(_, uplift)| *uplift)
            .unwrap_or(Decimal::ZERO);
        if case_mix.nursing_group.is_extensive() {
            probability += self.extensive_nursing_uplift;
        }

        probability.min(self.max_probability)
    }
}

/// Cost line-item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostComponentKind {
    Nursing,
    Supplies,
    Pharmacy,
    Transport,
    Overhead,
    DenialRiskReserve,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostComponent {
    pub component: CostComponentKind,
    pub amount: Decimal,
    pub detail: String,
}

/// Projected cost for one stay, itemized to mirror the revenue breakdown.
/// The denial-risk reserve is carried on the cost side so the revenue
/// figure stays a clean contractual number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub components: Vec<CostComponent>,
    pub total: Decimal,
    pub per_diem: Decimal,
    pub denial_probability: Decimal,
    pub los: u16,
}

/// Stateless estimator combining the acuity-banded cost model, the
/// surcharge policy, and the denial-risk policy. Always returns a
/// breakdown; extreme inputs produce extreme but consistent numbers.
#[derive(Debug, Clone, Default)]
pub struct CostEstimator {
    policy: CostPolicy,
    denial_risk: DenialRiskPolicy,
}

impl CostEstimator {
    pub fn new(policy: CostPolicy, denial_risk: DenialRiskPolicy) -> Self {
        Self {
            policy,
            denial_risk,
        }
    }

    pub fn denial_risk(&self) -> &DenialRiskPolicy {
        &self.denial_risk
    }

    pub fn estimate(
        &self,
        case_mix: &CaseMixClassification,
        cost_model: &CostModelRecord,
        los: u16,
        authorization: AuthorizationStatus,
        payer: PayerType,
        transport: Option<TransportMode>,
        revenue_at_risk: Decimal,
    ) -> CostBreakdown {
        let days = Decimal::from(los.max(1));
        let services = case_mix.special_care;

        let nursing_per_diem = cost_model.nursing_hours_per_day * cost_model.hourly_rate;
        let nursing = nursing_per_diem * days;

        let mut supply_per_diem = cost_model.supply_per_diem;
        let mut supply_notes = vec![format!("base {}/day", cost_model.supply_per_diem)];
        if services.wound_vac {
            supply_per_diem += self.policy.wound_vac_supply_per_diem;
            supply_notes.push(format!(
                "wound vac {}/day",
                self.policy.wound_vac_supply_per_diem
            ));
        }
        if services.oxygen {
            supply_per_diem += self.policy.oxygen_supply_per_diem;
            supply_notes.push(format!("oxygen {}/day", self.policy.oxygen_supply_per_diem));
        }
        if services.feeding_tube {
            supply_per_diem += self.policy.feeding_tube_supply_per_diem;
            supply_notes.push(format!(
                "feeding tube {}/day",
                self.policy.feeding_tube_supply_per_diem
            ));
        }
        let supplies = supply_per_diem * days;

        let mut pharmacy_per_diem = cost_model.pharmacy_per_diem;
        let mut pharmacy_notes = vec![format!("base {}/day", cost_model.pharmacy_per_diem)];
        if services.iv_antibiotics {
            pharmacy_per_diem += self.policy.iv_antibiotics_pharmacy_per_diem;
            pharmacy_notes.push(format!(
                "IV antibiotics {}/day",
                self.policy.iv_antibiotics_pharmacy_per_diem
            ));
        }
        if services.wound_vac {
            pharmacy_per_diem += self.policy.wound_care_pharmacy_per_diem;
            pharmacy_notes.push(format!(
                "wound care {}/day",
                self.policy.wound_care_pharmacy_per_diem
            ));
        }
        let pharmacy = pharmacy_per_diem * days;

        let (transport_cost, transport_note) = match transport {
            Some(TransportMode::Ambulance) => (
                cost_model.transport_per_stay + self.policy.ambulance_surcharge,
                "ambulance, one-time".to_string(),
            ),
            Some(TransportMode::WheelchairVan) => (
                cost_model.transport_per_stay,
                "wheelchair van, one-time".to_string(),
            ),
            None => (Decimal::ZERO, "not required".to_string()),
        };

        let direct = nursing + supplies + pharmacy + transport_cost;
        let overhead = direct * cost_model.overhead_pct;

        let denial_probability = self
            .denial_risk
            .probability(payer, authorization, case_mix);
        let expected_loss = revenue_at_risk * denial_probability * self.denial_risk.loss_severity;

        let components = vec![
            CostComponent {
                component: CostComponentKind::Nursing,
                amount: nursing.round_dp(2),
                detail: format!(
                    "{} h/day @ {}/h ({} acuity)",
                    cost_model.nursing_hours_per_day,
                    cost_model.hourly_rate,
                    cost_model.acuity_band.label()
                ),
            },
            CostComponent {
                component: CostComponentKind::Supplies,
                amount: supplies.round_dp(2),
                detail: supply_notes.join(", "),
            },
            CostComponent {
                component: CostComponentKind::Pharmacy,
                amount: pharmacy.round_dp(2),
                detail: pharmacy_notes.join(", "),
            },
            CostComponent {
                component: CostComponentKind::Transport,
                amount: transport_cost.round_dp(2),
                detail: transport_note,
            },
            CostComponent {
                component: CostComponentKind::Overhead,
                amount: overhead.round_dp(2),
                detail: format!("{}% of direct costs", cost_model.overhead_pct * dec!(100)),
            },
            CostComponent {
                component: CostComponentKind::DenialRiskReserve,
                amount: expected_loss.round_dp(2),
                detail: format!(
                    "{}% denial probability × {}% loss severity on projected revenue",
                    (denial_probability * dec!(100)).round_dp(1),
                    (self.denial_risk.loss_severity * dec!(100)).round_dp(0)
                ),
            },
        ];

        let total: Decimal = components.iter().map(|component| component.amount).sum();
        let per_diem = (total / days).round_dp(2);

        CostBreakdown {
            components,
            total,
            per_diem,
            denial_probability,
            los,
        }
    }
}
