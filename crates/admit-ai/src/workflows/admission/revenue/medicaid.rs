use rust_decimal::Decimal;

use super::super::classification::CaseMixClassification;
use super::super::rates::{AddOnCondition, MedicaidRates};
use super::{RevenueComponent, RevenueComponentKind};

/// Medicaid projection: facility base per-diem plus the high-acuity
/// add-ons triggered by the resident's special-care flags, all scaled by
/// the stay length. Infallible once the LOS is validated.
pub(super) fn project(
    case_mix: &CaseMixClassification,
    rates: &MedicaidRates,
    los: u16,
) -> Vec<RevenueComponent> {
    let days = Decimal::from(los);

    let mut components = vec![RevenueComponent {
        component: RevenueComponentKind::BaseRate,
        amount: rates.base_per_diem * days,
        detail: format!("base {}/day for {los} day(s)", rates.base_per_diem),
    }];

    for add_on in &rates.add_ons {
        let triggered = match add_on.condition {
            AddOnCondition::Ventilator => case_mix.special_care.ventilator,
            AddOnCondition::Bariatric => case_mix.special_care.bariatric,
            AddOnCondition::IvAntibiotics => case_mix.special_care.iv_antibiotics,
        };
        if triggered {
            components.push(RevenueComponent {
                component: RevenueComponentKind::AcuityAddOn,
                amount: add_on.per_diem * days,
                detail: format!(
                    "{} add-on {}/day",
                    add_on.condition.label(),
                    add_on.per_diem
                ),
            });
        }
    }

    components
}
