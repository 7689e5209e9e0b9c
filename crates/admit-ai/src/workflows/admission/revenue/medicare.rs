use rust_decimal::Decimal;

use super::super::classification::CaseMixClassification;
use super::super::rates::FfsRateTable;
use super::{component_rate, RevenueComponent, RevenueComponentKind, RevenueError};

/// Medicare FFS component projection. Therapy components follow the
/// declining variable per-diem schedule, the NTA component its own
/// full-window-then-taper policy; nursing and non-case-mix pay flat
/// per-diems. The wage index adjusts the labor share of the therapy and
/// nursing components, and the VBP multiplier scales nursing.
pub(super) fn project(
    case_mix: &CaseMixClassification,
    rates: &FfsRateTable,
    los: u16,
    wage_index: Decimal,
    vbp_multiplier: Decimal,
) -> Result<Vec<RevenueComponent>, RevenueError> {
    let pt_rate = component_rate(&rates.pt, &case_mix.pt_group, "PT", case_mix.pt_group.code())?;
    let ot_rate = component_rate(&rates.ot, &case_mix.ot_group, "OT", case_mix.ot_group.code())?;
    let nursing_rate = component_rate(
        &rates.nursing,
        &case_mix.nursing_group,
        "nursing",
        case_mix.nursing_group.code(),
    )?;
    let nta_rate = component_rate(
        &rates.nta,
        &case_mix.nta_band,
        "NTA",
        case_mix.nta_band.label(),
    )?;
    let slp_rate = if case_mix.slp_group.indicated() {
        component_rate(
            &rates.slp,
            &case_mix.slp_group,
            "SLP",
            case_mix.slp_group.code(),
        )?
    } else {
        Decimal::ZERO
    };

    let mut pt = Decimal::ZERO;
    let mut ot = Decimal::ZERO;
    let mut slp = Decimal::ZERO;
    let mut nta = Decimal::ZERO;

    for day in 1..=los {
        let therapy_factor = rates.therapy_vpd.factor_for(day);
        pt += pt_rate * therapy_factor;
        ot += ot_rate * therapy_factor;
        if case_mix.slp_group.indicated() {
            slp += slp_rate * therapy_factor;
        }
        nta += nta_rate * rates.nta_vpd.factor_for(day);
    }

    let days = Decimal::from(los);
    let nursing = nursing_rate * days;
    let non_case_mix = rates.non_case_mix * days;

    // Wage adjustment applies to the labor share of the case-mix labor
    // components only; NTA and non-case-mix stay at table value.
    let wage_factor = rates.labor_share * wage_index + (Decimal::ONE - rates.labor_share);

    let mut components = vec![
        RevenueComponent {
            component: RevenueComponentKind::PhysicalTherapy,
            amount: pt * wage_factor,
            detail: format!(
                "{} @ {pt_rate}/day with variable per-diem taper",
                case_mix.pt_group.code()
            ),
        },
        RevenueComponent {
            component: RevenueComponentKind::OccupationalTherapy,
            amount: ot * wage_factor,
            detail: format!(
                "{} @ {ot_rate}/day with variable per-diem taper",
                case_mix.ot_group.code()
            ),
        },
    ];

    if case_mix.slp_group.indicated() {
        components.push(RevenueComponent {
            component: RevenueComponentKind::SpeechTherapy,
            amount: slp * wage_factor,
            detail: format!(
                "{} @ {slp_rate}/day with variable per-diem taper",
                case_mix.slp_group.code()
            ),
        });
    }

    components.push(RevenueComponent {
        component: RevenueComponentKind::Nursing,
        amount: nursing * wage_factor * vbp_multiplier,
        detail: format!(
            "{} @ {nursing_rate}/day, VBP multiplier {vbp_multiplier}",
            case_mix.nursing_group.code()
        ),
    });
    components.push(RevenueComponent {
        component: RevenueComponentKind::NonTherapyAncillary,
        amount: nta,
        detail: format!(
            "band {} @ {nta_rate}/day, full value through day {}",
            case_mix.nta_band.label(),
            rates.nta_vpd.full_days
        ),
    });
    components.push(RevenueComponent {
        component: RevenueComponentKind::NonCaseMix,
        amount: non_case_mix,
        detail: format!("non-case-mix @ {}/day", rates.non_case_mix),
    });

    Ok(components)
}
