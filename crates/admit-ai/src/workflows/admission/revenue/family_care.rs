use rust_decimal::Decimal;

use super::super::classification::CaseMixClassification;
use super::super::rates::FamilyCareMatrix;
use super::{component_rate, RevenueComponent, RevenueComponentKind, RevenueError};

/// Family Care MCO projection: per-diems looked up from the
/// (nursing group, NTA band) rate matrix and scaled by the stay length.
pub(super) fn project(
    case_mix: &CaseMixClassification,
    matrix: &FamilyCareMatrix,
    los: u16,
) -> Result<Vec<RevenueComponent>, RevenueError> {
    let nursing_rate = component_rate(
        &matrix.nursing,
        &case_mix.nursing_group,
        "nursing matrix",
        case_mix.nursing_group.code(),
    )?;
    let nta_rate = component_rate(
        &matrix.nta,
        &case_mix.nta_band,
        "NTA matrix",
        case_mix.nta_band.label(),
    )?;

    let days = Decimal::from(los);
    Ok(vec![
        RevenueComponent {
            component: RevenueComponentKind::Nursing,
            amount: nursing_rate * days,
            detail: format!(
                "{} matrix rate {nursing_rate}/day",
                case_mix.nursing_group.code()
            ),
        },
        RevenueComponent {
            component: RevenueComponentKind::NonTherapyAncillary,
            amount: nta_rate * days,
            detail: format!(
                "NTA band {} matrix rate {nta_rate}/day",
                case_mix.nta_band.label()
            ),
        },
    ])
}
