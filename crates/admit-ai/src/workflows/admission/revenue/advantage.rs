use rust_decimal::Decimal;

use super::super::classification::CaseMixClassification;
use super::super::rates::MaContract;
use super::{medicare, RevenueComponent, RevenueComponentKind, RevenueError};

/// Medicare Advantage / commercial projection across the three contract
/// shapes the plans negotiate.
pub(super) fn project(
    case_mix: &CaseMixClassification,
    contract: &MaContract,
    los: u16,
) -> Result<Vec<RevenueComponent>, RevenueError> {
    match contract {
        MaContract::FlatPerDiem { rate } => Ok(vec![RevenueComponent {
            component: RevenueComponentKind::ContractPerDiem,
            amount: *rate * Decimal::from(los),
            detail: format!("flat {rate}/day for {los} day(s)"),
        }]),
        MaContract::DayTiers { tiers } => {
            let mut components = Vec::new();
            for tier in tiers {
                let start = tier.from_day.max(1);
                let end = tier.to_day.unwrap_or(los).min(los);
                if end < start {
                    continue;
                }
                let covered = end - start + 1;
                let span = match tier.to_day {
                    Some(end) => format!("days {}-{}", tier.from_day, end),
                    None => format!("days {}+", tier.from_day),
                };
                components.push(RevenueComponent {
                    component: RevenueComponentKind::DayTier,
                    amount: tier.rate * Decimal::from(covered),
                    detail: format!("{span} @ {}/day ({covered} day(s) in stay)", tier.rate),
                });
            }

            // Every stay-day must land in a tier; a gap means the contract
            // configuration is incomplete.
            for day in 1..=los {
                if !tiers.iter().any(|tier| tier.covers(day)) {
                    return Err(RevenueError::MissingDayTier { day });
                }
            }

            Ok(components)
        }
        MaContract::PdpmMapped { rates, multiplier } => {
            // Plans mirror the FFS component math but skip the wage and VBP
            // adjustments and pay a negotiated fraction of table value.
            let components =
                medicare::project(case_mix, rates, los, Decimal::ONE, Decimal::ONE)?;
            Ok(components
                .into_iter()
                .map(|component| RevenueComponent {
                    amount: component.amount * multiplier,
                    detail: format!("{} at plan multiplier {multiplier}", component.detail),
                    component: component.component,
                })
                .collect())
        }
    }
}
