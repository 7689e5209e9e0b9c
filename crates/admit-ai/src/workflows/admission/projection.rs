use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::costs::CostBreakdown;
use super::revenue::RevenueBreakdown;

/// Combined financial picture for one stay. Recomputed fresh on every
/// evaluation; a negative margin is a valid business outcome, not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialProjection {
    pub revenue: RevenueBreakdown,
    pub cost: CostBreakdown,
    pub margin_total: Decimal,
    pub margin_per_diem: Decimal,
    /// Margin as a percentage of revenue; zero when revenue is zero.
    pub margin_pct: Decimal,
    pub los: u16,
}

impl FinancialProjection {
    pub fn new(revenue: RevenueBreakdown, cost: CostBreakdown) -> Self {
        let los = revenue.los;
        let margin_total = revenue.total - cost.total;
        let margin_per_diem = (margin_total / Decimal::from(los.max(1))).round_dp(2);
        let margin_pct = if revenue.total > Decimal::ZERO {
            (margin_total / revenue.total * dec!(100)).round_dp(1)
        } else {
            Decimal::ZERO
        };

        Self {
            revenue,
            cost,
            margin_total,
            margin_per_diem,
            margin_pct,
            los,
        }
    }
}
