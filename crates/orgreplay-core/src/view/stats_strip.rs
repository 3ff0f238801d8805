//! Rolling stats bar.

use orgreplay_types::StatsSnapshot;
use rust_decimal::Decimal;
use serde::Serialize;
use ts_rs::TS;

use crate::config::ProjectionConfig;

/// Kitchen rate that fills the kitchen bar.
pub const KITCHEN_BAR_MAX: u32 = 50;

/// Delivery rate that fills the delivery bar.
pub const DELIVERY_BAR_MAX: u32 = 25;

/// Queue length above which the queue reads elevated.
pub const QUEUE_ELEVATED_ABOVE: u32 = 1_000;

/// Queue length above which the queue reads critical.
pub const QUEUE_CRITICAL_ABOVE: u32 = 2_000;

/// Severity of the order queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum QueueLevel {
    /// At most 1000.
    Normal,
    /// Above 1000, at most 2000.
    Elevated,
    /// Above 2000.
    Critical,
}

impl QueueLevel {
    /// Classify a queue length.
    pub fn classify(queue: Decimal) -> Self {
        if queue > Decimal::from(QUEUE_CRITICAL_ABOVE) {
            Self::Critical
        } else if queue > Decimal::from(QUEUE_ELEVATED_ABOVE) {
            Self::Elevated
        } else {
            Self::Normal
        }
    }

    /// CSS color for the queue figure.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Normal => "#22d3ee",
            Self::Elevated => "#eab308",
            Self::Critical => "#ef4444",
        }
    }
}

/// Figures shown in the stats bar. Missing fields read as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StatsStrip {
    /// Patties per tick from the kitchen.
    #[ts(type = "string")]
    pub kitchen_rate: Decimal,
    /// Kitchen bar fill, 0 to 100.
    #[ts(type = "string")]
    pub kitchen_bar: Decimal,
    /// Orders waiting.
    #[ts(type = "string")]
    pub queue_size: Decimal,
    /// Queue severity.
    pub queue_level: QueueLevel,
    /// Orders delivered per tick.
    #[ts(type = "string")]
    pub delivery_rate: Decimal,
    /// Delivery bar fill, 0 to 100.
    #[ts(type = "string")]
    pub delivery_bar: Decimal,
    /// Revenue in credits.
    #[ts(type = "string")]
    pub revenue: Decimal,
    /// Margin percent, one decimal place.
    #[ts(type = "string")]
    pub margin: Decimal,
    /// Budget used, percent.
    #[ts(type = "string")]
    pub budget_used: Decimal,
}

impl StatsStrip {
    /// Read the bar's figures from a snapshot. The queue figure comes from
    /// the configured queue stat.
    pub fn build(stats: &StatsSnapshot, config: &ProjectionConfig) -> Self {
        let kitchen_rate = stats.get_or_zero("kitchenRate");
        let delivery_rate = stats.get_or_zero("deliveryRate");
        let queue_size = stats.get_or_zero(&config.queue_stat);
        Self {
            kitchen_rate,
            kitchen_bar: bar_fill(kitchen_rate, KITCHEN_BAR_MAX),
            queue_size,
            queue_level: QueueLevel::classify(queue_size),
            delivery_rate,
            delivery_bar: bar_fill(delivery_rate, DELIVERY_BAR_MAX),
            revenue: stats.get_or_zero("revenue"),
            margin: stats.get_or_zero("margin").round_dp(1),
            budget_used: stats.get_or_zero("budgetUsed"),
        }
    }
}

/// Percent of `max` covered by `value`, clamped to 0..=100.
fn bar_fill(value: Decimal, max: u32) -> Decimal {
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(Decimal::from(max)))
        .unwrap_or(Decimal::ZERO)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .round_dp(2)
}
