//! Progress header: act banner and progress toward the delivery target.

use rust_decimal::Decimal;
use serde::Serialize;
use ts_rs::TS;

use crate::config::RenderConfig;
use crate::dispatcher::ReplayFrame;

/// Banner above the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ProgressHeader {
    /// Act number.
    pub act: u32,
    /// Act title.
    pub act_name: String,
    /// Act narrative.
    pub narrative: String,
    /// Current value of the progress stat.
    #[ts(type = "string")]
    pub value: Decimal,
    /// Value counting as complete.
    pub target: u64,
    /// Percent of target, capped at 100.
    #[ts(type = "string")]
    pub percent: Decimal,
}

impl ProgressHeader {
    /// Build the header for one frame.
    pub fn build(frame: &ReplayFrame, config: &RenderConfig) -> Self {
        let value = frame.stats.get_or_zero(&config.progress_stat);
        let percent = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(Decimal::from(config.progress_target)))
            .unwrap_or(Decimal::ZERO)
            .min(Decimal::ONE_HUNDRED)
            .round_dp(2);
        Self {
            act: frame.act.num,
            act_name: frame.act.name.clone(),
            narrative: frame.act.narrative.clone(),
            value,
            target: config.progress_target,
            percent,
        }
    }

    /// Whether the target has been reached.
    pub fn is_complete(&self) -> bool {
        self.percent >= Decimal::ONE_HUNDRED
    }
}
