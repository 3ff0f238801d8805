//! Stats projection: one snapshot merged field by field.
//!
//! Fields designated cumulative may not decrease. A decreasing update is
//! reported as a [`StatRegression`] and, unless configured otherwise, the
//! field keeps its previous value.

use std::collections::BTreeSet;

use orgreplay_types::{EventBody, ProjectionKind, ReplayEvent, StatsSnapshot};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Effects, EventContext, Projection};

/// A cumulative field that an update tried to lower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRegression {
    /// Field name.
    pub field: String,
    /// Value before the update.
    pub previous: Decimal,
    /// Value the update carried.
    pub attempted: Decimal,
    /// Tick of the offending update.
    pub tick: u64,
    /// Whether the lower value was applied anyway.
    pub applied: bool,
}

/// Latest aggregate metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsProjection {
    snapshot: StatsSnapshot,
    cumulative: BTreeSet<String>,
    allow_regression: bool,
}

impl StatsProjection {
    /// Empty snapshot validating the given cumulative fields.
    pub fn new(cumulative: BTreeSet<String>, allow_regression: bool) -> Self {
        Self {
            snapshot: StatsSnapshot::default(),
            cumulative,
            allow_regression,
        }
    }

    /// Current snapshot.
    pub const fn snapshot(&self) -> &StatsSnapshot {
        &self.snapshot
    }
}

impl Projection for StatsProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Stats
    }

    fn apply(&mut self, event: &ReplayEvent, _ctx: &EventContext<'_>, effects: &mut Effects) -> bool {
        let EventBody::StatUpdate(update) = &event.body else {
            return false;
        };
        let mut changed = false;
        for (field, &value) in &update.stats {
            let previous = self.snapshot.get(field);
            if let Some(previous) = previous {
                if value < previous && self.cumulative.contains(field) {
                    let applied = self.allow_regression;
                    warn!(
                        tick = event.tick,
                        field = %field,
                        previous = %previous,
                        attempted = %value,
                        applied,
                        "Cumulative stat regression"
                    );
                    effects.regressions.push(StatRegression {
                        field: field.clone(),
                        previous,
                        attempted: value,
                        tick: event.tick,
                        applied,
                    });
                    if !applied {
                        continue;
                    }
                }
            }
            if previous != Some(value) {
                self.snapshot.fields.insert(field.clone(), value);
                changed = true;
            }
        }
        changed
    }
}
