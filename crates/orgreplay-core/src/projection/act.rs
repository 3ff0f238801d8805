//! Act projection: the current narrative phase.

use orgreplay_types::{ActCatalog, ActState, EventBody, ProjectionKind, ReplayEvent};
use tracing::warn;

use super::{Effects, EventContext, Projection};

/// Current act. Starts at act 0 and only moves forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActProjection {
    state: ActState,
}

impl ActProjection {
    /// Initial state: act 0 with the catalog's first entry.
    pub fn new(catalog: &ActCatalog) -> Self {
        Self {
            state: resolve(catalog, 0, None, None),
        }
    }

    /// Current act.
    pub const fn state(&self) -> &ActState {
        &self.state
    }
}

/// Build the act state for `num`, preferring explicit overrides over the
/// catalog entry.
fn resolve(catalog: &ActCatalog, num: u32, name: Option<&str>, narrative: Option<&str>) -> ActState {
    let def = catalog.get(num);
    ActState {
        num,
        name: name
            .or_else(|| def.map(|d| d.name.as_str()))
            .unwrap_or_default()
            .to_owned(),
        narrative: narrative
            .or_else(|| def.map(|d| d.narrative.as_str()))
            .unwrap_or_default()
            .to_owned(),
    }
}

impl Projection for ActProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Act
    }

    fn apply(&mut self, event: &ReplayEvent, ctx: &EventContext<'_>, _effects: &mut Effects) -> bool {
        let EventBody::ActChange(data) = &event.body else {
            return false;
        };
        if data.act < self.state.num {
            warn!(
                tick = event.tick,
                current = self.state.num,
                requested = data.act,
                "Backward act change ignored"
            );
            return false;
        }
        let next = resolve(
            ctx.catalog,
            data.act,
            data.name.as_deref(),
            data.narrative.as_deref(),
        );
        if next == self.state {
            return false;
        }
        self.state = next;
        true
    }
}
