//! Bundled replay scenarios.
//!
//! Currently one scenario: the 150-tick "10,000 Krabby Patties" run at the
//! Krusty Krab, in five acts. [`timeline`] returns the event script,
//! [`registry`] the participants and their reporting lines, and [`acts`]
//! the act catalog indexed from 0.

pub mod krusty_krab;

pub use krusty_krab::{DELIVERY_LEAD, END_TICK, QUEUE_OWNER, acts, registry, timeline};

/// The Krusty Krab scenario as one bundle.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Event script in tick order.
    pub timeline: Vec<orgreplay_types::ReplayEvent>,
    /// Participants and reporting lines.
    pub registry: orgreplay_types::ParticipantRegistry,
    /// Act names and narratives.
    pub acts: orgreplay_types::ActCatalog,
}

/// Build the bundled scenario.
pub fn bundled() -> Scenario {
    Scenario {
        timeline: timeline(),
        registry: registry(),
        acts: acts(),
    }
}
