//! Injected lookup tables: who the participants are and what the acts
//! are called.
//!
//! Both are read-only values handed to the engine at construction time,
//! so several engines with different registries can live side by side.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ParticipantId;

/// Glyph shown for participants missing from the registry.
pub const PLACEHOLDER_EMOJI: &str = "🐟";

/// Display metadata for one registered participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ParticipantProfile {
    /// Identifier used by events.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Display glyph.
    pub emoji: String,
    /// Optional avatar image path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Manager in the base org tree, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reports_to: Option<ParticipantId>,
}

/// A participant label resolved through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedParticipant<'a> {
    /// The id that was looked up.
    pub id: &'a ParticipantId,
    /// Display name (the raw id for unknown participants).
    pub name: &'a str,
    /// Display glyph ([`PLACEHOLDER_EMOJI`] for unknown participants).
    pub emoji: &'a str,
    /// Avatar path, when registered.
    pub avatar_url: Option<&'a str>,
    /// Whether the id was found in the registry.
    pub known: bool,
}

/// Static id to display-metadata lookup.
///
/// Registration order is preserved; the org chart renders participants
/// in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantRegistry {
    profiles: Vec<ParticipantProfile>,
    index: BTreeMap<ParticipantId, usize>,
}

impl ParticipantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant. A later registration under the same id
    /// replaces the earlier profile in place.
    pub fn insert(&mut self, profile: ParticipantProfile) {
        if let Some(slot) = self
            .index
            .get(&profile.id)
            .and_then(|&i| self.profiles.get_mut(i))
        {
            *slot = profile;
            return;
        }
        self.index.insert(profile.id.clone(), self.profiles.len());
        self.profiles.push(profile);
    }

    /// Look up a registered profile.
    pub fn get(&self, id: &ParticipantId) -> Option<&ParticipantProfile> {
        self.index.get(id).and_then(|&i| self.profiles.get(i))
    }

    /// Resolve display metadata, falling back to a placeholder for
    /// unknown ids. Never fails.
    pub fn resolve<'a>(&'a self, id: &'a ParticipantId) -> ResolvedParticipant<'a> {
        self.get(id).map_or(
            ResolvedParticipant {
                id,
                name: id.as_str(),
                emoji: PLACEHOLDER_EMOJI,
                avatar_url: None,
                known: false,
            },
            |profile| ResolvedParticipant {
                id,
                name: &profile.name,
                emoji: &profile.emoji,
                avatar_url: profile.avatar_url.as_deref(),
                known: true,
            },
        )
    }

    /// All profiles in registration order.
    pub fn profiles(&self) -> &[ParticipantProfile] {
        &self.profiles
    }

    /// Number of registered participants.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl FromIterator<ParticipantProfile> for ParticipantRegistry {
    fn from_iter<I: IntoIterator<Item = ParticipantProfile>>(iter: I) -> Self {
        let mut registry = Self::new();
        for profile in iter {
            registry.insert(profile);
        }
        registry
    }
}

/// Catalog entry for one narrative act.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ActDef {
    /// Banner title.
    pub name: String,
    /// One-line narrative.
    pub narrative: String,
}

/// Ordered list of acts. Act number `n` is the entry at index `n`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActCatalog {
    acts: Vec<ActDef>,
}

impl ActCatalog {
    /// Build a catalog from act definitions in order.
    pub const fn new(acts: Vec<ActDef>) -> Self {
        Self { acts }
    }

    /// Definition for an act number.
    pub fn get(&self, num: u32) -> Option<&ActDef> {
        usize::try_from(num).ok().and_then(|i| self.acts.get(i))
    }

    /// Number of catalogued acts.
    pub fn len(&self) -> usize {
        self.acts.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.acts.is_empty()
    }
}
