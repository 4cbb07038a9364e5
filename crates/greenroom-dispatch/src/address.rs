//! Address detection: deciding which agent an utterance was directed at.
//!
//! Resolution walks a fixed priority chain (explicit name match, DM puppet
//! override, last-speaker continuation, single-active fallback) and
//! produces exactly one agent ID or nothing. The order is a deliberate
//! design choice, not negotiable per call.

use crate::registry::Registry;
use std::collections::HashMap;

/// Name words shorter than this are not indexed ("Li" would match inside
/// half the dictionary).
const MIN_FRAGMENT_LEN: usize = 3;

/// Searchable index over the current agent set.
///
/// For each agent, its lowercase full name and every lowercase name word of
/// at least [`MIN_FRAGMENT_LEN`] characters map to the agent's ID. A second
/// view keeps the same entries sorted by descending key length so a full
/// multi-word name ("grimjaw the blacksmith") wins over a shorter fragment
/// ("grimjaw") when both occur in the text.
///
/// Derived data: rebuilt wholesale whenever the agent set changes, never
/// patched, always reconstructible from the registry.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    keys: HashMap<String, String>,
    /// `keys` re-sorted longest-key-first (ties broken lexicographically).
    ordered: Vec<(String, String)>,
}

impl NameIndex {
    /// Builds the index from `(agent id, display name)` pairs.
    ///
    /// When two agents share a name word, the lexicographically first agent
    /// ID claims the key, deterministically.
    pub fn build<'a>(agents: impl Iterator<Item = (&'a str, &'a str)>) -> Self {
        let mut pairs: Vec<(&str, &str)> = agents.collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));

        let mut keys: HashMap<String, String> = HashMap::new();
        for (id, name) in pairs {
            let full = name.to_lowercase();
            for word in full
                .split_whitespace()
                .filter(|word| word.len() >= MIN_FRAGMENT_LEN)
            {
                keys.entry(word.to_string())
                    .or_insert_with(|| id.to_string());
            }
            keys.entry(full).or_insert_with(|| id.to_string());
        }

        let mut ordered: Vec<(String, String)> = keys
            .iter()
            .map(|(key, id)| (key.clone(), id.clone()))
            .collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self { keys, ordered }
    }

    /// Returns the agent ID of the first (longest) key contained in
    /// `lowered_text`.
    ///
    /// This is substring containment, not word-boundary matching: a short
    /// indexed fragment can match inside an unrelated longer word. The
    /// looseness tolerates misheard speech from the transcription pipeline
    /// and is pinned by tests.
    pub fn find(&self, lowered_text: &str) -> Option<&str> {
        self.ordered
            .iter()
            .find(|(key, _)| lowered_text.contains(key.as_str()))
            .map(|(_, id)| id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Resolves the target agent for an utterance, or `None` for no-target.
///
/// Priority order, first match wins:
///
/// 1. Explicit name match in the text. Addressing a muted agent by name is
///    a dead end: resolution stops with no-target rather than falling
///    through to a different agent the player did not name.
/// 2. DM puppet override for the speaker, if the target is still active.
/// 3. Last-speaker continuation, if that agent is still active.
/// 4. Single active fallback: exactly one unmuted agent takes everything.
pub fn resolve_target(registry: &Registry, speaker_id: &str, text: &str) -> Option<String> {
    let lowered = text.to_lowercase();

    if let Some(id) = registry.index().find(&lowered) {
        return registry.is_active(id).then(|| id.to_string());
    }

    if let Some(target) = registry.puppet_for(speaker_id) {
        if registry.is_active(target) {
            return Some(target.to_string());
        }
    }

    if let Some(last) = registry.last_speaker() {
        if registry.is_active(last) {
            return Some(last.to_string());
        }
    }

    registry.sole_active().map(str::to_string)
}
