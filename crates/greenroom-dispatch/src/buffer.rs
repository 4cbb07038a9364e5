//! The shared utterance buffer: short-term cross-agent conversation memory.
//!
//! An append-only log of recent utterances from players and agents, bounded
//! both by count and by age. Eviction runs on every insertion; a second,
//! lazy age filter is applied again at read time since time passes between
//! writes and reads.

use chrono::{DateTime, Duration, Utc};
use greenroom_types::HeardUtterance;

/// Ordered log of recent utterances, oldest first.
#[derive(Debug)]
pub struct UtteranceBuffer {
    entries: Vec<HeardUtterance>,
    max_entries: usize,
    max_age: Duration,
}

impl UtteranceBuffer {
    pub fn new(max_entries: usize, max_age: Duration) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
            max_age,
        }
    }

    /// Appends an entry, then evicts.
    ///
    /// After this call the log holds at most `max_entries` entries and no
    /// entry older than `max_age` as of now.
    pub fn add(&mut self, entry: HeardUtterance) {
        self.add_at(Utc::now(), entry);
    }

    fn add_at(&mut self, now: DateTime<Utc>, entry: HeardUtterance) {
        self.entries.push(entry);

        // Entries arrive in roughly timestamp order, so the expired ones
        // form a contiguous prefix.
        let cutoff = now - self.max_age;
        let mut start = 0;
        while start < self.entries.len() && self.entries[start].spoken_at < cutoff {
            start += 1;
        }
        start += (self.entries.len() - start).saturating_sub(self.max_entries);

        if start > 0 {
            // Materialize survivors into a fresh backing store so evicted
            // entries do not pin the old allocation.
            self.entries = self.entries[start..].to_vec();
        }
    }

    /// Returns up to `max_entries` entries newer than the age cutoff whose
    /// producing-NPC ID is not `exclude_npc`, in chronological order.
    ///
    /// Scans from the newest end until the limit or the cutoff is reached;
    /// `None` excludes nothing.
    pub fn recent(&self, exclude_npc: Option<&str>, max_entries: usize) -> Vec<HeardUtterance> {
        self.recent_at(Utc::now(), exclude_npc, max_entries)
    }

    fn recent_at(
        &self,
        now: DateTime<Utc>,
        exclude_npc: Option<&str>,
        max_entries: usize,
    ) -> Vec<HeardUtterance> {
        let cutoff = now - self.max_age;
        let mut picked = Vec::new();
        for entry in self.entries.iter().rev() {
            if picked.len() >= max_entries || entry.spoken_at < cutoff {
                break;
            }
            if exclude_npc.is_some() && entry.npc_id.as_deref() == exclude_npc {
                continue;
            }
            picked.push(entry.clone());
        }
        picked.reverse();
        picked
    }

    /// Full snapshot in chronological order, for diagnostics and tests.
    pub fn list(&self) -> Vec<HeardUtterance> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
