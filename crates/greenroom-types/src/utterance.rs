//! Utterance records shared between the dispatch layer and NPC engines.
//!
//! An [`Utterance`] is what a participant just said, as delivered by the
//! transcription pipeline. A [`HeardUtterance`] is the immutable record the
//! dispatch layer keeps in its shared conversation log and hands to NPC
//! engines as cross-agent context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single spoken utterance entering the dispatch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    /// Display name of the speaking participant.
    pub speaker_name: String,
    /// Transcribed text of the utterance.
    pub text: String,
}

impl Utterance {
    pub fn new(speaker_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker_name: speaker_name.into(),
            text: text.into(),
        }
    }
}

/// An immutable record of something said in the session.
///
/// Entries are never mutated after creation; consumers receive copies.
/// Player speech carries `npc_id: None`; lines produced by an NPC carry
/// the producing agent's ID so that agent's own lines can be excluded
/// when building its context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeardUtterance {
    /// Stable ID of the speaking participant.
    pub speaker_id: String,
    /// Display name of the speaking participant.
    pub speaker_name: String,
    /// Transcribed or generated text.
    pub text: String,
    /// ID of the NPC agent that produced this line, if any.
    pub npc_id: Option<String>,
    /// When the line was spoken.
    pub spoken_at: DateTime<Utc>,
}

impl HeardUtterance {
    /// Creates a record for a player (human) utterance.
    pub fn player(
        speaker_id: impl Into<String>,
        speaker_name: impl Into<String>,
        text: impl Into<String>,
        spoken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            speaker_name: speaker_name.into(),
            text: text.into(),
            npc_id: None,
            spoken_at,
        }
    }

    /// Creates a record for a line produced by an NPC agent.
    ///
    /// The agent ID doubles as the speaker ID: an NPC speaks as itself.
    pub fn npc(
        npc_id: impl Into<String>,
        npc_name: impl Into<String>,
        text: impl Into<String>,
        spoken_at: DateTime<Utc>,
    ) -> Self {
        let npc_id = npc_id.into();
        Self {
            speaker_id: npc_id.clone(),
            speaker_name: npc_name.into(),
            text: text.into(),
            npc_id: Some(npc_id),
            spoken_at,
        }
    }
}

/// Cross-agent context injected into an NPC engine before its turn.
///
/// Entries are in chronological (oldest-first) order and never include
/// lines the receiving agent produced itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextUpdate {
    /// Recent utterances from other participants and agents.
    pub entries: Vec<HeardUtterance>,
}
