//! Scene update payloads broadcast to NPC agents.

use serde::{Deserialize, Serialize};

/// A change of scene pushed to every active NPC agent.
///
/// Carries the narrative framing an agent needs to stay coherent when the
/// session moves on: what the scene is, and optionally where it takes place
/// and its overall mood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneUpdate {
    /// Free-text description of the current scene.
    pub description: String,
    /// Location name, if the scene is anchored somewhere.
    pub location: Option<String>,
    /// Overall mood or tone (e.g. "tense", "festive").
    pub mood: Option<String>,
}

impl SceneUpdate {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            location: None,
            mood: None,
        }
    }
}
