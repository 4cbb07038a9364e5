//! Dispatch layer configuration.

use serde::Deserialize;

/// Top-level dispatch configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DispatchConfig {
    /// Shared utterance buffer bounds.
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Context injection settings.
    #[serde(default)]
    pub context: ContextConfig,
}

/// Bounds for the shared utterance buffer.
#[derive(Debug, Clone, Deserialize)]
pub struct BufferConfig {
    /// Maximum number of retained utterances.
    #[serde(default = "default_buffer_max_entries")]
    pub max_entries: usize,

    /// Maximum utterance age in seconds.
    #[serde(default = "default_buffer_max_age_secs")]
    pub max_age_secs: u64,
}

/// Settings for per-route context injection.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    /// Maximum number of recent utterances injected per routed turn.
    #[serde(default = "default_context_max_entries")]
    pub max_entries: usize,
}

fn default_buffer_max_entries() -> usize {
    50
}

fn default_buffer_max_age_secs() -> u64 {
    300
}

fn default_context_max_entries() -> usize {
    12
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_entries: default_buffer_max_entries(),
            max_age_secs: default_buffer_max_age_secs(),
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_entries: default_context_max_entries(),
        }
    }
}
