//! Presence tracking configuration.

use serde::{Deserialize, Serialize};

/// Limits and retry policy for attendance events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Place recorded when the caller omits one.
    #[serde(default = "default_place")]
    pub default_place: String,
    /// Maximum length of the `place` tag, in characters.
    #[serde(default = "default_max_place")]
    pub max_place_length: usize,
    /// Maximum length of the free-text note, in characters.
    #[serde(default = "default_max_note")]
    pub max_note_length: usize,
    /// How many times an uncommitted storage failure is retried.
    #[serde(default = "default_retry_attempts")]
    pub storage_retry_attempts: u32,
    /// Base backoff between storage retries, in milliseconds.
    #[serde(default = "default_retry_backoff")]
    pub storage_retry_backoff_ms: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            default_place: default_place(),
            max_place_length: default_max_place(),
            max_note_length: default_max_note(),
            storage_retry_attempts: default_retry_attempts(),
            storage_retry_backoff_ms: default_retry_backoff(),
        }
    }
}

fn default_place() -> String {
    "room".to_string()
}

fn default_max_place() -> usize {
    64
}

fn default_max_note() -> usize {
    500
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_backoff() -> u64 {
    50
}
