use serde::{Deserialize, Serialize};

/// Per-session tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiescence window for coalescing window-change requests, in ms.
    pub resize_debounce_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 50,
        }
    }
}
