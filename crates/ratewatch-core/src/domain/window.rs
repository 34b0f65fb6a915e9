use serde::{Deserialize, Serialize};

/// Request timestamps recorded for one client, oldest first.
///
/// Serialized as a bare JSON array of epoch seconds so the cached value stays
/// readable from any client of the shared store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientWindow {
    timestamps: Vec<f64>,
}

impl ClientWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_timestamps(timestamps: Vec<f64>) -> Self {
        Self { timestamps }
    }

    /// Parse a cached value.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Slide the window to `now`: drop everything at or before
    /// `now - window_secs`, then record `now`.
    ///
    /// Eviction runs before the append, so the entry for `now` survives even if
    /// the clock stepped backwards.
    pub fn advance(&mut self, now: f64, window_secs: f64) {
        let cutoff = now - window_secs;
        self.timestamps.retain(|&t| t > cutoff);
        self.timestamps.push(now);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }
}
