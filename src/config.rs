//! Client configuration

use serde::{Deserialize, Serialize};

/// Tunables for the optimistic coordinators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Collections holding a longer key are reported as needing a rebalance
    pub max_key_len: usize,

    /// Notifications buffered per subscriber before the oldest are dropped
    pub notice_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_key_len: 24,
            notice_capacity: 64,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_key_len(mut self, max_key_len: usize) -> Self {
        self.max_key_len = max_key_len;
        self
    }

    pub fn with_notice_capacity(mut self, capacity: usize) -> Self {
        // broadcast channels need room for at least one message
        self.notice_capacity = capacity.max(1);
        self
    }
}
