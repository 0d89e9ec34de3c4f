use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_FOOTPRINT: usize = 32 * 1024 * 1024;

/// Behavior knobs for a [`crate::Core`] instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Memory budget for the circular buffer, in bytes. Capacity in frames
    /// is the floor of this divided by the frame byte size.
    pub buffer_footprint: usize,
    /// Upper bound on a single device capture.
    pub device_timeout: Duration,
    /// Upper bound on waiting for the producer to acknowledge a stop.
    pub stop_timeout: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            buffer_footprint: DEFAULT_FOOTPRINT,
            device_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
        }
    }
}
