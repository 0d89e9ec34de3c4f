use std::time::Duration;

/// Errors from a device engine.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device did not deliver a frame in time.
    #[error("device did not produce a frame within {0:?}")]
    Timeout(Duration),

    /// The device reported a capture fault.
    #[error("device fault: {0}")]
    Fault(String),

    /// The device is no longer reachable.
    #[error("device disconnected")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, DeviceError>;
