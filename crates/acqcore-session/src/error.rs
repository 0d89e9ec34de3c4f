use std::time::Duration;

/// Errors from session and core-instance operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A sequence acquisition is already running.
    #[error("sequence acquisition already running")]
    AlreadyRunning,

    /// Operation requires an idle session.
    #[error("{0} while sequence acquisition is running")]
    Busy(&'static str),

    /// No image has been snapped yet.
    #[error("no snapped image available")]
    NoSnappedImage,

    /// Buffer-level error.
    #[error("buffer error: {0}")]
    Buffer(#[from] acqcore_buffer::BufferError),

    /// Device-level error.
    #[error("device error: {0}")]
    Device(#[from] acqcore_device::DeviceError),

    /// Malformed argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The producer did not acknowledge a stop request in time.
    #[error("producer did not stop within {0:?}")]
    StopTimeout(Duration),
}

pub type Result<T> = std::result::Result<T, SessionError>;
