use std::time::Duration;

use acqcore_frame::{Frame, FrameFormat};

use crate::error::Result;

/// The seam between the acquisition core and an image source.
///
/// Implementations capture from real or simulated hardware; the core never
/// assumes anything beyond these operations. `produce_frame` must
/// return within `timeout` (success or [`crate::DeviceError::Timeout`]) —
/// the session's stop latency is bounded by it.
pub trait DeviceEngine: Send {
    /// Capture one frame, waiting at most `timeout`.
    ///
    /// The frame number in the returned metadata is not meaningful; the
    /// session stamps its own numbering.
    fn produce_frame(&mut self, timeout: Duration) -> Result<Frame>;

    /// Whether the device is currently mid-capture.
    fn is_busy(&self) -> bool;

    /// Current frame format; fixed for the lifetime of an acquisition run.
    fn format(&self) -> FrameFormat;

    /// Exposure applied to new frames, in milliseconds.
    fn exposure_ms(&self) -> f64;

    /// Change the exposure for subsequent frames. Argument validation
    /// happens above this seam; implementations may still reject values
    /// the hardware cannot honor.
    fn set_exposure_ms(&mut self, exposure_ms: f64) -> Result<()>;
}
