/// Errors from circular buffer operations.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// No frames queued.
    #[error("no frames queued in the circular buffer")]
    Empty,

    /// The memory footprint cannot hold even one frame.
    #[error("memory footprint of {footprint} bytes is smaller than one {frame_size}-byte frame")]
    FootprintTooSmall { footprint: usize, frame_size: usize },

    /// Frame format change attempted while frames are still queued.
    #[error("frame format cannot change while {0} frames are queued")]
    FormatChangeWhileOccupied(usize),

    /// A pushed frame does not match the buffer's configured frame size.
    #[error("pushed frame is {got} bytes but the buffer expects {expected}-byte frames")]
    FrameSizeMismatch { expected: usize, got: usize },

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] acqcore_frame::FrameError),
}

pub type Result<T> = std::result::Result<T, BufferError>;
