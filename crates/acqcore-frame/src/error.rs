/// Errors from frame construction and copy-out.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Destination buffer length does not match the frame byte size.
    #[error("destination length {got} does not match frame byte size {expected}")]
    SizeMismatch { expected: usize, got: usize },

    /// Pixel payload length does not match the declared format.
    #[error("pixel payload length {got} does not match format byte size {expected}")]
    PayloadMismatch { expected: usize, got: usize },

    /// A frame format dimension is zero.
    #[error("frame format has a zero dimension: {width}x{height}x{bytes_per_pixel}")]
    ZeroDimension {
        width: u32,
        height: u32,
        bytes_per_pixel: u32,
    },
}

pub type Result<T> = std::result::Result<T, FrameError>;
