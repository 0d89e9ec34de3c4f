use std::time::Duration;

use bytes::Bytes;

use crate::error::{FrameError, Result};
use crate::format::FrameFormat;

/// Per-frame metadata.
///
/// The frame number is assigned by the acquisition session, monotonically
/// increasing from 0 within a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMeta {
    /// Position of this frame within the acquisition run.
    pub number: u64,
    /// Time since the run started when the frame was captured.
    pub elapsed: Duration,
    /// Exposure used for this frame, in milliseconds.
    pub exposure_ms: f64,
}

impl FrameMeta {
    /// Metadata for a frame captured outside a sequence run.
    pub fn single(exposure_ms: f64) -> Self {
        Self {
            number: 0,
            elapsed: Duration::ZERO,
            exposure_ms,
        }
    }
}

/// One acquired image: immutable pixels plus metadata.
///
/// Pixel storage is private; consumers copy out with [`Frame::copy_into`].
/// Cloning is cheap (the payload is reference-counted).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Pixel geometry of the payload.
    pub format: FrameFormat,
    /// Frame metadata.
    pub meta: FrameMeta,
    pixels: Bytes,
}

impl Frame {
    /// Create a frame, validating that the payload matches the format.
    pub fn new(format: FrameFormat, meta: FrameMeta, pixels: impl Into<Bytes>) -> Result<Self> {
        let pixels = pixels.into();
        if pixels.len() != format.byte_size() {
            return Err(FrameError::PayloadMismatch {
                expected: format.byte_size(),
                got: pixels.len(),
            });
        }
        Ok(Self {
            format,
            meta,
            pixels,
        })
    }

    /// Size of the pixel payload in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Borrow the pixel payload.
    pub fn pixels(&self) -> &[u8] {
        self.pixels.as_ref()
    }

    /// Copy the pixel payload into caller-supplied storage.
    ///
    /// The destination length must equal the frame byte size exactly;
    /// anything else fails with [`FrameError::SizeMismatch`].
    pub fn copy_into(&self, dest: &mut [u8]) -> Result<()> {
        if dest.len() != self.pixels.len() {
            return Err(FrameError::SizeMismatch {
                expected: self.pixels.len(),
                got: dest.len(),
            });
        }
        dest.copy_from_slice(self.pixels.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_4x4() -> FrameFormat {
        FrameFormat::new(4, 4, 1, 8).unwrap()
    }

    #[test]
    fn new_rejects_payload_mismatch() {
        let err = Frame::new(format_4x4(), FrameMeta::single(10.0), vec![0u8; 15]).unwrap_err();
        assert!(matches!(err, FrameError::PayloadMismatch { .. }));
    }

    #[test]
    fn copy_into_exact_size() {
        let frame = Frame::new(format_4x4(), FrameMeta::single(10.0), vec![7u8; 16]).unwrap();
        let mut dest = [0u8; 16];
        frame.copy_into(&mut dest).unwrap();
        assert_eq!(dest, [7u8; 16]);
    }

    #[test]
    fn copy_into_rejects_wrong_size() {
        let frame = Frame::new(format_4x4(), FrameMeta::single(10.0), vec![7u8; 16]).unwrap();

        let mut short = [0u8; 15];
        let err = frame.copy_into(&mut short).unwrap_err();
        assert!(matches!(
            err,
            FrameError::SizeMismatch {
                expected: 16,
                got: 15
            }
        ));

        let mut long = [0u8; 17];
        assert!(frame.copy_into(&mut long).is_err());
    }

    #[test]
    fn clone_shares_payload() {
        let frame = Frame::new(format_4x4(), FrameMeta::single(10.0), vec![1u8; 16]).unwrap();
        let copy = frame.clone();
        assert_eq!(copy.pixels(), frame.pixels());
        assert_eq!(copy.meta.number, 0);
    }
}
