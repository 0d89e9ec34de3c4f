use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

/// Pixel geometry of an acquired image.
///
/// The frame byte size is always `width * height * bytes_per_pixel`; every
/// copy-out destination must match it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameFormat {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Bytes per pixel: usually 1 (8-bit gray), 2 (16-bit gray) or 4 (RGBA).
    pub bytes_per_pixel: u32,
    /// Dynamic range in bits per pixel.
    pub bit_depth: u32,
}

impl FrameFormat {
    /// Create a format, rejecting zero dimensions.
    pub fn new(width: u32, height: u32, bytes_per_pixel: u32, bit_depth: u32) -> Result<Self> {
        if width == 0 || height == 0 || bytes_per_pixel == 0 {
            return Err(FrameError::ZeroDimension {
                width,
                height,
                bytes_per_pixel,
            });
        }
        Ok(Self {
            width,
            height,
            bytes_per_pixel,
            bit_depth,
        })
    }

    /// Size of one frame in bytes.
    pub fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_pixel as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_size_is_product_of_dimensions() {
        let format = FrameFormat::new(640, 480, 2, 16).unwrap();
        assert_eq!(format.byte_size(), 640 * 480 * 2);
    }

    #[test]
    fn zero_dimension_rejected() {
        let err = FrameFormat::new(640, 0, 1, 8).unwrap_err();
        assert!(matches!(err, FrameError::ZeroDimension { .. }));
    }
}
