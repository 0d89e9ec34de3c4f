use std::time::Duration;

use acqcore_frame::{Frame, FrameFormat, FrameMeta};
use tracing::debug;

use crate::engine::DeviceEngine;
use crate::error::{DeviceError, Result};

const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_EXPOSURE_MS: f64 = 10.0;

/// Simulated camera.
///
/// Produces synthetic 8-bit gradient frames at a configurable readout time.
/// Faults can be injected after a given frame count to exercise the
/// session's fault path.
pub struct SimCamera {
    format: FrameFormat,
    exposure_ms: f64,
    readout: Duration,
    produced: u64,
    fail_after: Option<u64>,
    capturing: bool,
}

impl SimCamera {
    /// Create a camera with the default 640x480 8-bit format and no readout
    /// delay.
    pub fn new() -> Self {
        let format = FrameFormat {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            bytes_per_pixel: 1,
            bit_depth: 8,
        };
        Self {
            format,
            exposure_ms: DEFAULT_EXPOSURE_MS,
            readout: Duration::ZERO,
            produced: 0,
            fail_after: None,
            capturing: false,
        }
    }

    /// Override the frame format.
    pub fn with_format(mut self, format: FrameFormat) -> Self {
        self.format = format;
        self
    }

    /// Override the simulated readout time per frame.
    pub fn with_readout(mut self, readout: Duration) -> Self {
        self.readout = readout;
        self
    }

    /// Override the reported exposure.
    pub fn with_exposure_ms(mut self, exposure_ms: f64) -> Self {
        self.exposure_ms = exposure_ms;
        self
    }

    /// Fail with a device fault once `count` frames have been produced.
    pub fn with_fail_after(mut self, count: u64) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Total frames produced since creation.
    pub fn frames_produced(&self) -> u64 {
        self.produced
    }

    fn render(&self) -> Vec<u8> {
        let width = self.format.width as usize;
        let height = self.format.height as usize;
        let bpp = self.format.bytes_per_pixel as usize;
        let shift = self.produced as usize;

        // Diagonal gradient shifted by frame index so consecutive frames
        // differ.
        let mut pixels = vec![0u8; width * height * bpp];
        for y in 0..height {
            for x in 0..width {
                let value = ((x + y + shift) % 256) as u8;
                let offset = (y * width + x) * bpp;
                pixels[offset] = value;
            }
        }
        pixels
    }
}

impl Default for SimCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceEngine for SimCamera {
    fn produce_frame(&mut self, timeout: Duration) -> Result<Frame> {
        if let Some(limit) = self.fail_after {
            if self.produced >= limit {
                return Err(DeviceError::Fault(format!(
                    "injected fault after {limit} frames"
                )));
            }
        }
        if self.readout > timeout {
            return Err(DeviceError::Timeout(timeout));
        }

        self.capturing = true;
        if !self.readout.is_zero() {
            std::thread::sleep(self.readout);
        }
        let pixels = self.render();
        self.capturing = false;

        self.produced += 1;
        debug!(produced = self.produced, "sim camera captured frame");

        let meta = FrameMeta::single(self.exposure_ms);
        Frame::new(self.format, meta, pixels)
            .map_err(|err| DeviceError::Fault(format!("frame assembly failed: {err}")))
    }

    fn is_busy(&self) -> bool {
        self.capturing
    }

    fn format(&self) -> FrameFormat {
        self.format
    }

    fn exposure_ms(&self) -> f64 {
        self.exposure_ms
    }

    fn set_exposure_ms(&mut self, exposure_ms: f64) -> Result<()> {
        self.exposure_ms = exposure_ms;
        Ok(())
    }
}
