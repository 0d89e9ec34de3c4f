use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use acqcore_buffer::FrameBuffer;
use acqcore_device::DeviceEngine;
use acqcore_frame::{Frame, FrameFormat};
use tracing::{debug, info};

use crate::config::CoreConfig;
use crate::error::{Result, SessionError};
use crate::session::{AcqMode, AcquisitionSession, SessionFault};

/// Device engine shared between the core and the producer thread.
pub type SharedDevice = Arc<Mutex<Box<dyn DeviceEngine>>>;

/// The instance object behind the boundary: one circular buffer, one
/// session slot, one device engine, one snap slot.
///
/// All methods take `&self`; internal state is independently locked so
/// consumer polling never contends with anything but the producer's
/// buffer writes. Dropping a `Core` stops any running acquisition first.
pub struct Core {
    device: SharedDevice,
    format: FrameFormat,
    buffer: Arc<FrameBuffer>,
    session: Mutex<Option<AcquisitionSession>>,
    snap: Mutex<Option<Frame>>,
    config: CoreConfig,
}

impl Core {
    /// Create an instance around a device engine.
    ///
    /// The frame format is read from the device once here and fixed for the
    /// instance's lifetime; the buffer is budgeted per
    /// [`CoreConfig::buffer_footprint`].
    pub fn new(device: Box<dyn DeviceEngine>, config: CoreConfig) -> Result<Self> {
        let format = device.format();
        let buffer = FrameBuffer::new(config.buffer_footprint, format)?;
        info!(
            width = format.width,
            height = format.height,
            capacity = buffer.capacity(),
            "core instance created"
        );
        Ok(Self {
            device: Arc::new(Mutex::new(device)),
            format,
            buffer: Arc::new(buffer),
            session: Mutex::new(None),
            snap: Mutex::new(None),
            config,
        })
    }

    // --- single-shot path ---

    /// Capture one frame synchronously into the snap slot.
    ///
    /// Runs in mode [`AcqMode::Single`]: valid only while no sequence is
    /// running, and back to idle before this returns. The session slot stays
    /// locked across the capture, so a concurrent start waits for the snap
    /// instead of overlapping it.
    pub fn snap_image(&self) -> Result<()> {
        let _session = {
            let session = self.session_slot();
            if session.as_ref().is_some_and(|s| s.is_running()) {
                return Err(SessionError::Busy("cannot snap"));
            }
            session
        };

        let mut frame = {
            let mut device = lock_ignoring_poison(&self.device);
            device.produce_frame(self.config.device_timeout)?
        };
        frame.meta.number = 0;
        debug!(mode = ?AcqMode::Single, "snapped image");
        *lock_ignoring_poison(&self.snap) = Some(frame);
        Ok(())
    }

    /// Copy of the most recently snapped frame.
    pub fn snapped_image(&self) -> Result<Frame> {
        lock_ignoring_poison(&self.snap)
            .clone()
            .ok_or(SessionError::NoSnappedImage)
    }

    // --- sequence path ---

    /// Start a finite sequence acquisition of `num_images` frames.
    pub fn start_sequence_acquisition(
        &self,
        num_images: u64,
        interval_ms: f64,
        stop_on_overflow: bool,
    ) -> Result<()> {
        if num_images == 0 {
            return Err(SessionError::InvalidArgument(
                "number of images must be positive".into(),
            ));
        }
        let interval = interval_from_ms(interval_ms)?;
        self.start_session(AcqMode::Finite { count: num_images }, interval, stop_on_overflow)
    }

    /// Start a continuous acquisition; runs until stopped. Overflow always
    /// drops the oldest frame.
    pub fn start_continuous_acquisition(&self, interval_ms: f64) -> Result<()> {
        let interval = interval_from_ms(interval_ms)?;
        self.start_session(AcqMode::Continuous, interval, false)
    }

    fn start_session(
        &self,
        mode: AcqMode,
        interval: Duration,
        stop_on_overflow: bool,
    ) -> Result<()> {
        let mut slot = self.session_slot();
        if slot.as_ref().is_some_and(|s| s.is_running()) {
            return Err(SessionError::AlreadyRunning);
        }

        // Fresh run: previous frames and the sticky overflow flag belong to
        // the run that produced them.
        self.buffer.clear();
        *slot = Some(AcquisitionSession::start(
            mode,
            interval,
            stop_on_overflow,
            Arc::clone(&self.buffer),
            Arc::clone(&self.device),
            self.config.device_timeout,
        ));
        Ok(())
    }

    /// Stop a running acquisition, draining the producer synchronously.
    /// A no-op when idle.
    ///
    /// The finished session stays in its slot so the sticky fault remains
    /// queryable; only the next start replaces it.
    pub fn stop_sequence_acquisition(&self) -> Result<()> {
        let mut slot = self.session_slot();
        if let Some(session) = slot.as_mut() {
            session.stop(self.config.stop_timeout)?;
        }
        Ok(())
    }

    /// Whether a sequence acquisition is running.
    pub fn is_sequence_running(&self) -> bool {
        self.session_slot()
            .as_ref()
            .is_some_and(|s| s.is_running())
    }

    /// The fault that ended the most recent run early, if any.
    /// Sticky until the next acquisition starts.
    pub fn last_acquisition_fault(&self) -> Option<SessionFault> {
        self.session_slot().as_ref().and_then(|s| s.last_fault())
    }

    // --- circular buffer path ---

    /// Remove and return the oldest queued frame.
    pub fn pop_next_image(&self) -> Result<Frame> {
        Ok(self.buffer.pop_oldest()?)
    }

    /// Copy of the most recently queued frame, without consuming it.
    pub fn last_image(&self) -> Result<Frame> {
        Ok(self.buffer.peek_newest()?)
    }

    /// Wait until a frame is queued, bounded by `timeout`. Returns whether a
    /// frame is available.
    pub fn wait_for_image(&self, timeout: Duration) -> bool {
        self.buffer.wait_for_frame(timeout)
    }

    /// Number of frames waiting in the buffer.
    pub fn remaining_image_count(&self) -> usize {
        self.buffer.len()
    }

    /// Total buffer capacity in frames.
    pub fn buffer_total_capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Free buffer slots.
    pub fn buffer_free_capacity(&self) -> usize {
        self.buffer.free_capacity()
    }

    /// Sticky overflow flag for the current run.
    pub fn is_buffer_overflowed(&self) -> bool {
        self.buffer.is_overflowed()
    }

    /// Rebudget the circular buffer. Rejected while a sequence runs;
    /// discards queued frames on success.
    pub fn set_buffer_footprint(&self, bytes: usize) -> Result<()> {
        if self.is_sequence_running() {
            return Err(SessionError::Busy("buffer footprint cannot change"));
        }
        Ok(self.buffer.set_footprint(bytes)?)
    }

    /// Discard all queued frames. Rejected while a sequence runs.
    pub fn clear_buffer(&self) -> Result<()> {
        if self.is_sequence_running() {
            return Err(SessionError::Busy("buffer cannot be cleared"));
        }
        self.buffer.clear();
        Ok(())
    }

    // --- format and device queries ---

    /// Image width in pixels.
    pub fn image_width(&self) -> u32 {
        self.format.width
    }

    /// Image height in pixels.
    pub fn image_height(&self) -> u32 {
        self.format.height
    }

    /// Bytes per pixel.
    pub fn bytes_per_pixel(&self) -> u32 {
        self.format.bytes_per_pixel
    }

    /// Dynamic range in bits per pixel.
    pub fn bit_depth(&self) -> u32 {
        self.format.bit_depth
    }

    /// Exact byte size a caller must allocate for one image.
    pub fn image_buffer_size(&self) -> usize {
        self.format.byte_size()
    }

    /// Exposure currently applied to new frames, in milliseconds.
    pub fn exposure_ms(&self) -> f64 {
        lock_ignoring_poison(&self.device).exposure_ms()
    }

    /// Change the device exposure for subsequent frames.
    pub fn set_exposure_ms(&self, exposure_ms: f64) -> Result<()> {
        if !exposure_ms.is_finite() || exposure_ms <= 0.0 {
            return Err(SessionError::InvalidArgument(format!(
                "exposure of {exposure_ms} ms is not a valid duration"
            )));
        }
        lock_ignoring_poison(&self.device).set_exposure_ms(exposure_ms)?;
        Ok(())
    }

    /// The frame format of this instance.
    pub fn frame_format(&self) -> FrameFormat {
        self.format
    }

    /// Whether the device engine is mid-capture. Non-blocking: a device
    /// locked by the producer counts as busy.
    pub fn device_busy(&self) -> bool {
        match self.device.try_lock() {
            Ok(device) => device.is_busy(),
            Err(_) => true,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    fn session_slot(&self) -> MutexGuard<'_, Option<AcquisitionSession>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        // No orphaned producer may outlive the instance; wait out the
        // configured stop bound.
        let _ = self.stop_sequence_acquisition();
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn interval_from_ms(interval_ms: f64) -> Result<Duration> {
    if !interval_ms.is_finite() || interval_ms < 0.0 {
        return Err(SessionError::InvalidArgument(format!(
            "interval of {interval_ms} ms is not a valid duration"
        )));
    }
    Ok(Duration::from_secs_f64(interval_ms / 1000.0))
}
