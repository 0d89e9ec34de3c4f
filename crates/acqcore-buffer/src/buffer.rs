use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use acqcore_frame::{Frame, FrameFormat};
use tracing::{debug, warn};

use crate::error::{BufferError, Result};

/// What `push` does when the buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Discard the oldest frame to make room (continuous acquisition).
    DropOldest,
    /// Refuse the new frame; the producer is expected to halt.
    RejectNewest,
}

/// Result of a successful `push`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Frame stored, no frames lost.
    Stored,
    /// Frame stored after discarding the oldest queued frame.
    DroppedOldest,
    /// Buffer full under [`OverflowPolicy::RejectNewest`]; frame not stored.
    RejectedFull,
}

#[derive(Debug)]
struct Inner {
    frames: VecDeque<Frame>,
    footprint: usize,
    frame_size: usize,
    capacity: usize,
    overflowed: bool,
}

impl Inner {
    fn recompute_capacity(&mut self) -> Result<()> {
        // Floor division; a footprint that cannot hold one frame is an error
        // rather than a zero-capacity buffer that rejects every push.
        let capacity = self.footprint / self.frame_size;
        if capacity == 0 {
            return Err(BufferError::FootprintTooSmall {
                footprint: self.footprint,
                frame_size: self.frame_size,
            });
        }
        self.capacity = capacity;
        Ok(())
    }
}

/// Bounded FIFO queue of frames with a byte-budgeted capacity.
///
/// Insertion order is acquisition order. `pop_oldest` is the only operation
/// that shrinks the queue; `peek_newest` never does. Both may interleave with
/// a concurrent producer: all head/tail/size bookkeeping sits behind one
/// mutex, so a push racing a pop can never lose or double-count a slot.
#[derive(Debug)]
pub struct FrameBuffer {
    inner: Mutex<Inner>,
    available: Condvar,
}

impl FrameBuffer {
    /// Create a buffer for frames of `format`, budgeted to `footprint` bytes.
    pub fn new(footprint: usize, format: FrameFormat) -> Result<Self> {
        let mut inner = Inner {
            frames: VecDeque::new(),
            footprint,
            frame_size: format.byte_size(),
            capacity: 0,
            overflowed: false,
        };
        inner.recompute_capacity()?;
        debug!(
            footprint,
            frame_size = inner.frame_size,
            capacity = inner.capacity,
            "circular buffer created"
        );
        Ok(Self {
            inner: Mutex::new(inner),
            available: Condvar::new(),
        })
    }

    /// Change the memory footprint, recomputing capacity.
    ///
    /// Discards all queued frames and clears the overflow flag. Callers must
    /// ensure no acquisition is running; the instance layer enforces that.
    pub fn set_footprint(&self, footprint: usize) -> Result<()> {
        let mut inner = self.lock();
        let previous = inner.footprint;
        inner.footprint = footprint;
        if let Err(err) = inner.recompute_capacity() {
            inner.footprint = previous;
            return Err(err);
        }
        inner.frames.clear();
        inner.overflowed = false;
        debug!(footprint, capacity = inner.capacity, "footprint changed");
        Ok(())
    }

    /// Change the frame format, recomputing capacity.
    ///
    /// Rejected while frames are queued; a mid-stream frame-size change would
    /// break the uniform-size copy-out contract.
    pub fn set_format(&self, format: FrameFormat) -> Result<()> {
        let mut inner = self.lock();
        if !inner.frames.is_empty() {
            return Err(BufferError::FormatChangeWhileOccupied(inner.frames.len()));
        }
        let previous = inner.frame_size;
        inner.frame_size = format.byte_size();
        if let Err(err) = inner.recompute_capacity() {
            inner.frame_size = previous;
            return Err(err);
        }
        inner.overflowed = false;
        Ok(())
    }

    /// Append a frame at the tail (producer side, non-blocking).
    ///
    /// On a full buffer the behavior follows `policy`; a drop sets the sticky
    /// overflow flag. Frames of the wrong byte size are rejected outright.
    pub fn push(&self, frame: Frame, policy: OverflowPolicy) -> Result<PushOutcome> {
        let mut inner = self.lock();
        if frame.byte_size() != inner.frame_size {
            return Err(BufferError::FrameSizeMismatch {
                expected: inner.frame_size,
                got: frame.byte_size(),
            });
        }

        let outcome = if inner.frames.len() == inner.capacity {
            inner.overflowed = true;
            match policy {
                OverflowPolicy::DropOldest => {
                    inner.frames.pop_front();
                    inner.frames.push_back(frame);
                    debug!("buffer full, dropped oldest frame");
                    PushOutcome::DroppedOldest
                }
                OverflowPolicy::RejectNewest => {
                    warn!("buffer full, rejecting frame");
                    PushOutcome::RejectedFull
                }
            }
        } else {
            inner.frames.push_back(frame);
            PushOutcome::Stored
        };

        drop(inner);
        if outcome != PushOutcome::RejectedFull {
            self.available.notify_all();
        }
        Ok(outcome)
    }

    /// Copy of the most recently pushed frame, without consuming it.
    pub fn peek_newest(&self) -> Result<Frame> {
        let inner = self.lock();
        inner.frames.back().cloned().ok_or(BufferError::Empty)
    }

    /// Remove and return the oldest queued frame.
    pub fn pop_oldest(&self) -> Result<Frame> {
        let mut inner = self.lock();
        inner.frames.pop_front().ok_or(BufferError::Empty)
    }

    /// Number of frames currently queued.
    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    /// True when no frames are queued.
    pub fn is_empty(&self) -> bool {
        self.lock().frames.is_empty()
    }

    /// Total capacity in frames.
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    /// Free slots remaining.
    pub fn free_capacity(&self) -> usize {
        let inner = self.lock();
        inner.capacity - inner.frames.len()
    }

    /// Byte size of the frames this buffer holds.
    pub fn frame_byte_size(&self) -> usize {
        self.lock().frame_size
    }

    /// Sticky overflow flag: set on any full-buffer push since the last
    /// `clear`, `set_footprint` or `reset_overflow`.
    pub fn is_overflowed(&self) -> bool {
        self.lock().overflowed
    }

    /// Clear the sticky overflow flag.
    pub fn reset_overflow(&self) {
        self.lock().overflowed = false;
    }

    /// Discard all queued frames and clear the overflow flag.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.frames.clear();
        inner.overflowed = false;
    }

    /// Wait until at least one frame is queued, bounded by `timeout`.
    ///
    /// Returns true if a frame is available, false on timeout. This is the
    /// only consumer-side wait primitive; peek and pop never block.
    pub fn wait_for_frame(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut inner = self.lock();
        while inner.frames.is_empty() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, result) = self
                .available
                .wait_timeout(inner, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            inner = guard;
            if result.timed_out() && inner.frames.is_empty() {
                return false;
            }
        }
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
