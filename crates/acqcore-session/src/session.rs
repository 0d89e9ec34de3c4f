use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use acqcore_buffer::{FrameBuffer, OverflowPolicy, PushOutcome};
use tracing::{debug, info, warn};

use crate::core::SharedDevice;
use crate::error::{Result, SessionError};

/// Acquisition mode for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcqMode {
    /// One frame, captured synchronously into the snap slot.
    Single,
    /// A fixed number of frames into the circular buffer.
    Finite { count: u64 },
    /// Frames until stopped; overflow always drops the oldest.
    Continuous,
}

/// Why a run ended early. Sticky until the next run starts.
#[derive(Debug, Clone)]
pub enum SessionFault {
    /// Finite run halted because the buffer overflowed with
    /// stop-on-overflow set.
    Overflow,
    /// The device engine failed mid-run.
    Device(String),
}

struct State {
    running: bool,
    stop_requested: bool,
    fault: Option<SessionFault>,
    frames_produced: u64,
}

struct Shared {
    state: Mutex<State>,
    signal: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A single sequence acquisition run.
///
/// Externally observable states are `Running` and `Idle`: a stop request
/// drains the producer synchronously, so no intermediate state leaks out.
/// The [`crate::Core`] keeps a stopped session around until the next run
/// starts, so its fault stays queryable.
pub struct AcquisitionSession {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
    mode: AcqMode,
}

impl AcquisitionSession {
    /// Spawn the producer thread for a finite or continuous run.
    pub(crate) fn start(
        mode: AcqMode,
        interval: Duration,
        stop_on_overflow: bool,
        buffer: Arc<FrameBuffer>,
        device: SharedDevice,
        device_timeout: Duration,
    ) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                running: true,
                stop_requested: false,
                fault: None,
                frames_produced: 0,
            }),
            signal: Condvar::new(),
        });

        let handle = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                run_producer(
                    &shared,
                    mode,
                    interval,
                    stop_on_overflow,
                    &buffer,
                    &device,
                    device_timeout,
                );
                let mut state = shared.lock();
                state.running = false;
                drop(state);
                shared.signal.notify_all();
            })
        };

        info!(?mode, ?interval, stop_on_overflow, "acquisition started");
        Self {
            shared,
            handle: Some(handle),
            mode,
        }
    }

    /// Whether the producer is still running.
    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// The fault that ended this run early, if any.
    pub fn last_fault(&self) -> Option<SessionFault> {
        self.shared.lock().fault.clone()
    }

    /// Frames produced so far in this run.
    pub fn frames_produced(&self) -> u64 {
        self.shared.lock().frames_produced
    }

    /// Mode of this run.
    pub fn mode(&self) -> AcqMode {
        self.mode
    }

    /// Request a stop and wait for the producer to acknowledge, bounded by
    /// `timeout`.
    ///
    /// A no-op when the run has already finished. Fails with
    /// [`SessionError::StopTimeout`] if the producer does not drain in time;
    /// the caller may retry.
    pub fn stop(&mut self, timeout: Duration) -> Result<()> {
        {
            let mut state = self.shared.lock();
            state.stop_requested = true;
        }
        self.shared.signal.notify_all();

        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock();
        while state.running {
            let now = Instant::now();
            if now >= deadline {
                warn!(?timeout, "producer did not acknowledge stop");
                return Err(SessionError::StopTimeout(timeout));
            }
            let (guard, _) = self
                .shared
                .signal
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state = guard;
        }
        drop(state);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        debug!("acquisition stopped");
        Ok(())
    }
}

/// Wait out the inter-frame interval, waking early on a stop request.
/// Returns false if a stop was requested.
fn wait_interval(shared: &Shared, interval: Duration) -> bool {
    let deadline = Instant::now() + interval;
    let mut state = shared.lock();
    loop {
        if state.stop_requested {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        let (guard, _) = shared
            .signal
            .wait_timeout(state, deadline - now)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state = guard;
    }
}

fn run_producer(
    shared: &Shared,
    mode: AcqMode,
    interval: Duration,
    stop_on_overflow: bool,
    buffer: &FrameBuffer,
    device: &SharedDevice,
    device_timeout: Duration,
) {
    let target = match mode {
        AcqMode::Single => Some(1),
        AcqMode::Finite { count } => Some(count),
        AcqMode::Continuous => None,
    };
    let policy = if stop_on_overflow {
        OverflowPolicy::RejectNewest
    } else {
        OverflowPolicy::DropOldest
    };
    let started = Instant::now();
    let mut number = 0u64;

    loop {
        if shared.lock().stop_requested {
            break;
        }
        if let Some(count) = target {
            if number >= count {
                break;
            }
        }

        let captured = {
            let mut device = device
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            device.produce_frame(device_timeout)
        };

        let mut frame = match captured {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, "device fault, ending acquisition");
                shared.lock().fault = Some(SessionFault::Device(err.to_string()));
                break;
            }
        };
        frame.meta.number = number;
        frame.meta.elapsed = started.elapsed();

        match buffer.push(frame, policy) {
            Ok(PushOutcome::Stored) | Ok(PushOutcome::DroppedOldest) => {
                number += 1;
                shared.lock().frames_produced = number;
            }
            Ok(PushOutcome::RejectedFull) => {
                info!(frames = number, "buffer overflow, halting acquisition");
                shared.lock().fault = Some(SessionFault::Overflow);
                break;
            }
            Err(err) => {
                warn!(%err, "buffer rejected frame, ending acquisition");
                shared.lock().fault = Some(SessionFault::Device(err.to_string()));
                break;
            }
        }

        if !interval.is_zero() && !wait_interval(shared, interval) {
            break;
        }
    }
}
