//! Camera acquisition core with a circular frame buffer.
//!
//! acqcore drives a camera-style device engine through single-shot and
//! sequence acquisition, queueing frames in a byte-budgeted circular buffer
//! for a polling consumer.
//!
//! # Crate Structure
//!
//! - [`frame`] — Frame format, metadata, and pixel payloads
//! - [`buffer`] — The bounded circular frame buffer
//! - [`device`] — The device engine trait and simulated camera
//! - [`session`] — Sequence acquisition and the core instance object

/// Re-export frame types.
pub mod frame {
    pub use acqcore_frame::*;
}

/// Re-export buffer types.
pub mod buffer {
    pub use acqcore_buffer::*;
}

/// Re-export device types.
pub mod device {
    pub use acqcore_device::*;
}

/// Re-export session types.
pub mod session {
    pub use acqcore_session::*;
}
