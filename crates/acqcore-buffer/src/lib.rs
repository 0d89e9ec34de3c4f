//! Bounded circular frame buffer.
//!
//! Decouples a producer writing at hardware pace from a consumer polling at
//! its own pace, under a fixed memory budget. Capacity is derived from the
//! configured footprint divided by the frame byte size (floor division).

pub mod buffer;
pub mod error;

pub use buffer::{FrameBuffer, OverflowPolicy, PushOutcome};
pub use error::{BufferError, Result};
