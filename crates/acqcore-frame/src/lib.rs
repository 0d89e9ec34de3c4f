//! Image frame types for the acquisition core.
//!
//! A [`Frame`] is an immutable pixel payload plus metadata. Consumers never
//! receive references into internal storage; [`Frame::copy_into`] validates
//! the destination length and copies.

pub mod error;
pub mod format;
pub mod frame;

pub use error::{FrameError, Result};
pub use format::FrameFormat;
pub use frame::{Frame, FrameMeta};
