//! Device engine seam for the acquisition core.
//!
//! The core needs little from whatever captures images: produce one frame
//! within a timeout, report busy/idle, report the current frame format,
//! and get/set the exposure. Everything else about a device stays behind
//! this trait. [`SimCamera`] is the built-in engine for tests, demos, and
//! the C-ABI default instance.

pub mod engine;
pub mod error;
pub mod sim;

pub use engine::DeviceEngine;
pub use error::{DeviceError, Result};
pub use sim::SimCamera;
