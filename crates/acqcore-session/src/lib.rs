//! Sequence acquisition for the acquisition core.
//!
//! [`AcquisitionSession`] is the producer-side state machine: one thread
//! pumping frames from a device engine into the circular buffer, in finite
//! or continuous mode. [`Core`] ties one buffer, one session slot, and one
//! device engine into the instance object behind the C-ABI boundary.

pub mod config;
pub mod core;
pub mod error;
pub mod session;

pub use config::CoreConfig;
pub use core::{Core, SharedDevice};
pub use error::{Result, SessionError};
pub use session::{AcqMode, AcquisitionSession, SessionFault};
