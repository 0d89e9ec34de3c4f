use std::ffi::c_void;

use acqcore_session::Core;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcqStatus {
    Ok = 0,
    InvalidArgument = 1,
    InvalidInstance = 2,
    InstanceExists = 3,
    InvalidState = 4,
    BufferEmpty = 5,
    BufferOverflow = 6,
    DeviceFault = 7,
    Internal = 99,
}

#[allow(dead_code)]
pub const ACQ_OK: AcqStatus = AcqStatus::Ok;
#[allow(dead_code)]
pub const ACQ_ERR_INVALID_ARGUMENT: AcqStatus = AcqStatus::InvalidArgument;
#[allow(dead_code)]
pub const ACQ_ERR_INVALID_INSTANCE: AcqStatus = AcqStatus::InvalidInstance;
#[allow(dead_code)]
pub const ACQ_ERR_INSTANCE_EXISTS: AcqStatus = AcqStatus::InstanceExists;
#[allow(dead_code)]
pub const ACQ_ERR_INVALID_STATE: AcqStatus = AcqStatus::InvalidState;
#[allow(dead_code)]
pub const ACQ_ERR_BUFFER_EMPTY: AcqStatus = AcqStatus::BufferEmpty;
#[allow(dead_code)]
pub const ACQ_ERR_BUFFER_OVERFLOW: AcqStatus = AcqStatus::BufferOverflow;
#[allow(dead_code)]
pub const ACQ_ERR_DEVICE_FAULT: AcqStatus = AcqStatus::DeviceFault;
#[allow(dead_code)]
pub const ACQ_ERR_INTERNAL: AcqStatus = AcqStatus::Internal;

/// C boolean: 0 is false, 1 is true.
pub type AcqBool = i32;

#[allow(dead_code)]
pub const ACQ_FALSE: AcqBool = 0;
#[allow(dead_code)]
pub const ACQ_TRUE: AcqBool = 1;

/// Per-image metadata written alongside a copied-out image.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AcqImageInfo {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
    pub bit_depth: u32,
    /// Zero-based frame number within its acquisition run.
    pub frame_number: u64,
    /// Milliseconds from run start to this frame's capture.
    pub elapsed_ms: f64,
    pub exposure_ms: f64,
}

impl Default for AcqImageInfo {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            bytes_per_pixel: 0,
            bit_depth: 0,
            frame_number: 0,
            elapsed_ms: 0.0,
            exposure_ms: 0.0,
        }
    }
}

pub type AcqCoreHandle = *mut c_void;

pub(crate) struct CoreHandle {
    pub(crate) core: Core,
}
