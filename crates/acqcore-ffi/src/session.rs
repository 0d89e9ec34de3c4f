use acqcore_session::SessionFault;

use crate::error;
use crate::types::{AcqBool, AcqCoreHandle, AcqStatus, ACQ_FALSE, ACQ_TRUE};
use crate::with_core;

fn write_bool_out(out: *mut AcqBool, value: bool) -> AcqStatus {
    if out.is_null() {
        return error::set_invalid_argument("out pointer cannot be null");
    }
    // SAFETY: Pointer was checked for null above; caller guarantees it is
    // writable.
    unsafe {
        *out = if value { ACQ_TRUE } else { ACQ_FALSE };
    }
    AcqStatus::Ok
}

/// Start a finite sequence acquisition of `num_images` frames, `interval_ms`
/// apart. With `stop_on_overflow` set, a full buffer halts the run instead
/// of dropping the oldest frame.
///
/// # Safety
/// `handle` must be a live handle from `acq_core_create`.
#[no_mangle]
pub unsafe extern "C" fn acq_start_sequence_acquisition(
    handle: AcqCoreHandle,
    num_images: i32,
    interval_ms: f64,
    stop_on_overflow: AcqBool,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        if num_images <= 0 {
            return error::set_invalid_argument("number of images must be positive");
        }

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            match core_handle.core.start_sequence_acquisition(
                num_images as u64,
                interval_ms,
                stop_on_overflow != ACQ_FALSE,
            ) {
                Ok(()) => AcqStatus::Ok,
                Err(err) => error::map_session_error(&err),
            }
        })
    })
}

/// Start a continuous acquisition that runs until stopped, dropping the
/// oldest frame when the buffer fills.
///
/// # Safety
/// `handle` must be a live handle from `acq_core_create`.
#[no_mangle]
pub unsafe extern "C" fn acq_start_continuous_acquisition(
    handle: AcqCoreHandle,
    interval_ms: f64,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            match core_handle.core.start_continuous_acquisition(interval_ms) {
                Ok(()) => AcqStatus::Ok,
                Err(err) => error::map_session_error(&err),
            }
        })
    })
}

/// Stop a running acquisition, waiting for the producer to drain. A no-op
/// when nothing is running.
///
/// # Safety
/// `handle` must be a live handle from `acq_core_create`.
#[no_mangle]
pub unsafe extern "C" fn acq_stop_sequence_acquisition(handle: AcqCoreHandle) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            match core_handle.core.stop_sequence_acquisition() {
                Ok(()) => AcqStatus::Ok,
                Err(err) => error::map_session_error(&err),
            }
        })
    })
}

/// Write whether a sequence acquisition is running to `out_running`.
///
/// # Safety
/// `handle` must be a live handle and `out_running` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_is_sequence_running(
    handle: AcqCoreHandle,
    out_running: *mut AcqBool,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            write_bool_out(out_running, core_handle.core.is_sequence_running())
        })
    })
}

/// Report why the most recent acquisition run ended early.
///
/// Returns `ACQ_OK` when the run is still going or finished cleanly,
/// `ACQ_ERR_BUFFER_OVERFLOW` when it halted on a full buffer, and
/// `ACQ_ERR_DEVICE_FAULT` when the device failed mid-run. The fault is
/// sticky until the next acquisition starts.
///
/// # Safety
/// `handle` must be a live handle from `acq_core_create`.
#[no_mangle]
pub unsafe extern "C" fn acq_get_acquisition_fault(handle: AcqCoreHandle) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            match core_handle.core.last_acquisition_fault() {
                None => AcqStatus::Ok,
                Some(SessionFault::Overflow) => error::set_error(
                    AcqStatus::BufferOverflow,
                    "acquisition halted on circular buffer overflow",
                ),
                Some(SessionFault::Device(message)) => {
                    error::set_error(AcqStatus::DeviceFault, message)
                }
            }
        })
    })
}

/// Write whether the device engine is mid-capture to `out_busy`.
///
/// # Safety
/// `handle` must be a live handle and `out_busy` a non-null writable pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_is_device_busy(
    handle: AcqCoreHandle,
    out_busy: *mut AcqBool,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            write_bool_out(out_busy, core_handle.core.device_busy())
        })
    })
}
