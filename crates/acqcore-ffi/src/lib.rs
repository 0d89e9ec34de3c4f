//! acqcore-ffi: C-ABI exports for the acquisition core.
//!
//! One core instance exists per process. `acq_core_create` hands out an
//! opaque handle; every other export takes that handle and reports failures
//! through both its status return and the process-wide last-error slot.

mod error;
mod image;
mod session;
mod types;

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};

use acqcore_device::SimCamera;
use acqcore_session::{Core, CoreConfig};

pub use image::{
    acq_clear_circular_buffer, acq_get_buffer_free_capacity, acq_get_buffer_total_capacity,
    acq_get_exposure, acq_get_image, acq_get_image_bit_depth, acq_get_image_buffer_size,
    acq_get_image_bytes_per_pixel, acq_get_image_height, acq_get_image_width, acq_get_last_image,
    acq_get_remaining_image_count, acq_is_buffer_overflowed, acq_pop_next_image,
    acq_set_circular_buffer_memory_footprint, acq_set_exposure, acq_snap_image,
    acq_wait_for_image,
};
pub use session::{
    acq_get_acquisition_fault, acq_is_device_busy, acq_is_sequence_running,
    acq_start_continuous_acquisition, acq_start_sequence_acquisition,
    acq_stop_sequence_acquisition,
};
pub use types::{
    AcqBool, AcqCoreHandle, AcqImageInfo, AcqStatus, ACQ_ERR_BUFFER_EMPTY,
    ACQ_ERR_BUFFER_OVERFLOW, ACQ_ERR_DEVICE_FAULT, ACQ_ERR_INSTANCE_EXISTS, ACQ_ERR_INTERNAL,
    ACQ_ERR_INVALID_ARGUMENT, ACQ_ERR_INVALID_INSTANCE, ACQ_ERR_INVALID_STATE, ACQ_FALSE, ACQ_OK,
    ACQ_TRUE,
};

use types::CoreHandle;

/// Set while a core instance is live. Guards against double create and
/// against calls through a handle that outlived its instance.
static INSTANCE_LIVE: AtomicBool = AtomicBool::new(false);

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

pub(crate) fn with_core<T>(
    handle: AcqCoreHandle,
    on_error: T,
    f: impl FnOnce(&CoreHandle) -> T,
) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_instance("core handle cannot be null");
        return on_error;
    }
    if !INSTANCE_LIVE.load(Ordering::SeqCst) {
        let _ = error::set_invalid_instance("no live core instance");
        return on_error;
    }

    let core_handle = {
        // SAFETY: Handle validity is guaranteed by the caller; the liveness
        // flag above rejects handles whose instance was destroyed.
        unsafe { &*(handle as *mut CoreHandle) }
    };

    f(core_handle)
}

/// Create the process-wide core instance and write its handle to `out_handle`.
///
/// Fails with `ACQ_ERR_INSTANCE_EXISTS` if an instance is already live.
///
/// # Safety
/// `out_handle` must be a non-null writable pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_core_create(out_handle: *mut AcqCoreHandle) -> AcqStatus {
    ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        if out_handle.is_null() {
            return error::set_invalid_argument("out_handle cannot be null");
        }
        if INSTANCE_LIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return error::set_error(AcqStatus::InstanceExists, "core instance already exists");
        }

        match Core::new(Box::new(SimCamera::new()), CoreConfig::default()) {
            Ok(core) => {
                let handle = CoreHandle { core };
                // SAFETY: Pointer was checked for null above.
                unsafe {
                    *out_handle = Box::into_raw(Box::new(handle)) as AcqCoreHandle;
                }
                AcqStatus::Ok
            }
            Err(err) => {
                INSTANCE_LIVE.store(false, Ordering::SeqCst);
                error::map_session_error(&err)
            }
        }
    })
}

/// Destroy the core instance behind `*handle` and null the caller's handle.
///
/// Stops any running acquisition first. Idempotent: a null `handle`, a null
/// `*handle`, or a handle whose instance is already gone are all no-ops.
///
/// # Safety
/// `handle` must be null or point to a handle previously written by
/// `acq_core_create`.
#[no_mangle]
pub unsafe extern "C" fn acq_core_destroy(handle: *mut AcqCoreHandle) -> AcqStatus {
    ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        if handle.is_null() {
            return AcqStatus::Ok;
        }
        // SAFETY: Caller guarantees `handle` is a valid writable pointer.
        let raw = unsafe { *handle };
        if raw.is_null() {
            return AcqStatus::Ok;
        }
        // SAFETY: Same pointer as above.
        unsafe {
            *handle = std::ptr::null_mut();
        }
        if !INSTANCE_LIVE.load(Ordering::SeqCst) {
            return AcqStatus::Ok;
        }

        // SAFETY: Caller guarantees `raw` was allocated by acq_core_create;
        // dropping stops the producer before the buffer goes away.
        unsafe {
            drop(Box::from_raw(raw as *mut CoreHandle));
        }
        INSTANCE_LIVE.store(false, Ordering::SeqCst);
        AcqStatus::Ok
    })
}

/// Numeric code of the last failure, or 0 when clear.
#[no_mangle]
pub extern "C" fn acq_get_last_error_code() -> i32 {
    ffi_boundary(AcqStatus::Internal as i32, error::last_error_code)
}

/// Copy the last failure's text into `buf` as a NUL-terminated C string,
/// truncating to fit.
///
/// # Safety
/// `buf` must be non-null and writable for `buf_size` bytes.
#[no_mangle]
pub unsafe extern "C" fn acq_get_last_error_text(
    buf: *mut std::os::raw::c_char,
    buf_size: usize,
) -> AcqStatus {
    ffi_boundary(AcqStatus::Internal, || {
        // SAFETY: Forwarded caller contract.
        unsafe { error::copy_last_error_text(buf, buf_size) }
    })
}

/// Clear the last-error slot.
#[no_mangle]
pub extern "C" fn acq_reset_error() {
    ffi_boundary((), error::clear_error_state);
}

/// Library version as a static NUL-terminated string.
#[no_mangle]
pub extern "C" fn acq_version() -> *const std::os::raw::c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const std::os::raw::c_char
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    #[test]
    fn create_use_destroy_lifecycle() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());

        let mut handle: AcqCoreHandle = std::ptr::null_mut();
        assert_eq!(unsafe { acq_core_create(&mut handle) }, AcqStatus::Ok);
        assert!(!handle.is_null());

        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
        assert!(handle.is_null());

        // Second destroy through the nulled handle is a no-op.
        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
    }

    #[test]
    fn second_create_is_rejected_while_instance_lives() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());

        let mut first: AcqCoreHandle = std::ptr::null_mut();
        assert_eq!(unsafe { acq_core_create(&mut first) }, AcqStatus::Ok);

        let mut second: AcqCoreHandle = std::ptr::null_mut();
        assert_eq!(
            unsafe { acq_core_create(&mut second) },
            AcqStatus::InstanceExists
        );
        assert!(second.is_null());
        assert_eq!(
            acq_get_last_error_code(),
            AcqStatus::InstanceExists as i32
        );

        assert_eq!(unsafe { acq_core_destroy(&mut first) }, AcqStatus::Ok);

        // Destroy makes room for a fresh instance.
        let mut third: AcqCoreHandle = std::ptr::null_mut();
        assert_eq!(unsafe { acq_core_create(&mut third) }, AcqStatus::Ok);
        assert_eq!(unsafe { acq_core_destroy(&mut third) }, AcqStatus::Ok);
    }

    #[test]
    fn destroy_stops_a_running_acquisition() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());

        let mut handle: AcqCoreHandle = std::ptr::null_mut();
        assert_eq!(unsafe { acq_core_create(&mut handle) }, AcqStatus::Ok);
        assert_eq!(
            unsafe { acq_start_continuous_acquisition(handle, 0.0) },
            AcqStatus::Ok
        );

        // Destroy must drain the producer, not leak it.
        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
        assert!(handle.is_null());

        // A fresh instance coming up cleanly shows the teardown completed.
        let mut next: AcqCoreHandle = std::ptr::null_mut();
        assert_eq!(unsafe { acq_core_create(&mut next) }, AcqStatus::Ok);
        assert_eq!(unsafe { acq_core_destroy(&mut next) }, AcqStatus::Ok);
    }

    #[test]
    fn create_rejects_null_out_handle() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        assert_eq!(
            unsafe { acq_core_create(std::ptr::null_mut()) },
            AcqStatus::InvalidArgument
        );
    }

    #[test]
    fn calls_without_live_instance_report_invalid_instance() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());

        let status = with_core(std::ptr::null_mut(), AcqStatus::InvalidInstance, |_| {
            AcqStatus::Ok
        });
        assert_eq!(status, AcqStatus::InvalidInstance);
        assert_eq!(
            acq_get_last_error_code(),
            AcqStatus::InvalidInstance as i32
        );
        error::clear_error_state();
    }

    #[test]
    fn version_is_a_valid_c_string() {
        let ptr = acq_version();
        assert!(!ptr.is_null());

        // SAFETY: acq_version returns a static NUL-terminated string.
        let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap();
        assert!(!text.is_empty());
    }
}
