use std::time::Duration;

use acqcore_frame::Frame;
use acqcore_session::Core;

use crate::error;
use crate::types::{AcqBool, AcqCoreHandle, AcqImageInfo, AcqStatus};
use crate::with_core;

fn write_u32_out(out: *mut u32, value: u32) -> AcqStatus {
    if out.is_null() {
        return error::set_invalid_argument("out pointer cannot be null");
    }
    // SAFETY: Pointer was checked for null above; caller guarantees it is
    // writable.
    unsafe {
        *out = value;
    }
    AcqStatus::Ok
}

fn write_u64_out(out: *mut u64, value: u64) -> AcqStatus {
    if out.is_null() {
        return error::set_invalid_argument("out pointer cannot be null");
    }
    // SAFETY: Pointer was checked for null above; caller guarantees it is
    // writable.
    unsafe {
        *out = value;
    }
    AcqStatus::Ok
}

/// Copy `frame` pixels into the caller's buffer. The buffer length must
/// equal the image byte size exactly; callers query it with
/// `acq_get_image_buffer_size`.
fn copy_image_out(frame: &Frame, buf: *mut u8, buf_size: usize) -> AcqStatus {
    let expected = frame.byte_size();
    if buf.is_null() {
        return error::set_invalid_argument("image buffer cannot be null");
    }
    if buf_size != expected {
        return error::set_invalid_argument(format!(
            "image buffer of {buf_size} bytes does not match the {expected}-byte image"
        ));
    }

    let dest = {
        // SAFETY: Caller guarantees `buf` is writable for `buf_size` bytes,
        // and `buf_size == expected`.
        unsafe { std::slice::from_raw_parts_mut(buf, expected) }
    };
    match frame.copy_into(dest) {
        Ok(()) => AcqStatus::Ok,
        Err(err) => error::set_error(AcqStatus::Internal, err.to_string()),
    }
}

/// Fill the optional metadata struct. A null `out_info` means the caller
/// does not want metadata.
fn write_info_out(out_info: *mut AcqImageInfo, frame: &Frame) {
    if out_info.is_null() {
        return;
    }
    let info = AcqImageInfo {
        width: frame.format.width,
        height: frame.format.height,
        bytes_per_pixel: frame.format.bytes_per_pixel,
        bit_depth: frame.format.bit_depth,
        frame_number: frame.meta.number,
        elapsed_ms: frame.meta.elapsed.as_secs_f64() * 1000.0,
        exposure_ms: frame.meta.exposure_ms,
    };
    // SAFETY: Pointer was checked for null above; caller guarantees it is
    // writable.
    unsafe {
        *out_info = info;
    }
}

fn checked_buffer(core: &Core, buf: *mut u8, buf_size: usize) -> Option<AcqStatus> {
    let expected = core.image_buffer_size();
    if buf.is_null() {
        return Some(error::set_invalid_argument("image buffer cannot be null"));
    }
    if buf_size != expected {
        return Some(error::set_invalid_argument(format!(
            "image buffer of {buf_size} bytes does not match the {expected}-byte image"
        )));
    }
    None
}

/// Capture a single image synchronously into the snap slot.
///
/// Fails with `ACQ_ERR_INVALID_STATE` while a sequence acquisition runs.
///
/// # Safety
/// `handle` must be a live handle from `acq_core_create`.
#[no_mangle]
pub unsafe extern "C" fn acq_snap_image(handle: AcqCoreHandle) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            match core_handle.core.snap_image() {
                Ok(()) => AcqStatus::Ok,
                Err(err) => error::map_session_error(&err),
            }
        })
    })
}

/// Copy the most recently snapped image into `buf`. `buf_size` must equal
/// the image byte size reported by `acq_get_image_buffer_size`.
///
/// # Safety
/// `handle` must be a live handle; `buf` must be non-null and writable for
/// `buf_size` bytes.
#[no_mangle]
pub unsafe extern "C" fn acq_get_image(
    handle: AcqCoreHandle,
    buf: *mut u8,
    buf_size: usize,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            match core_handle.core.snapped_image() {
                Ok(frame) => copy_image_out(&frame, buf, buf_size),
                Err(err) => error::map_session_error(&err),
            }
        })
    })
}

/// Copy the newest queued image into `buf` without consuming it. `buf_size`
/// must equal the image byte size reported by `acq_get_image_buffer_size`.
///
/// # Safety
/// `handle` must be a live handle; `buf` must be non-null and writable for
/// `buf_size` bytes; `out_info` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn acq_get_last_image(
    handle: AcqCoreHandle,
    buf: *mut u8,
    buf_size: usize,
    out_info: *mut AcqImageInfo,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            match core_handle.core.last_image() {
                Ok(frame) => {
                    let status = copy_image_out(&frame, buf, buf_size);
                    if status == AcqStatus::Ok {
                        write_info_out(out_info, &frame);
                    }
                    status
                }
                Err(err) => error::map_session_error(&err),
            }
        })
    })
}

/// Remove the oldest queued image and copy it into `buf`. `buf_size` must
/// equal the image byte size reported by `acq_get_image_buffer_size`.
///
/// The buffer size is validated before the image is taken out of the queue,
/// so a rejected call loses no frame.
///
/// # Safety
/// `handle` must be a live handle; `buf` must be non-null and writable for
/// `buf_size` bytes; `out_info` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn acq_pop_next_image(
    handle: AcqCoreHandle,
    buf: *mut u8,
    buf_size: usize,
    out_info: *mut AcqImageInfo,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            if let Some(status) = checked_buffer(&core_handle.core, buf, buf_size) {
                return status;
            }

            match core_handle.core.pop_next_image() {
                Ok(frame) => {
                    let status = copy_image_out(&frame, buf, buf_size);
                    if status == AcqStatus::Ok {
                        write_info_out(out_info, &frame);
                    }
                    status
                }
                Err(err) => error::map_session_error(&err),
            }
        })
    })
}

/// Wait until an image is queued, bounded by `timeout_ms`. Writes whether an
/// image became available; a timeout is not an error.
///
/// # Safety
/// `handle` must be a live handle and `out_available` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_wait_for_image(
    handle: AcqCoreHandle,
    timeout_ms: f64,
    out_available: *mut AcqBool,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        if !timeout_ms.is_finite() || timeout_ms < 0.0 {
            return error::set_invalid_argument(format!(
                "timeout of {timeout_ms} ms is not a valid duration"
            ));
        }
        if out_available.is_null() {
            return error::set_invalid_argument("out pointer cannot be null");
        }

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            let timeout = Duration::from_secs_f64(timeout_ms / 1000.0);
            let available = core_handle.core.wait_for_image(timeout);
            // SAFETY: Pointer was checked for null above.
            unsafe {
                *out_available = available as AcqBool;
            }
            AcqStatus::Ok
        })
    })
}

/// Number of images waiting in the circular buffer.
///
/// # Safety
/// `handle` must be a live handle and `out_count` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_get_remaining_image_count(
    handle: AcqCoreHandle,
    out_count: *mut u64,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            write_u64_out(out_count, core_handle.core.remaining_image_count() as u64)
        })
    })
}

/// Total circular buffer capacity in images.
///
/// # Safety
/// `handle` must be a live handle and `out_capacity` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_get_buffer_total_capacity(
    handle: AcqCoreHandle,
    out_capacity: *mut u64,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            write_u64_out(out_capacity, core_handle.core.buffer_total_capacity() as u64)
        })
    })
}

/// Free circular buffer slots.
///
/// # Safety
/// `handle` must be a live handle and `out_free` a non-null writable pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_get_buffer_free_capacity(
    handle: AcqCoreHandle,
    out_free: *mut u64,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            write_u64_out(out_free, core_handle.core.buffer_free_capacity() as u64)
        })
    })
}

/// Whether the circular buffer has overflowed since the current run started.
///
/// # Safety
/// `handle` must be a live handle and `out_overflowed` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_is_buffer_overflowed(
    handle: AcqCoreHandle,
    out_overflowed: *mut AcqBool,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            if out_overflowed.is_null() {
                return error::set_invalid_argument("out pointer cannot be null");
            }
            // SAFETY: Pointer was checked for null above.
            unsafe {
                *out_overflowed = core_handle.core.is_buffer_overflowed() as AcqBool;
            }
            AcqStatus::Ok
        })
    })
}

/// Rebudget the circular buffer to `bytes`. Rejected while a sequence runs;
/// discards queued images on success.
///
/// # Safety
/// `handle` must be a live handle from `acq_core_create`.
#[no_mangle]
pub unsafe extern "C" fn acq_set_circular_buffer_memory_footprint(
    handle: AcqCoreHandle,
    bytes: u64,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        let bytes = match usize::try_from(bytes) {
            Ok(bytes) => bytes,
            Err(_) => {
                return error::set_invalid_argument(format!(
                    "footprint of {bytes} bytes does not fit this platform"
                ))
            }
        };

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            match core_handle.core.set_buffer_footprint(bytes) {
                Ok(()) => AcqStatus::Ok,
                Err(err) => error::map_session_error(&err),
            }
        })
    })
}

/// Discard all queued images. Rejected while a sequence runs.
///
/// # Safety
/// `handle` must be a live handle from `acq_core_create`.
#[no_mangle]
pub unsafe extern "C" fn acq_clear_circular_buffer(handle: AcqCoreHandle) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            match core_handle.core.clear_buffer() {
                Ok(()) => AcqStatus::Ok,
                Err(err) => error::map_session_error(&err),
            }
        })
    })
}

/// Image width in pixels.
///
/// # Safety
/// `handle` must be a live handle and `out_width` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_get_image_width(
    handle: AcqCoreHandle,
    out_width: *mut u32,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            write_u32_out(out_width, core_handle.core.image_width())
        })
    })
}

/// Image height in pixels.
///
/// # Safety
/// `handle` must be a live handle and `out_height` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_get_image_height(
    handle: AcqCoreHandle,
    out_height: *mut u32,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            write_u32_out(out_height, core_handle.core.image_height())
        })
    })
}

/// Bytes per pixel.
///
/// # Safety
/// `handle` must be a live handle and `out_bpp` a non-null writable pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_get_image_bytes_per_pixel(
    handle: AcqCoreHandle,
    out_bpp: *mut u32,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            write_u32_out(out_bpp, core_handle.core.bytes_per_pixel())
        })
    })
}

/// Dynamic range in bits per pixel.
///
/// # Safety
/// `handle` must be a live handle and `out_depth` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_get_image_bit_depth(
    handle: AcqCoreHandle,
    out_depth: *mut u32,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            write_u32_out(out_depth, core_handle.core.bit_depth())
        })
    })
}

/// Exact byte size a caller must allocate for one image.
///
/// # Safety
/// `handle` must be a live handle and `out_size` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_get_image_buffer_size(
    handle: AcqCoreHandle,
    out_size: *mut u64,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            write_u64_out(out_size, core_handle.core.image_buffer_size() as u64)
        })
    })
}

/// Exposure applied to new images, in milliseconds.
///
/// # Safety
/// `handle` must be a live handle and `out_exposure` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn acq_get_exposure(
    handle: AcqCoreHandle,
    out_exposure: *mut f64,
) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            if out_exposure.is_null() {
                return error::set_invalid_argument("out pointer cannot be null");
            }
            // SAFETY: Pointer was checked for null above.
            unsafe {
                *out_exposure = core_handle.core.exposure_ms();
            }
            AcqStatus::Ok
        })
    })
}

/// Change the exposure for subsequent images. The value must be a positive
/// finite number of milliseconds.
///
/// # Safety
/// `handle` must be a live handle from `acq_core_create`.
#[no_mangle]
pub unsafe extern "C" fn acq_set_exposure(handle: AcqCoreHandle, exposure_ms: f64) -> AcqStatus {
    crate::ffi_boundary(AcqStatus::Internal, || {
        error::clear_error_state();

        with_core(handle, AcqStatus::InvalidInstance, |core_handle| {
            match core_handle.core.set_exposure_ms(exposure_ms) {
                Ok(()) => AcqStatus::Ok,
                Err(err) => error::map_session_error(&err),
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::{
        acq_core_create, acq_core_destroy, acq_start_sequence_acquisition, AcqBool, ACQ_FALSE,
        ACQ_TRUE,
    };

    fn create() -> AcqCoreHandle {
        let mut handle: AcqCoreHandle = std::ptr::null_mut();
        assert_eq!(unsafe { acq_core_create(&mut handle) }, AcqStatus::Ok);
        handle
    }

    fn image_size(handle: AcqCoreHandle) -> usize {
        let mut size = 0u64;
        assert_eq!(
            unsafe { acq_get_image_buffer_size(handle, &mut size) },
            AcqStatus::Ok
        );
        size as usize
    }

    fn wait_idle(handle: AcqCoreHandle) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let mut running: AcqBool = -1;
            assert_eq!(
                unsafe { crate::acq_is_sequence_running(handle, &mut running) },
                AcqStatus::Ok
            );
            if running == ACQ_FALSE {
                return;
            }
            assert!(Instant::now() < deadline);
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn snap_and_copy_out() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let mut handle = create();

        assert_eq!(unsafe { acq_snap_image(handle) }, AcqStatus::Ok);

        let size = image_size(handle);
        let mut image = vec![0u8; size];
        assert_eq!(
            unsafe { acq_get_image(handle, image.as_mut_ptr(), image.len()) },
            AcqStatus::Ok
        );
        // The simulated camera's gradient pattern is never all zeros.
        assert!(image.iter().any(|&b| b != 0));

        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
    }

    #[test]
    fn get_image_before_snap_is_invalid_state() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let mut handle = create();

        let mut image = vec![0u8; image_size(handle)];
        assert_eq!(
            unsafe { acq_get_image(handle, image.as_mut_ptr(), image.len()) },
            AcqStatus::InvalidState
        );
        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
    }

    #[test]
    fn mismatched_buffer_is_rejected_without_losing_frames() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let mut handle = create();

        assert_eq!(
            unsafe { acq_start_sequence_acquisition(handle, 2, 0.0, ACQ_FALSE) },
            AcqStatus::Ok
        );
        wait_idle(handle);

        let mut count = 0u64;
        assert_eq!(
            unsafe { acq_get_remaining_image_count(handle, &mut count) },
            AcqStatus::Ok
        );
        assert_eq!(count, 2);

        let mut tiny = [0u8; 16];
        assert_eq!(
            unsafe {
                acq_pop_next_image(handle, tiny.as_mut_ptr(), tiny.len(), std::ptr::null_mut())
            },
            AcqStatus::InvalidArgument
        );

        // An oversized buffer is a mismatch too, not a lenient copy.
        let mut oversized = vec![0u8; image_size(handle) + 1];
        assert_eq!(
            unsafe {
                acq_pop_next_image(
                    handle,
                    oversized.as_mut_ptr(),
                    oversized.len(),
                    std::ptr::null_mut(),
                )
            },
            AcqStatus::InvalidArgument
        );

        // The rejected pops left the queue intact.
        assert_eq!(
            unsafe { acq_get_remaining_image_count(handle, &mut count) },
            AcqStatus::Ok
        );
        assert_eq!(count, 2);
        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
    }

    #[test]
    fn exposure_roundtrip_across_the_boundary() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let mut handle = create();

        let mut exposure = 0.0f64;
        assert_eq!(
            unsafe { acq_get_exposure(handle, &mut exposure) },
            AcqStatus::Ok
        );
        assert_eq!(exposure, 10.0);

        assert_eq!(unsafe { acq_set_exposure(handle, 2.5) }, AcqStatus::Ok);
        assert_eq!(
            unsafe { acq_get_exposure(handle, &mut exposure) },
            AcqStatus::Ok
        );
        assert_eq!(exposure, 2.5);

        assert_eq!(
            unsafe { acq_set_exposure(handle, -1.0) },
            AcqStatus::InvalidArgument
        );
        assert_eq!(
            unsafe { acq_set_exposure(handle, f64::NAN) },
            AcqStatus::InvalidArgument
        );
        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
    }

    #[test]
    fn pop_drains_in_order_with_metadata() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let mut handle = create();

        assert_eq!(
            unsafe { acq_start_sequence_acquisition(handle, 3, 0.0, ACQ_FALSE) },
            AcqStatus::Ok
        );
        wait_idle(handle);

        let mut image = vec![0u8; image_size(handle)];
        for expected in 0..3u64 {
            let mut info = AcqImageInfo::default();
            assert_eq!(
                unsafe {
                    acq_pop_next_image(handle, image.as_mut_ptr(), image.len(), &mut info)
                },
                AcqStatus::Ok
            );
            assert_eq!(info.frame_number, expected);
            assert_eq!(info.width, 640);
            assert_eq!(info.height, 480);
        }

        assert_eq!(
            unsafe {
                acq_pop_next_image(
                    handle,
                    image.as_mut_ptr(),
                    image.len(),
                    std::ptr::null_mut(),
                )
            },
            AcqStatus::BufferEmpty
        );
        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
    }

    #[test]
    fn peek_does_not_consume() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let mut handle = create();

        assert_eq!(
            unsafe { acq_start_sequence_acquisition(handle, 2, 0.0, ACQ_FALSE) },
            AcqStatus::Ok
        );
        wait_idle(handle);

        let mut image = vec![0u8; image_size(handle)];
        let mut info = AcqImageInfo::default();
        assert_eq!(
            unsafe { acq_get_last_image(handle, image.as_mut_ptr(), image.len(), &mut info) },
            AcqStatus::Ok
        );
        assert_eq!(info.frame_number, 1);

        let mut count = 0u64;
        assert_eq!(
            unsafe { acq_get_remaining_image_count(handle, &mut count) },
            AcqStatus::Ok
        );
        assert_eq!(count, 2);
        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
    }

    #[test]
    fn wait_for_image_times_out_cleanly() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let mut handle = create();

        let mut available: AcqBool = ACQ_TRUE;
        assert_eq!(
            unsafe { acq_wait_for_image(handle, 20.0, &mut available) },
            AcqStatus::Ok
        );
        assert_eq!(available, ACQ_FALSE);

        assert_eq!(
            unsafe { acq_wait_for_image(handle, -1.0, &mut available) },
            AcqStatus::InvalidArgument
        );
        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
    }

    #[test]
    fn footprint_and_clear_manage_the_buffer() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let mut handle = create();

        let size = image_size(handle) as u64;
        assert_eq!(
            unsafe { acq_set_circular_buffer_memory_footprint(handle, size * 4) },
            AcqStatus::Ok
        );

        let mut capacity = 0u64;
        assert_eq!(
            unsafe { acq_get_buffer_total_capacity(handle, &mut capacity) },
            AcqStatus::Ok
        );
        assert_eq!(capacity, 4);

        // Too small for even one image.
        assert_eq!(
            unsafe { acq_set_circular_buffer_memory_footprint(handle, size - 1) },
            AcqStatus::InvalidArgument
        );

        assert_eq!(unsafe { acq_clear_circular_buffer(handle) }, AcqStatus::Ok);
        let mut free = 0u64;
        assert_eq!(
            unsafe { acq_get_buffer_free_capacity(handle, &mut free) },
            AcqStatus::Ok
        );
        assert_eq!(free, 4);
        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
    }

    #[test]
    fn format_queries_match_the_simulated_camera() {
        let _guard = error::TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let mut handle = create();

        let mut width = 0u32;
        let mut height = 0u32;
        let mut bpp = 0u32;
        let mut depth = 0u32;
        assert_eq!(
            unsafe { acq_get_image_width(handle, &mut width) },
            AcqStatus::Ok
        );
        assert_eq!(
            unsafe { acq_get_image_height(handle, &mut height) },
            AcqStatus::Ok
        );
        assert_eq!(
            unsafe { acq_get_image_bytes_per_pixel(handle, &mut bpp) },
            AcqStatus::Ok
        );
        assert_eq!(
            unsafe { acq_get_image_bit_depth(handle, &mut depth) },
            AcqStatus::Ok
        );

        assert_eq!((width, height, bpp, depth), (640, 480, 1, 8));
        assert_eq!(image_size(handle), 640 * 480);
        assert_eq!(unsafe { acq_core_destroy(&mut handle) }, AcqStatus::Ok);
    }
}
