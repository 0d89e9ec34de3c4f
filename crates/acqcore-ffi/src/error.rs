use std::os::raw::c_char;
use std::sync::Mutex;

use acqcore_buffer::BufferError;
use acqcore_session::SessionError;

use crate::types::AcqStatus;

/// Longest error text kept for copy-out, including the NUL terminator.
pub(crate) const MAX_ERROR_TEXT: usize = 1024;

struct ErrorState {
    code: i32,
    message: String,
}

// Process-wide, not per-thread: the last failure is observable from any
// thread, matching callers that poll errors from a different thread than
// the one that failed. Concurrent failing calls race on the slot; the
// winner is the call that set it last.
static LAST_ERROR: Mutex<ErrorState> = Mutex::new(ErrorState {
    code: 0,
    message: String::new(),
});

fn lock() -> std::sync::MutexGuard<'static, ErrorState> {
    LAST_ERROR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn clear_error_state() {
    let mut state = lock();
    state.code = 0;
    state.message.clear();
}

pub(crate) fn set_error(status: AcqStatus, message: impl Into<String>) -> AcqStatus {
    let mut message = message.into();
    message.retain(|c| c != '\0');
    if message.len() >= MAX_ERROR_TEXT {
        let mut end = MAX_ERROR_TEXT - 1;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }

    let mut state = lock();
    state.code = status as i32;
    state.message = message;
    status
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> AcqStatus {
    set_error(AcqStatus::InvalidArgument, message)
}

pub(crate) fn set_invalid_instance(message: impl Into<String>) -> AcqStatus {
    set_error(AcqStatus::InvalidInstance, message)
}

pub(crate) fn set_panic_error() {
    let _ = set_error(AcqStatus::Internal, "panic across FFI boundary");
}

pub(crate) fn map_session_error(err: &SessionError) -> AcqStatus {
    let status = match err {
        SessionError::AlreadyRunning
        | SessionError::Busy(_)
        | SessionError::NoSnappedImage => AcqStatus::InvalidState,
        SessionError::Buffer(BufferError::Empty) => AcqStatus::BufferEmpty,
        SessionError::Buffer(BufferError::FormatChangeWhileOccupied(_)) => AcqStatus::InvalidState,
        SessionError::Buffer(_) => AcqStatus::InvalidArgument,
        SessionError::Device(_) | SessionError::StopTimeout(_) => AcqStatus::DeviceFault,
        SessionError::InvalidArgument(_) => AcqStatus::InvalidArgument,
    };
    set_error(status, err.to_string())
}

pub(crate) fn last_error_code() -> i32 {
    lock().code
}

/// Copy the last error text into `buf` as a NUL-terminated C string,
/// truncating to `buf_size - 1` bytes.
///
/// # Safety
/// `buf` must be non-null and writable for `buf_size` bytes.
pub(crate) unsafe fn copy_last_error_text(buf: *mut c_char, buf_size: usize) -> AcqStatus {
    if buf.is_null() || buf_size == 0 {
        return AcqStatus::InvalidArgument;
    }

    let state = lock();
    let text = state.message.as_bytes();
    let len = text.len().min(buf_size - 1);

    // SAFETY: Caller guarantees `buf` is writable for `buf_size` bytes and
    // `len + 1 <= buf_size`.
    unsafe {
        std::ptr::copy_nonoverlapping(text.as_ptr(), buf as *mut u8, len);
        *buf.add(len) = 0;
    }
    AcqStatus::Ok
}

// The error slot is process-wide, so tests that assert on it run serially.
#[cfg(test)]
pub(crate) static TEST_LOCK: Mutex<()> = Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_read_code_and_text() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let status = set_error(AcqStatus::BufferEmpty, "circular buffer is empty");
        assert_eq!(status, AcqStatus::BufferEmpty);
        assert_eq!(last_error_code(), AcqStatus::BufferEmpty as i32);

        let mut buf = [0 as c_char; 64];
        let copied = unsafe { copy_last_error_text(buf.as_mut_ptr(), buf.len()) };
        assert_eq!(copied, AcqStatus::Ok);

        let text = unsafe { std::ffi::CStr::from_ptr(buf.as_ptr()) };
        assert_eq!(text.to_str().unwrap(), "circular buffer is empty");

        clear_error_state();
        assert_eq!(last_error_code(), 0);
    }

    #[test]
    fn text_truncates_to_buffer_size() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let _ = set_error(AcqStatus::Internal, "a longer message than fits");

        let mut buf = [0 as c_char; 8];
        assert_eq!(
            unsafe { copy_last_error_text(buf.as_mut_ptr(), buf.len()) },
            AcqStatus::Ok
        );

        let text = unsafe { std::ffi::CStr::from_ptr(buf.as_ptr()) };
        assert_eq!(text.to_bytes().len(), 7);
        clear_error_state();
    }

    #[test]
    fn interior_nul_is_stripped() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let _ = set_error(AcqStatus::Internal, "bad\0text");

        let mut buf = [0 as c_char; 64];
        assert_eq!(
            unsafe { copy_last_error_text(buf.as_mut_ptr(), buf.len()) },
            AcqStatus::Ok
        );
        let text = unsafe { std::ffi::CStr::from_ptr(buf.as_ptr()) };
        assert_eq!(text.to_str().unwrap(), "badtext");
        clear_error_state();
    }
}
