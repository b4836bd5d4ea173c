//! Shared utilities for the C exports.

use std::ffi::CStr;
use std::os::raw::c_char;

use log::warn;

use crate::error::{NativeIoError, clear_error, native_io_error_t, write_error};

/// Borrows the bytes of a NUL-terminated C string, without the terminator.
///
/// The returned slice must not outlive the call that received `value`.
pub(crate) fn read_cbytes<'a>(
    value: *const c_char,
    field: &'static str,
) -> Result<&'a [u8], NativeIoError> {
    if value.is_null() {
        return Err(NativeIoError::NullArgument(field));
    }
    // Safety: caller guarantees a valid, NUL-terminated C string.
    let cstr = unsafe { CStr::from_ptr(value) };
    Ok(cstr.to_bytes())
}

/// Applies the unchecked-export policy: log the failure and carry on.
pub(crate) fn ignore_failure<T>(operation: &'static str, result: Result<T, NativeIoError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(target: "native_io", "{operation} failed, ignoring: {err}");
            None
        }
    }
}

/// Applies the checked-export policy: report the failure through `out_error`.
pub(crate) fn report_failure(
    result: Result<(), NativeIoError>,
    out_error: *mut *mut native_io_error_t,
) -> bool {
    clear_error(out_error);
    match result {
        Ok(()) => true,
        Err(err) => {
            write_error(out_error, &err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use super::*;
    use crate::error::{native_io_error_free, native_io_error_kind, native_io_error_kind_t};

    #[test]
    fn read_cbytes_strips_terminator() {
        let bytes = read_cbytes(c"hi there".as_ptr(), "msg").unwrap();
        assert_eq!(bytes, b"hi there");
    }

    #[test]
    fn read_cbytes_rejects_null() {
        let err = read_cbytes(ptr::null(), "msg").unwrap_err();
        assert_eq!(err.to_string(), "msg was null");
    }

    #[test]
    fn ignore_failure_swallows_errors() {
        assert_eq!(ignore_failure("scani", Ok::<_, NativeIoError>(3)), Some(3));
        assert_eq!(
            ignore_failure::<i32>("scani", Err(NativeIoError::EndOfInput)),
            None
        );
    }

    #[test]
    fn report_failure_sets_out_error() {
        let mut raw: *mut native_io_error_t = ptr::null_mut();
        assert!(!report_failure(Err(NativeIoError::EndOfInput), &mut raw));
        assert_eq!(
            native_io_error_kind(raw),
            native_io_error_kind_t::NATIVE_IO_ERROR_END_OF_INPUT
        );
        native_io_error_free(raw);

        assert!(report_failure(Ok(()), &mut raw));
        assert!(raw.is_null());
    }
}
