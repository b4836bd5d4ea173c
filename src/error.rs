//! Error types for the native I/O shim and their C handles.

use std::ffi::CString;
use std::io;
use std::os::raw::c_char;
use std::ptr;

use thiserror::Error;

use crate::format::FormatError;

/// Errors produced by the safe console layer.
///
/// The unchecked exports log these and carry on; the `_checked` exports hand
/// them to the caller as a `native_io_error_t`.
#[derive(Debug, Error)]
pub enum NativeIoError {
    #[error("failed to write to stdout: {0}")]
    IoWriteFailure(#[source] io::Error),
    #[error("failed to read from stdin: {0}")]
    IoReadFailure(#[source] io::Error),
    #[error("expected {expected}, found `{token}`")]
    IoParseFailure { expected: &'static str, token: String },
    #[error("stdin reached end of input before a token was found")]
    EndOfInput,
    #[error("input token exceeded {limit} bytes")]
    TokenTooLong { limit: usize },
    #[error(transparent)]
    FormatFailure(#[from] FormatError),
    #[error("{0} was null")]
    NullArgument(&'static str),
    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl NativeIoError {
    pub(crate) fn kind(&self) -> native_io_error_kind_t {
        match self {
            Self::IoWriteFailure(_) => native_io_error_kind_t::NATIVE_IO_ERROR_WRITE,
            Self::IoReadFailure(_) => native_io_error_kind_t::NATIVE_IO_ERROR_READ,
            Self::IoParseFailure { .. } | Self::TokenTooLong { .. } => {
                native_io_error_kind_t::NATIVE_IO_ERROR_PARSE
            }
            Self::EndOfInput => native_io_error_kind_t::NATIVE_IO_ERROR_END_OF_INPUT,
            Self::FormatFailure(_) => native_io_error_kind_t::NATIVE_IO_ERROR_FORMAT,
            Self::NullArgument(_) => native_io_error_kind_t::NATIVE_IO_ERROR_NULL_ARGUMENT,
            Self::Logging(_) => native_io_error_kind_t::NATIVE_IO_ERROR_LOGGING,
        }
    }
}

/// Error categories reported to C callers.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(C)]
pub enum native_io_error_kind_t {
    NATIVE_IO_ERROR_WRITE = 1,
    NATIVE_IO_ERROR_READ = 2,
    NATIVE_IO_ERROR_PARSE = 3,
    NATIVE_IO_ERROR_END_OF_INPUT = 4,
    NATIVE_IO_ERROR_FORMAT = 5,
    NATIVE_IO_ERROR_NULL_ARGUMENT = 6,
    NATIVE_IO_ERROR_LOGGING = 7,
}

/// Opaque error type for C callers.
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct native_io_error_t;

struct ErrorHandle {
    kind: native_io_error_kind_t,
    message: CString,
}

pub(crate) fn cstring_from_str_lossy(value: &str) -> CString {
    let sanitized: Vec<u8> = value
        .bytes()
        .map(|b| if b == 0 { b' ' } else { b })
        .collect();
    // No interior NULs remain after sanitizing.
    CString::new(sanitized).unwrap_or_default()
}

pub(crate) fn clear_error(out_error: *mut *mut native_io_error_t) {
    if !out_error.is_null() {
        // Safety: caller provided a valid out_error pointer.
        unsafe {
            *out_error = ptr::null_mut();
        }
    }
}

pub(crate) fn write_error(out_error: *mut *mut native_io_error_t, error: &NativeIoError) {
    if out_error.is_null() {
        return;
    }
    let handle = Box::new(ErrorHandle {
        kind: error.kind(),
        message: cstring_from_str_lossy(&error.to_string()),
    });
    // Safety: out_error is non-null and points to writable memory.
    unsafe {
        *out_error = Box::into_raw(handle) as *mut native_io_error_t;
    }
}

/// Returns the message for an error allocated by native_io.
///
/// The returned pointer is valid as long as the error handle is alive.
#[unsafe(no_mangle)]
pub extern "C" fn native_io_error_message(error: *const native_io_error_t) -> *const c_char {
    if error.is_null() {
        return ptr::null();
    }
    // Safety: error must be a valid handle allocated by native_io.
    let handle = unsafe { &*(error as *const ErrorHandle) };
    handle.message.as_ptr()
}

/// Returns the category of an error allocated by native_io.
#[unsafe(no_mangle)]
pub extern "C" fn native_io_error_kind(error: *const native_io_error_t) -> native_io_error_kind_t {
    if error.is_null() {
        return native_io_error_kind_t::NATIVE_IO_ERROR_NULL_ARGUMENT;
    }
    // Safety: error must be a valid handle allocated by native_io.
    let handle = unsafe { &*(error as *const ErrorHandle) };
    handle.kind
}

/// Frees an error returned by native_io.
#[unsafe(no_mangle)]
pub extern "C" fn native_io_error_free(error: *mut native_io_error_t) {
    if error.is_null() {
        return;
    }
    // Safety: error must be a valid handle allocated by native_io.
    unsafe {
        drop(Box::from_raw(error as *mut ErrorHandle));
    }
}
