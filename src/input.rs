//! C bindings for reading numbers from stdin.

use std::io::{self, BufRead, Write};

use log::debug;

use crate::config::{self, Config};
use crate::console;
use crate::error::{NativeIoError, native_io_error_t};
use crate::ffi::{ignore_failure, report_failure};

/// Flushes pending output so a prompt is visible before the scan blocks,
/// as C stdio does for line-buffered stdout.
fn flush_prompt() {
    if let Err(err) = io::stdout().flush() {
        debug!(target: "native_io", "flushing stdout before scan failed: {err}");
    }
}

fn scan_int<R: BufRead + ?Sized>(reader: &mut R) -> Result<i32, NativeIoError> {
    let value = console::scan_int_from(reader)?;
    debug!(target: "native_io", "scanned int {value}");
    Ok(value)
}

fn scan_double<R: BufRead + ?Sized>(reader: &mut R) -> Result<f64, NativeIoError> {
    let value = console::scan_double_from(reader)?;
    debug!(target: "native_io", "scanned double {value}");
    Ok(value)
}

fn scan_int_or_fallback<R: BufRead + ?Sized>(reader: &mut R, config: &Config) -> i32 {
    ignore_failure("scani", scan_int(reader)).unwrap_or(config.scan_int_fallback)
}

fn scan_double_or_fallback<R: BufRead + ?Sized>(reader: &mut R, config: &Config) -> f64 {
    ignore_failure("scand", scan_double(reader)).unwrap_or(config.scan_double_fallback)
}

fn store<T>(out: *mut T, value: T) -> Result<(), NativeIoError> {
    if out.is_null() {
        return Err(NativeIoError::NullArgument("out"));
    }
    // Safety: out is non-null and points to writable memory.
    unsafe {
        *out = value;
    }
    Ok(())
}

/// Reads one integer token from stdin, blocking until one is available.
///
/// Returns the configured fallback (0 by default) if the token is not a
/// valid 32-bit integer or stdin is closed. A malformed token is consumed.
#[unsafe(no_mangle)]
pub extern "C" fn scani() -> i32 {
    flush_prompt();
    scan_int_or_fallback(&mut io::stdin().lock(), &config::current())
}

/// Reads one floating-point token from stdin, blocking until one is available.
///
/// Returns the configured fallback (0.0 by default) if the token is not a
/// valid number or stdin is closed. A malformed token is consumed.
#[unsafe(no_mangle)]
pub extern "C" fn scand() -> f64 {
    flush_prompt();
    scan_double_or_fallback(&mut io::stdin().lock(), &config::current())
}

/// Reads one integer token into `out`.
///
/// On failure `out` is left untouched and `out_error` describes the problem.
#[unsafe(no_mangle)]
pub extern "C" fn scani_checked(out: *mut i32, out_error: *mut *mut native_io_error_t) -> bool {
    if out.is_null() {
        return report_failure(Err(NativeIoError::NullArgument("out")), out_error);
    }
    flush_prompt();
    let scanned = scan_int(&mut io::stdin().lock());
    report_failure(scanned.and_then(|value| store(out, value)), out_error)
}

/// Reads one floating-point token into `out`.
///
/// On failure `out` is left untouched and `out_error` describes the problem.
#[unsafe(no_mangle)]
pub extern "C" fn scand_checked(out: *mut f64, out_error: *mut *mut native_io_error_t) -> bool {
    if out.is_null() {
        return report_failure(Err(NativeIoError::NullArgument("out")), out_error);
    }
    flush_prompt();
    let scanned = scan_double(&mut io::stdin().lock());
    report_failure(scanned.and_then(|value| store(out, value)), out_error)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::ptr;

    use super::*;
    use crate::error::{native_io_error_free, native_io_error_kind, native_io_error_kind_t};

    #[test]
    fn checked_scans_reject_null_output_without_reading() {
        let mut raw: *mut native_io_error_t = ptr::null_mut();
        assert!(!scani_checked(ptr::null_mut(), &mut raw));
        assert_eq!(
            native_io_error_kind(raw),
            native_io_error_kind_t::NATIVE_IO_ERROR_NULL_ARGUMENT
        );
        native_io_error_free(raw);

        let mut raw: *mut native_io_error_t = ptr::null_mut();
        assert!(!scand_checked(ptr::null_mut(), &mut raw));
        native_io_error_free(raw);
    }

    #[test]
    fn store_writes_through_pointer() {
        let mut slot = 0i32;
        store(&mut slot, 17).unwrap();
        assert_eq!(slot, 17);
        assert!(matches!(
            store::<i32>(ptr::null_mut(), 1),
            Err(NativeIoError::NullArgument("out"))
        ));
    }

    #[test]
    fn failed_scans_fall_back_to_defaults() {
        let config = Config::default();
        let mut input = Cursor::new(b"abc 7".to_vec());
        assert_eq!(scan_int_or_fallback(&mut input, &config), 0);
        assert_eq!(scan_int_or_fallback(&mut input, &config), 7);
        assert_eq!(scan_int_or_fallback(&mut input, &config), 0);

        let mut input = Cursor::new(b"abc".to_vec());
        assert_eq!(scan_double_or_fallback(&mut input, &config), 0.0);
        assert_eq!(scan_double_or_fallback(&mut Cursor::new(Vec::new()), &config), 0.0);
    }

    #[test]
    fn failed_scans_return_configured_fallback() {
        let config = Config {
            scan_int_fallback: -1,
            scan_double_fallback: f64::NAN,
            ..Config::default()
        };
        assert_eq!(scan_int_or_fallback(&mut Cursor::new(b"abc".to_vec()), &config), -1);
        assert_eq!(scan_int_or_fallback(&mut Cursor::new(Vec::new()), &config), -1);
        assert!(scan_double_or_fallback(&mut Cursor::new(b"abc".to_vec()), &config).is_nan());
        assert!(scan_double_or_fallback(&mut Cursor::new(Vec::new()), &config).is_nan());

        let mut input = Cursor::new(b"2.5\n".to_vec());
        assert_eq!(scan_double_or_fallback(&mut input, &config), 2.5);
    }
}
