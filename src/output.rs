//! C bindings for printing to stdout.
//!
//! The plain exports ignore failures after logging them, matching the
//! fire-and-forget contract of `printf`. Each has a `_checked` twin that
//! reports the failure through `out_error` instead.

use std::io::{StdoutLock, Write};
use std::os::raw::c_char;
use std::ptr;
use std::slice;

use crate::config;
use crate::console::Console;
use crate::error::{NativeIoError, native_io_error_t};
use crate::ffi::{ignore_failure, read_cbytes, report_failure};
use crate::format::FormatArg;

/// Kind tag for a formatting argument.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(C)]
pub enum native_io_arg_kind_t {
    NATIVE_IO_ARG_INT = 0,
    NATIVE_IO_ARG_DOUBLE = 1,
    NATIVE_IO_ARG_STRING = 2,
    NATIVE_IO_ARG_CHAR = 3,
}

/// A typed formatting argument for `printf_args`.
///
/// Only the field selected by `kind` is read. `int_value` carries the byte
/// for `NATIVE_IO_ARG_CHAR`. `string_value` must be a NUL-terminated string
/// that stays valid for the duration of the call.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct native_io_arg_t {
    pub kind: native_io_arg_kind_t,
    pub int_value: i64,
    pub double_value: f64,
    pub string_value: *const c_char,
}

impl native_io_arg_t {
    fn empty(kind: native_io_arg_kind_t) -> Self {
        Self {
            kind,
            int_value: 0,
            double_value: 0.0,
            string_value: ptr::null(),
        }
    }

    fn to_format_arg<'a>(self) -> Result<FormatArg<'a>, NativeIoError> {
        Ok(match self.kind {
            native_io_arg_kind_t::NATIVE_IO_ARG_INT => FormatArg::Int(self.int_value),
            native_io_arg_kind_t::NATIVE_IO_ARG_DOUBLE => FormatArg::Double(self.double_value),
            native_io_arg_kind_t::NATIVE_IO_ARG_STRING => {
                FormatArg::Str(read_cbytes(self.string_value, "string_value")?)
            }
            native_io_arg_kind_t::NATIVE_IO_ARG_CHAR => FormatArg::Char(self.int_value as u8),
        })
    }
}

/// Builds an integer argument.
#[unsafe(no_mangle)]
pub extern "C" fn native_io_arg_int(value: i64) -> native_io_arg_t {
    native_io_arg_t {
        int_value: value,
        ..native_io_arg_t::empty(native_io_arg_kind_t::NATIVE_IO_ARG_INT)
    }
}

/// Builds a double argument.
#[unsafe(no_mangle)]
pub extern "C" fn native_io_arg_double(value: f64) -> native_io_arg_t {
    native_io_arg_t {
        double_value: value,
        ..native_io_arg_t::empty(native_io_arg_kind_t::NATIVE_IO_ARG_DOUBLE)
    }
}

/// Builds a string argument. The string is borrowed, not copied.
#[unsafe(no_mangle)]
pub extern "C" fn native_io_arg_string(value: *const c_char) -> native_io_arg_t {
    native_io_arg_t {
        string_value: value,
        ..native_io_arg_t::empty(native_io_arg_kind_t::NATIVE_IO_ARG_STRING)
    }
}

/// Builds a character argument.
#[unsafe(no_mangle)]
pub extern "C" fn native_io_arg_char(value: c_char) -> native_io_arg_t {
    native_io_arg_t {
        int_value: i64::from(value as u8),
        ..native_io_arg_t::empty(native_io_arg_kind_t::NATIVE_IO_ARG_CHAR)
    }
}

fn with_stdout(
    f: impl FnOnce(&mut Console<StdoutLock<'static>>) -> Result<(), NativeIoError>,
) -> Result<(), NativeIoError> {
    let config = config::current();
    let mut console = Console::stdout(&config);
    f(&mut console)
}

fn print_string(msg: *const c_char) -> Result<(), NativeIoError> {
    let msg = read_cbytes(msg, "msg")?;
    with_stdout(|console| console.print_string(msg))
}

fn print_string_raw(msg: *const c_char) -> Result<(), NativeIoError> {
    let msg = read_cbytes(msg, "msg")?;
    with_stdout(|console| console.print_string_raw(msg))
}

fn print_formatted<W: Write>(
    console: &mut Console<W>,
    format: *const c_char,
    args: &[FormatArg<'_>],
) -> Result<(), NativeIoError> {
    let template = read_cbytes(format, "format")?;
    console.print_formatted(template, args)
}

fn print_with_int<W: Write>(
    console: &mut Console<W>,
    format: *const c_char,
    value: i64,
) -> Result<(), NativeIoError> {
    print_formatted(console, format, &[FormatArg::Int(value)])
}

fn print_with_double<W: Write>(
    console: &mut Console<W>,
    format: *const c_char,
    value: f64,
) -> Result<(), NativeIoError> {
    print_formatted(console, format, &[FormatArg::Double(value)])
}

fn print_with_string<W: Write>(
    console: &mut Console<W>,
    format: *const c_char,
    value: *const c_char,
) -> Result<(), NativeIoError> {
    let value = read_cbytes(value, "value")?;
    print_formatted(console, format, &[FormatArg::Str(value)])
}

fn print_formatted_array(
    format: *const c_char,
    args: *const native_io_arg_t,
    len: usize,
) -> Result<(), NativeIoError> {
    let raw = if len == 0 {
        &[][..]
    } else if args.is_null() {
        return Err(NativeIoError::NullArgument("args"));
    } else {
        // Safety: caller guarantees args points to len initialized arguments.
        unsafe { slice::from_raw_parts(args, len) }
    };
    let args = raw
        .iter()
        .map(|arg| arg.to_format_arg())
        .collect::<Result<Vec<_>, _>>()?;
    with_stdout(|console| print_formatted(console, format, &args))
}

/// Prints `msg` followed by a newline.
#[unsafe(no_mangle)]
pub extern "C" fn prints(msg: *const c_char) {
    ignore_failure("prints", print_string(msg));
}

/// Prints `msg` without a trailing newline.
#[unsafe(no_mangle)]
pub extern "C" fn printca(msg: *const c_char) {
    ignore_failure("printca", print_string_raw(msg));
}

/// Prints a 32-bit integer in decimal followed by a newline.
#[unsafe(no_mangle)]
pub extern "C" fn printi(n: i32) {
    ignore_failure("printi", with_stdout(|console| console.print_int(n)));
}

/// Prints a double in fixed notation followed by a newline (`%lf`).
#[unsafe(no_mangle)]
pub extern "C" fn printd(n: f64) {
    ignore_failure("printd", with_stdout(|console| console.print_double(n)));
}

/// Prints `format` with a single integer argument, followed by a newline.
#[unsafe(no_mangle)]
pub extern "C" fn printf_i(format: *const c_char, value: i64) {
    let result = with_stdout(|console| print_with_int(console, format, value));
    ignore_failure("printf_i", result);
}

/// Prints `format` with a single double argument, followed by a newline.
#[unsafe(no_mangle)]
pub extern "C" fn printf_d(format: *const c_char, value: f64) {
    let result = with_stdout(|console| print_with_double(console, format, value));
    ignore_failure("printf_d", result);
}

/// Prints `format` with a single string argument, followed by a newline.
#[unsafe(no_mangle)]
pub extern "C" fn printf_s(format: *const c_char, value: *const c_char) {
    let result = with_stdout(|console| print_with_string(console, format, value));
    ignore_failure("printf_s", result);
}

/// Prints `format` with `len` typed arguments, followed by a newline.
///
/// Nothing is printed if an argument does not match its directive.
#[unsafe(no_mangle)]
pub extern "C" fn printf_args(format: *const c_char, args: *const native_io_arg_t, len: usize) {
    ignore_failure("printf_args", print_formatted_array(format, args, len));
}

/// Like `prints`, but reports failures through `out_error`.
#[unsafe(no_mangle)]
pub extern "C" fn prints_checked(
    msg: *const c_char,
    out_error: *mut *mut native_io_error_t,
) -> bool {
    report_failure(print_string(msg), out_error)
}

/// Like `printca`, but reports failures through `out_error`.
#[unsafe(no_mangle)]
pub extern "C" fn printca_checked(
    msg: *const c_char,
    out_error: *mut *mut native_io_error_t,
) -> bool {
    report_failure(print_string_raw(msg), out_error)
}

/// Like `printi`, but reports failures through `out_error`.
#[unsafe(no_mangle)]
pub extern "C" fn printi_checked(n: i32, out_error: *mut *mut native_io_error_t) -> bool {
    report_failure(with_stdout(|console| console.print_int(n)), out_error)
}

/// Like `printd`, but reports failures through `out_error`.
#[unsafe(no_mangle)]
pub extern "C" fn printd_checked(n: f64, out_error: *mut *mut native_io_error_t) -> bool {
    report_failure(with_stdout(|console| console.print_double(n)), out_error)
}

/// Like `printf_args`, but reports failures through `out_error`.
#[unsafe(no_mangle)]
pub extern "C" fn printf_args_checked(
    format: *const c_char,
    args: *const native_io_arg_t,
    len: usize,
    out_error: *mut *mut native_io_error_t,
) -> bool {
    report_failure(print_formatted_array(format, args, len), out_error)
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;
    use crate::config::Config;
    use crate::error::{native_io_error_free, native_io_error_kind, native_io_error_kind_t, native_io_error_message};

    fn checked_error(
        f: impl FnOnce(*mut *mut native_io_error_t) -> bool,
    ) -> (native_io_error_kind_t, String) {
        let mut raw: *mut native_io_error_t = ptr::null_mut();
        assert!(!f(&mut raw));
        let kind = native_io_error_kind(raw);
        let message = unsafe { CStr::from_ptr(native_io_error_message(raw)) }
            .to_string_lossy()
            .into_owned();
        native_io_error_free(raw);
        (kind, message)
    }

    #[test]
    fn arg_constructors_set_kind_and_value() {
        let arg = native_io_arg_int(-3);
        assert_eq!(arg.kind, native_io_arg_kind_t::NATIVE_IO_ARG_INT);
        assert_eq!(arg.to_format_arg().unwrap(), FormatArg::Int(-3));

        let arg = native_io_arg_double(0.5);
        assert_eq!(arg.to_format_arg().unwrap(), FormatArg::Double(0.5));

        let arg = native_io_arg_string(c"text".as_ptr());
        assert_eq!(arg.to_format_arg().unwrap(), FormatArg::Str(b"text"));

        let arg = native_io_arg_char(b'z' as c_char);
        assert_eq!(arg.to_format_arg().unwrap(), FormatArg::Char(b'z'));
    }

    #[test]
    fn null_string_argument_is_rejected() {
        let arg = native_io_arg_string(ptr::null());
        assert!(matches!(
            arg.to_format_arg(),
            Err(NativeIoError::NullArgument("string_value"))
        ));
    }

    #[test]
    fn checked_prints_rejects_null_message() {
        let (kind, message) = checked_error(|out| prints_checked(ptr::null(), out));
        assert_eq!(kind, native_io_error_kind_t::NATIVE_IO_ERROR_NULL_ARGUMENT);
        assert_eq!(message, "msg was null");
    }

    #[test]
    fn checked_printf_args_rejects_mismatch_before_writing() {
        let args = [native_io_arg_double(1.0)];
        let (kind, message) = checked_error(|out| {
            printf_args_checked(c"%d".as_ptr(), args.as_ptr(), args.len(), out)
        });
        assert_eq!(kind, native_io_error_kind_t::NATIVE_IO_ERROR_FORMAT);
        assert_eq!(message, "argument 0 for `%d` must be an int, found double");
    }

    #[test]
    fn checked_printf_args_rejects_null_array() {
        let (kind, _) =
            checked_error(|out| printf_args_checked(c"%d".as_ptr(), ptr::null(), 1, out));
        assert_eq!(kind, native_io_error_kind_t::NATIVE_IO_ERROR_NULL_ARGUMENT);
    }

    fn buffer() -> Console<Vec<u8>> {
        Console::new(Vec::new(), &Config::default())
    }

    #[test]
    fn single_int_argument_fills_one_directive() {
        let mut console = buffer();
        print_with_int(&mut console, c"[%5ld]".as_ptr(), -42).unwrap();
        assert_eq!(console.into_inner(), b"[  -42]\n");

        let err = print_with_int(&mut buffer(), c"%s".as_ptr(), 1).unwrap_err();
        assert_eq!(err.kind(), native_io_error_kind_t::NATIVE_IO_ERROR_FORMAT);
    }

    #[test]
    fn single_double_argument_fills_one_directive() {
        let mut console = buffer();
        print_with_double(&mut console, c"x=%.2f".as_ptr(), 2.345).unwrap();
        assert_eq!(console.into_inner(), b"x=2.35\n");

        let mut console = buffer();
        let err = print_with_double(&mut console, c"%d".as_ptr(), 1.0).unwrap_err();
        assert_eq!(err.kind(), native_io_error_kind_t::NATIVE_IO_ERROR_FORMAT);
        assert!(console.into_inner().is_empty());
    }

    #[test]
    fn single_string_argument_fills_one_directive() {
        let mut console = buffer();
        print_with_string(&mut console, c"<%-6s>".as_ptr(), c"abc".as_ptr()).unwrap();
        assert_eq!(console.into_inner(), b"<abc   >\n");

        let err = print_with_string(&mut buffer(), c"%s".as_ptr(), ptr::null()).unwrap_err();
        assert!(matches!(err, NativeIoError::NullArgument("value")));

        let err = print_with_string(&mut buffer(), c"%s %s".as_ptr(), c"a".as_ptr()).unwrap_err();
        assert_eq!(err.kind(), native_io_error_kind_t::NATIVE_IO_ERROR_FORMAT);
    }

    #[test]
    fn unchecked_exports_tolerate_null() {
        prints(ptr::null());
        printca(ptr::null());
        printf_s(c"%s".as_ptr(), ptr::null());
        printf_args(ptr::null(), ptr::null(), 0);
    }
}
