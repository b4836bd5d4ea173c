//! Safe print and scan operations behind the C exports.
//!
//! Each print renders its complete output first and hands it to the writer
//! in one `write_all`, so text from a single call is never interleaved with
//! another call's when the writer is the locked process stdout. Ordering
//! *between* calls on different threads is not coordinated; callers that
//! need a coherent sequence of prints must serialize it themselves.

use std::io::{self, BufRead, StdoutLock, Write};

use crate::config::Config;
use crate::error::NativeIoError;
use crate::format::{self, FormatArg};
use crate::scan;

pub struct Console<W> {
    out: W,
    flush: bool,
    double_precision: usize,
}

impl Console<StdoutLock<'static>> {
    /// Locks the process stdout for the lifetime of the console.
    pub fn stdout(config: &Config) -> Self {
        Self {
            out: io::stdout().lock(),
            flush: config.flush_after_write,
            double_precision: config.double_precision(),
        }
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, config: &Config) -> Self {
        Self {
            out,
            flush: config.flush_after_write,
            double_precision: config.double_precision(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes `msg` followed by a newline.
    pub fn print_string(&mut self, msg: &[u8]) -> Result<(), NativeIoError> {
        let mut line = Vec::with_capacity(msg.len() + 1);
        line.extend_from_slice(msg);
        line.push(b'\n');
        self.emit(&line)
    }

    /// Writes `msg` as-is.
    pub fn print_string_raw(&mut self, msg: &[u8]) -> Result<(), NativeIoError> {
        self.emit(msg)
    }

    /// Renders `template` with `args` and writes it followed by a newline.
    ///
    /// Nothing is written if the arguments do not match the template.
    pub fn print_formatted(
        &mut self,
        template: &[u8],
        args: &[FormatArg<'_>],
    ) -> Result<(), NativeIoError> {
        let mut line = format::render(template, args)?;
        line.push(b'\n');
        self.emit(&line)
    }

    pub fn print_int(&mut self, n: i32) -> Result<(), NativeIoError> {
        self.emit(format!("{n}\n").as_bytes())
    }

    /// Writes `n` in fixed notation, like `printf("%lf\n", n)`.
    pub fn print_double(&mut self, n: f64) -> Result<(), NativeIoError> {
        let mut line = format::render_fixed(n, self.double_precision);
        line.push(b'\n');
        self.emit(&line)
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<(), NativeIoError> {
        self.out
            .write_all(bytes)
            .map_err(NativeIoError::IoWriteFailure)?;
        if self.flush {
            self.out.flush().map_err(NativeIoError::IoWriteFailure)?;
        }
        Ok(())
    }
}

pub fn scan_int_from<R: BufRead + ?Sized>(reader: &mut R) -> Result<i32, NativeIoError> {
    scan::scan_int(reader)
}

pub fn scan_double_from<R: BufRead + ?Sized>(reader: &mut R) -> Result<f64, NativeIoError> {
    scan::scan_double(reader)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn console() -> Console<Vec<u8>> {
        Console::new(Vec::new(), &Config::default())
    }

    fn output(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn print_string_appends_newline() {
        let mut console = console();
        console.print_string(b"hello").unwrap();
        assert_eq!(output(console), "hello\n");
    }

    #[test]
    fn print_string_raw_has_no_newline() {
        let mut console = console();
        console.print_string_raw(b"hello").unwrap();
        assert_eq!(output(console), "hello");
    }

    #[test]
    fn print_int_edge_values() {
        let mut console = console();
        for n in [0, -1, i32::MAX, i32::MIN] {
            console.print_int(n).unwrap();
        }
        assert_eq!(output(console), "0\n-1\n2147483647\n-2147483648\n");
    }

    #[test]
    fn print_double_uses_fixed_notation() {
        let mut console = console();
        console.print_double(3.5).unwrap();
        console.print_double(-0.125).unwrap();
        console.print_double(1e20).unwrap();
        assert_eq!(
            output(console),
            "3.500000\n-0.125000\n100000000000000000000.000000\n"
        );
    }

    #[test]
    fn print_double_honors_configured_precision() {
        let config = Config {
            double_precision: 2,
            ..Config::default()
        };
        let mut console = Console::new(Vec::new(), &config);
        console.print_double(2.0 / 3.0).unwrap();
        assert_eq!(output(console), "0.67\n");
    }

    #[test]
    fn print_formatted_appends_newline() {
        let mut console = console();
        console
            .print_formatted(
                b"%s scored %d (%.1f%%)",
                &[FormatArg::Str(b"ada"), FormatArg::Int(9), FormatArg::Double(90.0)],
            )
            .unwrap();
        assert_eq!(output(console), "ada scored 9 (90.0%)\n");
    }

    #[test]
    fn print_formatted_mismatch_writes_nothing() {
        let mut console = console();
        let err = console
            .print_formatted(b"%d", &[FormatArg::Str(b"nope")])
            .unwrap_err();
        assert!(matches!(err, NativeIoError::FormatFailure(_)));
        assert_eq!(output(console), "");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_reported() {
        let mut console = Console::new(BrokenPipe, &Config::default());
        let err = console.print_int(1).unwrap_err();
        assert!(matches!(err, NativeIoError::IoWriteFailure(_)));
    }

    #[test]
    fn scans_from_reader() {
        let mut input = Cursor::new(b"42\n3.14\n".to_vec());
        assert_eq!(scan_int_from(&mut input).unwrap(), 42);
        assert_eq!(scan_double_from(&mut input).unwrap(), 3.14);
    }
}
