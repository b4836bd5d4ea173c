//! Whitespace-delimited token scanning over any `BufRead`.
//!
//! A scan skips leading whitespace, as C `isspace` defines it, then consumes
//! bytes up to (not including) the next whitespace byte. The trailing delimiter stays in the
//! reader, the way `scanf("%d")` leaves the newline behind. A token that
//! fails to parse is still consumed, so a retry sees fresh input.

use std::io::{self, BufRead};

use crate::error::NativeIoError;

/// Longest token a scan will accept.
pub const MAX_TOKEN_LEN: usize = 4096;

/// Reads one integer token.
pub fn scan_int<R: BufRead + ?Sized>(reader: &mut R) -> Result<i32, NativeIoError> {
    let token = read_token(reader)?;
    parse_int(&token)
}

/// Reads one floating-point token.
pub fn scan_double<R: BufRead + ?Sized>(reader: &mut R) -> Result<f64, NativeIoError> {
    let token = read_token(reader)?;
    parse_double(&token)
}

/// Reads the next whitespace-delimited token.
///
/// Returns `EndOfInput` if the reader is exhausted before any token byte is
/// seen. Tokens longer than [`MAX_TOKEN_LEN`] are consumed in full and
/// reported as `TokenTooLong`. Once end of input is observed the reader is
/// not polled again.
pub fn read_token<R: BufRead + ?Sized>(reader: &mut R) -> Result<Vec<u8>, NativeIoError> {
    if skip_whitespace(reader)? {
        return Err(NativeIoError::EndOfInput);
    }

    let mut token = Vec::new();
    let mut overflowed = false;
    loop {
        let done = step(reader, |buf| {
            let end = buf.iter().position(is_space).unwrap_or(buf.len());
            let room = MAX_TOKEN_LEN.saturating_sub(token.len());
            if end > room {
                overflowed = true;
            }
            token.extend_from_slice(&buf[..end.min(room)]);
            (end, buf.is_empty() || end < buf.len())
        })?;
        if done {
            break;
        }
    }

    if overflowed {
        return Err(NativeIoError::TokenTooLong {
            limit: MAX_TOKEN_LEN,
        });
    }
    if token.is_empty() {
        return Err(NativeIoError::EndOfInput);
    }
    Ok(token)
}

/// Skips leading whitespace. Returns `true` if input ran out.
fn skip_whitespace<R: BufRead + ?Sized>(reader: &mut R) -> Result<bool, NativeIoError> {
    loop {
        let stop = step(reader, |buf| {
            let skipped = buf.iter().take_while(|b| is_space(b)).count();
            let stop = if buf.is_empty() {
                Some(true)
            } else if skipped < buf.len() {
                Some(false)
            } else {
                None
            };
            (skipped, stop)
        })?;
        if let Some(at_eof) = stop {
            return Ok(at_eof);
        }
    }
}

/// Fills the reader's buffer with a single `fill_buf` call, hands it to `f`
/// and consumes the byte count `f` returns. An empty slice is end of input.
fn step<R, T, F>(reader: &mut R, mut f: F) -> Result<T, NativeIoError>
where
    R: BufRead + ?Sized,
    F: FnMut(&[u8]) -> (usize, T),
{
    loop {
        match reader.fill_buf() {
            Ok(buf) => {
                let (used, value) = f(buf);
                reader.consume(used);
                return Ok(value);
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(NativeIoError::IoReadFailure(err)),
        }
    }
}

/// C `isspace` in the "C" locale, which also counts vertical tab.
fn is_space(byte: &u8) -> bool {
    byte.is_ascii_whitespace() || *byte == 0x0b
}

/// Parses a decimal `i32` with an optional sign.
pub fn parse_int(token: &[u8]) -> Result<i32, NativeIoError> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|text| text.parse::<i32>().ok())
        .ok_or_else(|| parse_failure("an integer", token))
}

/// Parses a decimal or exponent-form `f64`; `inf`, `infinity` and `nan`
/// are accepted in any case.
pub fn parse_double(token: &[u8]) -> Result<f64, NativeIoError> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .ok_or_else(|| parse_failure("a number", token))
}

fn parse_failure(expected: &'static str, token: &[u8]) -> NativeIoError {
    NativeIoError::IoParseFailure {
        expected,
        token: String::from_utf8_lossy(token).into_owned(),
    }
}
