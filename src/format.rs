//! Typed `printf`-style formatting.
//!
//! Templates use C directive syntax (`%[flags][width][.precision][length]conv`)
//! but arguments come from a closed set of typed values. Every directive is
//! matched positionally against the argument list before anything is
//! written, so a mismatched call produces an error instead of reading
//! garbage off the stack.

use thiserror::Error;

/// Upper bound applied to widths and precisions, including those taken
/// from `*` arguments.
pub const MAX_FIELD_WIDTH: usize = 1 << 16;

/// Default number of fractional digits for `%f`, `%e` and `%g`.
pub const DEFAULT_PRECISION: usize = 6;

/// A single formatting argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatArg<'a> {
    Int(i64),
    Double(f64),
    Str(&'a [u8]),
    Char(u8),
}

impl FormatArg<'_> {
    fn kind_name(&self) -> &'static str {
        match self {
            FormatArg::Int(_) => "int",
            FormatArg::Double(_) => "double",
            FormatArg::Str(_) => "string",
            FormatArg::Char(_) => "char",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("argument {index} for `%{conversion}` is missing")]
    MissingArgument { index: usize, conversion: char },
    #[error("argument {index} for `%{conversion}` must be {expected}, found {found}")]
    ArgumentMismatch {
        index: usize,
        conversion: char,
        expected: &'static str,
        found: &'static str,
    },
    #[error("`%{conversion}` is not supported")]
    Unsupported { conversion: char },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    left_justify: bool,
    force_sign: bool,
    space_sign: bool,
    alt_form: bool,
    zero_pad: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Count {
    Absent,
    Fixed(usize),
    FromArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Length {
    Default,
    Char,
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Directive {
    flags: Flags,
    width: Count,
    precision: Count,
    length: Length,
    conversion: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a [u8]),
    Percent,
    Directive(Directive),
}

/// Width, precision and flags after `*` arguments have been resolved.
#[derive(Debug, Clone, Copy)]
struct Field {
    flags: Flags,
    width: usize,
    precision: Option<usize>,
}

/// Renders `template` with `args` into a new buffer.
///
/// Surplus arguments are ignored. Nothing is produced when any directive
/// lacks an argument of a compatible kind.
pub fn render(template: &[u8], args: &[FormatArg<'_>]) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::with_capacity(template.len());
    let mut cursor = ArgCursor { args, next: 0 };

    for segment in parse_template(template) {
        match segment {
            Segment::Literal(bytes) => out.extend_from_slice(bytes),
            Segment::Percent => out.push(b'%'),
            Segment::Directive(directive) => render_directive(&directive, &mut cursor, &mut out)?,
        }
    }

    Ok(out)
}

/// Renders `value` the way `%.{precision}f` does.
pub fn render_fixed(value: f64, precision: usize) -> Vec<u8> {
    let field = Field {
        flags: Flags::default(),
        width: 0,
        precision: Some(precision.min(MAX_FIELD_WIDTH)),
    };
    let mut out = Vec::new();
    format_double(value, b'f', &field, &mut out);
    out
}

struct ArgCursor<'a, 'b> {
    args: &'b [FormatArg<'a>],
    next: usize,
}

impl<'a> ArgCursor<'a, '_> {
    fn take(&mut self, conversion: u8) -> Result<(usize, FormatArg<'a>), FormatError> {
        let index = self.next;
        let arg = self
            .args
            .get(index)
            .copied()
            .ok_or(FormatError::MissingArgument {
                index,
                conversion: conversion as char,
            })?;
        self.next += 1;
        Ok((index, arg))
    }

    fn take_int(&mut self, conversion: u8) -> Result<i64, FormatError> {
        match self.take(conversion)? {
            (_, FormatArg::Int(value)) => Ok(value),
            (index, other) => Err(mismatch(index, conversion, "an int", &other)),
        }
    }
}

fn mismatch(index: usize, conversion: u8, expected: &'static str, found: &FormatArg<'_>) -> FormatError {
    FormatError::ArgumentMismatch {
        index,
        conversion: conversion as char,
        expected,
        found: found.kind_name(),
    }
}

fn parse_template(template: &[u8]) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut pos = 0;
    let len = template.len();

    while pos < len {
        let start = pos;
        while pos < len && template[pos] != b'%' {
            pos += 1;
        }
        if pos > start {
            segments.push(Segment::Literal(&template[start..pos]));
        }
        if pos >= len {
            break;
        }
        pos += 1;
        if pos >= len {
            segments.push(Segment::Literal(b"%"));
            break;
        }
        match parse_directive(&template[pos..]) {
            // Flags and width on a '%' conversion are ignored, as glibc does.
            Some((directive, consumed)) if directive.conversion == b'%' => {
                pos += consumed;
                segments.push(Segment::Percent);
            }
            Some((directive, consumed)) => {
                pos += consumed;
                segments.push(Segment::Directive(directive));
            }
            // Malformed directives are emitted verbatim, starting with the '%'.
            None => segments.push(Segment::Literal(b"%")),
        }
    }

    segments
}

/// Parses one directive from the bytes following a '%'.
fn parse_directive(fmt: &[u8]) -> Option<(Directive, usize)> {
    let mut pos = 0;
    let len = fmt.len();

    let mut flags = Flags::default();
    while pos < len {
        match fmt[pos] {
            b'-' => flags.left_justify = true,
            b'+' => flags.force_sign = true,
            b' ' => flags.space_sign = true,
            b'#' => flags.alt_form = true,
            b'0' => flags.zero_pad = true,
            _ => break,
        }
        pos += 1;
    }
    if flags.force_sign {
        flags.space_sign = false;
    }
    if flags.left_justify {
        flags.zero_pad = false;
    }

    let width = if pos < len && fmt[pos] == b'*' {
        pos += 1;
        Count::FromArg
    } else {
        let (value, consumed) = parse_decimal(&fmt[pos..]);
        pos += consumed;
        if consumed > 0 {
            Count::Fixed(value)
        } else {
            Count::Absent
        }
    };

    let precision = if pos < len && fmt[pos] == b'.' {
        pos += 1;
        if pos < len && fmt[pos] == b'*' {
            pos += 1;
            Count::FromArg
        } else {
            let (value, consumed) = parse_decimal(&fmt[pos..]);
            pos += consumed;
            Count::Fixed(value)
        }
    } else {
        Count::Absent
    };

    let mut length = Length::Default;
    while pos < len {
        length = match (fmt[pos], length) {
            (b'h', Length::Short) => Length::Char,
            (b'h', _) => Length::Short,
            (b'l' | b'j' | b'z' | b't' | b'L', _) => Length::Long,
            _ => break,
        };
        pos += 1;
    }

    let conversion = *fmt.get(pos)?;
    match conversion {
        b'd' | b'i' | b'u' | b'x' | b'X' | b'o' | b'c' | b's' | b'f' | b'F' | b'e' | b'E'
        | b'g' | b'G' | b'a' | b'A' | b'n' | b'p' | b'%' => {}
        _ => return None,
    }

    Some((
        Directive {
            flags,
            width,
            precision,
            length,
            conversion,
        },
        pos + 1,
    ))
}

fn parse_decimal(digits: &[u8]) -> (usize, usize) {
    let mut value = 0usize;
    let mut consumed = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        value = value.saturating_mul(10).saturating_add(usize::from(b - b'0'));
        consumed += 1;
    }
    (value.min(MAX_FIELD_WIDTH), consumed)
}

fn render_directive(
    directive: &Directive,
    cursor: &mut ArgCursor<'_, '_>,
    out: &mut Vec<u8>,
) -> Result<(), FormatError> {
    let conversion = directive.conversion;
    if matches!(conversion, b'n' | b'p' | b'a' | b'A') {
        return Err(FormatError::Unsupported {
            conversion: conversion as char,
        });
    }

    let mut flags = directive.flags;
    let width = match directive.width {
        Count::Absent => 0,
        Count::Fixed(width) => width,
        Count::FromArg => {
            let width = cursor.take_int(conversion)?;
            if width < 0 {
                flags.left_justify = true;
                flags.zero_pad = false;
            }
            clamp_count(width.unsigned_abs())
        }
    };
    let precision = match directive.precision {
        Count::Absent => None,
        Count::Fixed(precision) => Some(precision),
        Count::FromArg => {
            let precision = cursor.take_int(conversion)?;
            (precision >= 0).then(|| clamp_count(precision.unsigned_abs()))
        }
    };
    let field = Field {
        flags,
        width,
        precision,
    };

    match conversion {
        b'd' | b'i' => {
            let value = cursor.take_int(conversion)?;
            format_signed(truncate_signed(value, directive.length), &field, out);
        }
        b'u' | b'x' | b'X' | b'o' => {
            let value = cursor.take_int(conversion)?;
            format_unsigned(truncate_unsigned(value, directive.length), conversion, &field, out);
        }
        b'c' => {
            let byte = match cursor.take(conversion)? {
                (_, FormatArg::Char(byte)) => byte,
                (_, FormatArg::Int(value)) => value as u8,
                (index, other) => return Err(mismatch(index, conversion, "a char", &other)),
            };
            pad_field(out, b"", &[byte], &field, false);
        }
        b's' => {
            let bytes = match cursor.take(conversion)? {
                (_, FormatArg::Str(bytes)) => bytes,
                (index, other) => return Err(mismatch(index, conversion, "a string", &other)),
            };
            let shown = match field.precision {
                Some(limit) => &bytes[..bytes.len().min(limit)],
                None => bytes,
            };
            pad_field(out, b"", shown, &field, false);
        }
        _ => {
            let value = match cursor.take(conversion)? {
                (_, FormatArg::Double(value)) => value,
                (index, other) => return Err(mismatch(index, conversion, "a double", &other)),
            };
            format_double(value, conversion, &field, out);
        }
    }

    Ok(())
}

fn clamp_count(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX).min(MAX_FIELD_WIDTH)
}

fn truncate_signed(value: i64, length: Length) -> i64 {
    match length {
        Length::Char => i64::from(value as i8),
        Length::Short => i64::from(value as i16),
        Length::Default => i64::from(value as i32),
        Length::Long => value,
    }
}

fn truncate_unsigned(value: i64, length: Length) -> u64 {
    match length {
        Length::Char => u64::from(value as u8),
        Length::Short => u64::from(value as u16),
        Length::Default => u64::from(value as u32),
        Length::Long => value as u64,
    }
}

fn format_signed(value: i64, field: &Field, out: &mut Vec<u8>) {
    let sign: &[u8] = if value < 0 {
        b"-"
    } else if field.flags.force_sign {
        b"+"
    } else if field.flags.space_sign {
        b" "
    } else {
        b""
    };
    let digits = apply_int_precision(value.unsigned_abs().to_string(), value == 0, field.precision);
    // An explicit precision disables zero padding for integer conversions.
    let zero_pad = field.flags.zero_pad && field.precision.is_none();
    pad_field(out, sign, digits.as_bytes(), field, zero_pad);
}

fn format_unsigned(value: u64, conversion: u8, field: &Field, out: &mut Vec<u8>) {
    let raw = match conversion {
        b'x' => format!("{value:x}"),
        b'X' => format!("{value:X}"),
        b'o' => format!("{value:o}"),
        _ => value.to_string(),
    };
    let mut digits = apply_int_precision(raw, value == 0, field.precision);

    let mut prefix: &[u8] = b"";
    if field.flags.alt_form {
        match conversion {
            b'o' if !digits.starts_with('0') => digits.insert(0, '0'),
            b'x' if value != 0 => prefix = b"0x",
            b'X' if value != 0 => prefix = b"0X",
            _ => {}
        }
    }

    let zero_pad = field.flags.zero_pad && field.precision.is_none();
    pad_field(out, prefix, digits.as_bytes(), field, zero_pad);
}

fn apply_int_precision(digits: String, is_zero: bool, precision: Option<usize>) -> String {
    match precision {
        Some(0) if is_zero => String::new(),
        Some(min) if digits.len() < min => {
            let mut padded = "0".repeat(min - digits.len());
            padded.push_str(&digits);
            padded
        }
        _ => digits,
    }
}

fn format_double(value: f64, conversion: u8, field: &Field, out: &mut Vec<u8>) {
    let uppercase = conversion.is_ascii_uppercase();
    let sign: &[u8] = if value.is_sign_negative() {
        b"-"
    } else if field.flags.force_sign {
        b"+"
    } else if field.flags.space_sign {
        b" "
    } else {
        b""
    };

    if !value.is_finite() {
        let body = match (value.is_nan(), uppercase) {
            (true, false) => "nan",
            (true, true) => "NAN",
            (false, false) => "inf",
            (false, true) => "INF",
        };
        pad_field(out, sign, body.as_bytes(), field, false);
        return;
    }

    let precision = field.precision.unwrap_or(DEFAULT_PRECISION);
    let alt = field.flags.alt_form;
    let magnitude = value.abs();
    let body = match conversion.to_ascii_lowercase() {
        b'e' => exponent_notation(magnitude, precision, uppercase, alt),
        b'g' => general_notation(magnitude, precision, uppercase, alt),
        _ => fixed_notation(magnitude, precision, alt),
    };
    pad_field(out, sign, body.as_bytes(), field, field.flags.zero_pad);
}

fn fixed_notation(magnitude: f64, precision: usize, alt: bool) -> String {
    let mut body = format!("{magnitude:.precision$}");
    if alt && precision == 0 {
        body.push('.');
    }
    body
}

fn exponent_notation(magnitude: f64, precision: usize, uppercase: bool, alt: bool) -> String {
    let (mut mantissa, exponent) = split_exponent(magnitude, precision);
    if alt && precision == 0 {
        mantissa.push('.');
    }
    let marker = if uppercase { 'E' } else { 'e' };
    let exp_sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{marker}{exp_sign}{:02}", exponent.unsigned_abs())
}

/// Rust renders `{:.3e}` as `1.235e4`; split that into mantissa and exponent.
fn split_exponent(magnitude: f64, precision: usize) -> (String, i32) {
    let rendered = format!("{magnitude:.precision$e}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => (mantissa.to_string(), exponent.parse().unwrap_or(0)),
        None => (rendered, 0),
    }
}

fn general_notation(magnitude: f64, precision: usize, uppercase: bool, alt: bool) -> String {
    let significant = precision.max(1);
    let exponent = if magnitude == 0.0 {
        0
    } else {
        split_exponent(magnitude, significant - 1).1
    };

    let significant_i = i32::try_from(significant).unwrap_or(i32::MAX);
    let mut body = if exponent >= -4 && exponent < significant_i {
        let decimals = usize::try_from(significant_i - 1 - exponent).unwrap_or(0);
        fixed_notation(magnitude, decimals, alt)
    } else {
        exponent_notation(magnitude, significant - 1, uppercase, alt)
    };

    if !alt {
        strip_trailing_zeros(&mut body);
    }
    body
}

fn strip_trailing_zeros(body: &mut String) {
    let exponent_at = body.find(['e', 'E']).unwrap_or(body.len());
    let (mantissa, exponent) = body.split_at(exponent_at);
    if !mantissa.contains('.') {
        return;
    }
    let trimmed = mantissa.trim_end_matches('0').trim_end_matches('.');
    *body = format!("{trimmed}{exponent}");
}

fn pad_field(out: &mut Vec<u8>, prefix: &[u8], body: &[u8], field: &Field, zero_pad: bool) {
    let fill = field.width.saturating_sub(prefix.len() + body.len());
    if field.flags.left_justify {
        out.extend_from_slice(prefix);
        out.extend_from_slice(body);
        out.resize(out.len() + fill, b' ');
    } else if zero_pad {
        out.extend_from_slice(prefix);
        out.resize(out.len() + fill, b'0');
        out.extend_from_slice(body);
    } else {
        out.resize(out.len() + fill, b' ');
        out.extend_from_slice(prefix);
        out.extend_from_slice(body);
    }
}
