use std::io::Cursor;

use native_io::console::{self, Console};
use native_io::{Config, FormatArg, NativeIoError, add_int};

fn captured(f: impl FnOnce(&mut Console<Vec<u8>>)) -> String {
    let mut console = Console::new(Vec::new(), &Config::default());
    f(&mut console);
    String::from_utf8(console.into_inner()).unwrap()
}

#[test]
fn add_wraps_at_i32_bounds() {
    for (a, b) in [(1, 2), (-5, 3), (i32::MAX, 1), (i32::MIN, -1), (i32::MAX, i32::MAX)] {
        assert_eq!(add_int(a, b), a.wrapping_add(b));
    }
}

#[test]
fn prints_match_c_stdio_output() {
    let out = captured(|console| {
        console.print_string(b"hello").unwrap();
        console.print_string_raw(b"hello").unwrap();
        console.print_string_raw(b" ").unwrap();
        console.print_int(-2147483648).unwrap();
        console.print_double(3.5).unwrap();
    });
    assert_eq!(out, "hello\nhello -2147483648\n3.500000\n");
}

#[test]
fn formatted_line_mixes_argument_kinds() {
    let out = captured(|console| {
        console
            .print_formatted(
                b"[%-6s|%4d|%7.3f|%c]",
                &[
                    FormatArg::Str(b"cat"),
                    FormatArg::Int(12),
                    FormatArg::Double(-1.5),
                    FormatArg::Char(b'!'),
                ],
            )
            .unwrap();
    });
    assert_eq!(out, "[cat   |  12| -1.500|!]\n");
}

#[test]
fn prompt_then_scan_session() {
    let mut stdin = Cursor::new(b"7\n2.25\nseven\n".to_vec());

    let out = captured(|console| {
        console.print_string_raw(b"count? ").unwrap();
        let count = console::scan_int_from(&mut stdin).unwrap();
        console.print_string_raw(b"scale? ").unwrap();
        let scale = console::scan_double_from(&mut stdin).unwrap();
        console.print_double(f64::from(count) * scale).unwrap();
    });
    assert_eq!(out, "count? scale? 15.750000\n");

    let err = console::scan_int_from(&mut stdin).unwrap_err();
    assert!(matches!(err, NativeIoError::IoParseFailure { .. }));
    assert!(matches!(
        console::scan_int_from(&mut stdin),
        Err(NativeIoError::EndOfInput)
    ));
}
