//! JNI-style aliases for runtimes that bind native methods of class `ioTer`
//! by their mangled `Java_ioTer_<method>` symbol.
//!
//! These take plain C arguments rather than a `JNIEnv`; the runtime
//! converts its values before the call.

#![allow(non_snake_case)]

use std::os::raw::c_char;

use crate::{arith, input, output};

#[unsafe(no_mangle)]
pub extern "C" fn Java_ioTer_prints(msg: *const c_char) {
    output::prints(msg);
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_ioTer_printca(msg: *const c_char) {
    output::printca(msg);
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_ioTer_printi(n: i32) {
    output::printi(n);
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_ioTer_printd(n: f64) {
    output::printd(n);
}

/// Legacy name of `Java_ioTer_printd`.
#[unsafe(no_mangle)]
pub extern "C" fn Java_ioTer_printn(n: f64) {
    output::printd(n);
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_ioTer_add(a: i32, b: i32) -> i32 {
    arith::add(a, b)
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_ioTer_scani() -> i32 {
    input::scani()
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_ioTer_scand() -> f64 {
    input::scand()
}
