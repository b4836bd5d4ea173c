//! C-callable print and scan primitives for managed runtimes.
//!
//! The exports write to the process stdout and read from the process stdin
//! with no synchronization beyond the standard stream locks held for the
//! duration of one call. Runtimes that print from several threads must
//! serialize those calls if they need the lines in a particular order.

mod arith;
mod config;
mod error;
mod ffi;
mod input;
mod jni;
mod logging;
mod output;

pub mod console;
pub mod format;
pub mod scan;

pub use arith::add_int;
pub use config::{Config, MAX_DOUBLE_PRECISION};
pub use error::NativeIoError;
pub use format::{FormatArg, FormatError};
