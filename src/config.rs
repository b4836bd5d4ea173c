//! Process-wide configuration for the shim.

use std::sync::RwLock;

use log::debug;
use once_cell::sync::Lazy;

use crate::format::DEFAULT_PRECISION;

/// Largest fractional digit count `printd` will render.
pub const MAX_DOUBLE_PRECISION: u32 = 40;

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

/// Settings applied by the C exports.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Flush stdout after every print, so prompts written without a newline
    /// are visible before a blocking scan.
    pub flush_after_write: bool,
    /// Fractional digits used by `printd`.
    pub double_precision: u32,
    /// Returned by `scani` when no integer could be read.
    pub scan_int_fallback: i32,
    /// Returned by `scand` when no number could be read.
    pub scan_double_fallback: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flush_after_write: true,
            double_precision: DEFAULT_PRECISION as u32,
            scan_int_fallback: 0,
            scan_double_fallback: 0.0,
        }
    }
}

impl Config {
    pub fn double_precision(&self) -> usize {
        self.double_precision.min(MAX_DOUBLE_PRECISION) as usize
    }
}

impl From<&native_io_config_t> for Config {
    fn from(value: &native_io_config_t) -> Self {
        Self {
            flush_after_write: value.flush_after_write,
            double_precision: value.double_precision.min(MAX_DOUBLE_PRECISION),
            scan_int_fallback: value.scan_int_fallback,
            scan_double_fallback: value.scan_double_fallback,
        }
    }
}

impl From<Config> for native_io_config_t {
    fn from(value: Config) -> Self {
        Self {
            flush_after_write: value.flush_after_write,
            double_precision: value.double_precision,
            scan_int_fallback: value.scan_int_fallback,
            scan_double_fallback: value.scan_double_fallback,
        }
    }
}

/// Returns a snapshot of the active configuration.
pub fn current() -> Config {
    *CONFIG.read().unwrap_or_else(|err| err.into_inner())
}

/// Replaces the active configuration.
pub fn install(config: Config) {
    debug!(target: "native_io", "installing configuration {config:?}");
    let mut guard = CONFIG.write().unwrap_or_else(|err| err.into_inner());
    *guard = config;
}

/// Configuration for the native I/O shim.
///
/// `double_precision` values above 40 are clamped.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct native_io_config_t {
    pub flush_after_write: bool,
    pub double_precision: u32,
    pub scan_int_fallback: i32,
    pub scan_double_fallback: f64,
}

/// Initializes default configuration values.
///
/// The defaults flush after every write, print doubles with six fractional
/// digits and return zero from failed scans.
#[unsafe(no_mangle)]
pub extern "C" fn native_io_config_init(config: *mut native_io_config_t) {
    if config.is_null() {
        return;
    }
    // Safety: caller provided a writable config pointer.
    unsafe {
        *config = Config::default().into();
    }
}

/// Installs a configuration. A null `config` restores the defaults.
#[unsafe(no_mangle)]
pub extern "C" fn native_io_configure(config: *const native_io_config_t) {
    // Safety: caller guarantees config is null or points to a valid config.
    let config = unsafe { config.as_ref() };
    install(config.map(Config::from).unwrap_or_default());
}
