//! Logging for the shim, routed to stderr or a C callback.
//!
//! Records never go to stdout: that stream belongs to the program output
//! the shim is producing.

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, RwLock};

use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;

use crate::error::{NativeIoError, cstring_from_str_lossy, native_io_error_t};
use crate::ffi::report_failure;

const DEFAULT_TARGET: &str = "native_io";

static LOGGER_INIT: Once = Once::new();
static LOGGER_INSTALLED: AtomicBool = AtomicBool::new(false);
static LOGGER: Lazy<BridgeLogger> = Lazy::new(BridgeLogger::new);

/// Log level values for native_io logging.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(C)]
pub enum native_io_log_level_t {
    NATIVE_IO_LOG_LEVEL_OFF = 0,
    NATIVE_IO_LOG_LEVEL_ERROR = 1,
    NATIVE_IO_LOG_LEVEL_WARN = 2,
    NATIVE_IO_LOG_LEVEL_INFO = 3,
    NATIVE_IO_LOG_LEVEL_DEBUG = 4,
    NATIVE_IO_LOG_LEVEL_TRACE = 5,
}

impl From<native_io_log_level_t> for LevelFilter {
    fn from(value: native_io_log_level_t) -> Self {
        match value {
            native_io_log_level_t::NATIVE_IO_LOG_LEVEL_OFF => LevelFilter::Off,
            native_io_log_level_t::NATIVE_IO_LOG_LEVEL_ERROR => LevelFilter::Error,
            native_io_log_level_t::NATIVE_IO_LOG_LEVEL_WARN => LevelFilter::Warn,
            native_io_log_level_t::NATIVE_IO_LOG_LEVEL_INFO => LevelFilter::Info,
            native_io_log_level_t::NATIVE_IO_LOG_LEVEL_DEBUG => LevelFilter::Debug,
            native_io_log_level_t::NATIVE_IO_LOG_LEVEL_TRACE => LevelFilter::Trace,
        }
    }
}

impl From<Level> for native_io_log_level_t {
    fn from(value: Level) -> Self {
        match value {
            Level::Error => native_io_log_level_t::NATIVE_IO_LOG_LEVEL_ERROR,
            Level::Warn => native_io_log_level_t::NATIVE_IO_LOG_LEVEL_WARN,
            Level::Info => native_io_log_level_t::NATIVE_IO_LOG_LEVEL_INFO,
            Level::Debug => native_io_log_level_t::NATIVE_IO_LOG_LEVEL_DEBUG,
            Level::Trace => native_io_log_level_t::NATIVE_IO_LOG_LEVEL_TRACE,
        }
    }
}

/// Log record delivered to a C callback.
///
/// String pointers are only valid for the duration of the callback.
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct native_io_log_record_t {
    pub level: native_io_log_level_t,
    pub target: *const c_char,
    pub message: *const c_char,
}

/// Callback invoked for each enabled log record, from whichever thread
/// emitted it.
#[allow(non_camel_case_types)]
pub type native_io_log_callback_t =
    Option<extern "C" fn(record: *const native_io_log_record_t, user_data: *mut c_void)>;

/// Logging configuration.
///
/// A non-null `filter` is a `RUST_LOG`-style directive list and takes
/// precedence over `RUST_LOG` in the environment, which in turn takes
/// precedence over `level`. Without a `callback`, records go to stderr.
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct native_io_log_config_t {
    pub level: native_io_log_level_t,
    pub filter: *const c_char,
    pub callback: native_io_log_callback_t,
    pub user_data: *mut c_void,
}

#[derive(Clone, Debug, PartialEq)]
struct Directive {
    target: String,
    level: LevelFilter,
}

/// Per-target level filter; the longest matching target prefix wins.
#[derive(Clone, Debug, PartialEq)]
struct LogFilter {
    default: LevelFilter,
    directives: Vec<Directive>,
}

impl LogFilter {
    fn for_level(level: LevelFilter) -> Self {
        Self {
            default: LevelFilter::Off,
            directives: vec![Directive {
                target: DEFAULT_TARGET.to_string(),
                level,
            }],
        }
    }

    fn parse(spec: &str) -> Result<Self, String> {
        let mut filter = Self {
            default: LevelFilter::Off,
            directives: Vec::new(),
        };

        for directive in spec.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.split_once('=') {
                Some((target, level)) => {
                    let target = target.trim();
                    let level = level.trim();
                    if target.is_empty() {
                        return Err(format!("missing target before `={level}`"));
                    }
                    let level =
                        parse_level(level).ok_or_else(|| format!("invalid level `{level}`"))?;
                    filter.directives.push(Directive {
                        target: target.to_string(),
                        level,
                    });
                }
                None => match parse_level(directive) {
                    Some(level) => filter.default = level,
                    None => filter.directives.push(Directive {
                        target: directive.to_string(),
                        level: LevelFilter::Trace,
                    }),
                },
            }
        }

        Ok(filter)
    }

    fn level_for(&self, target: &str) -> LevelFilter {
        self.directives
            .iter()
            .filter(|d| target.starts_with(&d.target))
            .max_by_key(|d| d.target.len())
            .map_or(self.default, |d| d.level)
    }

    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level().to_level_filter() <= self.level_for(metadata.target())
    }

    fn max_level(&self) -> LevelFilter {
        self.directives
            .iter()
            .map(|d| d.level)
            .fold(self.default, Ord::max)
    }
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

struct Sink {
    filter: LogFilter,
    callback: native_io_log_callback_t,
    user_data: usize,
}

struct BridgeLogger {
    sink: RwLock<Sink>,
}

impl BridgeLogger {
    fn new() -> Self {
        Self {
            sink: RwLock::new(Sink {
                filter: LogFilter::for_level(LevelFilter::Warn),
                callback: None,
                user_data: 0,
            }),
        }
    }

    fn replace(&self, sink: Sink) {
        *self.sink.write().unwrap_or_else(|err| err.into_inner()) = sink;
    }
}

impl Log for BridgeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let sink = self.sink.read().unwrap_or_else(|err| err.into_inner());
        sink.filter.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        let (callback, user_data) = {
            let sink = self.sink.read().unwrap_or_else(|err| err.into_inner());
            if !sink.filter.enabled(record.metadata()) {
                return;
            }
            (sink.callback, sink.user_data)
        };

        match callback {
            Some(callback) => {
                let target = cstring_from_str_lossy(record.target());
                let message = cstring_from_str_lossy(&record.args().to_string());
                let raw = native_io_log_record_t {
                    level: record.level().into(),
                    target: target.as_ptr(),
                    message: message.as_ptr(),
                };
                callback(&raw, user_data as *mut c_void);
            }
            None => eprintln!("{} {}: {}", record.level(), record.target(), record.args()),
        }
    }

    fn flush(&self) {}
}

fn read_filter(value: *const c_char) -> Option<String> {
    if value.is_null() {
        return None;
    }
    // Safety: caller guarantees a valid, NUL-terminated C string.
    let cstr = unsafe { CStr::from_ptr(value) };
    Some(cstr.to_string_lossy().into_owned())
}

fn resolve_filter(config: Option<&native_io_log_config_t>) -> Result<LogFilter, String> {
    if let Some(spec) = config.and_then(|config| read_filter(config.filter)) {
        return LogFilter::parse(&spec).map_err(|err| format!("invalid log filter `{spec}`: {err}"));
    }
    if let Ok(spec) = std::env::var("RUST_LOG") {
        return LogFilter::parse(&spec).map_err(|err| format!("invalid RUST_LOG `{spec}`: {err}"));
    }
    let level = config.map_or(native_io_log_level_t::NATIVE_IO_LOG_LEVEL_WARN, |config| {
        config.level
    });
    Ok(LogFilter::for_level(level.into()))
}

fn install_logger() -> Result<(), String> {
    LOGGER_INIT.call_once(|| {
        if log::set_logger(&*LOGGER).is_ok() {
            LOGGER_INSTALLED.store(true, Ordering::SeqCst);
        }
    });
    if LOGGER_INSTALLED.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err("another logger is already installed in this process".to_string())
    }
}

fn init(config: Option<&native_io_log_config_t>) -> Result<(), String> {
    let filter = resolve_filter(config)?;
    install_logger()?;
    let max_level = filter.max_level();
    LOGGER.replace(Sink {
        filter,
        callback: config.and_then(|config| config.callback),
        user_data: config.map_or(0, |config| config.user_data as usize),
    });
    log::set_max_level(max_level);
    Ok(())
}

/// Initializes default logging configuration values: WARN for the
/// `native_io` target, no filter string and no callback.
#[unsafe(no_mangle)]
pub extern "C" fn native_io_log_config_init(config: *mut native_io_log_config_t) {
    if config.is_null() {
        return;
    }
    // Safety: caller provided a writable config pointer.
    unsafe {
        *config = native_io_log_config_t {
            level: native_io_log_level_t::NATIVE_IO_LOG_LEVEL_WARN,
            filter: ptr::null(),
            callback: None,
            user_data: ptr::null_mut(),
        };
    }
}

/// Initializes logging. A null `config` selects the defaults.
///
/// May be called again later to change the configuration.
#[unsafe(no_mangle)]
pub extern "C" fn native_io_log_init(
    config: *const native_io_log_config_t,
    out_error: *mut *mut native_io_error_t,
) -> bool {
    // Safety: caller guarantees config is null or points to a valid config.
    let config = unsafe { config.as_ref() };
    report_failure(init(config).map_err(NativeIoError::Logging), out_error)
}
