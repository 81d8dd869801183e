use std::ffi::{c_char, c_void};

use libbtck_sys::{
    btck_LogLevel, btck_LoggingConnection, btck_LoggingOptions, btck_logging_connection_create,
    btck_logging_connection_destroy, btck_logging_disable, btck_logging_set_level,
    BTCK_LOG_LEVEL_DEBUG, BTCK_LOG_LEVEL_INFO, BTCK_LOG_LEVEL_TRACE,
};

use crate::{ffi::c_helpers, KernelError};

/// A function for handling log messages produced by the engine.
///
/// The engine calls it on whichever thread is decoding a record, so
/// implementations must be shareable across threads.
pub trait Log: Send + Sync {
    fn log(&self, message: &str);
}

unsafe extern "C" fn log_callback<T: Log + 'static>(
    user_data: *mut c_void,
    message: *const c_char,
    message_len: usize,
) {
    let message = unsafe { c_helpers::to_string(message, message_len) };
    let log = user_data as *mut T;
    (*log).log(&message);
}

unsafe extern "C" fn destroy_log_callback<T>(user_data: *mut c_void) {
    if !user_data.is_null() {
        let _ = Box::from_raw(user_data as *mut T);
    }
}

/// Formatting applied by the engine to every line it hands to a [`Logger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingOptions {
    /// Prefix each line with the unix time in seconds.
    pub timestamps: bool,
    /// Prefix each line with its level, e.g. `[debug]`.
    pub level_prefix: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        LoggingOptions {
            timestamps: false,
            level_prefix: true,
        }
    }
}

impl From<LoggingOptions> for btck_LoggingOptions {
    fn from(options: LoggingOptions) -> Self {
        btck_LoggingOptions {
            log_timestamps: c_helpers::to_c_bool(options.timestamps),
            log_level_prefix: c_helpers::to_c_bool(options.level_prefix),
        }
    }
}

/// The logger object forwards engine log messages into a user-defined log
/// function. The engine internally uses a global logging instance, and every
/// live `Logger` receives every message. Dropping the logger unregisters it.
pub struct Logger {
    inner: *mut btck_LoggingConnection,
}

impl Drop for Logger {
    fn drop(&mut self) {
        unsafe {
            btck_logging_connection_destroy(self.inner);
        }
    }
}

/// Permanently disable logging. Live loggers stop receiving messages and new
/// ones can no longer be created.
///
/// # Warning
///
/// This should only be called once during the lifetime of the program.
pub fn disable_logging() {
    unsafe {
        btck_logging_disable();
    }
}

impl Logger {
    /// Create a new Logger with the specified callback and default options.
    pub fn new<T: Log + 'static>(log: T) -> Result<Logger, KernelError> {
        Logger::with_options(log, LoggingOptions::default())
    }

    /// Create a new Logger with the specified callback and line formatting.
    pub fn with_options<T: Log + 'static>(
        log: T,
        options: LoggingOptions,
    ) -> Result<Logger, KernelError> {
        let log_ptr = Box::into_raw(Box::new(log));

        let inner = unsafe {
            btck_logging_connection_create(
                Some(log_callback::<T>),
                log_ptr as *mut c_void,
                Some(destroy_log_callback::<T>),
                options.into(),
            )
        };

        if inner.is_null() {
            unsafe {
                let _ = Box::from_raw(log_ptr);
            }
            return Err(KernelError::Internal(
                "Failed to create new logging connection.".to_string(),
            ));
        }

        Ok(Logger { inner })
    }

    /// Sets the minimum level of messages the engine emits. This applies to
    /// all loggers.
    pub fn set_level(&self, level: LogLevel) {
        unsafe {
            btck_logging_set_level(level.into());
        }
    }
}

/// Logging levels for controlling message verbosity.
///
/// Determines the minimum severity level of messages that will be logged.
/// Lower levels include all messages from higher levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Detailed trace information for debugging
    Trace = BTCK_LOG_LEVEL_TRACE,
    /// Debug information for development
    Debug = BTCK_LOG_LEVEL_DEBUG,
    /// General informational messages
    Info = BTCK_LOG_LEVEL_INFO,
}

impl From<LogLevel> for btck_LogLevel {
    fn from(level: LogLevel) -> Self {
        level as btck_LogLevel
    }
}

impl TryFrom<btck_LogLevel> for LogLevel {
    type Error = KernelError;

    fn try_from(value: btck_LogLevel) -> Result<Self, Self::Error> {
        match value {
            BTCK_LOG_LEVEL_TRACE => Ok(LogLevel::Trace),
            BTCK_LOG_LEVEL_DEBUG => Ok(LogLevel::Debug),
            BTCK_LOG_LEVEL_INFO => Ok(LogLevel::Info),
            _ => Err(KernelError::Internal(format!("Unknown log level: {}", value))),
        }
    }
}
