// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

use std::cell::Cell;
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use libc::{c_char, c_int};

pub type btck_LogLevel = u8;

pub const BTCK_LOG_LEVEL_TRACE: btck_LogLevel = 0;
pub const BTCK_LOG_LEVEL_DEBUG: btck_LogLevel = 1;
pub const BTCK_LOG_LEVEL_INFO: btck_LogLevel = 2;

/// Receives one formatted log line. The message is not nul terminated.
pub type btck_LogCallback =
    Option<unsafe extern "C" fn(user_data: *mut c_void, message: *const c_char, message_len: usize)>;

/// Frees the user data of a logging connection once it is destroyed.
pub type btck_DestroyCallback = Option<unsafe extern "C" fn(user_data: *mut c_void)>;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct btck_LoggingOptions {
    /// Prefix each line with the unix time in seconds.
    pub log_timestamps: c_int,
    /// Prefix each line with its level, e.g. `[debug]`.
    pub log_level_prefix: c_int,
}

pub struct btck_LoggingConnection {
    id: u64,
}

struct Connection {
    id: u64,
    callback: unsafe extern "C" fn(*mut c_void, *const c_char, usize),
    user_data: *mut c_void,
    destroy: btck_DestroyCallback,
    options: btck_LoggingOptions,
}

// The user data is only touched by the callbacks the owner registered with
// it, which must be callable from any thread.
unsafe impl Send for Connection {}
unsafe impl Sync for Connection {}

/// The destroy callback runs once the last in-flight log call holding the
/// connection has returned.
impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(destroy) = self.destroy {
            unsafe { destroy(self.user_data) };
        }
    }
}

impl Connection {
    fn format(&self, level: btck_LogLevel, message: &str) -> String {
        let mut line = String::new();
        if self.options.log_timestamps != 0 {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            line.push_str(&format!("{} ", secs));
        }
        if self.options.log_level_prefix != 0 {
            line.push_str(&format!("[{}] ", level_name(level)));
        }
        line.push_str(message);
        line
    }
}

fn level_name(level: btck_LogLevel) -> &'static str {
    match level {
        BTCK_LOG_LEVEL_TRACE => "trace",
        BTCK_LOG_LEVEL_DEBUG => "debug",
        _ => "info",
    }
}

pub(crate) struct Registry {
    connections: Mutex<Vec<Arc<Connection>>>,
    next_id: AtomicU64,
    level: AtomicU8,
    disabled: AtomicBool,
}

static REGISTRY: Registry = Registry::new();

thread_local! {
    static IN_CALLBACK: Cell<bool> = const { Cell::new(false) };
}

impl Registry {
    const fn new() -> Self {
        Registry {
            connections: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            level: AtomicU8::new(BTCK_LOG_LEVEL_INFO),
            disabled: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Connection>>> {
        self.connections.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn connect(
        &self,
        callback: unsafe extern "C" fn(*mut c_void, *const c_char, usize),
        user_data: *mut c_void,
        destroy: btck_DestroyCallback,
        options: btck_LoggingOptions,
    ) -> Option<u64> {
        if self.disabled.load(Ordering::Acquire) {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push(Arc::new(Connection {
            id,
            callback,
            user_data,
            destroy,
            options,
        }));
        Some(id)
    }

    fn disconnect(&self, id: u64) {
        let removed = {
            let mut connections = self.lock();
            connections
                .iter()
                .position(|c| c.id == id)
                .map(|pos| connections.remove(pos))
        };
        drop(removed);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::Release);
        let drained: Vec<Arc<Connection>> = std::mem::take(&mut *self.lock());
        drop(drained);
    }

    fn enabled(&self, level: btck_LogLevel) -> bool {
        !self.disabled.load(Ordering::Acquire) && level >= self.level.load(Ordering::Relaxed)
    }

    fn log(&self, level: btck_LogLevel, message: impl FnOnce() -> String) {
        if !self.enabled(level) || IN_CALLBACK.with(|flag| flag.get()) {
            return;
        }
        let message = message();
        // Callbacks run on a snapshot with the lock released, so they may
        // create, drop or disable connections themselves.
        let connections: Vec<Arc<Connection>> = self.lock().clone();
        IN_CALLBACK.with(|flag| flag.set(true));
        for connection in connections.iter() {
            let line = connection.format(level, &message);
            unsafe {
                (connection.callback)(
                    connection.user_data,
                    line.as_ptr() as *const c_char,
                    line.len(),
                )
            };
        }
        IN_CALLBACK.with(|flag| flag.set(false));
    }
}

/// Emits a message to every registered connection if `level` passes the
/// global threshold. The message is only built when someone will see it.
pub(crate) fn log_at(level: btck_LogLevel, message: impl FnOnce() -> String) {
    REGISTRY.log(level, message);
}

/// Registers a log callback. Returns null if logging was disabled or the
/// callback is missing, in which case `user_data` is left to the caller.
#[no_mangle]
pub unsafe extern "C" fn btck_logging_connection_create(
    callback: btck_LogCallback,
    user_data: *mut c_void,
    destroy: btck_DestroyCallback,
    options: btck_LoggingOptions,
) -> *mut btck_LoggingConnection {
    let Some(callback) = callback else {
        return std::ptr::null_mut();
    };
    match REGISTRY.connect(callback, user_data, destroy, options) {
        Some(id) => Box::into_raw(Box::new(btck_LoggingConnection { id })),
        None => std::ptr::null_mut(),
    }
}

/// Unregisters the connection and runs its destroy callback.
#[no_mangle]
pub unsafe extern "C" fn btck_logging_connection_destroy(connection: *mut btck_LoggingConnection) {
    if connection.is_null() {
        return;
    }
    let connection = Box::from_raw(connection);
    REGISTRY.disconnect(connection.id);
}

#[no_mangle]
pub unsafe extern "C" fn btck_logging_set_level(level: btck_LogLevel) {
    REGISTRY.level.store(level, Ordering::Relaxed);
}

/// Permanently disables logging. Existing connections are destroyed and no
/// new ones can be created.
#[no_mangle]
pub unsafe extern "C" fn btck_logging_disable() {
    REGISTRY.disable();
}
