// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

use std::ffi::CStr;
use std::fmt;
use std::ptr::NonNull;

use libbtck_sys::{
    btck_Error, btck_error_code, btck_error_destroy, btck_error_domain, btck_error_message,
};

/// An error reported by the native engine.
///
/// Owns the native error object and frees it when dropped.
pub struct NativeError {
    inner: NonNull<btck_Error>,
}

unsafe impl Send for NativeError {}
unsafe impl Sync for NativeError {}

impl NativeError {
    /// Takes ownership of an error handed out through an out-parameter.
    /// Returns `None` for a null pointer.
    pub(crate) unsafe fn from_raw(ptr: *mut btck_Error) -> Option<Self> {
        NonNull::new(ptr).map(|inner| NativeError { inner })
    }

    pub fn code(&self) -> i32 {
        unsafe { btck_error_code(self.inner.as_ptr()) }
    }

    /// The subsystem that failed, e.g. `"Parse"` or `"Chain"`.
    pub fn domain(&self) -> String {
        unsafe { CStr::from_ptr(btck_error_domain(self.inner.as_ptr())) }
            .to_string_lossy()
            .into_owned()
    }

    pub fn message(&self) -> String {
        unsafe { CStr::from_ptr(btck_error_message(self.inner.as_ptr())) }
            .to_string_lossy()
            .into_owned()
    }
}

impl Drop for NativeError {
    fn drop(&mut self) {
        unsafe { btck_error_destroy(self.inner.as_ptr()) }
    }
}

impl fmt::Debug for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeError")
            .field("code", &self.code())
            .field("domain", &self.domain())
            .field("message", &self.message())
            .finish()
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.domain(), self.code(), self.message())
    }
}

impl std::error::Error for NativeError {}

#[cfg(test)]
mod tests {
    use std::ffi::c_void;

    use libbtck_sys::{btck_transaction_create, BTCK_ERROR_CODE_PARSE};

    use super::*;

    fn parse_failure() -> NativeError {
        let raw = [0xffu8; 3];
        let mut err: *mut btck_Error = std::ptr::null_mut();
        let tx = unsafe { btck_transaction_create(raw.as_ptr() as *const c_void, raw.len(), &mut err) };
        assert!(tx.is_null());
        unsafe { NativeError::from_raw(err) }.unwrap()
    }

    #[test]
    fn test_native_error_accessors() {
        let err = parse_failure();
        assert_eq!(err.code(), BTCK_ERROR_CODE_PARSE);
        assert_eq!(err.domain(), "Parse");
        assert!(err.message().starts_with("failed to decode transaction"));
        assert!(err.to_string().starts_with("[Parse:1] "));
    }

    #[test]
    fn test_native_error_from_null() {
        assert!(unsafe { NativeError::from_raw(std::ptr::null_mut()) }.is_none());
    }

    #[test]
    fn test_native_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NativeError>();
    }
}
