// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

use std::ffi::CString;
use std::panic::{self, AssertUnwindSafe};

use libc::{c_char, c_int};

pub const BTCK_ERROR_CODE_UNKNOWN: c_int = -1;
pub const BTCK_ERROR_CODE_PARSE: c_int = 1;
pub const BTCK_ERROR_CODE_INDEX_OUT_OF_RANGE: c_int = 2;
pub const BTCK_ERROR_CODE_CHAIN_DISCONNECTED: c_int = 3;
pub const BTCK_ERROR_CODE_NULL_ARGUMENT: c_int = 4;

pub const BTCK_ERROR_DOMAIN_PARSE: &str = "Parse";
pub const BTCK_ERROR_DOMAIN_RANGE: &str = "Range";
pub const BTCK_ERROR_DOMAIN_CHAIN: &str = "Chain";
pub const BTCK_ERROR_DOMAIN_INTERNAL: &str = "Internal";

/// One error occurrence, owned by the caller once handed out.
pub struct btck_Error {
    code: c_int,
    domain: CString,
    message: CString,
}

/// A failure raised inside the engine before it is turned into a `btck_Error`.
#[derive(Debug)]
pub(crate) struct Failure {
    pub(crate) code: c_int,
    pub(crate) domain: &'static str,
    pub(crate) message: String,
}

impl Failure {
    pub(crate) fn parse(record: &str, err: impl std::fmt::Display) -> Self {
        Failure {
            code: BTCK_ERROR_CODE_PARSE,
            domain: BTCK_ERROR_DOMAIN_PARSE,
            message: format!("failed to decode {}: {}", record, err),
        }
    }

    pub(crate) fn out_of_range(index: usize, count: usize) -> Self {
        Failure {
            code: BTCK_ERROR_CODE_INDEX_OUT_OF_RANGE,
            domain: BTCK_ERROR_DOMAIN_RANGE,
            message: format!("index {} out of range for {} elements", index, count),
        }
    }

    pub(crate) fn null_argument(name: &str) -> Self {
        Failure {
            code: BTCK_ERROR_CODE_NULL_ARGUMENT,
            domain: BTCK_ERROR_DOMAIN_INTERNAL,
            message: format!("{} must not be null", name),
        }
    }
}

fn c_string(text: &str) -> CString {
    CString::new(text.replace('\0', "")).unwrap_or_default()
}

impl From<Failure> for btck_Error {
    fn from(failure: Failure) -> Self {
        btck_Error {
            code: failure.code,
            domain: c_string(failure.domain),
            message: c_string(&failure.message),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs a fallible constructor behind the out-parameter convention: on
/// failure `*err` receives a new error and null is returned, on success `*err`
/// is left untouched. A null `err` discards the error.
pub(crate) unsafe fn wrap_fn<T>(
    err: *mut *mut btck_Error,
    f: impl FnOnce() -> Result<*mut T, Failure>,
) -> *mut T {
    let failure = match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(ptr)) => return ptr,
        Ok(Err(failure)) => failure,
        Err(payload) => Failure {
            code: BTCK_ERROR_CODE_UNKNOWN,
            domain: BTCK_ERROR_DOMAIN_INTERNAL,
            message: panic_message(payload.as_ref()),
        },
    };
    if !err.is_null() {
        *err = Box::into_raw(Box::new(btck_Error::from(failure)));
    }
    std::ptr::null_mut()
}

#[no_mangle]
pub unsafe extern "C" fn btck_error_code(error: *const btck_Error) -> c_int {
    (*error).code
}

#[no_mangle]
pub unsafe extern "C" fn btck_error_domain(error: *const btck_Error) -> *const c_char {
    (*error).domain.as_ptr()
}

#[no_mangle]
pub unsafe extern "C" fn btck_error_message(error: *const btck_Error) -> *const c_char {
    (*error).message.as_ptr()
}

#[no_mangle]
pub unsafe extern "C" fn btck_error_destroy(error: *mut btck_Error) {
    if !error.is_null() {
        drop(Box::from_raw(error));
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    #[test]
    fn test_wrap_fn_success_leaves_error_unset() {
        let mut err: *mut btck_Error = std::ptr::null_mut();
        let value = Box::into_raw(Box::new(7u8));
        let ptr = unsafe { wrap_fn(&mut err, || Ok(value)) };
        assert_eq!(ptr, value);
        assert!(err.is_null());
        drop(unsafe { Box::from_raw(ptr) });
    }

    #[test]
    fn test_wrap_fn_failure_populates_error() {
        let mut err: *mut btck_Error = std::ptr::null_mut();
        let ptr: *mut u8 = unsafe { wrap_fn(&mut err, || Err(Failure::out_of_range(3, 3))) };
        assert!(ptr.is_null());
        assert!(!err.is_null());
        unsafe {
            assert_eq!(btck_error_code(err), BTCK_ERROR_CODE_INDEX_OUT_OF_RANGE);
            assert_eq!(CStr::from_ptr(btck_error_domain(err)).to_str().unwrap(), "Range");
            assert_eq!(
                CStr::from_ptr(btck_error_message(err)).to_str().unwrap(),
                "index 3 out of range for 3 elements"
            );
            btck_error_destroy(err);
        }
    }

    #[test]
    fn test_wrap_fn_catches_panic() {
        let mut err: *mut btck_Error = std::ptr::null_mut();
        let ptr: *mut u8 = unsafe { wrap_fn(&mut err, || panic!("boom")) };
        assert!(ptr.is_null());
        unsafe {
            assert_eq!(btck_error_code(err), BTCK_ERROR_CODE_UNKNOWN);
            assert_eq!(CStr::from_ptr(btck_error_message(err)).to_str().unwrap(), "boom");
            btck_error_destroy(err);
        }
    }
}
