// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

use std::ffi::c_void;

use bitcoin::ScriptBuf;
use libc::c_int;

use crate::logging::{log_at, BTCK_LOG_LEVEL_TRACE};
use crate::refcount;
use crate::util::{pull_bytes, raw_slice};

/// A locking script. Any byte string is accepted, scripts are not interpreted.
pub struct btck_ScriptPubkey {
    pub(crate) script: ScriptBuf,
}

impl btck_ScriptPubkey {
    pub(crate) fn new(script: ScriptBuf) -> Self {
        btck_ScriptPubkey { script }
    }
}

/// Copies `len` bytes into a new script pubkey. Returns null if `raw` is null
/// while `len` is not zero.
#[no_mangle]
pub unsafe extern "C" fn btck_script_pubkey_create(
    raw: *const c_void,
    len: usize,
) -> *mut btck_ScriptPubkey {
    let Some(bytes) = raw_slice(raw, len) else {
        return std::ptr::null_mut();
    };
    log_at(BTCK_LOG_LEVEL_TRACE, || {
        format!("Created script pubkey of {} bytes", bytes.len())
    });
    refcount::into_handle(btck_ScriptPubkey::new(ScriptBuf::from_bytes(bytes.to_vec())))
}

#[no_mangle]
pub unsafe extern "C" fn btck_script_pubkey_retain(
    script_pubkey: *mut btck_ScriptPubkey,
) -> *mut btck_ScriptPubkey {
    refcount::retain(script_pubkey)
}

#[no_mangle]
pub unsafe extern "C" fn btck_script_pubkey_release(script_pubkey: *mut btck_ScriptPubkey) {
    refcount::release(script_pubkey)
}

/// Returns 1 if both scripts hold the same bytes, 0 otherwise.
#[no_mangle]
pub unsafe extern "C" fn btck_script_pubkey_equal(
    left: *const btck_ScriptPubkey,
    right: *const btck_ScriptPubkey,
) -> c_int {
    c_int::from((*left).script == (*right).script)
}

/// Borrowed view of the script bytes, valid until the script pubkey is
/// released.
#[no_mangle]
pub unsafe extern "C" fn btck_script_pubkey_as_bytes(
    script_pubkey: *const btck_ScriptPubkey,
    len: *mut usize,
) -> *const c_void {
    pull_bytes((*script_pubkey).script.as_bytes(), len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_pubkey_bytes_and_equality() {
        let raw = [0x00u8, 0x14, 0xaa, 0xbb];
        unsafe {
            let a = btck_script_pubkey_create(raw.as_ptr() as *const c_void, raw.len());
            let b = btck_script_pubkey_create(raw.as_ptr() as *const c_void, raw.len());
            let c = btck_script_pubkey_create(raw.as_ptr() as *const c_void, 2);
            assert_eq!(btck_script_pubkey_equal(a, b), 1);
            assert_eq!(btck_script_pubkey_equal(a, c), 0);

            let mut len = 0usize;
            let ptr = btck_script_pubkey_as_bytes(a, &mut len);
            assert_eq!(std::slice::from_raw_parts(ptr as *const u8, len), &raw);

            btck_script_pubkey_release(a);
            btck_script_pubkey_release(b);
            btck_script_pubkey_release(c);
        }
    }

    #[test]
    fn test_script_pubkey_create_rejects_null_with_length() {
        assert!(unsafe { btck_script_pubkey_create(std::ptr::null(), 4) }.is_null());
        let empty = unsafe { btck_script_pubkey_create(std::ptr::null(), 0) };
        assert!(!empty.is_null());
        unsafe { btck_script_pubkey_release(empty) };
    }
}
