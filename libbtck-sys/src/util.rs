// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

use std::ffi::c_void;

use libc::{c_char, c_int};

use crate::btck_WriteBytes;

/// Views caller memory as a byte slice. Returns `None` for a null pointer with
/// a non-zero length.
pub(crate) unsafe fn raw_slice<'a>(raw: *const c_void, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        Some(&[])
    } else if raw.is_null() {
        None
    } else {
        Some(std::slice::from_raw_parts(raw as *const u8, len))
    }
}

/// Reports a borrowed byte buffer through the pull protocol.
pub(crate) unsafe fn pull_bytes(bytes: &[u8], len: *mut usize) -> *const c_void {
    if !len.is_null() {
        *len = bytes.len();
    }
    bytes.as_ptr() as *const c_void
}

/// Feeds `chunks` to a write callback in order, stopping at the first chunk
/// the callback rejects.
pub(crate) unsafe fn push_chunks<'a>(
    write: btck_WriteBytes,
    user_data: *mut c_void,
    chunks: impl IntoIterator<Item = &'a [u8]>,
) -> c_int {
    let Some(write) = write else {
        return 1;
    };
    for chunk in chunks {
        let status = write(chunk.as_ptr() as *const c_void, chunk.len(), user_data);
        if status != 0 {
            return status;
        }
    }
    0
}

/// Two-phase string output: always returns the full length of `text`, and
/// copies as much as fits (plus a terminating nul) when `buf` has capacity.
pub(crate) unsafe fn write_string(text: &str, buf: *mut c_char, capacity: usize) -> c_int {
    let Ok(len) = c_int::try_from(text.len()) else {
        return -1;
    };
    if !buf.is_null() && capacity > 0 {
        let copied = text.len().min(capacity - 1);
        std::ptr::copy_nonoverlapping(text.as_ptr(), buf as *mut u8, copied);
        *buf.add(copied) = 0;
    }
    len
}

pub(crate) fn short_hex(bytes: &[u8], max: usize) -> String {
    let mut encoded = hex::encode(bytes);
    encoded.truncate(max);
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_string_two_phase() {
        let text = "CTxOut(nValue=1.00000000)";
        let len = unsafe { write_string(text, std::ptr::null_mut(), 0) };
        assert_eq!(len as usize, text.len());

        let mut buf = vec![0 as c_char; len as usize + 1];
        let written = unsafe { write_string(text, buf.as_mut_ptr(), buf.len()) };
        assert_eq!(written, len);
        let bytes: Vec<u8> = buf[..len as usize].iter().map(|&c| c as u8).collect();
        assert_eq!(bytes, text.as_bytes());
        assert_eq!(buf[len as usize], 0);
    }

    #[test]
    fn test_write_string_truncates() {
        let mut buf = [1 as c_char; 4];
        let len = unsafe { write_string("abcdef", buf.as_mut_ptr(), buf.len()) };
        assert_eq!(len, 6);
        assert_eq!(buf.map(|c| c as u8), [b'a', b'b', b'c', 0]);
    }

    #[test]
    fn test_raw_slice_null() {
        assert!(unsafe { raw_slice(std::ptr::null(), 3) }.is_none());
        assert_eq!(unsafe { raw_slice(std::ptr::null(), 0) }, Some(&[][..]));
    }
}
