use std::ffi::c_char;

/// Returns true if the C return code indicates success (0).
#[inline]
pub fn success(code: i32) -> bool {
    code == 0
}

/// Returns true if the C return code indicates a present/found state (non-zero).
#[inline]
pub fn present(code: i32) -> bool {
    code != 0
}

/// Converts a Rust bool to C bool representation (1 for true, 0 for false).
#[inline]
pub fn to_c_bool(value: bool) -> i32 {
    if value {
        1
    } else {
        0
    }
}

/// Converts success status to C result code (0 for success, 1 for failure).
#[inline]
pub fn to_c_result(success: bool) -> i32 {
    if success {
        0
    } else {
        1
    }
}

/// Copies a C string of known length, replacing invalid UTF-8.
pub unsafe fn to_string(c_str: *const c_char, len: usize) -> String {
    if !c_str.is_null() {
        let slice = std::slice::from_raw_parts(c_str as *const u8, len);
        String::from_utf8_lossy(slice).into_owned()
    } else {
        "".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_codes() {
        assert!(success(0));
        assert!(!success(7));
        assert!(present(1));
        assert_eq!(to_c_bool(true), 1);
        assert_eq!(to_c_result(false), 1);
    }

    #[test]
    fn test_to_string_lossy() {
        let bytes = [b'o', b'k', 0xff];
        let text = unsafe { to_string(bytes.as_ptr() as *const c_char, 2) };
        assert_eq!(text, "ok");
        assert_eq!(unsafe { to_string(std::ptr::null(), 5) }, "");
    }
}
