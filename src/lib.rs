//! Safe, ownership-typed views over the records of the btck engine.
//!
//! Records (blocks, transactions, outputs, script pubkeys and chains) live in
//! the engine behind reference counted handles. Owned wrappers hold one
//! reference each and release it on drop, `*Ref<'a>` wrappers borrow a record
//! from the parent that keeps it alive.

use std::ffi::{c_char, c_void};
use std::{fmt, panic};

use ffi::c_helpers;

pub mod core;
pub mod error;
pub mod ffi;
pub mod log;
pub mod state;

/// Serializes data using a C callback function pattern.
///
/// Takes a C function that writes data via a callback and returns the
/// serialized bytes as a Vec<u8>.
fn c_serialize<F>(c_function: F) -> Result<Vec<u8>, KernelError>
where
    F: FnOnce(unsafe extern "C" fn(*const c_void, usize, *mut c_void) -> i32, *mut c_void) -> i32,
{
    let mut buffer = Vec::new();

    unsafe extern "C" fn write_callback(
        data: *const c_void,
        len: usize,
        user_data: *mut c_void,
    ) -> i32 {
        panic::catch_unwind(|| {
            let buffer = &mut *(user_data as *mut Vec<u8>);
            let slice = std::slice::from_raw_parts(data as *const u8, len);
            buffer.extend_from_slice(slice);
            c_helpers::to_c_result(true)
        })
        .unwrap_or_else(|_| c_helpers::to_c_result(false))
    }

    let result = c_function(write_callback, &mut buffer as *mut Vec<u8> as *mut c_void);

    if c_helpers::success(result) {
        Ok(buffer)
    } else {
        Err(KernelError::SerializationFailed)
    }
}

/// Copies a byte span the engine exposes as a pointer and length.
///
/// The span is only valid during the call, so it is copied before returning.
fn c_copy_bytes<F>(c_function: F) -> Vec<u8>
where
    F: FnOnce(*mut usize) -> *const c_void,
{
    let mut len = 0usize;
    let ptr = c_function(&mut len);
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr as *const u8, len) }.to_vec()
}

/// Reads a string through the two-phase sizing protocol: the first call
/// reports the length, the second fills a buffer of that size.
fn c_to_string<F>(c_function: F) -> String
where
    F: Fn(*mut c_char, usize) -> i32,
{
    let len = c_function(std::ptr::null_mut(), 0);
    if len <= 0 {
        return String::new();
    }
    let mut buffer = vec![0u8; len as usize + 1];
    let written = c_function(buffer.as_mut_ptr() as *mut c_char, buffer.len());
    if written <= 0 {
        return String::new();
    }
    buffer.truncate((written as usize).min(len as usize));
    String::from_utf8_lossy(&buffer).into_owned()
}

/// A collection of errors emitted by this library
#[derive(Debug)]
pub enum KernelError {
    /// The bytes are not a well-formed encoding of the record.
    Parse {
        record: &'static str,
        source: Option<NativeError>,
    },
    IndexOutOfRange {
        index: usize,
        count: usize,
    },
    LookupFailed(BlockHash),
    SerializationFailed,
    Native(NativeError),
    InvalidLength {
        expected: usize,
        actual: usize,
    },
    Internal(String),
}

impl From<NativeError> for KernelError {
    fn from(err: NativeError) -> Self {
        KernelError::Native(err)
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Parse {
                record,
                source: Some(source),
            } => write!(f, "Failed to parse {}: {}", record, source),
            KernelError::Parse { record, source: None } => {
                write!(f, "Failed to parse {}", record)
            }
            KernelError::IndexOutOfRange { index, count } => {
                write!(f, "Index {} out of range for {} elements", index, count)
            }
            KernelError::LookupFailed(hash) => write!(f, "Block {} not found", hash),
            KernelError::SerializationFailed => write!(f, "Serialization failed"),
            KernelError::Native(err) => write!(f, "Native error: {}", err),
            KernelError::InvalidLength { expected, actual } => {
                write!(f, "Invalid length: expected {}, got {}", expected, actual)
            }
            KernelError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for KernelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KernelError::Parse {
                source: Some(err), ..
            } => Some(err),
            KernelError::Native(err) => Some(err),
            _ => None,
        }
    }
}

pub use crate::core::{
    Block, BlockHash, RandomAccess, RecordIter, ScriptPubkey, ScriptPubkeyRef, Transaction,
    TransactionRef, TxOut, TxOutRef, Txid,
};

pub use crate::error::NativeError;

pub use crate::log::{disable_logging, Log, LogLevel, Logger, LoggingOptions};

pub use crate::state::Chain;

pub mod prelude {
    pub use crate::core::{RandomAccess, ScriptPubkeyExt, TransactionExt, TxOutExt};
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_c_serialize_collects_chunks_in_order() {
        let chunks: [&[u8]; 3] = [b"ab", b"", b"cd"];
        let bytes = c_serialize(|write, user_data| {
            for chunk in chunks {
                let status = unsafe { write(chunk.as_ptr() as *const c_void, chunk.len(), user_data) };
                if status != 0 {
                    return status;
                }
            }
            0
        })
        .unwrap();
        assert_eq!(bytes, b"abcd");
    }

    #[test]
    fn test_c_serialize_reports_abort() {
        let result = c_serialize(|_, _| 3);
        assert!(matches!(result, Err(KernelError::SerializationFailed)));
    }

    #[test]
    fn test_c_copy_bytes_empty() {
        assert!(c_copy_bytes(|_| std::ptr::null()).is_empty());
        let data = [1u8, 2, 3];
        let copied = c_copy_bytes(|len| {
            unsafe { *len = data.len() };
            data.as_ptr() as *const c_void
        });
        assert_eq!(copied, data);
    }

    #[test]
    fn test_c_to_string_two_phase() {
        let text = "CTxOut(nValue=0.00000001, scriptPubKey=)";
        let calls = std::cell::Cell::new(0);
        let result = c_to_string(|buf, cap| {
            calls.set(calls.get() + 1);
            if !buf.is_null() {
                let n = text.len().min(cap - 1);
                unsafe {
                    std::ptr::copy_nonoverlapping(text.as_ptr(), buf as *mut u8, n);
                    *buf.add(n) = 0;
                }
            }
            text.len() as i32
        });
        assert_eq!(result, text);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_c_to_string_no_output() {
        assert_eq!(c_to_string(|_, _| 0), "");
        assert_eq!(c_to_string(|_, _| -1), "");
    }

    #[test]
    fn test_kernel_error_display_and_source() {
        let err = KernelError::IndexOutOfRange { index: 3, count: 3 };
        assert_eq!(err.to_string(), "Index 3 out of range for 3 elements");
        assert!(err.source().is_none());

        let err = KernelError::Parse {
            record: "block",
            source: None,
        };
        assert_eq!(err.to_string(), "Failed to parse block");

        let err = KernelError::LookupFailed(BlockHash::from([0u8; 32]));
        assert_eq!(err.to_string(), format!("Block {} not found", "00".repeat(32)));
    }

    #[test]
    fn test_kernel_error_wraps_native_source() {
        let err = Transaction::new(&[0x01]).unwrap_err();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to parse transaction: [Parse:1]"));
    }
}
