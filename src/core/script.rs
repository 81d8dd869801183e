use std::{
    ffi::c_void,
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
};

use libbtck_sys::{
    btck_ScriptPubkey, btck_script_pubkey_as_bytes, btck_script_pubkey_create,
    btck_script_pubkey_equal,
};

use crate::{
    c_copy_bytes,
    ffi::{
        c_helpers::present,
        convention,
        handle::Owned,
        sealed::{AsPtr, FromPtr},
    },
    KernelError,
};

/// Common operations for script pubkeys, implemented by both owned and borrowed types.
pub trait ScriptPubkeyExt: AsPtr<btck_ScriptPubkey> {
    /// Copies the raw script bytes.
    fn to_bytes(&self) -> Vec<u8> {
        c_copy_bytes(|len| unsafe { btck_script_pubkey_as_bytes(self.as_ptr(), len) })
    }

    /// Compares the script bytes of two script pubkeys, owned or borrowed.
    fn equals(&self, other: &impl ScriptPubkeyExt) -> bool {
        present(unsafe { btck_script_pubkey_equal(self.as_ptr(), other.as_ptr()) })
    }
}

/// A single script pubkey containing spending conditions for a transaction output.
///
/// Script pubkeys can be created from raw script bytes or retrieved from existing
/// transaction outputs. The bytes are not interpreted.
#[derive(Clone)]
pub struct ScriptPubkey {
    inner: Owned<btck_ScriptPubkey>,
}

impl ScriptPubkey {
    pub fn new(script_bytes: &[u8]) -> Result<Self, KernelError> {
        let inner = unsafe {
            convention::from_nullable(btck_script_pubkey_create(
                script_bytes.as_ptr() as *const c_void,
                script_bytes.len(),
            ))
        }
        .map_err(|source| KernelError::Parse {
            record: "script pubkey",
            source,
        })?;
        Ok(ScriptPubkey { inner })
    }

    pub fn as_ref(&self) -> ScriptPubkeyRef<'_> {
        unsafe { ScriptPubkeyRef::from_ptr(self.inner.as_ptr()) }
    }
}

impl AsPtr<btck_ScriptPubkey> for ScriptPubkey {
    fn as_ptr(&self) -> *const btck_ScriptPubkey {
        self.inner.as_ptr()
    }
}

impl ScriptPubkeyExt for ScriptPubkey {}

impl TryFrom<&[u8]> for ScriptPubkey {
    type Error = KernelError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        ScriptPubkey::new(bytes)
    }
}

impl From<ScriptPubkey> for Vec<u8> {
    fn from(script: ScriptPubkey) -> Self {
        script.to_bytes()
    }
}

impl From<&ScriptPubkey> for Vec<u8> {
    fn from(script: &ScriptPubkey) -> Self {
        script.to_bytes()
    }
}

impl Debug for ScriptPubkey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptPubkey({:?})", self.to_bytes())
    }
}

/// A script pubkey borrowed from a record that keeps it alive, usually a
/// transaction output.
pub struct ScriptPubkeyRef<'a> {
    inner: *const btck_ScriptPubkey,
    marker: PhantomData<&'a ()>,
}

unsafe impl<'a> Send for ScriptPubkeyRef<'a> {}
unsafe impl<'a> Sync for ScriptPubkeyRef<'a> {}

impl<'a> ScriptPubkeyRef<'a> {
    /// Retains the script so it can outlive the record it was borrowed from.
    pub fn to_owned(&self) -> ScriptPubkey {
        ScriptPubkey {
            inner: unsafe { Owned::retained(std::ptr::NonNull::new_unchecked(self.inner as *mut _)) },
        }
    }
}

impl<'a> AsPtr<btck_ScriptPubkey> for ScriptPubkeyRef<'a> {
    fn as_ptr(&self) -> *const btck_ScriptPubkey {
        self.inner
    }
}

impl<'a> FromPtr<btck_ScriptPubkey> for ScriptPubkeyRef<'a> {
    unsafe fn from_ptr(ptr: *const btck_ScriptPubkey) -> Self {
        ScriptPubkeyRef {
            inner: ptr,
            marker: PhantomData,
        }
    }
}

impl<'a> ScriptPubkeyExt for ScriptPubkeyRef<'a> {}

impl<'a> From<ScriptPubkeyRef<'a>> for Vec<u8> {
    fn from(script_ref: ScriptPubkeyRef<'a>) -> Self {
        script_ref.to_bytes()
    }
}

impl<'a> From<&ScriptPubkeyRef<'a>> for Vec<u8> {
    fn from(script_ref: &ScriptPubkeyRef<'a>) -> Self {
        script_ref.to_bytes()
    }
}

impl<'a> Clone for ScriptPubkeyRef<'a> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a> Copy for ScriptPubkeyRef<'a> {}

impl<'a> Debug for ScriptPubkeyRef<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptPubkeyRef({:?})", self.to_bytes())
    }
}

impl PartialEq for ScriptPubkey {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl PartialEq<ScriptPubkeyRef<'_>> for ScriptPubkey {
    fn eq(&self, other: &ScriptPubkeyRef<'_>) -> bool {
        self.equals(other)
    }
}

impl Eq for ScriptPubkey {}

impl PartialEq for ScriptPubkeyRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl PartialEq<ScriptPubkey> for ScriptPubkeyRef<'_> {
    fn eq(&self, other: &ScriptPubkey) -> bool {
        self.equals(other)
    }
}

impl Eq for ScriptPubkeyRef<'_> {}
