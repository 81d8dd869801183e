// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

//! Ownership of reference counted native records.
//!
//! An [`Owned`] holds exactly one native reference: cloning retains, dropping
//! releases. Borrowed views (the `*Ref<'a>` types) never touch the count and
//! are tied to the lifetime of whatever keeps the record alive.

use std::fmt;
use std::ptr::NonNull;

use libbtck_sys::{
    btck_Block, btck_Chain, btck_ScriptPubkey, btck_Transaction, btck_TransactionOutput,
    btck_block_release, btck_block_retain, btck_chain_release, btck_chain_retain,
    btck_script_pubkey_release, btck_script_pubkey_retain, btck_transaction_output_release,
    btck_transaction_output_retain, btck_transaction_release, btck_transaction_retain,
};

/// A native record type with an atomic reference count.
///
/// # Safety
///
/// `retain` must add one reference and return the same pointer, `release`
/// must drop one reference. Both must be callable from any thread.
pub unsafe trait RefCounted {
    unsafe fn retain(ptr: *mut Self) -> *mut Self;
    unsafe fn release(ptr: *mut Self);
}

macro_rules! ref_counted {
    ($ffi_type:ty, $retain:ident, $release:ident) => {
        unsafe impl RefCounted for $ffi_type {
            unsafe fn retain(ptr: *mut Self) -> *mut Self {
                $retain(ptr)
            }

            unsafe fn release(ptr: *mut Self) {
                $release(ptr)
            }
        }
    };
}

ref_counted!(btck_ScriptPubkey, btck_script_pubkey_retain, btck_script_pubkey_release);
ref_counted!(
    btck_TransactionOutput,
    btck_transaction_output_retain,
    btck_transaction_output_release
);
ref_counted!(btck_Transaction, btck_transaction_retain, btck_transaction_release);
ref_counted!(btck_Block, btck_block_retain, btck_block_release);
ref_counted!(btck_Chain, btck_chain_retain, btck_chain_release);

/// One counted reference to a native record.
pub struct Owned<T: RefCounted> {
    ptr: NonNull<T>,
}

unsafe impl<T: RefCounted> Send for Owned<T> {}
unsafe impl<T: RefCounted> Sync for Owned<T> {}

impl<T: RefCounted> Owned<T> {
    /// Takes over the reference `ptr` carries, without retaining.
    ///
    /// # Safety
    ///
    /// `ptr` must carry a reference that nobody else will release.
    pub(crate) unsafe fn from_raw(ptr: NonNull<T>) -> Self {
        Owned { ptr }
    }

    /// Acquires a new reference to a record someone else keeps alive.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live record.
    pub(crate) unsafe fn retained(ptr: NonNull<T>) -> Self {
        let ptr = T::retain(ptr.as_ptr());
        Owned {
            ptr: NonNull::new_unchecked(ptr),
        }
    }

    pub(crate) fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr() as *const T
    }
}

impl<T: RefCounted> Clone for Owned<T> {
    fn clone(&self) -> Self {
        unsafe { Owned::retained(self.ptr) }
    }
}

impl<T: RefCounted> Drop for Owned<T> {
    fn drop(&mut self) {
        unsafe { T::release(self.ptr.as_ptr()) }
    }
}

impl<T: RefCounted> fmt::Debug for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Owned").field(&self.ptr).finish()
    }
}
