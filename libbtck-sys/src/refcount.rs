// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

//! Handles are `Arc` pointers leaked across the ABI. The strong count is the
//! native reference count.

use std::sync::Arc;

/// Moves `value` behind a fresh handle carrying one reference.
pub(crate) fn into_handle<T>(value: T) -> *mut T {
    Arc::into_raw(Arc::new(value)) as *mut T
}

/// Hands out an additional reference to a record shared with its parent.
pub(crate) fn share<T>(record: &Arc<T>) -> *mut T {
    Arc::into_raw(Arc::clone(record)) as *mut T
}

/// Hands out a pointer that stays valid as long as `record` is kept alive.
pub(crate) fn borrow<T>(record: &Arc<T>) -> *const T {
    Arc::as_ptr(record)
}

/// Rebuilds an `Arc` for a handle without consuming the caller's reference.
pub(crate) unsafe fn adopt<T>(ptr: *const T) -> Arc<T> {
    Arc::increment_strong_count(ptr);
    Arc::from_raw(ptr)
}

pub(crate) unsafe fn retain<T>(ptr: *mut T) -> *mut T {
    assert!(!ptr.is_null(), "retain of a null handle");
    Arc::increment_strong_count(ptr as *const T);
    ptr
}

pub(crate) unsafe fn release<T>(ptr: *mut T) {
    if !ptr.is_null() {
        Arc::decrement_strong_count(ptr as *const T);
    }
}
