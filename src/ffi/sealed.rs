// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

//! Pointer access traits shared by the owned and borrowed wrappers. They are
//! public so the `Ext` traits can name them, but the module is not re-exported.

/// Exposes the native pointer a wrapper points at.
pub trait AsPtr<T> {
    fn as_ptr(&self) -> *const T;
}

/// Builds a borrowed wrapper around a pointer owned by someone else.
pub trait FromPtr<T> {
    /// # Safety
    ///
    /// `ptr` must be non-null and stay valid for the lifetime of the wrapper.
    unsafe fn from_ptr(ptr: *const T) -> Self;
}

