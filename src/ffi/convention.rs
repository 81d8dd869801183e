// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

//! The engine reports failures in two ways: constructors taking a trailing
//! `btck_Error**` fill it in, other functions return null. Both are turned
//! into a [`NativeResult`] here and nowhere else.

use std::ptr::NonNull;

use libbtck_sys::btck_Error;

use crate::error::NativeError;
use crate::ffi::handle::{Owned, RefCounted};
use crate::ffi::sealed::FromPtr;

/// Result of one native call. The error is `None` when the engine gave no
/// detail beyond a null return.
pub(crate) type NativeResult<T> = Result<T, Option<NativeError>>;

/// Calls a function using the out-parameter convention and takes ownership of
/// whatever it returned.
pub(crate) unsafe fn from_out_param<T, F>(c_function: F) -> NativeResult<Owned<T>>
where
    T: RefCounted,
    F: FnOnce(*mut *mut btck_Error) -> *mut T,
{
    let mut err: *mut btck_Error = std::ptr::null_mut();
    let ptr = c_function(&mut err);
    let error = NativeError::from_raw(err);
    match (NonNull::new(ptr), error) {
        (Some(ptr), None) => Ok(Owned::from_raw(ptr)),
        (Some(ptr), Some(error)) => {
            drop(Owned::from_raw(ptr));
            Err(Some(error))
        }
        (None, error) => Err(error),
    }
}

/// Takes ownership of a retained pointer that is null on failure.
pub(crate) unsafe fn from_nullable<T: RefCounted>(ptr: *mut T) -> NativeResult<Owned<T>> {
    NonNull::new(ptr).map(|ptr| Owned::from_raw(ptr)).ok_or(None)
}

/// Wraps a borrowed pointer that is null on failure.
pub(crate) unsafe fn borrowed<T, R: FromPtr<T>>(ptr: *const T) -> NativeResult<R> {
    if ptr.is_null() {
        Err(None)
    } else {
        Ok(R::from_ptr(ptr))
    }
}
