// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

//! Raw C ABI of the btck record engine.
//!
//! Every record is handed out as an opaque pointer to a reference counted
//! object. A pointer returned by a `*_create` function or by an accessor
//! documented as "retained" carries one reference that must be given back with
//! the matching `*_release`. Pointers documented as "borrowed" stay valid for
//! as long as the record they were obtained from.
//!
//! Two error conventions are in use: constructors that take a trailing
//! `btck_Error**` populate it on failure and return null, the remaining
//! fallible functions simply return null.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(clippy::missing_safety_doc)]

use std::ffi::c_void;

use libc::c_int;

mod block;
mod chain;
mod error;
mod logging;
mod refcount;
mod script_pubkey;
mod transaction;
mod transaction_output;
mod util;

pub use block::*;
pub use chain::*;
pub use error::*;
pub use logging::*;
pub use script_pubkey::*;
pub use transaction::*;
pub use transaction_output::*;

/// Callback receiving one chunk of serialized bytes. Returning non-zero aborts
/// the serialization.
pub type btck_WriteBytes =
    Option<unsafe extern "C" fn(bytes: *const c_void, len: usize, user_data: *mut c_void) -> c_int>;

pub const btck_BlockHash_SIZE: usize = 32;
pub const btck_Txid_SIZE: usize = 32;

/// A block hash in internal byte order.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct btck_BlockHash {
    pub data: [u8; btck_BlockHash_SIZE],
}

/// A transaction id in internal byte order.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct btck_Txid {
    pub data: [u8; btck_Txid_SIZE],
}
