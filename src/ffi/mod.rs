// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

pub mod c_helpers;
pub(crate) mod convention;
pub mod handle;
pub mod sealed;

pub use c_helpers::{present, success, to_c_bool, to_c_result, to_string};
pub use handle::{Owned, RefCounted};
