// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

use std::collections::HashMap;
use std::sync::Arc;

use crate::block::btck_Block;
use crate::error::{
    btck_Error, wrap_fn, Failure, BTCK_ERROR_CODE_CHAIN_DISCONNECTED, BTCK_ERROR_DOMAIN_CHAIN,
};
use crate::logging::{log_at, BTCK_LOG_LEVEL_INFO};
use crate::refcount;
use crate::btck_BlockHash;

/// An immutable sequence of blocks where every block extends its predecessor.
/// A block's index is its height relative to the first block.
pub struct btck_Chain {
    blocks: Vec<Arc<btck_Block>>,
    heights: HashMap<[u8; 32], usize>,
}

fn disconnected(height: usize) -> Failure {
    Failure {
        code: BTCK_ERROR_CODE_CHAIN_DISCONNECTED,
        domain: BTCK_ERROR_DOMAIN_CHAIN,
        message: format!("block at height {} does not extend its predecessor", height),
    }
}

/// Assembles a chain from `len` blocks. Each block is retained by the chain,
/// the caller keeps its own references.
#[no_mangle]
pub unsafe extern "C" fn btck_chain_create(
    blocks: *const *const btck_Block,
    len: usize,
    err: *mut *mut btck_Error,
) -> *mut btck_Chain {
    wrap_fn(err, || {
        if blocks.is_null() && len > 0 {
            return Err(Failure::null_argument("blocks"));
        }
        let mut chain = btck_Chain {
            blocks: Vec::with_capacity(len),
            heights: HashMap::with_capacity(len),
        };
        for height in 0..len {
            let ptr = *blocks.add(height);
            if ptr.is_null() {
                return Err(Failure::null_argument("block"));
            }
            let block = refcount::adopt(ptr);
            if let Some(prev) = chain.blocks.last() {
                if block.prev_hash() != prev.hash() {
                    return Err(disconnected(height));
                }
            }
            chain.heights.entry(block.hash()).or_insert(height);
            chain.blocks.push(block);
        }
        log_at(BTCK_LOG_LEVEL_INFO, || {
            format!("Assembled chain of {} blocks", chain.blocks.len())
        });
        Ok(refcount::into_handle(chain))
    })
}

#[no_mangle]
pub unsafe extern "C" fn btck_chain_retain(chain: *mut btck_Chain) -> *mut btck_Chain {
    refcount::retain(chain)
}

#[no_mangle]
pub unsafe extern "C" fn btck_chain_release(chain: *mut btck_Chain) {
    refcount::release(chain)
}

#[no_mangle]
pub unsafe extern "C" fn btck_chain_count_blocks(chain: *const btck_Chain) -> usize {
    (*chain).blocks.len()
}

/// Retained block at `index`, null when out of range.
#[no_mangle]
pub unsafe extern "C" fn btck_chain_get_block_at(
    chain: *const btck_Chain,
    index: usize,
) -> *mut btck_Block {
    match (&(*chain).blocks).get(index) {
        Some(block) => refcount::share(block),
        None => std::ptr::null_mut(),
    }
}

/// Index of the block with `hash`, or -1 if the chain does not contain it.
#[no_mangle]
pub unsafe extern "C" fn btck_chain_find(
    chain: *const btck_Chain,
    hash: *const btck_BlockHash,
) -> isize {
    (*chain)
        .heights
        .get(&(*hash).data)
        .map_or(-1, |&height| height as isize)
}
