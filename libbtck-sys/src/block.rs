// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

use std::ffi::c_void;
use std::sync::Arc;

use bitcoin::block::Header;
use bitcoin::consensus::encode::VarInt;
use bitcoin::consensus::{deserialize, serialize};
use bitcoin::hashes::Hash;
use bitcoin::Block;
use libc::c_int;

use crate::error::{btck_Error, wrap_fn, Failure};
use crate::logging::{log_at, BTCK_LOG_LEVEL_DEBUG, BTCK_LOG_LEVEL_INFO};
use crate::refcount;
use crate::transaction::btck_Transaction;
use crate::util::{push_chunks, raw_slice};
use crate::{btck_BlockHash, btck_WriteBytes};

pub struct btck_Block {
    header: Header,
    hash: [u8; 32],
    transactions: Vec<Arc<btck_Transaction>>,
}

impl btck_Block {
    fn from_block(block: Block) -> Self {
        let hash = block.block_hash().to_byte_array();
        let transactions = block
            .txdata
            .into_iter()
            .map(|tx| Arc::new(btck_Transaction::from_tx(tx)))
            .collect();
        btck_Block {
            header: block.header,
            hash,
            transactions,
        }
    }

    pub(crate) fn hash(&self) -> [u8; 32] {
        self.hash
    }

    pub(crate) fn prev_hash(&self) -> [u8; 32] {
        self.header.prev_blockhash.to_byte_array()
    }
}

/// Decodes a block in network serialization. The whole buffer must be
/// consumed.
#[no_mangle]
pub unsafe extern "C" fn btck_block_create(
    raw: *const c_void,
    len: usize,
    err: *mut *mut btck_Error,
) -> *mut btck_Block {
    wrap_fn(err, || {
        let bytes = raw_slice(raw, len).ok_or_else(|| Failure::null_argument("raw"))?;
        let block: Block = deserialize(bytes).map_err(|e| {
            log_at(BTCK_LOG_LEVEL_INFO, || {
                format!("Rejected block of {} bytes: {}", bytes.len(), e)
            });
            Failure::parse("block", e)
        })?;
        let block = btck_Block::from_block(block);
        log_at(BTCK_LOG_LEVEL_DEBUG, || {
            format!(
                "Decoded block {} with {} transactions",
                bitcoin::BlockHash::from_byte_array(block.hash),
                block.transactions.len()
            )
        });
        Ok(refcount::into_handle(block))
    })
}

#[no_mangle]
pub unsafe extern "C" fn btck_block_retain(block: *mut btck_Block) -> *mut btck_Block {
    refcount::retain(block)
}

#[no_mangle]
pub unsafe extern "C" fn btck_block_release(block: *mut btck_Block) {
    refcount::release(block)
}

#[no_mangle]
pub unsafe extern "C" fn btck_block_get_hash(block: *const btck_Block, out: *mut btck_BlockHash) {
    (*out).data = (*block).hash;
}

#[no_mangle]
pub unsafe extern "C" fn btck_block_count_transactions(block: *const btck_Block) -> usize {
    (*block).transactions.len()
}

/// Retained transaction at `index`. On an out of range index `*err` receives
/// a "Range" error and null is returned.
#[no_mangle]
pub unsafe extern "C" fn btck_block_get_transaction_at(
    block: *const btck_Block,
    index: usize,
    err: *mut *mut btck_Error,
) -> *mut btck_Transaction {
    wrap_fn(err, || {
        let transactions = &(*block).transactions;
        transactions
            .get(index)
            .map(refcount::share)
            .ok_or_else(|| Failure::out_of_range(index, transactions.len()))
    })
}

/// Streams the block in network serialization: the header, the transaction
/// count, then one chunk per transaction. Returns 0 on success, otherwise the
/// status of the chunk the callback rejected.
#[no_mangle]
pub unsafe extern "C" fn btck_block_to_bytes(
    block: *const btck_Block,
    write: btck_WriteBytes,
    user_data: *mut c_void,
) -> c_int {
    let block = &*block;
    let header = serialize(&block.header);
    let count = serialize(&VarInt(block.transactions.len() as u64));
    let chunks = [header.as_slice(), count.as_slice()]
        .into_iter()
        .chain(block.transactions.iter().map(|tx| tx.serialized()));
    let status = push_chunks(write, user_data, chunks);
    if status != 0 {
        log_at(BTCK_LOG_LEVEL_DEBUG, || {
            format!("Block serialization aborted with status {}", status)
        });
    }
    status
}

#[cfg(test)]
mod tests {
    use bitcoin::absolute::LockTime;
    use bitcoin::block::Version;
    use bitcoin::{
        transaction, Amount, CompactTarget, OutPoint, ScriptBuf, Sequence, Transaction, TxIn,
        TxMerkleNode, TxOut, Witness,
    };

    use super::*;
    use crate::error::{
        btck_error_code, btck_error_destroy, BTCK_ERROR_CODE_INDEX_OUT_OF_RANGE,
        BTCK_ERROR_CODE_PARSE,
    };
    use crate::transaction::btck_transaction_release;

    fn tx(tag: u8) -> Transaction {
        Transaction {
            version: transaction::Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: ScriptBuf::from_bytes(vec![0x01, tag]),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(1_000 + tag as u64),
                script_pubkey: ScriptBuf::from_bytes(vec![0x51]),
            }],
        }
    }

    fn sample_block() -> Vec<u8> {
        let mut block = Block {
            header: Header {
                version: Version::ONE,
                prev_blockhash: bitcoin::BlockHash::all_zeros(),
                merkle_root: TxMerkleNode::all_zeros(),
                time: 1_700_000_000,
                bits: CompactTarget::from_consensus(0x207fffff),
                nonce: 0,
            },
            txdata: vec![tx(1), tx(2), tx(3)],
        };
        if let Some(root) = block.compute_merkle_root() {
            block.header.merkle_root = root;
        }
        serialize(&block)
    }

    unsafe extern "C" fn append(bytes: *const c_void, len: usize, user_data: *mut c_void) -> c_int {
        let out = &mut *(user_data as *mut Vec<u8>);
        out.extend_from_slice(std::slice::from_raw_parts(bytes as *const u8, len));
        0
    }

    unsafe extern "C" fn reject_second(
        _bytes: *const c_void,
        _len: usize,
        user_data: *mut c_void,
    ) -> c_int {
        let calls = &mut *(user_data as *mut usize);
        *calls += 1;
        if *calls == 2 {
            7
        } else {
            0
        }
    }

    #[test]
    fn test_block_round_trip_and_children() {
        let raw = sample_block();
        let mut err: *mut btck_Error = std::ptr::null_mut();
        unsafe {
            let block = btck_block_create(raw.as_ptr() as *const c_void, raw.len(), &mut err);
            assert!(err.is_null());
            assert_eq!(btck_block_count_transactions(block), 3);

            let mut out: Vec<u8> = Vec::new();
            let status = btck_block_to_bytes(block, Some(append), &mut out as *mut _ as *mut c_void);
            assert_eq!(status, 0);
            assert_eq!(out, raw);

            let tx = btck_block_get_transaction_at(block, 2, &mut err);
            assert!(!tx.is_null());
            btck_block_release(block);
            // The retained transaction outlives its block.
            assert_eq!(crate::btck_transaction_count_outputs(tx), 1);
            btck_transaction_release(tx);
        }
    }

    #[test]
    fn test_block_transaction_out_of_range() {
        let raw = sample_block();
        let mut err: *mut btck_Error = std::ptr::null_mut();
        unsafe {
            let block = btck_block_create(raw.as_ptr() as *const c_void, raw.len(), &mut err);
            let tx = btck_block_get_transaction_at(block, 3, &mut err);
            assert!(tx.is_null());
            assert_eq!(btck_error_code(err), BTCK_ERROR_CODE_INDEX_OUT_OF_RANGE);
            btck_error_destroy(err);
            btck_block_release(block);
        }
    }

    #[test]
    fn test_block_to_bytes_stops_at_rejected_chunk() {
        let raw = sample_block();
        let mut err: *mut btck_Error = std::ptr::null_mut();
        let mut calls = 0usize;
        unsafe {
            let block = btck_block_create(raw.as_ptr() as *const c_void, raw.len(), &mut err);
            let status = btck_block_to_bytes(
                block,
                Some(reject_second),
                &mut calls as *mut usize as *mut c_void,
            );
            assert_eq!(status, 7);
            assert_eq!(calls, 2);
            assert_eq!(btck_block_to_bytes(block, None, std::ptr::null_mut()), 1);
            btck_block_release(block);
        }
    }

    #[test]
    fn test_block_create_truncated() {
        let raw = sample_block();
        let mut err: *mut btck_Error = std::ptr::null_mut();
        unsafe {
            let block = btck_block_create(raw.as_ptr() as *const c_void, 40, &mut err);
            assert!(block.is_null());
            assert_eq!(btck_error_code(err), BTCK_ERROR_CODE_PARSE);
            btck_error_destroy(err);
        }
    }
}
