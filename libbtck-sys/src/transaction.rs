// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

use std::ffi::c_void;
use std::fmt::Write as _;
use std::sync::Arc;

use bitcoin::consensus::{deserialize, serialize};
use bitcoin::hashes::Hash;
use bitcoin::{Sequence, Transaction};
use libc::{c_char, c_int};

use crate::error::{btck_Error, wrap_fn, Failure};
use crate::logging::{log_at, BTCK_LOG_LEVEL_DEBUG, BTCK_LOG_LEVEL_INFO};
use crate::refcount;
use crate::transaction_output::btck_TransactionOutput;
use crate::util::{pull_bytes, raw_slice, short_hex, write_string};
use crate::btck_Txid;

pub struct btck_Transaction {
    tx: Transaction,
    serialized: Vec<u8>,
    outputs: Vec<Arc<btck_TransactionOutput>>,
    txid: [u8; 32],
}

impl btck_Transaction {
    pub(crate) fn from_tx(tx: Transaction) -> Self {
        let serialized = serialize(&tx);
        let outputs = tx
            .output
            .iter()
            .map(|out| Arc::new(btck_TransactionOutput::from_tx_out(out)))
            .collect();
        let txid = tx.txid().to_byte_array();
        btck_Transaction {
            tx,
            serialized,
            outputs,
            txid,
        }
    }

    pub(crate) fn serialized(&self) -> &[u8] {
        &self.serialized
    }

    fn describe(&self) -> String {
        let tx = &self.tx;
        let mut text = String::new();
        let _ = writeln!(
            text,
            "CTransaction(hash={}, ver={}, vin.size={}, vout.size={}, nLockTime={})",
            &tx.txid().to_string()[..10],
            tx.version.0 as u32,
            tx.input.len(),
            tx.output.len(),
            tx.lock_time.to_consensus_u32()
        );
        for input in &tx.input {
            let prevout = &input.previous_output;
            let _ = write!(
                text,
                "    CTxIn(COutPoint({}, {})",
                &prevout.txid.to_string()[..10],
                prevout.vout
            );
            if prevout.is_null() {
                let _ = write!(text, ", coinbase {}", hex::encode(input.script_sig.as_bytes()));
            } else {
                let _ = write!(
                    text,
                    ", scriptSig={}",
                    short_hex(input.script_sig.as_bytes(), 24)
                );
            }
            if input.sequence != Sequence::MAX {
                let _ = write!(text, ", nSequence={}", input.sequence.0);
            }
            text.push_str(")\n");
        }
        for input in &tx.input {
            let stack: Vec<String> = input.witness.iter().map(hex::encode).collect();
            let _ = writeln!(text, "    CScriptWitness({})", stack.join(", "));
        }
        for output in &self.outputs {
            let _ = writeln!(text, "    {}", output.describe());
        }
        text
    }
}

/// Decodes a transaction in network serialization, with or without witness
/// data. The whole buffer must be consumed.
#[no_mangle]
pub unsafe extern "C" fn btck_transaction_create(
    raw: *const c_void,
    len: usize,
    err: *mut *mut btck_Error,
) -> *mut btck_Transaction {
    wrap_fn(err, || {
        let bytes = raw_slice(raw, len).ok_or_else(|| Failure::null_argument("raw"))?;
        let tx: Transaction = deserialize(bytes).map_err(|e| {
            log_at(BTCK_LOG_LEVEL_INFO, || {
                format!("Rejected transaction of {} bytes: {}", bytes.len(), e)
            });
            Failure::parse("transaction", e)
        })?;
        let transaction = btck_Transaction::from_tx(tx);
        log_at(BTCK_LOG_LEVEL_DEBUG, || {
            format!(
                "Decoded transaction {} ({} inputs, {} outputs)",
                transaction.tx.txid(),
                transaction.tx.input.len(),
                transaction.outputs.len()
            )
        });
        Ok(refcount::into_handle(transaction))
    })
}

#[no_mangle]
pub unsafe extern "C" fn btck_transaction_retain(
    transaction: *mut btck_Transaction,
) -> *mut btck_Transaction {
    refcount::retain(transaction)
}

#[no_mangle]
pub unsafe extern "C" fn btck_transaction_release(transaction: *mut btck_Transaction) {
    refcount::release(transaction)
}

#[no_mangle]
pub unsafe extern "C" fn btck_transaction_count_outputs(transaction: *const btck_Transaction) -> usize {
    (*transaction).outputs.len()
}

#[no_mangle]
pub unsafe extern "C" fn btck_transaction_count_inputs(transaction: *const btck_Transaction) -> usize {
    (*transaction).tx.input.len()
}

/// Borrowed output at `index`, valid until the transaction is released.
/// Returns null when `index` is out of range.
#[no_mangle]
pub unsafe extern "C" fn btck_transaction_get_output_at(
    transaction: *const btck_Transaction,
    index: usize,
) -> *const btck_TransactionOutput {
    match (&(*transaction).outputs).get(index) {
        Some(output) => refcount::borrow(output),
        None => std::ptr::null(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn btck_transaction_get_txid(
    transaction: *const btck_Transaction,
    out: *mut btck_Txid,
) {
    (*out).data = (*transaction).txid;
}

/// Borrowed view of the transaction in network serialization, valid until the
/// transaction is released.
#[no_mangle]
pub unsafe extern "C" fn btck_transaction_as_bytes(
    transaction: *const btck_Transaction,
    len: *mut usize,
) -> *const c_void {
    pull_bytes(&(*transaction).serialized, len)
}

/// Renders the transaction in its debug form. Returns the full length of the
/// text; at most `capacity - 1` bytes plus a nul are written to `buf`. Call
/// with a null `buf` first to learn the length.
#[no_mangle]
pub unsafe extern "C" fn btck_transaction_to_string(
    transaction: *const btck_Transaction,
    buf: *mut c_char,
    capacity: usize,
) -> c_int {
    write_string(&(*transaction).describe(), buf, capacity)
}
