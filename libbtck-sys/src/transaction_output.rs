// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

use std::sync::Arc;

use bitcoin::TxOut;
use libc::{c_char, c_int};

use crate::refcount;
use crate::script_pubkey::btck_ScriptPubkey;
use crate::util::{short_hex, write_string};

const COIN: i64 = 100_000_000;

pub struct btck_TransactionOutput {
    amount: i64,
    script_pubkey: Arc<btck_ScriptPubkey>,
}

impl btck_TransactionOutput {
    pub(crate) fn from_tx_out(tx_out: &TxOut) -> Self {
        btck_TransactionOutput {
            amount: tx_out.value.to_sat() as i64,
            script_pubkey: Arc::new(btck_ScriptPubkey::new(tx_out.script_pubkey.clone())),
        }
    }

    pub(crate) fn describe(&self) -> String {
        format!(
            "CTxOut(nValue={}.{:08}, scriptPubKey={})",
            self.amount / COIN,
            self.amount % COIN,
            short_hex(self.script_pubkey.script.as_bytes(), 30)
        )
    }
}

/// Creates an output paying `amount` to `script_pubkey`. The script is shared,
/// the caller keeps its own reference.
#[no_mangle]
pub unsafe extern "C" fn btck_transaction_output_create(
    script_pubkey: *const btck_ScriptPubkey,
    amount: i64,
) -> *mut btck_TransactionOutput {
    if script_pubkey.is_null() {
        return std::ptr::null_mut();
    }
    refcount::into_handle(btck_TransactionOutput {
        amount,
        script_pubkey: refcount::adopt(script_pubkey),
    })
}

#[no_mangle]
pub unsafe extern "C" fn btck_transaction_output_retain(
    output: *mut btck_TransactionOutput,
) -> *mut btck_TransactionOutput {
    refcount::retain(output)
}

#[no_mangle]
pub unsafe extern "C" fn btck_transaction_output_release(output: *mut btck_TransactionOutput) {
    refcount::release(output)
}

#[no_mangle]
pub unsafe extern "C" fn btck_transaction_output_get_amount(
    output: *const btck_TransactionOutput,
) -> i64 {
    (*output).amount
}

/// Borrowed, valid until the output is released.
#[no_mangle]
pub unsafe extern "C" fn btck_transaction_output_get_script_pubkey(
    output: *const btck_TransactionOutput,
) -> *const btck_ScriptPubkey {
    refcount::borrow(&(*output).script_pubkey)
}

/// Two-phase rendering, see `btck_transaction_to_string`.
#[no_mangle]
pub unsafe extern "C" fn btck_transaction_output_to_string(
    output: *const btck_TransactionOutput,
    buf: *mut c_char,
    capacity: usize,
) -> c_int {
    write_string(&(*output).describe(), buf, capacity)
}

#[cfg(test)]
mod tests {
    use std::ffi::c_void;

    use super::*;
    use crate::script_pubkey::{btck_script_pubkey_create, btck_script_pubkey_release};

    #[test]
    fn test_output_shares_script_pubkey() {
        let raw = [0x51u8];
        unsafe {
            let script = btck_script_pubkey_create(raw.as_ptr() as *const c_void, raw.len());
            let output = btck_transaction_output_create(script, 150_000_000);
            btck_script_pubkey_release(script);

            assert_eq!(btck_transaction_output_get_amount(output), 150_000_000);
            let borrowed = btck_transaction_output_get_script_pubkey(output);
            assert_eq!((*borrowed).script.as_bytes(), &raw);
            assert_eq!(
                (*output).describe(),
                "CTxOut(nValue=1.50000000, scriptPubKey=51)"
            );
            btck_transaction_output_release(output);
        }
    }

    #[test]
    fn test_output_describe_truncates_script() {
        let output = btck_TransactionOutput {
            amount: 42,
            script_pubkey: Arc::new(btck_ScriptPubkey::new(bitcoin::ScriptBuf::from_bytes(
                vec![0xab; 40],
            ))),
        };
        assert_eq!(
            output.describe(),
            format!("CTxOut(nValue=0.00000042, scriptPubKey={})", "ab".repeat(15))
        );
    }
}
