#[cfg(test)]
macro_rules! test_owned_trait_requirements {
    ($test_name:ident, $owned:ty, $ffi_type:ty) => {
        #[test]
        fn $test_name() {
            use crate::ffi::sealed::AsPtr;

            fn assert_clone<T: Clone>() {}
            fn assert_send_sync<T: Send + Sync>() {}
            fn assert_as_ptr<T: AsPtr<U>, U>() {}

            assert_clone::<$owned>();
            assert_send_sync::<$owned>();
            assert_as_ptr::<$owned, $ffi_type>();
        }
    };
}

#[cfg(test)]
macro_rules! test_ref_trait_requirements {
    ($test_name:ident, $ref:ty, $ffi_type:ty) => {
        #[test]
        fn $test_name() {
            use crate::ffi::sealed::{AsPtr, FromPtr};

            fn assert_clone<T: Clone>() {}
            fn assert_copy<T: Copy>() {}
            fn assert_send_sync<T: Send + Sync>() {}
            fn assert_as_ptr<T: AsPtr<U>, U>() {}
            fn assert_from_ptr<T: FromPtr<U>, U>() {}

            assert_clone::<$ref>();
            assert_copy::<$ref>();
            assert_send_sync::<$ref>();
            assert_as_ptr::<$ref, $ffi_type>();
            assert_from_ptr::<$ref, $ffi_type>();
        }
    };
}

#[cfg(test)]
pub(crate) use {test_owned_trait_requirements, test_ref_trait_requirements};

#[cfg(test)]
mod fixtures {
    use bitcoin::absolute::LockTime;
    use bitcoin::block::{Header, Version};
    use bitcoin::hashes::Hash;
    use bitcoin::{
        transaction, Amount, Block, BlockHash, CompactTarget, OutPoint, ScriptBuf, Sequence,
        Transaction, TxIn, TxMerkleNode, TxOut, Witness,
    };

    const P2WPKH: [u8; 22] = [
        0x00, 0x14, 0x75, 0x1e, 0x76, 0xe8, 0x19, 0x91, 0x96, 0xd4, 0x54, 0x94, 0x1c, 0x45, 0xd1,
        0xb3, 0xa3, 0x23, 0xf1, 0x43, 0x3b, 0xd6,
    ];

    fn coinbase(height: u32) -> Transaction {
        let mut script_sig = vec![0x04];
        script_sig.extend_from_slice(&height.to_le_bytes());
        Transaction {
            version: transaction::Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: ScriptBuf::from_bytes(script_sig),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![
                TxOut {
                    value: Amount::from_sat(5_000_000_000),
                    script_pubkey: ScriptBuf::from_bytes(P2WPKH.to_vec()),
                },
                TxOut {
                    value: Amount::ZERO,
                    script_pubkey: ScriptBuf::from_bytes(vec![0x6a, 0x02, 0xbe, 0xef]),
                },
            ],
        }
    }

    fn spend(prev: &Transaction, vout: u32, witness: Vec<Vec<u8>>, outputs: &[u64]) -> Transaction {
        Transaction {
            version: transaction::Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::new(prev.txid(), vout),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
                witness: Witness::from_slice(&witness),
            }],
            output: outputs
                .iter()
                .map(|&sats| TxOut {
                    value: Amount::from_sat(sats),
                    script_pubkey: ScriptBuf::from_bytes(P2WPKH.to_vec()),
                })
                .collect(),
        }
    }

    /// A coinbase, a segwit spend of it and a spend of that, in block order.
    pub(crate) fn sample_transactions() -> [Transaction; 3] {
        let first = coinbase(1);
        let second = spend(
            &first,
            0,
            vec![vec![0x30; 71], vec![0x02; 33]],
            &[1_000_000_000, 3_999_990_000],
        );
        let third = spend(&second, 1, vec![vec![0x30; 72], vec![0x03; 33]], &[3_999_980_000]);
        [first, second, third]
    }

    fn header(prev_blockhash: BlockHash, nonce: u32) -> Header {
        Header {
            version: Version::ONE,
            prev_blockhash,
            merkle_root: TxMerkleNode::all_zeros(),
            time: 1_700_000_000 + nonce,
            bits: CompactTarget::from_consensus(0x207fffff),
            nonce,
        }
    }

    fn with_merkle_root(mut block: Block) -> Block {
        if let Some(root) = block.compute_merkle_root() {
            block.header.merkle_root = root;
        }
        block
    }

    /// A block holding the three sample transactions.
    pub(crate) fn sample_block() -> Block {
        with_merkle_root(Block {
            header: header(BlockHash::all_zeros(), 0),
            txdata: sample_transactions().to_vec(),
        })
    }

    /// `len` blocks, each extending the previous one.
    pub(crate) fn sample_chain(len: u32) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::new();
        for height in 0..len {
            let prev = blocks
                .last()
                .map(|b| b.block_hash())
                .unwrap_or_else(BlockHash::all_zeros);
            blocks.push(with_merkle_root(Block {
                header: header(prev, height),
                txdata: vec![coinbase(height)],
            }));
        }
        blocks
    }

    /// A block that does not extend any block of `sample_chain`.
    pub(crate) fn unrelated_block() -> Block {
        with_merkle_root(Block {
            header: header(BlockHash::from_byte_array([0xee; 32]), 99),
            txdata: vec![coinbase(99)],
        })
    }
}

#[cfg(test)]
pub(crate) use fixtures::{sample_block, sample_chain, sample_transactions, unrelated_block};
