// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

use std::{
    ffi::c_void,
    fmt::{self, Debug, Display, Formatter},
};

use libbtck_sys::{
    btck_Block, btck_BlockHash, btck_block_count_transactions, btck_block_create,
    btck_block_get_hash, btck_block_get_transaction_at, btck_block_to_bytes,
    BTCK_ERROR_CODE_INDEX_OUT_OF_RANGE,
};

use crate::{
    c_serialize,
    core::iter::{RandomAccess, RecordIter},
    ffi::{convention, handle::Owned, sealed::AsPtr},
    KernelError, NativeError,
};

use super::transaction::Transaction;

/// A type for a Block hash, in internal byte order.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct BlockHash {
    pub hash: [u8; 32],
}

impl BlockHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    pub(crate) fn to_native(self) -> btck_BlockHash {
        btck_BlockHash { data: self.hash }
    }
}

impl From<[u8; 32]> for BlockHash {
    fn from(hash: [u8; 32]) -> Self {
        BlockHash { hash }
    }
}

impl TryFrom<&[u8]> for BlockHash {
    type Error = KernelError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let hash: [u8; 32] = bytes.try_into().map_err(|_| KernelError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(BlockHash { hash })
    }
}

/// Displays the hash byte-reversed, the way block explorers show it.
impl Display for BlockHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.hash.iter().rev() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// A Bitcoin block containing a header and transactions.
///
/// Blocks are decoded once from raw serialized data; every accessor reads the
/// already decoded record.
#[derive(Clone)]
pub struct Block {
    inner: Owned<btck_Block>,
}

impl Block {
    /// Decodes a block from Bitcoin wire format.
    ///
    /// # Errors
    /// Returns [`KernelError::Parse`] if the bytes are not exactly one
    /// well-formed block.
    pub fn new(raw_block: &[u8]) -> Result<Self, KernelError> {
        let inner = unsafe {
            convention::from_out_param(|err| {
                btck_block_create(raw_block.as_ptr() as *const c_void, raw_block.len(), err)
            })
        }
        .map_err(|source| KernelError::Parse {
            record: "block",
            source,
        })?;
        Ok(Block { inner })
    }

    pub(crate) fn from_owned(inner: Owned<btck_Block>) -> Self {
        Block { inner }
    }

    /// Returns the hash of this block.
    ///
    /// This is the double SHA256 hash of the block header, as computed by the
    /// engine when the block was decoded.
    pub fn hash(&self) -> BlockHash {
        let mut hash = btck_BlockHash::default();
        unsafe { btck_block_get_hash(self.inner.as_ptr(), &mut hash) };
        BlockHash { hash: hash.data }
    }

    /// Returns the number of transactions in this block.
    pub fn transaction_count(&self) -> usize {
        unsafe { btck_block_count_transactions(self.inner.as_ptr()) }
    }

    /// Returns the transaction at the specified index.
    ///
    /// # Arguments
    /// * `index` - The zero-based index of the transaction (0 is the coinbase)
    ///
    /// # Errors
    /// Returns [`KernelError::IndexOutOfRange`] if the index is invalid, and
    /// [`KernelError::Native`] for any other engine failure.
    pub fn transaction(&self, index: usize) -> Result<Transaction, KernelError> {
        unsafe {
            convention::from_out_param(|err| {
                btck_block_get_transaction_at(self.inner.as_ptr(), index, err)
            })
        }
        .map(Transaction::from_owned)
        .map_err(|err| lookup_error(err, index, self.transaction_count()))
    }

    /// Returns an iterator over the transactions, coinbase first.
    pub fn transactions(&self) -> RecordIter<'_, Block> {
        RecordIter::new(self)
    }

    /// Consensus encodes the block to Bitcoin wire format.
    pub fn consensus_encode(&self) -> Result<Vec<u8>, KernelError> {
        c_serialize(|callback, user_data| unsafe {
            btck_block_to_bytes(self.inner.as_ptr(), Some(callback), user_data)
        })
    }
}

fn lookup_error(err: Option<NativeError>, index: usize, count: usize) -> KernelError {
    match err {
        Some(err) if err.code() == BTCK_ERROR_CODE_INDEX_OUT_OF_RANGE => {
            log::debug!(target: "btck", "transaction lookup failed: {}", err);
            KernelError::IndexOutOfRange { index, count }
        }
        Some(err) => KernelError::Native(err),
        None => KernelError::Internal("Failed to retrieve transaction.".to_string()),
    }
}

impl AsPtr<btck_Block> for Block {
    fn as_ptr(&self) -> *const btck_Block {
        self.inner.as_ptr()
    }
}

impl RandomAccess for Block {
    type Item<'a> = Transaction where Self: 'a;

    fn count(&self) -> usize {
        self.transaction_count()
    }

    fn at(&self, index: usize) -> Result<Transaction, KernelError> {
        self.transaction(index)
    }
}

impl Debug for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("hash", &self.hash().to_string())
            .field("transactions", &self.transaction_count())
            .finish()
    }
}

impl TryFrom<Block> for Vec<u8> {
    type Error = KernelError;

    fn try_from(block: Block) -> Result<Self, KernelError> {
        block.consensus_encode()
    }
}

impl TryFrom<&Block> for Vec<u8> {
    type Error = KernelError;

    fn try_from(block: &Block) -> Result<Self, KernelError> {
        block.consensus_encode()
    }
}

impl TryFrom<&[u8]> for Block {
    type Error = KernelError;

    fn try_from(raw_block: &[u8]) -> Result<Self, Self::Error> {
        Block::new(raw_block)
    }
}
