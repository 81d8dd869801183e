//! An immutable sequence of linked blocks.
//!
//! The [`Chain`] is assembled from decoded [`Block`]s, each of which must
//! extend its predecessor. Blocks are addressed by their index, which is the
//! height relative to the first block, and can be looked up by hash.

use std::fmt::{self, Debug, Formatter};

use libbtck_sys::{
    btck_Block, btck_Chain, btck_chain_count_blocks, btck_chain_create, btck_chain_find,
    btck_chain_get_block_at,
};

use crate::{
    core::iter::{RandomAccess, RecordIter},
    ffi::{convention, handle::Owned, sealed::AsPtr},
    Block, BlockHash, KernelError,
};

/// A chain of blocks, ordered from the first block to the tip.
///
/// # Examples
/// ```no_run
/// use btck::{Block, Chain, KernelError};
///
/// # let raw_blocks: Vec<Vec<u8>> = Vec::new();
/// let blocks = raw_blocks
///     .iter()
///     .map(|raw| Block::new(raw))
///     .collect::<Result<Vec<_>, _>>()?;
/// let chain = Chain::new(&blocks)?;
///
/// if let Some(tip) = chain.tip() {
///     println!("Chain of {} blocks, tip {}", chain.block_count(), tip.hash());
/// }
/// # Ok::<(), KernelError>(())
/// ```
#[derive(Clone)]
pub struct Chain {
    inner: Owned<btck_Chain>,
}

impl Chain {
    /// Assembles a chain from blocks in order. The chain keeps its own
    /// references to the blocks.
    ///
    /// # Errors
    /// Returns [`KernelError::Native`] with a `"Chain"` domain error if a
    /// block does not extend the block before it.
    pub fn new(blocks: &[Block]) -> Result<Self, KernelError> {
        let ptrs: Vec<*const btck_Block> = blocks.iter().map(|block| block.as_ptr()).collect();
        let inner = unsafe {
            convention::from_out_param(|err| btck_chain_create(ptrs.as_ptr(), ptrs.len(), err))
        }
        .map_err(|err| match err {
            Some(err) => KernelError::Native(err),
            None => KernelError::Internal("Failed to assemble chain.".to_string()),
        })?;
        log::debug!(target: "btck", "assembled chain of {} blocks", blocks.len());
        Ok(Chain { inner })
    }

    /// Returns the number of blocks in the chain.
    pub fn block_count(&self) -> usize {
        unsafe { btck_chain_count_blocks(self.inner.as_ptr()) }
    }

    /// Returns the block at `index`.
    ///
    /// # Errors
    /// Returns [`KernelError::IndexOutOfRange`] if the index is invalid.
    pub fn block(&self, index: usize) -> Result<Block, KernelError> {
        unsafe { convention::from_nullable(btck_chain_get_block_at(self.inner.as_ptr(), index)) }
            .map(Block::from_owned)
            .map_err(|_| KernelError::IndexOutOfRange {
                index,
                count: self.block_count(),
            })
    }

    /// Returns an iterator over the blocks, first block to tip.
    pub fn blocks(&self) -> RecordIter<'_, Chain> {
        RecordIter::new(self)
    }

    /// Returns the last block, or `None` for an empty chain.
    pub fn tip(&self) -> Option<Block> {
        self.block_count()
            .checked_sub(1)
            .and_then(|index| self.block(index).ok())
    }

    /// Returns the index of the block with `hash`, or `None` if the chain
    /// does not contain it.
    pub fn find(&self, hash: &BlockHash) -> Option<usize> {
        let native = hash.to_native();
        let index = unsafe { btck_chain_find(self.inner.as_ptr(), &native) };
        usize::try_from(index).ok()
    }

    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.find(hash).is_some()
    }

    /// Returns the block with `hash`.
    ///
    /// # Errors
    /// Returns [`KernelError::LookupFailed`] if the chain does not contain it.
    pub fn block_by_hash(&self, hash: &BlockHash) -> Result<Block, KernelError> {
        let index = self
            .find(hash)
            .ok_or(KernelError::LookupFailed(*hash))?;
        self.block(index)
    }
}

impl AsPtr<btck_Chain> for Chain {
    fn as_ptr(&self) -> *const btck_Chain {
        self.inner.as_ptr()
    }
}

impl RandomAccess for Chain {
    type Item<'a> = Block where Self: 'a;

    fn count(&self) -> usize {
        self.block_count()
    }

    fn at(&self, index: usize) -> Result<Block, KernelError> {
        self.block(index)
    }
}

impl Debug for Chain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("blocks", &self.block_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::consensus::serialize;

    use super::*;
    use crate::core::test_utils::{sample_chain, test_owned_trait_requirements, unrelated_block};

    test_owned_trait_requirements!(test_chain_implementations, Chain, btck_Chain);

    fn blocks(len: u32) -> Vec<Block> {
        sample_chain(len)
            .iter()
            .map(|block| Block::new(&serialize(block)).unwrap())
            .collect()
    }

    #[test]
    fn test_chain_find() {
        let blocks = blocks(3);
        let chain = Chain::new(&blocks).unwrap();
        assert_eq!(chain.block_count(), 3);
        assert_eq!(chain.find(&blocks[1].hash()), Some(1));
        assert_eq!(chain.find(&blocks[0].hash()), Some(0));

        let unknown = Block::new(&serialize(&unrelated_block())).unwrap();
        assert_eq!(chain.find(&unknown.hash()), None);
        assert!(!chain.contains(&unknown.hash()));
        assert!(matches!(
            chain.block_by_hash(&unknown.hash()),
            Err(KernelError::LookupFailed(hash)) if hash == unknown.hash()
        ));
    }

    #[test]
    fn test_chain_random_access() {
        let blocks = blocks(3);
        let chain = Chain::new(&blocks).unwrap();
        drop(blocks);

        let hashes: Vec<BlockHash> = chain.blocks().map(|block| block.hash()).collect();
        assert_eq!(hashes.len(), 3);
        assert_eq!(chain.tip().unwrap().hash(), hashes[2]);
        assert_eq!(chain.block_by_hash(&hashes[1]).unwrap().hash(), hashes[1]);
        assert!(matches!(
            chain.block(3),
            Err(KernelError::IndexOutOfRange { index: 3, count: 3 })
        ));
        assert!(chain.at(usize::MAX).is_err());
    }

    #[test]
    fn test_chain_rejects_unlinked_blocks() {
        let mut blocks = blocks(2);
        blocks.push(Block::new(&serialize(&unrelated_block())).unwrap());
        match Chain::new(&blocks) {
            Err(KernelError::Native(err)) => assert_eq!(err.domain(), "Chain"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_chain() {
        let chain = Chain::new(&[]).unwrap();
        assert_eq!(chain.block_count(), 0);
        assert!(chain.tip().is_none());
        assert_eq!(chain.blocks().count(), 0);
    }
}
