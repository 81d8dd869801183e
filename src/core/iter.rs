use crate::KernelError;

/// Indexed access to the ordered children of a record: the outputs of a
/// transaction, the transactions of a block, the blocks of a chain.
///
/// Every call to [`RandomAccess::at`] builds a fresh wrapper. Repeated calls
/// with the same index yield equivalent children, not the same object.
pub trait RandomAccess {
    type Item<'a>
    where
        Self: 'a;

    /// Number of children, fixed for the lifetime of the parent.
    fn count(&self) -> usize;

    /// Child at `index`.
    ///
    /// # Errors
    /// Returns [`KernelError::IndexOutOfRange`] if `index >= self.count()`.
    fn at(&self, index: usize) -> Result<Self::Item<'_>, KernelError>;

    /// Iterates the children in index order.
    fn iter(&self) -> RecordIter<'_, Self>
    where
        Self: Sized,
    {
        RecordIter::new(self)
    }
}

/// Iterator over the children of a [`RandomAccess`] record, in index order.
///
/// The iterator is fused on the first failed access, so [`ExactSizeIterator::len`]
/// never reports children it cannot yield.
pub struct RecordIter<'a, R> {
    parent: &'a R,
    front: usize,
    back: usize,
}

impl<'a, R: RandomAccess> RecordIter<'a, R> {
    pub fn new(parent: &'a R) -> Self {
        Self {
            parent,
            front: 0,
            back: parent.count(),
        }
    }
}

impl<'a, R: RandomAccess> Iterator for RecordIter<'a, R> {
    type Item = R::Item<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let index = self.front;
        self.front += 1;
        let item = self.parent.at(index).ok();
        if item.is_none() {
            self.front = self.back;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, R: RandomAccess> DoubleEndedIterator for RecordIter<'a, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        let item = self.parent.at(self.back).ok();
        if item.is_none() {
            self.back = self.front;
        }
        item
    }
}

impl<'a, R: RandomAccess> ExactSizeIterator for RecordIter<'a, R> {}
