use std::{
    ffi::c_void,
    fmt::{self, Debug, Display, Formatter},
    marker::PhantomData,
    ptr::NonNull,
};

use libbtck_sys::{
    btck_Transaction, btck_TransactionOutput, btck_Txid, btck_transaction_as_bytes,
    btck_transaction_count_inputs, btck_transaction_count_outputs, btck_transaction_create,
    btck_transaction_get_output_at, btck_transaction_get_txid, btck_transaction_output_create,
    btck_transaction_output_get_amount, btck_transaction_output_get_script_pubkey,
    btck_transaction_output_to_string, btck_transaction_to_string,
};

use crate::{
    c_copy_bytes, c_to_string,
    core::iter::{RandomAccess, RecordIter},
    ffi::{
        convention,
        handle::Owned,
        sealed::{AsPtr, FromPtr},
    },
    KernelError,
};

use super::script::{ScriptPubkeyExt, ScriptPubkeyRef};

/// Common operations for transactions, implemented by both owned and borrowed types.
pub trait TransactionExt: AsPtr<btck_Transaction> {
    /// Returns the number of outputs in this transaction.
    fn output_count(&self) -> usize {
        unsafe { btck_transaction_count_outputs(self.as_ptr()) }
    }

    /// Returns a reference to the output at the specified index.
    ///
    /// # Arguments
    /// * `index` - The zero-based index of the output to retrieve
    ///
    /// # Returns
    /// * `Ok(TxOutRef)` - A reference to the output
    /// * `Err(KernelError::IndexOutOfRange)` - If the index is invalid
    fn output(&self, index: usize) -> Result<TxOutRef<'_>, KernelError> {
        unsafe {
            convention::borrowed(btck_transaction_get_output_at(self.as_ptr(), index))
        }
        .map_err(|_| {
            log::trace!(target: "btck", "output index {} rejected", index);
            KernelError::IndexOutOfRange {
                index,
                count: self.output_count(),
            }
        })
    }

    /// Returns an iterator over all outputs in this transaction.
    fn outputs(&self) -> RecordIter<'_, Self>
    where
        Self: Sized,
    {
        RecordIter::new(self)
    }

    fn input_count(&self) -> usize {
        unsafe { btck_transaction_count_inputs(self.as_ptr()) }
    }

    /// Returns the transaction ID (txid) of this transaction.
    fn txid(&self) -> Txid {
        let mut txid = btck_Txid::default();
        unsafe { btck_transaction_get_txid(self.as_ptr(), &mut txid) };
        Txid::from(txid.data)
    }

    /// Copies the transaction in Bitcoin wire format.
    fn to_bytes(&self) -> Vec<u8> {
        c_copy_bytes(|len| unsafe { btck_transaction_as_bytes(self.as_ptr(), len) })
    }
}

impl<T: TransactionExt> RandomAccess for T {
    type Item<'a> = TxOutRef<'a> where Self: 'a;

    fn count(&self) -> usize {
        self.output_count()
    }

    fn at(&self, index: usize) -> Result<TxOutRef<'_>, KernelError> {
        self.output(index)
    }
}

fn describe(transaction: &impl TransactionExt) -> String {
    c_to_string(|buf, len| unsafe { btck_transaction_to_string(transaction.as_ptr(), buf, len) })
}

/// A Bitcoin transaction.
#[derive(Clone)]
pub struct Transaction {
    inner: Owned<btck_Transaction>,
}

impl Transaction {
    /// Decodes a transaction from Bitcoin wire format, with or without
    /// witness data.
    ///
    /// # Errors
    /// Returns [`KernelError::Parse`] if the bytes are not exactly one
    /// well-formed transaction.
    pub fn new(transaction_bytes: &[u8]) -> Result<Self, KernelError> {
        let inner = unsafe {
            convention::from_out_param(|err| {
                btck_transaction_create(
                    transaction_bytes.as_ptr() as *const c_void,
                    transaction_bytes.len(),
                    err,
                )
            })
        }
        .map_err(|source| KernelError::Parse {
            record: "transaction",
            source,
        })?;
        Ok(Transaction { inner })
    }

    pub(crate) fn from_owned(inner: Owned<btck_Transaction>) -> Self {
        Transaction { inner }
    }

    pub fn as_ref(&self) -> TransactionRef<'_> {
        unsafe { TransactionRef::from_ptr(self.inner.as_ptr()) }
    }
}

impl AsPtr<btck_Transaction> for Transaction {
    fn as_ptr(&self) -> *const btck_Transaction {
        self.inner.as_ptr()
    }
}

impl TransactionExt for Transaction {}

impl TryFrom<&[u8]> for Transaction {
    type Error = KernelError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Transaction::new(bytes)
    }
}

impl TryFrom<Transaction> for Vec<u8> {
    type Error = KernelError;

    fn try_from(transaction: Transaction) -> Result<Self, Self::Error> {
        Ok(transaction.to_bytes())
    }
}

impl TryFrom<&Transaction> for Vec<u8> {
    type Error = KernelError;

    fn try_from(transaction: &Transaction) -> Result<Self, Self::Error> {
        Ok(transaction.to_bytes())
    }
}

impl Debug for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Transaction({})", self.txid())
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(self))
    }
}

/// A transaction borrowed from a record that keeps it alive.
pub struct TransactionRef<'a> {
    inner: *const btck_Transaction,
    marker: PhantomData<&'a ()>,
}

unsafe impl<'a> Send for TransactionRef<'a> {}
unsafe impl<'a> Sync for TransactionRef<'a> {}

impl<'a> TransactionRef<'a> {
    /// Retains the transaction so it no longer depends on its parent.
    pub fn to_owned(&self) -> Transaction {
        Transaction {
            inner: unsafe { Owned::retained(NonNull::new_unchecked(self.inner as *mut _)) },
        }
    }
}

impl<'a> AsPtr<btck_Transaction> for TransactionRef<'a> {
    fn as_ptr(&self) -> *const btck_Transaction {
        self.inner
    }
}

impl<'a> FromPtr<btck_Transaction> for TransactionRef<'a> {
    unsafe fn from_ptr(ptr: *const btck_Transaction) -> Self {
        TransactionRef {
            inner: ptr,
            marker: PhantomData,
        }
    }
}

impl<'a> TransactionExt for TransactionRef<'a> {}

impl<'a> Clone for TransactionRef<'a> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a> Copy for TransactionRef<'a> {}

impl<'a> Debug for TransactionRef<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionRef({})", self.txid())
    }
}

impl<'a> Display for TransactionRef<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(self))
    }
}

/// Common operations for transaction outputs, implemented by both owned and borrowed types.
pub trait TxOutExt: AsPtr<btck_TransactionOutput> {
    /// Returns the amount of this output in satoshis.
    fn amount(&self) -> i64 {
        unsafe { btck_transaction_output_get_amount(self.as_ptr()) }
    }

    /// Returns a reference to the script pubkey that defines how this output can be spent.
    fn script_pubkey(&self) -> ScriptPubkeyRef<'_> {
        let ptr = unsafe { btck_transaction_output_get_script_pubkey(self.as_ptr()) };
        unsafe { ScriptPubkeyRef::from_ptr(ptr) }
    }
}

fn describe_output(output: &impl TxOutExt) -> String {
    c_to_string(|buf, len| unsafe {
        btck_transaction_output_to_string(output.as_ptr(), buf, len)
    })
}

/// A single transaction output containing a value and spending conditions.
///
/// Transaction outputs can be created from a script pubkey and amount, or retrieved
/// from existing transactions.
#[derive(Clone)]
pub struct TxOut {
    inner: Owned<btck_TransactionOutput>,
}

impl TxOut {
    /// Creates a new transaction output with the specified script and amount.
    ///
    /// # Arguments
    /// * `script_pubkey` - The script defining how this output can be spent
    /// * `amount` - The amount in satoshis
    pub fn new(script_pubkey: &impl ScriptPubkeyExt, amount: i64) -> Self {
        let ptr = unsafe { btck_transaction_output_create(script_pubkey.as_ptr(), amount) };
        TxOut {
            inner: unsafe { Owned::from_raw(NonNull::new_unchecked(ptr)) },
        }
    }

    pub fn as_ref(&self) -> TxOutRef<'_> {
        unsafe { TxOutRef::from_ptr(self.inner.as_ptr()) }
    }
}

impl AsPtr<btck_TransactionOutput> for TxOut {
    fn as_ptr(&self) -> *const btck_TransactionOutput {
        self.inner.as_ptr()
    }
}

impl TxOutExt for TxOut {}

impl Debug for TxOut {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TxOut({})", self.amount())
    }
}

impl Display for TxOut {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_output(self))
    }
}

/// An output borrowed from the transaction that contains it.
pub struct TxOutRef<'a> {
    inner: *const btck_TransactionOutput,
    marker: PhantomData<&'a ()>,
}

unsafe impl<'a> Send for TxOutRef<'a> {}
unsafe impl<'a> Sync for TxOutRef<'a> {}

impl<'a> TxOutRef<'a> {
    /// Retains the output so it can outlive its transaction.
    pub fn to_owned(&self) -> TxOut {
        TxOut {
            inner: unsafe { Owned::retained(NonNull::new_unchecked(self.inner as *mut _)) },
        }
    }
}

impl<'a> AsPtr<btck_TransactionOutput> for TxOutRef<'a> {
    fn as_ptr(&self) -> *const btck_TransactionOutput {
        self.inner
    }
}

impl<'a> FromPtr<btck_TransactionOutput> for TxOutRef<'a> {
    unsafe fn from_ptr(ptr: *const btck_TransactionOutput) -> Self {
        TxOutRef {
            inner: ptr,
            marker: PhantomData,
        }
    }
}

impl<'a> TxOutExt for TxOutRef<'a> {}

impl<'a> Clone for TxOutRef<'a> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a> Copy for TxOutRef<'a> {}

impl<'a> Debug for TxOutRef<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TxOutRef({})", self.amount())
    }
}

impl<'a> Display for TxOutRef<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_output(self))
    }
}

/// A transaction id in internal byte order.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct Txid {
    pub hash: [u8; 32],
}

impl Txid {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }
}

impl From<[u8; 32]> for Txid {
    fn from(hash: [u8; 32]) -> Self {
        Txid { hash }
    }
}

impl TryFrom<&[u8]> for Txid {
    type Error = KernelError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let hash: [u8; 32] = bytes.try_into().map_err(|_| KernelError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Txid { hash })
    }
}

/// Displays the txid in the byte-reversed hex form block explorers use.
impl Display for Txid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.hash.iter().rev() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
