use crate::{IterCapabilities, IterVTable, PtrConst, PtrMut, SizeCost, TypeDescriptor};

/// Get the number of elements in the sequence
///
/// # Safety
///
/// The `seq` parameter must point to aligned, initialized memory of the correct type.
pub type SeqLenFn = unsafe fn(seq: PtrConst) -> usize;

/// Get pointer to the element at `index`, or `None` if the index is out of
/// bounds.
///
/// # Safety
///
/// The `seq` parameter must point to aligned, initialized memory of the correct type.
pub type SeqGetFn = unsafe fn(seq: PtrConst, index: usize) -> Option<PtrConst>;

/// Get mutable pointer to the element at `index`, or `None` if the index is
/// out of bounds.
///
/// # Safety
///
/// The `seq` parameter must point to aligned, initialized memory of the correct type.
pub type SeqGetMutFn = unsafe fn(seq: PtrMut, index: usize) -> Option<PtrMut>;

/// Copy `item` into the sequence at one end. Returns `false` if the element
/// type cannot be copied.
///
/// # Safety
///
/// The `seq` parameter must point to aligned, initialized memory of the correct type,
/// `item` to an initialized element.
pub type SeqPushFn = unsafe fn(seq: PtrMut, item: PtrConst) -> bool;

/// Remove and drop the element at one end. Returns `false` if the sequence
/// was empty.
///
/// # Safety
///
/// The `seq` parameter must point to aligned, initialized memory of the correct type.
pub type SeqPopFn = unsafe fn(seq: PtrMut) -> bool;

/// Operations on a sequential container.
#[derive(Clone, Copy, Debug)]
pub struct SequenceVTable {
    /// cf. [`SeqLenFn`]
    pub len: SeqLenFn,

    /// cf. [`SeqGetFn`]. Present for random-access shapes.
    pub get: Option<SeqGetFn>,

    /// cf. [`SeqGetMutFn`]. Present for random-access shapes.
    pub get_mut: Option<SeqGetMutFn>,

    /// Walks the elements front to back.
    pub iter: IterVTable<PtrConst>,

    /// cf. [`SeqPushFn`]
    pub push_back: Option<SeqPushFn>,

    /// cf. [`SeqPushFn`]
    pub push_front: Option<SeqPushFn>,

    /// cf. [`SeqPopFn`]
    pub pop_back: Option<SeqPopFn>,

    /// cf. [`SeqPopFn`]
    pub pop_front: Option<SeqPopFn>,
}

/// Shape of a sequential container.
#[derive(Clone, Copy, Debug)]
pub struct SequenceDef {
    /// vtable for interacting with the sequence
    pub vtable: SequenceVTable,

    /// descriptor of the elements
    pub element: &'static TypeDescriptor,

    /// how the sequence can be walked
    pub capabilities: IterCapabilities,

    /// cost of [`SequenceVTable::len`]
    pub size_cost: SizeCost,
}

impl SequenceDef {
    /// Whether elements can be reached by index.
    #[inline]
    pub fn is_random_access(&self) -> bool {
        self.capabilities.contains(IterCapabilities::RANDOM_ACCESS) && self.vtable.get.is_some()
    }

    /// Whether the sequence can be walked from the back.
    #[inline]
    pub fn is_bidirectional(&self) -> bool {
        self.capabilities.contains(IterCapabilities::BIDIRECTIONAL)
            && self.vtable.iter.next_back.is_some()
    }
}
