use crate::{IterCapabilities, IterVTable, PtrConst, PtrMut, SizeCost, TypeDescriptor};

/// Get the number of entries in the association
///
/// # Safety
///
/// The `map` parameter must point to aligned, initialized memory of the correct type.
pub type AssocLenFn = unsafe fn(map: PtrConst) -> usize;

/// Get a pointer to the value mapped to `key`, or `None` if absent.
///
/// # Safety
///
/// The `map` parameter must point to aligned, initialized memory of the correct type,
/// `key` to an initialized value of the key type.
pub type AssocGetFn = unsafe fn(map: PtrConst, key: PtrConst) -> Option<PtrConst>;

/// Whether `key` is present.
///
/// # Safety
///
/// The `map` parameter must point to aligned, initialized memory of the correct type,
/// `key` to an initialized value of the key type.
pub type AssocContainsFn = unsafe fn(map: PtrConst, key: PtrConst) -> bool;

/// Copy `key` and `value` in, replacing any existing entry. Returns `false`
/// if the key or value type cannot be copied.
///
/// # Safety
///
/// The `map` parameter must point to aligned, initialized memory of the correct type,
/// `key` and `value` to initialized values of the key and value types.
pub type AssocInsertFn = unsafe fn(map: PtrMut, key: PtrConst, value: PtrConst) -> bool;

/// Remove and drop the entry for `key`. Returns `false` if it was absent.
///
/// # Safety
///
/// The `map` parameter must point to aligned, initialized memory of the correct type,
/// `key` to an initialized value of the key type.
pub type AssocRemoveFn = unsafe fn(map: PtrMut, key: PtrConst) -> bool;

/// Operations on an associative container.
#[derive(Clone, Copy, Debug)]
pub struct AssociationVTable {
    /// cf. [`AssocLenFn`]
    pub len: AssocLenFn,

    /// cf. [`AssocGetFn`]
    pub get_value: AssocGetFn,

    /// cf. [`AssocContainsFn`]
    pub contains_key: AssocContainsFn,

    /// Walks `(key, value)` pairs in the container's order.
    pub iter: IterVTable<(PtrConst, PtrConst)>,

    /// cf. [`AssocInsertFn`]
    pub insert: Option<AssocInsertFn>,

    /// cf. [`AssocRemoveFn`]
    pub remove: Option<AssocRemoveFn>,
}

/// Shape of an associative container.
#[derive(Clone, Copy, Debug)]
pub struct AssociationDef {
    /// vtable for interacting with the association
    pub vtable: AssociationVTable,

    /// descriptor of the keys
    pub key: &'static TypeDescriptor,

    /// descriptor of the mapped values
    pub value: &'static TypeDescriptor,

    /// how the entries can be walked
    pub capabilities: IterCapabilities,

    /// cost of [`AssociationVTable::len`]
    pub size_cost: SizeCost,
}
