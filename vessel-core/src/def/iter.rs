use alloc::boxed::Box;

use crate::{PtrConst, PtrMut};

/// Starts walking the container at `value` and returns the boxed walk state.
///
/// # Safety
///
/// `value` must point to a live container of the type the vtable was built
/// for. The container must stay alive and unchanged until the state is freed.
pub type IterInitWithValueFn = unsafe fn(value: PtrConst) -> PtrMut;

/// Yields the next item from the front, `None` once the walk is over.
///
/// # Safety
///
/// `iter` must be a state returned by the matching init hook and not yet freed.
pub type IterNextFn<T> = unsafe fn(iter: PtrMut) -> Option<<T as IterItem>::Item>;

/// Yields the next item from the back. Only bidirectional shapes have one.
///
/// # Safety
///
/// Same as [`IterNextFn`].
pub type IterNextBackFn<T> = unsafe fn(iter: PtrMut) -> Option<<T as IterItem>::Item>;

/// Frees the walk state.
///
/// # Safety
///
/// `iter` must be a state returned by the matching init hook. It is dangling
/// afterwards.
pub type IterDeallocFn = unsafe fn(iter: PtrMut);

/// Hooks walking one container shape. `T` is [`PtrConst`] for sequences and
/// `(PtrConst, PtrConst)` for key/value pairs.
#[derive(Clone, Copy, Debug)]
pub struct IterVTable<T: IterItem> {
    /// cf. [`IterInitWithValueFn`]
    pub init_with_value: IterInitWithValueFn,

    /// cf. [`IterNextFn`]
    pub next: IterNextFn<T>,

    /// cf. [`IterNextBackFn`]
    pub next_back: Option<IterNextBackFn<T>>,

    /// cf. [`IterDeallocFn`]
    pub dealloc: IterDeallocFn,
}

/// What an [`IterVTable`] yields per step.
pub trait IterItem {
    /// Erased item, one pointer per component.
    type Item;
}

impl IterItem for PtrConst {
    type Item = PtrConst;
}

impl<K: IterItem, V: IterItem> IterItem for (K, V) {
    type Item = (K::Item, V::Item);
}

// Shared building blocks for iterator vtables over std containers. The
// iterator state is boxed and handed out as an erased pointer.

pub(crate) fn boxed_iter<I>(iter: I) -> PtrMut {
    PtrMut::new(Box::into_raw(Box::new(iter)))
}

pub(crate) unsafe fn iter_next<'a, I, T>(iter: PtrMut) -> Option<PtrConst>
where
    I: Iterator<Item = &'a T>,
    T: 'a,
{
    let iter = unsafe { iter.as_mut::<I>() };
    iter.next().map(|item| PtrConst::new(item as *const T))
}

pub(crate) unsafe fn iter_next_back<'a, I, T>(iter: PtrMut) -> Option<PtrConst>
where
    I: DoubleEndedIterator<Item = &'a T>,
    T: 'a,
{
    let iter = unsafe { iter.as_mut::<I>() };
    iter.next_back().map(|item| PtrConst::new(item as *const T))
}

pub(crate) unsafe fn pair_next<'a, I, K, V>(iter: PtrMut) -> Option<(PtrConst, PtrConst)>
where
    I: Iterator<Item = (&'a K, &'a V)>,
    K: 'a,
    V: 'a,
{
    let iter = unsafe { iter.as_mut::<I>() };
    iter.next()
        .map(|(k, v)| (PtrConst::new(k as *const K), PtrConst::new(v as *const V)))
}

pub(crate) unsafe fn iter_dealloc<I>(iter: PtrMut) {
    drop(unsafe { Box::from_raw(iter.as_mut_ptr::<I>()) });
}
