//! Views that walk and edit containers held by a [`Variant`] without
//! knowing their concrete type.

use core::fmt;
use core::marker::PhantomData;

use vessel_core::{IterItem, IterVTable, MetaId, PtrConst, TypeDescriptor};

use crate::Variant;

mod sequence;
pub use sequence::*;

mod association;
pub use association::*;

/// Feeds every item of the container at `container` to `f`, stopping early
/// when `f` returns `false`. Returns whether every item was accepted.
///
/// # Safety
///
/// `container` must point to an initialized container that `vtable` belongs
/// to, left unchanged during the walk.
pub(crate) unsafe fn walk<T: IterItem>(
    vtable: &IterVTable<T>,
    container: PtrConst,
    mut f: impl FnMut(T::Item) -> bool,
) -> bool {
    let iter = unsafe { (vtable.init_with_value)(container) };
    let mut accepted = true;
    while let Some(item) = unsafe { (vtable.next)(iter) } {
        if !f(item) {
            accepted = false;
            break;
        }
    }
    unsafe { (vtable.dealloc)(iter) };
    accepted
}

/// A borrowed element of a container.
#[derive(Clone, Copy)]
pub struct ValueRef<'a> {
    desc: &'static TypeDescriptor,
    ptr: PtrConst,
    _marker: PhantomData<&'a ()>,
}

impl<'a> ValueRef<'a> {
    /// # Safety
    ///
    /// `ptr` must point to an initialized value of `desc`'s type that stays
    /// alive and unchanged for `'a`.
    pub(crate) unsafe fn new(desc: &'static TypeDescriptor, ptr: PtrConst) -> Self {
        Self {
            desc,
            ptr,
            _marker: PhantomData,
        }
    }

    /// Descriptor of the element type.
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.desc
    }

    /// Id of the element type.
    pub fn meta_id(&self) -> MetaId {
        self.desc.id
    }

    /// Pointer to the element.
    pub fn data(&self) -> PtrConst {
        self.ptr
    }

    /// The element, if it is a `T`.
    pub fn get<T: 'static>(&self) -> Option<&'a T> {
        self.desc.is::<T>().then(|| unsafe { self.ptr.get::<T>() })
    }

    /// A copy of the element. A `Variant` element is returned as is rather
    /// than wrapped; an element that cannot be copied gives an invalid variant.
    pub fn to_variant(&self) -> Variant {
        if let Some(variant) = self.get::<Variant>() {
            return variant.clone();
        }
        unsafe { Variant::copy_of(self.desc, self.ptr) }
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&unsafe { self.desc.debug_value(self.ptr) }, f)
    }
}

/// The value of `variant` as a value of `desc`'s type: the value itself, or
/// a converted copy. Keys must match exactly and are never converted.
fn coerce(variant: &Variant, desc: &'static TypeDescriptor, exact: bool) -> Option<Variant> {
    match variant.descriptor() {
        Some(held) if held == desc => Some(variant.clone()),
        Some(_) if exact => None,
        Some(_) if desc.is::<Variant>() => Some(Variant::new(variant.clone())),
        Some(_) => variant.converted(desc.id),
        None => None,
    }
}
