use core::fmt;
use core::marker::PhantomData;

use vessel_core::{
    IterCapabilities, PtrConst, PtrMut, SeqPopFn, SeqPushFn, SequenceDef, SizeCost,
    TypeDescriptor,
};

use super::{ValueRef, coerce};
use crate::Variant;

/// Read access to a sequential container held by a variant.
#[derive(Clone, Copy)]
pub struct SequenceView<'a> {
    def: &'static SequenceDef,
    ptr: PtrConst,
    _marker: PhantomData<&'a Variant>,
}

impl<'a> SequenceView<'a> {
    /// Number of elements. cf. [`SequenceView::size_cost`]
    pub fn len(&self) -> usize {
        unsafe { (self.def.vtable.len)(self.ptr) }
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cost of [`SequenceView::len`].
    pub fn size_cost(&self) -> SizeCost {
        self.def.size_cost
    }

    /// How the sequence can be walked.
    pub fn capabilities(&self) -> IterCapabilities {
        self.def.capabilities
    }

    /// Descriptor of the elements.
    pub fn element(&self) -> &'static TypeDescriptor {
        self.def.element
    }

    /// The element at `index`. Always `None` for shapes without random access.
    pub fn at(&self, index: usize) -> Option<ValueRef<'a>> {
        if !self.def.is_random_access() {
            return None;
        }
        let get = self.def.vtable.get?;
        let item = unsafe { get(self.ptr, index) }?;
        Some(unsafe { ValueRef::new(self.def.element, item) })
    }

    /// Walks the elements. Walking from the back is supported by
    /// bidirectional shapes; for others `next_back` gives `None`.
    pub fn iter(&self) -> SequenceIter<'a> {
        SequenceIter {
            def: self.def,
            iter: unsafe { (self.def.vtable.iter.init_with_value)(self.ptr) },
            _marker: PhantomData,
        }
    }

    /// Copies of the elements.
    pub fn values(&self) -> impl Iterator<Item = Variant> + 'a {
        self.iter().map(|item| item.to_variant())
    }
}

impl<'a> IntoIterator for SequenceView<'a> {
    type Item = ValueRef<'a>;
    type IntoIter = SequenceIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for SequenceView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over the elements of a [`SequenceView`].
pub struct SequenceIter<'a> {
    def: &'static SequenceDef,
    iter: PtrMut,
    _marker: PhantomData<&'a Variant>,
}

impl<'a> Iterator for SequenceIter<'a> {
    type Item = ValueRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = unsafe { (self.def.vtable.iter.next)(self.iter) }?;
        Some(unsafe { ValueRef::new(self.def.element, item) })
    }
}

impl DoubleEndedIterator for SequenceIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if !self.def.is_bidirectional() {
            return None;
        }
        let next_back = self.def.vtable.iter.next_back?;
        let item = unsafe { next_back(self.iter) }?;
        Some(unsafe { ValueRef::new(self.def.element, item) })
    }
}

impl Drop for SequenceIter<'_> {
    fn drop(&mut self) {
        unsafe { (self.def.vtable.iter.dealloc)(self.iter) }
    }
}

/// Read and write access to a sequential container held by a variant.
///
/// Holding the view borrows the variant mutably, and the variant was
/// detached when the view was made, so edits never leak into copies.
pub struct SequenceViewMut<'a> {
    def: &'static SequenceDef,
    ptr: PtrMut,
    _marker: PhantomData<&'a mut Variant>,
}

impl SequenceViewMut<'_> {
    /// Read access to the same container.
    pub fn as_view(&self) -> SequenceView<'_> {
        SequenceView {
            def: self.def,
            ptr: self.ptr.as_const(),
            _marker: PhantomData,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.as_view().len()
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutable access to the element at `index`, if it is a `T`.
    pub fn at_mut<T: 'static>(&mut self, index: usize) -> Option<&mut T> {
        if !self.def.element.is::<T>() || !self.def.is_random_access() {
            return None;
        }
        let get_mut = self.def.vtable.get_mut?;
        let item = unsafe { get_mut(self.ptr, index) }?;
        Some(unsafe { item.as_mut::<T>() })
    }

    fn push(&mut self, push: Option<SeqPushFn>, value: &Variant) -> bool {
        let Some(push) = push else {
            return false;
        };
        let Some(value) = coerce(value, self.def.element, false) else {
            return false;
        };
        match value.data() {
            Some(item) => unsafe { push(self.ptr, item) },
            None => false,
        }
    }

    fn pop(&mut self, pop: Option<SeqPopFn>) -> bool {
        match pop {
            Some(pop) => unsafe { pop(self.ptr) },
            None => false,
        }
    }

    /// Appends `value`, converted to the element type. cf. [`SequenceViewMut::add_value_at_end`]
    pub fn add_value(&mut self, value: &Variant) -> bool {
        self.add_value_at_end(value)
    }

    /// Prepends `value`, converted to the element type. `false` when the
    /// shape cannot grow at the front or the value does not convert.
    pub fn add_value_at_begin(&mut self, value: &Variant) -> bool {
        self.push(self.def.vtable.push_front, value)
    }

    /// Appends `value`, converted to the element type. `false` when the
    /// shape cannot grow at the back or the value does not convert.
    pub fn add_value_at_end(&mut self, value: &Variant) -> bool {
        self.push(self.def.vtable.push_back, value)
    }

    /// Removes the first element. `false` when unsupported or empty.
    pub fn remove_value_at_begin(&mut self) -> bool {
        self.pop(self.def.vtable.pop_front)
    }

    /// Removes the last element. `false` when unsupported or empty.
    pub fn remove_value_at_end(&mut self) -> bool {
        self.pop(self.def.vtable.pop_back)
    }
}

impl fmt::Debug for SequenceViewMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_view().fmt(f)
    }
}

impl Variant {
    /// Read access to the held value, if it is a sequential container.
    pub fn sequence(&self) -> Option<SequenceView<'_>> {
        let def = self.descriptor()?.sequence()?;
        Some(SequenceView {
            def,
            ptr: self.data()?,
            _marker: PhantomData,
        })
    }

    /// Read and write access to the held value, if it is a sequential
    /// container. Detaches a shared value.
    pub fn sequence_mut(&mut self) -> Option<SequenceViewMut<'_>> {
        let def = self.descriptor()?.sequence()?;
        Some(SequenceViewMut {
            def,
            ptr: self.data_mut()?,
            _marker: PhantomData,
        })
    }
}
