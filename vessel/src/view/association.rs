use core::fmt;
use core::marker::PhantomData;

use vessel_core::{AssociationDef, IterCapabilities, PtrConst, PtrMut, SizeCost, TypeDescriptor};

use super::{ValueRef, coerce};
use crate::Variant;

/// Read access to an associative container held by a variant.
#[derive(Clone, Copy)]
pub struct AssociationView<'a> {
    def: &'static AssociationDef,
    ptr: PtrConst,
    _marker: PhantomData<&'a Variant>,
}

impl<'a> AssociationView<'a> {
    /// Number of entries.
    pub fn len(&self) -> usize {
        unsafe { (self.def.vtable.len)(self.ptr) }
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cost of [`AssociationView::len`].
    pub fn size_cost(&self) -> SizeCost {
        self.def.size_cost
    }

    /// How the entries can be walked.
    pub fn capabilities(&self) -> IterCapabilities {
        self.def.capabilities
    }

    /// Descriptor of the keys.
    pub fn key_descriptor(&self) -> &'static TypeDescriptor {
        self.def.key
    }

    /// Descriptor of the mapped values.
    pub fn value_descriptor(&self) -> &'static TypeDescriptor {
        self.def.value
    }

    /// Walks `(key, value)` pairs in the container's order.
    pub fn iter(&self) -> AssociationIter<'a> {
        AssociationIter {
            def: self.def,
            iter: unsafe { (self.def.vtable.iter.init_with_value)(self.ptr) },
            _marker: PhantomData,
        }
    }

    /// Walks the keys.
    pub fn keys(&self) -> impl Iterator<Item = ValueRef<'a>> + 'a {
        self.iter().map(|(key, _)| key)
    }

    /// Walks the mapped values.
    pub fn values(&self) -> impl Iterator<Item = ValueRef<'a>> + 'a {
        self.iter().map(|(_, value)| value)
    }

    /// The value mapped to `key`. The key must hold exactly the key type.
    pub fn find(&self, key: &Variant) -> Option<ValueRef<'a>> {
        let key = coerce(key, self.def.key, true)?;
        let value = unsafe { (self.def.vtable.get_value)(self.ptr, key.data()?) }?;
        Some(unsafe { ValueRef::new(self.def.value, value) })
    }

    /// A copy of the value mapped to `key`, or an invalid variant.
    pub fn value(&self, key: &Variant) -> Variant {
        self.find(key)
            .map(|value| value.to_variant())
            .unwrap_or_default()
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &Variant) -> bool {
        let Some(key) = coerce(key, self.def.key, true) else {
            return false;
        };
        match key.data() {
            Some(key) => unsafe { (self.def.vtable.contains_key)(self.ptr, key) },
            None => false,
        }
    }
}

impl<'a> IntoIterator for AssociationView<'a> {
    type Item = (ValueRef<'a>, ValueRef<'a>);
    type IntoIter = AssociationIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for AssociationView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over the entries of an [`AssociationView`].
pub struct AssociationIter<'a> {
    def: &'static AssociationDef,
    iter: PtrMut,
    _marker: PhantomData<&'a Variant>,
}

impl<'a> Iterator for AssociationIter<'a> {
    type Item = (ValueRef<'a>, ValueRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = unsafe { (self.def.vtable.iter.next)(self.iter) }?;
        unsafe {
            Some((
                ValueRef::new(self.def.key, key),
                ValueRef::new(self.def.value, value),
            ))
        }
    }
}

impl Drop for AssociationIter<'_> {
    fn drop(&mut self) {
        unsafe { (self.def.vtable.iter.dealloc)(self.iter) }
    }
}

/// Read and write access to an associative container held by a variant.
pub struct AssociationViewMut<'a> {
    def: &'static AssociationDef,
    ptr: PtrMut,
    _marker: PhantomData<&'a mut Variant>,
}

impl AssociationViewMut<'_> {
    /// Read access to the same container.
    pub fn as_view(&self) -> AssociationView<'_> {
        AssociationView {
            def: self.def,
            ptr: self.ptr.as_const(),
            _marker: PhantomData,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.as_view().len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maps `key` to `value`, replacing any previous value. The key must hold
    /// exactly the key type; the value is converted to the mapped type.
    /// Returns `false` when either does not fit or the container is read-only.
    pub fn set_value(&mut self, key: &Variant, value: &Variant) -> bool {
        let Some(insert) = self.def.vtable.insert else {
            return false;
        };
        let Some(key) = coerce(key, self.def.key, true) else {
            return false;
        };
        let Some(value) = coerce(value, self.def.value, false) else {
            return false;
        };
        match (key.data(), value.data()) {
            (Some(key), Some(value)) => unsafe { insert(self.ptr, key, value) },
            _ => false,
        }
    }

    /// Removes the entry for `key`. Returns whether one was removed.
    pub fn remove_key(&mut self, key: &Variant) -> bool {
        let Some(remove) = self.def.vtable.remove else {
            return false;
        };
        let Some(key) = coerce(key, self.def.key, true) else {
            return false;
        };
        match key.data() {
            Some(key) => unsafe { remove(self.ptr, key) },
            None => false,
        }
    }
}

impl fmt::Debug for AssociationViewMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_view().fmt(f)
    }
}

impl Variant {
    /// Read access to the held value, if it is an associative container.
    pub fn association(&self) -> Option<AssociationView<'_>> {
        let def = self.descriptor()?.association()?;
        Some(AssociationView {
            def,
            ptr: self.data()?,
            _marker: PhantomData,
        })
    }

    /// Read and write access to the held value, if it is an associative
    /// container. Detaches a shared value.
    pub fn association_mut(&mut self) -> Option<AssociationViewMut<'_>> {
        let def = self.descriptor()?.association()?;
        Some(AssociationViewMut {
            def,
            ptr: self.data_mut()?,
            _marker: PhantomData,
        })
    }
}
