use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use core::any::TypeId;
use core::fmt;
use core::hash::Hash;
use core::mem::MaybeUninit;
use std::collections::HashMap;

use super::clone_item;
use crate::def::{boxed_iter, iter_dealloc, pair_next};
use crate::{
    AssocInsertFn, AssociationDef, AssociationVTable, Builtin, CloneIntoFn, Describe, FormatFn,
    IterCapabilities, IterVTable, LoadFn, PartialEqFn, PtrConst, PtrMut, PtrUninit, SaveFn,
    SizeCost, StreamReader, StreamWriter, TypeDescriptor, descriptor_of,
};

/// A std map, seen through the operations its descriptor exposes.
pub(crate) trait Association: Default + Send + Sync + 'static {
    type Key: Describe;
    type Value: Describe;
    type Iter<'a>: Iterator<Item = (&'a Self::Key, &'a Self::Value)>
    where
        Self: 'a;

    const KIND: &'static str;

    fn len(&self) -> usize;
    fn entries(&self) -> Self::Iter<'_>;
    fn get(&self, key: &Self::Key) -> Option<&Self::Value>;
    fn insert(&mut self, key: Self::Key, value: Self::Value);
    fn remove(&mut self, key: &Self::Key) -> bool;
}

impl<K: Describe + Ord, V: Describe> Association for BTreeMap<K, V> {
    type Key = K;
    type Value = V;
    type Iter<'a> = alloc::collections::btree_map::Iter<'a, K, V>;

    const KIND: &'static str = "BTreeMap";

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn entries(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn get(&self, key: &K) -> Option<&V> {
        BTreeMap::get(self, key)
    }

    fn insert(&mut self, key: K, value: V) {
        BTreeMap::insert(self, key, value);
    }

    fn remove(&mut self, key: &K) -> bool {
        BTreeMap::remove(self, key).is_some()
    }
}

impl<K: Describe + Hash + Eq, V: Describe> Association for HashMap<K, V> {
    type Key = K;
    type Value = V;
    type Iter<'a> = std::collections::hash_map::Iter<'a, K, V>;

    const KIND: &'static str = "HashMap";

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn entries(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn get(&self, key: &K) -> Option<&V> {
        HashMap::get(self, key)
    }

    fn insert(&mut self, key: K, value: V) {
        HashMap::insert(self, key, value);
    }

    fn remove(&mut self, key: &K) -> bool {
        HashMap::remove(self, key).is_some()
    }
}

unsafe fn map_len<M: Association>(map: PtrConst) -> usize {
    unsafe { map.get::<M>() }.len()
}

unsafe fn map_get<M: Association>(map: PtrConst, key: PtrConst) -> Option<PtrConst> {
    let value = unsafe { map.get::<M>().get(key.get::<M::Key>()) }?;
    Some(PtrConst::new(value))
}

unsafe fn map_contains<M: Association>(map: PtrConst, key: PtrConst) -> bool {
    unsafe { map.get::<M>().get(key.get::<M::Key>()) }.is_some()
}

unsafe fn map_iter_init<M: Association>(map: PtrConst) -> PtrMut {
    boxed_iter(unsafe { map.get::<M>() }.entries())
}

unsafe fn map_insert<M: Association>(map: PtrMut, key: PtrConst, value: PtrConst) -> bool {
    let key_desc = descriptor_of::<M::Key>();
    let value_desc = descriptor_of::<M::Value>();
    let key = unsafe { clone_item(key_desc, key.get::<M::Key>()) };
    let value = unsafe { clone_item(value_desc, value.get::<M::Value>()) };
    match (key, value) {
        (Some(key), Some(value)) => {
            unsafe { map.as_mut::<M>() }.insert(key, value);
            true
        }
        _ => false,
    }
}

unsafe fn map_remove<M: Association>(map: PtrMut, key: PtrConst) -> bool {
    unsafe { map.as_mut::<M>().remove(key.get::<M::Key>()) }
}

unsafe fn map_clone<M: Association>(src: PtrConst, dst: PtrUninit) {
    let key_desc = descriptor_of::<M::Key>();
    let value_desc = descriptor_of::<M::Value>();
    let mut out = M::default();
    for (key, value) in unsafe { src.get::<M>() }.entries() {
        let key = unsafe { clone_item(key_desc, key) };
        let value = unsafe { clone_item(value_desc, value) };
        if let (Some(key), Some(value)) = (key, value) {
            out.insert(key, value);
        }
    }
    unsafe { dst.put(out) };
}

unsafe fn map_eq<M: Association>(left: PtrConst, right: PtrConst) -> bool {
    let value_desc = descriptor_of::<M::Value>();
    let (left, right) = unsafe { (left.get::<M>(), right.get::<M>()) };
    left.len() == right.len()
        && left.entries().all(|(key, a)| match right.get(key) {
            Some(b) => {
                matches!(unsafe { value_desc.eq_values(PtrConst::new(a), PtrConst::new(b)) }, Some(true))
            }
            None => false,
        })
}

unsafe fn map_debug<M: Association>(map: PtrConst, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let key_desc = descriptor_of::<M::Key>();
    let value_desc = descriptor_of::<M::Value>();
    f.debug_map()
        .entries(unsafe { map.get::<M>() }.entries().map(|(k, v)| unsafe {
            (
                key_desc.debug_value(PtrConst::new(k)),
                value_desc.debug_value(PtrConst::new(v)),
            )
        }))
        .finish()
}

unsafe fn map_save<M: Association>(map: PtrConst, out: &mut StreamWriter) {
    let key_desc = descriptor_of::<M::Key>();
    let value_desc = descriptor_of::<M::Value>();
    let map = unsafe { map.get::<M>() };
    if !out.write_len(map.len()) {
        return;
    }
    let (Some(save_key), Some(save_value)) = (key_desc.vtable.save, value_desc.vtable.save) else {
        return;
    };
    for (key, value) in map.entries() {
        unsafe {
            save_key(PtrConst::new(key), out);
            save_value(PtrConst::new(value), out);
        }
    }
}

unsafe fn map_load<M: Association>(input: &mut StreamReader, target: PtrUninit) -> bool {
    let key_desc = descriptor_of::<M::Key>();
    let value_desc = descriptor_of::<M::Value>();
    let (Some(load_key), Some(load_value)) = (key_desc.vtable.load, value_desc.vtable.load) else {
        return false;
    };
    let Some(len) = input.read_len() else {
        return false;
    };
    let mut map = M::default();
    for _ in 0..len {
        let mut key = MaybeUninit::<M::Key>::uninit();
        if !unsafe { load_key(input, PtrUninit::from_maybe_uninit(&mut key)) } {
            return false;
        }
        let key = unsafe { key.assume_init() };
        let mut value = MaybeUninit::<M::Value>::uninit();
        if !unsafe { load_value(input, PtrUninit::from_maybe_uninit(&mut value)) } {
            return false;
        }
        map.insert(key, unsafe { value.assume_init() });
    }
    unsafe { target.put(map) };
    true
}

/// Describes a map type. Hooks that need key or value support are only
/// installed when both provide it.
pub(crate) fn describe_association<M: Association>(capabilities: IterCapabilities) -> TypeDescriptor {
    let key = descriptor_of::<M::Key>();
    let value = descriptor_of::<M::Value>();
    let can_copy = key.has_clone() && value.has_clone();
    let streamable = key.is_streamable() && value.is_streamable();

    let vtable = AssociationVTable {
        len: map_len::<M>,
        get_value: map_get::<M>,
        contains_key: map_contains::<M>,
        iter: IterVTable {
            init_with_value: map_iter_init::<M>,
            next: pair_next::<M::Iter<'static>, M::Key, M::Value>,
            next_back: None,
            dealloc: iter_dealloc::<M::Iter<'static>>,
        },
        insert: can_copy.then_some(map_insert::<M> as AssocInsertFn),
        remove: Some(map_remove::<M>),
    };

    let variant_map = TypeId::of::<M>() == TypeId::of::<BTreeMap<String, M::Value>>()
        && value.id == Builtin::Variant.id();
    let builder =
        TypeDescriptor::builder::<M>(format!("{}<{},{}>", M::KIND, key.name, value.name))
            .with_default();
    // every hook is monomorphized for `M`
    let builder = unsafe {
        builder
            .raw_clone(can_copy.then_some(map_clone::<M> as CloneIntoFn))
            .raw_cmp(
                value.vtable.partial_eq.map(|_| map_eq::<M> as PartialEqFn),
                None,
            )
            .raw_debug(Some(map_debug::<M> as FormatFn))
            .raw_stream(
                streamable.then_some(map_save::<M> as SaveFn),
                streamable.then_some(map_load::<M> as LoadFn),
            )
            .association(AssociationDef {
                vtable,
                key,
                value,
                capabilities,
                size_cost: SizeCost::Constant,
            })
    };
    if variant_map {
        // `M` is `BTreeMap<String, V>` with `V` registered as the variant type
        unsafe { builder.builtin(Builtin::VariantMap) }.build()
    } else {
        builder.build()
    }
}

unsafe impl<K: Describe + Ord, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        describe_association::<Self>(IterCapabilities::FORWARD)
    }
}

unsafe impl<K: Describe + Hash + Eq, V: Describe> Describe for HashMap<K, V> {
    fn describe() -> TypeDescriptor {
        describe_association::<Self>(IterCapabilities::FORWARD)
    }
}
