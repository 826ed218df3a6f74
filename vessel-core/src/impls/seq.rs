use alloc::collections::{LinkedList, VecDeque};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use core::cmp::Ordering;
use core::fmt;
use core::mem::MaybeUninit;

use super::clone_item;
use crate::def::{boxed_iter, iter_dealloc, iter_next, iter_next_back};
use crate::{
    Builtin, CloneIntoFn, Describe, FormatFn, IterCapabilities, IterVTable, LoadFn, PartialCmpFn,
    PartialEqFn, PtrConst, PtrMut, PtrUninit, SaveFn, SeqGetFn, SeqGetMutFn, SeqPushFn,
    SequenceDef, SequenceVTable, SizeCost, StreamReader, StreamWriter, TypeDescriptor,
    descriptor_of,
};

/// A std sequence, seen through the operations its descriptor exposes.
pub(crate) trait Sequence: Default + Send + Sync + 'static {
    type Item: Describe;
    type Iter<'a>: DoubleEndedIterator<Item = &'a Self::Item>
    where
        Self: 'a;

    const KIND: &'static str;
    const CAPABILITIES: IterCapabilities;

    fn len(&self) -> usize;
    fn items(&self) -> Self::Iter<'_>;

    fn get(&self, _index: usize) -> Option<&Self::Item> {
        None
    }

    fn get_mut(&mut self, _index: usize) -> Option<&mut Self::Item> {
        None
    }

    fn push_back(&mut self, item: Self::Item);
    fn push_front(&mut self, item: Self::Item);
    fn pop_back(&mut self) -> Option<Self::Item>;
    fn pop_front(&mut self) -> Option<Self::Item>;
}

impl<T: Describe> Sequence for Vec<T> {
    type Item = T;
    type Iter<'a> = core::slice::Iter<'a, T>;

    const KIND: &'static str = "Vec";
    const CAPABILITIES: IterCapabilities = IterCapabilities::all();

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn get(&self, index: usize) -> Option<&T> {
        <[T]>::get(self, index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        <[T]>::get_mut(self, index)
    }

    fn push_back(&mut self, item: T) {
        self.push(item);
    }

    fn push_front(&mut self, item: T) {
        self.insert(0, item);
    }

    fn pop_back(&mut self) -> Option<T> {
        self.pop()
    }

    fn pop_front(&mut self) -> Option<T> {
        (!self.is_empty()).then(|| self.remove(0))
    }
}

impl<T: Describe> Sequence for VecDeque<T> {
    type Item = T;
    type Iter<'a> = alloc::collections::vec_deque::Iter<'a, T>;

    const KIND: &'static str = "VecDeque";
    const CAPABILITIES: IterCapabilities = IterCapabilities::all();

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn get(&self, index: usize) -> Option<&T> {
        VecDeque::get(self, index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        VecDeque::get_mut(self, index)
    }

    fn push_back(&mut self, item: T) {
        VecDeque::push_back(self, item);
    }

    fn push_front(&mut self, item: T) {
        VecDeque::push_front(self, item);
    }

    fn pop_back(&mut self) -> Option<T> {
        VecDeque::pop_back(self)
    }

    fn pop_front(&mut self) -> Option<T> {
        VecDeque::pop_front(self)
    }
}

impl<T: Describe> Sequence for LinkedList<T> {
    type Item = T;
    type Iter<'a> = alloc::collections::linked_list::Iter<'a, T>;

    const KIND: &'static str = "LinkedList";
    const CAPABILITIES: IterCapabilities =
        IterCapabilities::FORWARD.union(IterCapabilities::BIDIRECTIONAL);

    fn len(&self) -> usize {
        LinkedList::len(self)
    }

    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn push_back(&mut self, item: T) {
        LinkedList::push_back(self, item);
    }

    fn push_front(&mut self, item: T) {
        LinkedList::push_front(self, item);
    }

    fn pop_back(&mut self) -> Option<T> {
        LinkedList::pop_back(self)
    }

    fn pop_front(&mut self) -> Option<T> {
        LinkedList::pop_front(self)
    }
}

unsafe fn seq_len<S: Sequence>(seq: PtrConst) -> usize {
    unsafe { seq.get::<S>() }.len()
}

unsafe fn seq_get<S: Sequence>(seq: PtrConst, index: usize) -> Option<PtrConst> {
    let item = unsafe { seq.get::<S>() }.get(index)?;
    Some(PtrConst::new(item))
}

unsafe fn seq_get_mut<S: Sequence>(seq: PtrMut, index: usize) -> Option<PtrMut> {
    let item = unsafe { seq.as_mut::<S>() }.get_mut(index)?;
    Some(PtrMut::new(item))
}

unsafe fn seq_iter_init<S: Sequence>(seq: PtrConst) -> PtrMut {
    boxed_iter(unsafe { seq.get::<S>() }.items())
}

unsafe fn seq_push_back<S: Sequence>(seq: PtrMut, item: PtrConst) -> bool {
    let elem = descriptor_of::<S::Item>();
    match unsafe { clone_item(elem, item.get::<S::Item>()) } {
        Some(item) => {
            unsafe { seq.as_mut::<S>() }.push_back(item);
            true
        }
        None => false,
    }
}

unsafe fn seq_push_front<S: Sequence>(seq: PtrMut, item: PtrConst) -> bool {
    let elem = descriptor_of::<S::Item>();
    match unsafe { clone_item(elem, item.get::<S::Item>()) } {
        Some(item) => {
            unsafe { seq.as_mut::<S>() }.push_front(item);
            true
        }
        None => false,
    }
}

unsafe fn seq_pop_back<S: Sequence>(seq: PtrMut) -> bool {
    unsafe { seq.as_mut::<S>() }.pop_back().is_some()
}

unsafe fn seq_pop_front<S: Sequence>(seq: PtrMut) -> bool {
    unsafe { seq.as_mut::<S>() }.pop_front().is_some()
}

unsafe fn seq_clone<S: Sequence>(src: PtrConst, dst: PtrUninit) {
    let elem = descriptor_of::<S::Item>();
    let mut out = S::default();
    for item in unsafe { src.get::<S>() }.items() {
        if let Some(item) = unsafe { clone_item(elem, item) } {
            out.push_back(item);
        }
    }
    unsafe { dst.put(out) };
}

unsafe fn seq_eq<S: Sequence>(left: PtrConst, right: PtrConst) -> bool {
    let elem = descriptor_of::<S::Item>();
    let (left, right) = unsafe { (left.get::<S>(), right.get::<S>()) };
    left.len() == right.len()
        && left.items().zip(right.items()).all(|(a, b)| {
            matches!(unsafe { elem.eq_values(PtrConst::new(a), PtrConst::new(b)) }, Some(true))
        })
}

unsafe fn seq_cmp<S: Sequence>(left: PtrConst, right: PtrConst) -> Option<Ordering> {
    let elem = descriptor_of::<S::Item>();
    let (left, right) = unsafe { (left.get::<S>(), right.get::<S>()) };
    for (a, b) in left.items().zip(right.items()) {
        match unsafe { elem.compare_values(PtrConst::new(a), PtrConst::new(b)) } {
            Some(Ordering::Equal) => continue,
            other => return other,
        }
    }
    Some(left.len().cmp(&right.len()))
}

unsafe fn seq_debug<S: Sequence>(seq: PtrConst, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let elem = descriptor_of::<S::Item>();
    f.debug_list()
        .entries(
            unsafe { seq.get::<S>() }
                .items()
                .map(|item| unsafe { elem.debug_value(PtrConst::new(item)) }),
        )
        .finish()
}

unsafe fn seq_save<S: Sequence>(seq: PtrConst, out: &mut StreamWriter) {
    let elem = descriptor_of::<S::Item>();
    let seq = unsafe { seq.get::<S>() };
    if !out.write_len(seq.len()) {
        return;
    }
    if let Some(save) = elem.vtable.save {
        for item in seq.items() {
            unsafe { save(PtrConst::new(item), out) };
        }
    }
}

unsafe fn seq_load<S: Sequence>(input: &mut StreamReader, target: PtrUninit) -> bool {
    let elem = descriptor_of::<S::Item>();
    let Some(load) = elem.vtable.load else {
        return false;
    };
    let Some(len) = input.read_len() else {
        return false;
    };
    let mut seq = S::default();
    for _ in 0..len {
        let mut slot = MaybeUninit::<S::Item>::uninit();
        if !unsafe { load(input, PtrUninit::from_maybe_uninit(&mut slot)) } {
            return false;
        }
        seq.push_back(unsafe { slot.assume_init() });
    }
    unsafe { target.put(seq) };
    true
}

/// Describes a sequence type. Hooks that need element support are only
/// installed when the element type provides it.
pub(crate) fn describe_sequence<S: Sequence>() -> TypeDescriptor {
    let elem = descriptor_of::<S::Item>();
    let random_access = S::CAPABILITIES.contains(IterCapabilities::RANDOM_ACCESS);
    let can_copy = elem.has_clone();
    let streamable = elem.is_streamable();

    let vtable = SequenceVTable {
        len: seq_len::<S>,
        get: random_access.then_some(seq_get::<S> as SeqGetFn),
        get_mut: random_access.then_some(seq_get_mut::<S> as SeqGetMutFn),
        iter: IterVTable {
            init_with_value: seq_iter_init::<S>,
            next: iter_next::<S::Iter<'static>, S::Item>,
            next_back: Some(iter_next_back::<S::Iter<'static>, S::Item>),
            dealloc: iter_dealloc::<S::Iter<'static>>,
        },
        push_back: can_copy.then_some(seq_push_back::<S> as SeqPushFn),
        push_front: can_copy.then_some(seq_push_front::<S> as SeqPushFn),
        pop_back: Some(seq_pop_back::<S>),
        pop_front: Some(seq_pop_front::<S>),
    };

    let builder = TypeDescriptor::builder::<S>(format!("{}<{}>", S::KIND, elem.name)).with_default();
    // every hook is monomorphized for `S`
    let builder = unsafe {
        builder
            .raw_clone(can_copy.then_some(seq_clone::<S> as CloneIntoFn))
            .raw_cmp(
                elem.vtable.partial_eq.map(|_| seq_eq::<S> as PartialEqFn),
                elem.vtable.partial_cmp.map(|_| seq_cmp::<S> as PartialCmpFn),
            )
            .raw_debug(Some(seq_debug::<S> as FormatFn))
            .raw_stream(
                streamable.then_some(seq_save::<S> as SaveFn),
                streamable.then_some(seq_load::<S> as LoadFn),
            )
            .sequence(SequenceDef {
                vtable,
                element: elem,
                capabilities: S::CAPABILITIES,
                size_cost: SizeCost::Constant,
            })
    };
    match list_builtin::<S>(elem) {
        // `list_builtin` only names the reserved list that `S` is
        Some(builtin) => unsafe { builder.builtin(builtin) }.build(),
        None => builder.build(),
    }
}

/// The reserved list id `S` is entitled to: `Vec<String>`, or a `Vec` of the
/// type registered under [`Builtin::Variant`].
fn list_builtin<S: Sequence>(elem: &TypeDescriptor) -> Option<Builtin> {
    let seq = TypeId::of::<S>();
    if seq == TypeId::of::<Vec<String>>() {
        Some(Builtin::StringList)
    } else if seq == TypeId::of::<Vec<S::Item>>() && elem.id == Builtin::Variant.id() {
        Some(Builtin::VariantList)
    } else {
        None
    }
}

unsafe impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        describe_sequence::<Self>()
    }
}

unsafe impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> TypeDescriptor {
        describe_sequence::<Self>()
    }
}

unsafe impl<T: Describe> Describe for LinkedList<T> {
    fn describe() -> TypeDescriptor {
        describe_sequence::<Self>()
    }
}
