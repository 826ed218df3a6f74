use alloc::format;
use core::cmp::Ordering;
use core::fmt;
use core::mem::MaybeUninit;

use super::clone_item;
use crate::{
    CloneIntoFn, Describe, FormatFn, LoadFn, PartialCmpFn, PartialEqFn, PtrConst,
    PtrUninit, SaveFn, StreamReader, StreamWriter, TypeDescriptor, descriptor_of,
};

unsafe fn option_clone<T: Describe>(src: PtrConst, dst: PtrUninit) {
    let inner = descriptor_of::<T>();
    let value = unsafe { src.get::<Option<T>>() }
        .as_ref()
        .and_then(|value| unsafe { clone_item(inner, value) });
    unsafe { dst.put(value) };
}

unsafe fn option_eq<T: Describe>(left: PtrConst, right: PtrConst) -> bool {
    let inner = descriptor_of::<T>();
    match unsafe { (left.get::<Option<T>>(), right.get::<Option<T>>()) } {
        (None, None) => true,
        (Some(a), Some(b)) => {
            matches!(unsafe { inner.eq_values(PtrConst::new(a), PtrConst::new(b)) }, Some(true))
        }
        _ => false,
    }
}

unsafe fn option_cmp<T: Describe>(left: PtrConst, right: PtrConst) -> Option<Ordering> {
    let inner = descriptor_of::<T>();
    match unsafe { (left.get::<Option<T>>(), right.get::<Option<T>>()) } {
        (None, None) => Some(Ordering::Equal),
        (None, Some(_)) => Some(Ordering::Less),
        (Some(_), None) => Some(Ordering::Greater),
        (Some(a), Some(b)) => unsafe { inner.compare_values(PtrConst::new(a), PtrConst::new(b)) },
    }
}

unsafe fn option_debug<T: Describe>(value: PtrConst, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inner = descriptor_of::<T>();
    match unsafe { value.get::<Option<T>>() } {
        None => f.write_str("None"),
        Some(v) => f
            .debug_tuple("Some")
            .field(&unsafe { inner.debug_value(PtrConst::new(v)) })
            .finish(),
    }
}

unsafe fn option_save<T: Describe>(value: PtrConst, out: &mut StreamWriter) {
    let inner = descriptor_of::<T>();
    match unsafe { value.get::<Option<T>>() } {
        None => out.write_bool(false),
        Some(v) => {
            out.write_bool(true);
            if let Some(save) = inner.vtable.save {
                unsafe { save(PtrConst::new(v), out) };
            }
        }
    }
}

unsafe fn option_load<T: Describe>(input: &mut StreamReader, target: PtrUninit) -> bool {
    let inner = descriptor_of::<T>();
    let value = match input.read_bool() {
        None => return false,
        Some(false) => None,
        Some(true) => {
            let Some(load) = inner.vtable.load else {
                return false;
            };
            let mut slot = MaybeUninit::<T>::uninit();
            if !unsafe { load(input, PtrUninit::from_maybe_uninit(&mut slot)) } {
                return false;
            }
            Some(unsafe { slot.assume_init() })
        }
    };
    unsafe { target.put(value) };
    true
}

unsafe impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        let inner = descriptor_of::<T>();
        let vtable = &inner.vtable;
        let has_debug = vtable.debug.is_some() || vtable.display.is_some();
        let streamable = inner.is_streamable();
        let builder = TypeDescriptor::builder::<Option<T>>(format!("Option<{}>", inner.name))
            .with_default()
            .is_null_with(Option::is_none);
        // every hook below is monomorphized for `Option<T>`
        unsafe {
            builder
                .raw_clone(inner.has_clone().then_some(option_clone::<T> as CloneIntoFn))
                .raw_cmp(
                    vtable.partial_eq.map(|_| option_eq::<T> as PartialEqFn),
                    vtable.partial_cmp.map(|_| option_cmp::<T> as PartialCmpFn),
                )
                .raw_debug(has_debug.then_some(option_debug::<T> as FormatFn))
                .raw_stream(
                    streamable.then_some(option_save::<T> as SaveFn),
                    streamable.then_some(option_load::<T> as LoadFn),
                )
        }
        .build()
    }
}
