use alloc::string::String;
use alloc::vec::Vec;
use core::mem::MaybeUninit;

use crate::{PtrConst, PtrUninit, TypeDescriptor, descriptor_of};

mod scalar;

mod text;

mod option;

mod seq;

mod map;

#[cfg(feature = "uuid")]
mod uuid;

#[cfg(feature = "indexmap")]
mod indexmap;

/// A list of strings. Has a reserved id.
pub type StringList = Vec<String>;

/// Registers every type that owns a reserved id in this crate.
///
/// Runs inside the registry's one-time initializer, so it must only register,
/// never look up.
pub(crate) fn register_builtins() {
    descriptor_of::<bool>();
    descriptor_of::<i8>();
    descriptor_of::<i16>();
    descriptor_of::<i32>();
    descriptor_of::<i64>();
    descriptor_of::<isize>();
    descriptor_of::<u8>();
    descriptor_of::<u16>();
    descriptor_of::<u32>();
    descriptor_of::<u64>();
    descriptor_of::<usize>();
    descriptor_of::<f32>();
    descriptor_of::<f64>();
    descriptor_of::<char>();
    descriptor_of::<String>();
    descriptor_of::<bytes::Bytes>();
    descriptor_of::<()>();
    #[cfg(feature = "uuid")]
    descriptor_of::<::uuid::Uuid>();
    descriptor_of::<StringList>();
}

/// Copies `item` through `desc`'s copy hook.
///
/// # Safety
///
/// `desc` must describe `T`.
pub(crate) unsafe fn clone_item<T>(desc: &TypeDescriptor, item: &T) -> Option<T> {
    let mut slot = MaybeUninit::<T>::uninit();
    let copied =
        unsafe { desc.clone_into(PtrConst::new(item), PtrUninit::from_maybe_uninit(&mut slot)) };
    copied.then(|| unsafe { slot.assume_init() })
}
