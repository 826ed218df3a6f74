#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
/// Forwards to tracing::trace when the tracing feature is enabled
macro_rules! trace {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
/// Forwards to tracing::debug when the tracing feature is enabled
macro_rules! debug {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
/// Forwards to tracing::warn when the tracing feature is enabled
macro_rules! warn {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use {debug, trace, warn};

mod ptr;
pub use ptr::*;

mod id;
pub use id::*;

mod flags;
pub use flags::*;

mod error;
pub use error::*;

mod descriptor;
pub use descriptor::*;

mod def;
pub use def::*;

mod registry;
pub use registry::*;

mod convert;
pub use convert::*;

mod stream;
pub use stream::*;

mod object;
pub use object::*;

mod impls;
pub use impls::StringList;

/// Returns the descriptor for `T`, registering it on first use.
///
/// Shorthand for [`TypeRegistry::register`] on the global registry.
#[inline]
pub fn descriptor_of<T: Describe>() -> &'static TypeDescriptor {
    TypeRegistry::global().register::<T>()
}

/// Returns the id of `T`, registering it on first use.
#[inline]
pub fn id_of<T: Describe>() -> MetaId {
    descriptor_of::<T>().id
}

/// Registers `T` and returns its id.
///
/// Registering the same type twice is harmless and returns the same id.
#[inline]
pub fn register_type<T: Describe>() -> MetaId {
    id_of::<T>()
}
