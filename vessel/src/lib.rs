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

pub use vessel_core::*;

mod variant;
pub use variant::*;

mod compare;

mod convert;

mod property;

mod stream;
pub use stream::USER_TYPE_TAG;

mod view;
pub use view::*;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use std::sync::Once;

/// A list of variants. Has a reserved id.
pub type VariantList = Vec<Variant>;

/// Variants keyed by name. Has a reserved id.
pub type VariantMap = BTreeMap<String, Variant>;

/// Registers the types this crate reserves ids for: [`Variant`],
/// [`VariantList`] and [`VariantMap`].
///
/// Called by every operation that resolves types by id or name, so it only
/// needs calling directly before using `vessel_core`'s lookups.
pub fn register_builtins() {
    static BUILTINS: Once = Once::new();
    BUILTINS.call_once(|| {
        descriptor_of::<Variant>();
        descriptor_of::<VariantList>();
        descriptor_of::<VariantMap>();
        crate::trace!("registered variant built-ins");
    });
}
