//! Per-type metadata records.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::any::TypeId;
use core::cmp::Ordering;
use core::fmt;

use crate::{
    AssociationDef, Builtin, ClassInfo, ContainerDef, EnumDef, MetaId, NumericDef, PtrConst,
    PtrMut, PtrUninit, SequenceDef, StreamReader, StreamWriter, TypeFlags,
};

mod builder;
pub use builder::*;

/// Implemented by every type that can live inside a variant.
///
/// The descriptor is built once, the first time the type is registered, and
/// then lives for the rest of the process. Prefer the [`describe!`](crate::describe)
/// macro, which only uses the checked builder methods.
///
/// # Safety
///
/// `describe` must return a descriptor started with
/// `TypeDescriptor::builder::<Self>`. Every hook, field offset and shape
/// installed through an `unsafe` builder method or by writing to the
/// descriptor's fields must be sound for `Self`. Variants trust the
/// descriptor when they read, copy and drop their payload.
///
/// ```ignore
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Meters(f64);
///
/// unsafe impl Describe for Meters {
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::builder::<Meters>("Meters")
///             .with_default()
///             .with_clone()
///             .with_eq()
///             .with_debug()
///             .build()
///     }
/// }
/// ```
pub unsafe trait Describe: Sized + Send + Sync + 'static {
    /// Build the descriptor for `Self`.
    fn describe() -> TypeDescriptor;
}

//////////////////////////////////////////////////////////////////////
// Hook signatures
//////////////////////////////////////////////////////////////////////

/// Drop the value in place.
///
/// # Safety
///
/// The `value` parameter must point to aligned, initialized memory of the correct type.
/// The memory must not be used as a value afterwards.
pub type DropInPlaceFn = unsafe fn(value: PtrMut);

/// Construct the default value in place.
///
/// # Safety
///
/// The `target` parameter must point to aligned, uninitialized memory large
/// enough for the type.
pub type DefaultInPlaceFn = unsafe fn(target: PtrUninit);

/// Copy-construct `dst` from `src`.
///
/// # Safety
///
/// `src` must point to an initialized value of the correct type, `dst` to
/// aligned, uninitialized memory large enough for it.
pub type CloneIntoFn = unsafe fn(src: PtrConst, dst: PtrUninit);

/// Test two values for equality.
///
/// # Safety
///
/// Both pointers must point to initialized values of the correct type.
pub type PartialEqFn = unsafe fn(left: PtrConst, right: PtrConst) -> bool;

/// Order two values.
///
/// # Safety
///
/// Both pointers must point to initialized values of the correct type.
pub type PartialCmpFn = unsafe fn(left: PtrConst, right: PtrConst) -> Option<Ordering>;

/// Format a value.
///
/// # Safety
///
/// The `value` parameter must point to an initialized value of the correct type.
pub type FormatFn = unsafe fn(value: PtrConst, f: &mut fmt::Formatter<'_>) -> fmt::Result;

/// Parse a value from a string into `target`. Returns `false` when the string
/// does not parse, in which case `target` is left uninitialized.
///
/// # Safety
///
/// The `target` parameter must point to aligned, uninitialized memory large
/// enough for the type.
pub type ParseFn = unsafe fn(s: &str, target: PtrUninit) -> bool;

/// Whether the value counts as null (a null pointer, an empty `Option`).
///
/// # Safety
///
/// The `value` parameter must point to an initialized value of the correct type.
pub type IsNullFn = unsafe fn(value: PtrConst) -> bool;

/// Write the value's payload to a stream.
///
/// # Safety
///
/// The `value` parameter must point to an initialized value of the correct type.
pub type SaveFn = unsafe fn(value: PtrConst, out: &mut StreamWriter);

/// Read a payload from a stream into `target`. Returns `false` on failure, in
/// which case `target` is left uninitialized.
///
/// # Safety
///
/// The `target` parameter must point to aligned, uninitialized memory large
/// enough for the type.
pub type LoadFn = unsafe fn(input: &mut StreamReader, target: PtrUninit) -> bool;

/// Lifecycle operations, monomorphized per type.
#[derive(Clone, Copy, Debug)]
pub struct TypeOps {
    /// cf. [`DropInPlaceFn`]. Always present.
    pub drop_in_place: DropInPlaceFn,

    /// cf. [`DefaultInPlaceFn`]
    pub default_in_place: Option<DefaultInPlaceFn>,

    /// cf. [`CloneIntoFn`]
    pub clone_into: Option<CloneIntoFn>,
}

/// Optional behavior hooks. `None` means "not supported".
#[derive(Clone, Copy, Debug, Default)]
pub struct TypeVTable {
    /// cf. [`PartialEqFn`]
    pub partial_eq: Option<PartialEqFn>,

    /// cf. [`PartialCmpFn`]
    pub partial_cmp: Option<PartialCmpFn>,

    /// Debug rendering, cf. [`FormatFn`]
    pub debug: Option<FormatFn>,

    /// Display rendering, used as the string conversion. cf. [`FormatFn`]
    pub display: Option<FormatFn>,

    /// cf. [`ParseFn`]
    pub parse: Option<ParseFn>,

    /// cf. [`IsNullFn`]
    pub is_null: Option<IsNullFn>,

    /// cf. [`SaveFn`]
    pub save: Option<SaveFn>,

    /// cf. [`LoadFn`]
    pub load: Option<LoadFn>,
}

/// A named field of a gadget type.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    /// Field name
    pub name: &'static str,

    /// Byte offset from the start of the owning value
    pub offset: usize,

    /// Resolves the field's descriptor. Deferred so that types can refer to themselves.
    pub descriptor: fn() -> &'static TypeDescriptor,
}

/// Metadata for one registered type.
///
/// Exactly one descriptor exists per type. It is published by the
/// [`TypeRegistry`](crate::TypeRegistry) with a non-zero id and is never
/// changed afterwards, so `&'static TypeDescriptor` handles can be compared
/// by address.
///
/// Descriptors only come from [`TypeDescriptor::builder`], and the registry
/// only accepts them from a [`Describe`] impl. The registry refuses one whose
/// `type_id` or `layout` is not the registered type's.
pub struct TypeDescriptor {
    /// Assigned by the registry; [`MetaId::INVALID`] until published.
    pub id: MetaId,

    /// Normalized type name.
    pub name: Cow<'static, str>,

    /// Rust identity of the described type.
    pub type_id: TypeId,

    /// Size and alignment.
    pub layout: Layout,

    /// Storage and copy properties.
    pub flags: TypeFlags,

    /// Lifecycle operations.
    pub ops: TypeOps,

    /// Behavior hooks.
    pub vtable: TypeVTable,

    /// Promotion to and from [`crate::Number`], for bool, integers, floats and enumerations.
    pub numeric: Option<NumericDef>,

    /// Keys of an enumeration.
    pub enumeration: Option<EnumDef>,

    /// Fields of a gadget.
    pub fields: Vec<Field>,

    /// Class of the pointee, for object pointer types.
    pub class: Option<&'static ClassInfo>,

    /// Container shape, for sequences and associations.
    pub container: Option<ContainerDef>,

    pub(crate) reserved: Option<Builtin>,
}

impl TypeDescriptor {
    /// Whether this describes `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Whether this descriptor is the reserved built-in `builtin`.
    #[inline]
    pub fn is_builtin(&self, builtin: Builtin) -> bool {
        self.id == builtin.id()
    }

    /// The normalized type name.
    #[inline]
    pub fn type_name(&self) -> &str {
        &self.name
    }

    /// Whether values can be default-constructed.
    #[inline]
    pub fn has_default(&self) -> bool {
        self.ops.default_in_place.is_some()
    }

    /// Whether values can be copied.
    #[inline]
    pub fn has_clone(&self) -> bool {
        self.ops.clone_into.is_some()
    }

    /// Whether values can be written to and read from a stream.
    #[inline]
    pub fn is_streamable(&self) -> bool {
        self.vtable.save.is_some() && self.vtable.load.is_some()
    }

    /// The sequence shape, if this is a sequential container.
    #[inline]
    pub fn sequence(&self) -> Option<&SequenceDef> {
        match &self.container {
            Some(ContainerDef::Sequence(def)) => Some(def),
            _ => None,
        }
    }

    /// The association shape, if this is an associative container.
    #[inline]
    pub fn association(&self) -> Option<&AssociationDef> {
        match &self.container {
            Some(ContainerDef::Association(def)) => Some(def),
            _ => None,
        }
    }

    /// Looks up a gadget field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Copies the value at `src` into `dst`. Returns `false` when the type
    /// cannot be copied, leaving `dst` uninitialized.
    ///
    /// # Safety
    ///
    /// See [`CloneIntoFn`].
    #[inline]
    pub unsafe fn clone_into(&self, src: PtrConst, dst: PtrUninit) -> bool {
        match self.ops.clone_into {
            Some(clone_into) => {
                unsafe { clone_into(src, dst) };
                true
            }
            None => false,
        }
    }

    /// Equality through the `partial_eq` hook. `None` when the type has no
    /// equality.
    ///
    /// # Safety
    ///
    /// See [`PartialEqFn`].
    #[inline]
    pub unsafe fn eq_values(&self, left: PtrConst, right: PtrConst) -> Option<bool> {
        self.vtable
            .partial_eq
            .map(|eq| unsafe { eq(left, right) })
    }

    /// Ordering through the hooks: `partial_cmp` first, then `partial_eq` for
    /// equality only. `None` is "unordered".
    ///
    /// # Safety
    ///
    /// See [`PartialCmpFn`].
    pub unsafe fn compare_values(&self, left: PtrConst, right: PtrConst) -> Option<Ordering> {
        if let Some(cmp) = self.vtable.partial_cmp {
            return unsafe { cmp(left, right) };
        }
        match unsafe { self.eq_values(left, right) } {
            Some(true) => Some(Ordering::Equal),
            _ => None,
        }
    }

    /// Renders the value through `display`, falling back to `debug`.
    ///
    /// # Safety
    ///
    /// See [`FormatFn`].
    pub unsafe fn stringify(&self, value: PtrConst) -> Option<String> {
        let hook = self.vtable.display.or(self.vtable.debug)?;
        Some(alloc::format!("{}", Formatted { hook, value }))
    }

    /// A `Debug`/`Display` adapter for the value behind `value`, using the
    /// `debug` hook (or `display`, or the type name).
    ///
    /// # Safety
    ///
    /// `value` must point to an initialized value of this type for as long as
    /// the adapter is used.
    pub unsafe fn debug_value(&self, value: PtrConst) -> DebugValue<'_> {
        DebugValue { desc: self, value }
    }
}

struct Formatted {
    hook: FormatFn,
    value: PtrConst,
}

impl fmt::Display for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        unsafe { (self.hook)(self.value, f) }
    }
}

/// Formats a type-erased value. cf. [`TypeDescriptor::debug_value`]
pub struct DebugValue<'a> {
    desc: &'a TypeDescriptor,
    value: PtrConst,
}

impl fmt::Debug for DebugValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.desc.vtable.debug.or(self.desc.vtable.display) {
            Some(hook) => unsafe { hook(self.value, f) },
            None => write!(f, "<{}>", self.desc.name),
        }
    }
}

impl fmt::Display for DebugValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &self.layout.size())
            .field("align", &self.layout.align())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

impl Eq for TypeDescriptor {}
