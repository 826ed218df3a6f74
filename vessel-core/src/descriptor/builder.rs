use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::any::TypeId;
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::mem::transmute;
use core::str::FromStr;

use crate::{
    AssociationDef, Builtin, ClassInfo, CloneIntoFn, ContainerDef, DefaultInPlaceFn, Describe,
    EnumDef, Enumeration, Field, FormatFn, IsNullFn, LoadFn, MetaId, NumericDef,
    PartialCmpFn, PartialEqFn, ParseFn, PtrConst, PtrMut, PtrUninit, SaveFn, SequenceDef,
    Streamable, TypeDescriptor, TypeFlags, TypeOps, TypeVTable,
};

/// Builds a [`TypeDescriptor`] for `T`.
///
/// Generic over `T` at the type level, ensuring all hooks are for the same
/// type. The erasure to untyped pointers happens inside the builder methods.
pub struct TypeDescriptorBuilder<T> {
    desc: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl TypeDescriptor {
    /// Start describing `T` under `name`.
    ///
    /// The name is normalized on registration, so `"Pair< i32 , u8 >"` and
    /// `"Pair<i32,u8>"` are the same name.
    pub fn builder<T: 'static>(name: impl Into<Cow<'static, str>>) -> TypeDescriptorBuilder<T> {
        let mut flags = TypeFlags::RELOCATABLE
            | TypeFlags::NEEDS_CONSTRUCTION
            | TypeFlags::NEEDS_COPY_CONSTRUCTION;
        if core::mem::needs_drop::<T>() {
            flags |= TypeFlags::NEEDS_DESTRUCTION;
        }
        TypeDescriptorBuilder {
            desc: TypeDescriptor {
                id: MetaId::INVALID,
                name: name.into(),
                type_id: TypeId::of::<T>(),
                layout: Layout::new::<T>(),
                flags,
                ops: TypeOps {
                    drop_in_place: drop_in_place_shim::<T>,
                    default_in_place: None,
                    clone_into: None,
                },
                vtable: TypeVTable::default(),
                numeric: None,
                enumeration: None,
                fields: Vec::new(),
                class: None,
                container: None,
                reserved: None,
            },
            _marker: PhantomData,
        }
    }
}

unsafe fn drop_in_place_shim<T>(value: PtrMut) {
    unsafe { value.drop_in_place::<T>() };
}

unsafe fn default_in_place_shim<T: Default>(target: PtrUninit) {
    unsafe { target.put(T::default()) };
}

unsafe fn clone_into_shim<T: Clone>(src: PtrConst, dst: PtrUninit) {
    unsafe { dst.put(src.get::<T>().clone()) };
}

unsafe fn parse_shim<T: FromStr>(s: &str, target: PtrUninit) -> bool {
    match s.parse::<T>() {
        Ok(value) => {
            unsafe { target.put(value) };
            true
        }
        Err(_) => false,
    }
}

unsafe fn save_shim<T: Streamable>(value: PtrConst, out: &mut crate::StreamWriter) {
    unsafe { value.get::<T>() }.save(out);
}

unsafe fn load_shim<T: Streamable>(input: &mut crate::StreamReader, target: PtrUninit) -> bool {
    match T::load(input) {
        Some(value) => {
            unsafe { target.put(value) };
            true
        }
        None => false,
    }
}

impl<T: 'static> TypeDescriptorBuilder<T> {
    /// Default-construct through `T::default`.
    pub fn with_default(mut self) -> Self
    where
        T: Default,
    {
        self.desc.ops.default_in_place = Some(default_in_place_shim::<T>);
        self
    }

    /// Copy through `T::clone`.
    pub fn with_clone(mut self) -> Self
    where
        T: Clone,
    {
        self.desc.ops.clone_into = Some(clone_into_shim::<T>);
        self
    }

    /// Copy through `T::clone`, and mark copies as trivial.
    pub fn with_copy(mut self) -> Self
    where
        T: Copy,
    {
        self.desc.flags.remove(TypeFlags::NEEDS_COPY_CONSTRUCTION);
        self.with_clone()
    }

    /// Plain data: default-constructed and copied without running code.
    pub fn plain(mut self) -> Self
    where
        T: Copy + Default,
    {
        self.desc.flags.remove(TypeFlags::NEEDS_CONSTRUCTION);
        self.with_default().with_copy()
    }

    /// Equality through `T::eq`.
    pub fn with_eq(self) -> Self
    where
        T: PartialEq,
    {
        self.eq_with(<T as PartialEq>::eq)
    }

    /// Equality and ordering through `T::eq` and `T::partial_cmp`.
    pub fn with_ord(self) -> Self
    where
        T: PartialOrd,
    {
        self.eq_with(<T as PartialEq>::eq)
            .cmp_with(<T as PartialOrd>::partial_cmp)
    }

    /// Debug rendering through `T`'s `Debug` impl.
    pub fn with_debug(self) -> Self
    where
        T: fmt::Debug,
    {
        self.debug_with(<T as fmt::Debug>::fmt)
    }

    /// String rendering through `T`'s `Display` impl.
    pub fn with_display(self) -> Self
    where
        T: fmt::Display,
    {
        self.display_with(<T as fmt::Display>::fmt)
    }

    /// Parsing from strings through `T::from_str`.
    pub fn with_parse(mut self) -> Self
    where
        T: FromStr,
    {
        self.desc.vtable.parse = Some(parse_shim::<T>);
        self
    }

    /// Stream support through `T`'s [`Streamable`] impl.
    pub fn with_stream(mut self) -> Self
    where
        T: Streamable,
    {
        self.desc.vtable.save = Some(save_shim::<T>);
        self.desc.vtable.load = Some(load_shim::<T>);
        self
    }

    /// Set the equality function.
    pub fn eq_with(mut self, f: fn(&T, &T) -> bool) -> Self {
        self.desc.vtable.partial_eq =
            Some(unsafe { transmute::<fn(&T, &T) -> bool, PartialEqFn>(f) });
        self
    }

    /// Set the ordering function.
    pub fn cmp_with(mut self, f: fn(&T, &T) -> Option<Ordering>) -> Self {
        self.desc.vtable.partial_cmp =
            Some(unsafe { transmute::<fn(&T, &T) -> Option<Ordering>, PartialCmpFn>(f) });
        self
    }

    /// Set the debug function.
    pub fn debug_with(mut self, f: fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result) -> Self {
        self.desc.vtable.debug = Some(unsafe {
            transmute::<fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result, FormatFn>(f)
        });
        self
    }

    /// Set the display function.
    pub fn display_with(mut self, f: fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result) -> Self {
        self.desc.vtable.display = Some(unsafe {
            transmute::<fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result, FormatFn>(f)
        });
        self
    }

    /// Set the null test.
    pub fn is_null_with(mut self, f: fn(&T) -> bool) -> Self {
        self.desc.vtable.is_null = Some(unsafe { transmute::<fn(&T) -> bool, IsNullFn>(f) });
        self
    }

    /// Mark `T` as an enumeration with the keys of its [`Enumeration`] impl.
    ///
    /// Enumerations promote to integers for comparison and conversion.
    pub fn enumeration(mut self) -> Self
    where
        T: Enumeration,
    {
        self.desc.flags |= TypeFlags::IS_ENUMERATION;
        if T::UNSIGNED {
            self.desc.flags |= TypeFlags::IS_UNSIGNED_ENUMERATION;
        }
        self.desc.enumeration = Some(EnumDef::new(T::KEYS));
        self.desc.numeric = Some(NumericDef::enumeration::<T>());
        self
    }

    /// Expose a named field of type `F` at byte `offset`.
    ///
    /// # Safety
    ///
    /// `offset` must be the offset of a field of `T` whose type is exactly
    /// `F`. Take it from `core::mem::offset_of!`.
    pub unsafe fn field<F: Describe>(mut self, name: &'static str, offset: usize) -> Self {
        self.desc.flags |= TypeFlags::IS_GADGET;
        self.desc.fields.push(Field {
            name,
            offset,
            descriptor: crate::descriptor_of::<F>,
        });
        self
    }

    /// Mark `T` as a pointer to instances of `class`.
    ///
    /// # Safety
    ///
    /// `T` must be [`ObjectPtr`](crate::ObjectPtr) of a type whose class is
    /// `class`.
    pub unsafe fn class(mut self, class: &'static ClassInfo) -> Self {
        self.desc.flags |= TypeFlags::IS_POINTER | TypeFlags::POINTER_TO_OBJECT;
        self.desc.class = Some(class);
        self
    }

    /// Mark `T` as a pointer or handle type.
    pub fn pointer(mut self) -> Self {
        self.desc.flags |= TypeFlags::IS_POINTER;
        self
    }

    /// Values must stay at a stable address once stored, so they are never
    /// placed in a variant's inline buffer.
    pub fn not_relocatable(mut self) -> Self {
        self.desc.flags.remove(TypeFlags::RELOCATABLE);
        self.desc.flags |= TypeFlags::NEEDS_MOVE_CONSTRUCTION;
        self
    }

    /// Attach a sequence shape.
    ///
    /// # Safety
    ///
    /// Every hook in `def` must have been written for `T`.
    pub unsafe fn sequence(mut self, def: SequenceDef) -> Self {
        self.desc.container = Some(ContainerDef::Sequence(def));
        self
    }

    /// Attach an association shape.
    ///
    /// # Safety
    ///
    /// Every hook in `def` must have been written for `T`.
    pub unsafe fn association(mut self, def: AssociationDef) -> Self {
        self.desc.container = Some(ContainerDef::Association(def));
        self
    }

    /// Attach numeric promotion.
    ///
    /// # Safety
    ///
    /// The conversion hooks in `def` must have been written for `T`.
    pub unsafe fn numeric(mut self, def: NumericDef) -> Self {
        self.desc.numeric = Some(def);
        self
    }

    /// Ask for the reserved id of `builtin`.
    ///
    /// The registry refuses the claim when it knows the Rust type behind
    /// `builtin` and `T` is not that type.
    ///
    /// # Safety
    ///
    /// Code that looks a value up by a builtin id reads it as the type that
    /// id stands for, so `T` must be that type.
    pub unsafe fn builtin(mut self, builtin: Builtin) -> Self {
        self.desc.reserved = Some(builtin);
        self
    }

    /// Set an already type-erased default constructor.
    ///
    /// Generic containers use the raw setters to wire hooks that depend on
    /// their element descriptors.
    ///
    /// # Safety
    ///
    /// This and every other `raw_` setter takes hooks that must have been
    /// written for `T`. Nothing checks it.
    pub unsafe fn raw_default(mut self, f: Option<DefaultInPlaceFn>) -> Self {
        self.desc.ops.default_in_place = f;
        self
    }

    /// Set an already type-erased copy constructor.
    ///
    /// # Safety
    ///
    /// cf. [`Self::raw_default`]
    pub unsafe fn raw_clone(mut self, f: Option<CloneIntoFn>) -> Self {
        self.desc.ops.clone_into = f;
        self
    }

    /// Set already type-erased equality and ordering.
    ///
    /// # Safety
    ///
    /// cf. [`Self::raw_default`]
    pub unsafe fn raw_cmp(mut self, eq: Option<PartialEqFn>, cmp: Option<PartialCmpFn>) -> Self {
        self.desc.vtable.partial_eq = eq;
        self.desc.vtable.partial_cmp = cmp;
        self
    }

    /// Set an already type-erased debug function.
    ///
    /// # Safety
    ///
    /// cf. [`Self::raw_default`]
    pub unsafe fn raw_debug(mut self, f: Option<FormatFn>) -> Self {
        self.desc.vtable.debug = f;
        self
    }

    /// Set an already type-erased parse function.
    ///
    /// # Safety
    ///
    /// cf. [`Self::raw_default`]
    pub unsafe fn raw_parse(mut self, f: Option<ParseFn>) -> Self {
        self.desc.vtable.parse = f;
        self
    }

    /// Set an already type-erased null test.
    ///
    /// # Safety
    ///
    /// cf. [`Self::raw_default`]
    pub unsafe fn raw_is_null(mut self, f: Option<IsNullFn>) -> Self {
        self.desc.vtable.is_null = f;
        self
    }

    /// Set already type-erased stream hooks. Both or neither are installed.
    ///
    /// # Safety
    ///
    /// cf. [`Self::raw_default`]
    pub unsafe fn raw_stream(mut self, save: Option<SaveFn>, load: Option<LoadFn>) -> Self {
        if let (Some(save), Some(load)) = (save, load) {
            self.desc.vtable.save = Some(save);
            self.desc.vtable.load = Some(load);
        }
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> TypeDescriptor {
        self.desc
    }
}

/// Implements [`Describe`] for a type by listing the traits it supports.
///
/// ## Supported traits
///
/// - `Default` -> default constructor
/// - `Clone` -> copy constructor
/// - `Copy` -> trivial copy constructor
/// - `PartialEq` -> equality
/// - `PartialOrd` -> equality and ordering
/// - `Debug` -> debug rendering
/// - `Display` -> string rendering and conversion to `String`
/// - `FromStr` -> conversion from `String`
/// - `Stream` -> stream support through [`Streamable`]
/// - `Enumeration` -> enum keys through [`Enumeration`]
///
/// ## Example
///
/// ```ignore
/// describe!(Meters => Default, Clone, PartialOrd, Debug);
/// describe!(Celsius as "units::Celsius" => Default, Copy, PartialEq, Display, FromStr);
/// ```
#[macro_export]
macro_rules! describe {
    ($ty:ty as $name:expr => $($rest:tt)*) => {
        unsafe impl $crate::Describe for $ty {
            fn describe() -> $crate::TypeDescriptor {
                $crate::describe!(@build $crate::TypeDescriptor::builder::<$ty>($name), $($rest)*)
            }
        }
    };

    ($ty:ty => $($rest:tt)*) => {
        $crate::describe!($ty as stringify!($ty) => $($rest)*);
    };

    // Base case: no more tokens - just build
    (@build $builder:expr, $(,)?) => {
        $builder.build()
    };

    (@build $builder:expr, Default $(, $($rest:tt)*)?) => {
        $crate::describe!(@build $builder.with_default(), $($($rest)*)?)
    };
    (@build $builder:expr, Clone $(, $($rest:tt)*)?) => {
        $crate::describe!(@build $builder.with_clone(), $($($rest)*)?)
    };
    (@build $builder:expr, Copy $(, $($rest:tt)*)?) => {
        $crate::describe!(@build $builder.with_copy(), $($($rest)*)?)
    };
    (@build $builder:expr, PartialEq $(, $($rest:tt)*)?) => {
        $crate::describe!(@build $builder.with_eq(), $($($rest)*)?)
    };
    (@build $builder:expr, PartialOrd $(, $($rest:tt)*)?) => {
        $crate::describe!(@build $builder.with_ord(), $($($rest)*)?)
    };
    (@build $builder:expr, Debug $(, $($rest:tt)*)?) => {
        $crate::describe!(@build $builder.with_debug(), $($($rest)*)?)
    };
    (@build $builder:expr, Display $(, $($rest:tt)*)?) => {
        $crate::describe!(@build $builder.with_display(), $($($rest)*)?)
    };
    (@build $builder:expr, FromStr $(, $($rest:tt)*)?) => {
        $crate::describe!(@build $builder.with_parse(), $($($rest)*)?)
    };
    (@build $builder:expr, Stream $(, $($rest:tt)*)?) => {
        $crate::describe!(@build $builder.with_stream(), $($($rest)*)?)
    };
    (@build $builder:expr, Enumeration $(, $($rest:tt)*)?) => {
        $crate::describe!(@build $builder.enumeration(), $($($rest)*)?)
    };
}
