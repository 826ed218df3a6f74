use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

/// Numeric identity of a registered type.
///
/// `0` is [`MetaId::INVALID`]. Built-in types use the reserved ids listed in
/// [`Builtin`]; every other type gets an id at or above
/// [`MetaId::FIRST_USER`], handed out in registration order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct MetaId(u32);

impl MetaId {
    /// The id of "no type": what an invalid variant reports.
    pub const INVALID: MetaId = MetaId(0);

    /// Every reserved id is below this bound.
    pub const BUILTIN_LIMIT: u32 = 64;

    /// First id handed out to a user type.
    pub const FIRST_USER: MetaId = MetaId(65536);

    /// Wraps a raw id.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// `false` only for [`MetaId::INVALID`].
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// `true` for reserved built-in ids.
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 != 0 && self.0 < Self::BUILTIN_LIMIT
    }
}

impl fmt::Debug for MetaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Builtin::from_id(*self) {
            Some(b) => write!(f, "MetaId({}:{})", self.0, b.name()),
            None => write!(f, "MetaId({})", self.0),
        }
    }
}

impl fmt::Display for MetaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! builtins {
    ($($(#[$meta:meta])* $variant:ident = $raw:literal => $name:literal,)*) => {
        /// Types with a reserved [`MetaId`].
        ///
        /// Reserved ids are stable across processes, which lets the stream
        /// format tag built-in values with their id instead of their name.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum Builtin {
            $($(#[$meta])* $variant = $raw,)*
        }

        impl Builtin {
            /// All built-ins, in id order.
            pub const ALL: &'static [Builtin] = &[$(Builtin::$variant,)*];

            /// The reserved id.
            #[inline]
            pub const fn id(self) -> MetaId {
                MetaId(self as u32)
            }

            /// The normalized type name registered under this id.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Builtin::$variant => $name,)*
                }
            }

            /// The built-in reserved under `id`, if any.
            pub const fn from_id(id: MetaId) -> Option<Builtin> {
                match id.0 {
                    $($raw => Some(Builtin::$variant),)*
                    _ => None,
                }
            }

            /// The built-in whose normalized name is `name`, if any.
            pub fn from_name(name: &str) -> Option<Builtin> {
                match name {
                    $($name => Some(Builtin::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

builtins! {
    /// `bool`
    Bool = 1 => "bool",
    /// `i8`
    I8 = 2 => "i8",
    /// `i16`
    I16 = 3 => "i16",
    /// `i32`
    I32 = 4 => "i32",
    /// `i64`
    I64 = 5 => "i64",
    /// `isize`
    Isize = 6 => "isize",
    /// `u8`
    U8 = 7 => "u8",
    /// `u16`
    U16 = 8 => "u16",
    /// `u32`
    U32 = 9 => "u32",
    /// `u64`
    U64 = 10 => "u64",
    /// `usize`
    Usize = 11 => "usize",
    /// `f32`
    F32 = 12 => "f32",
    /// `f64`
    F64 = 13 => "f64",
    /// `char`
    Char = 14 => "char",
    /// `String`
    String = 15 => "String",
    /// `bytes::Bytes`
    Bytes = 16 => "Bytes",
    /// `uuid::Uuid`
    Uuid = 17 => "Uuid",
    /// `()`
    Unit = 18 => "()",
    /// A variant holding another variant
    Variant = 19 => "Variant",
    /// `Vec<Variant>`
    VariantList = 20 => "Vec<Variant>",
    /// `BTreeMap<String,Variant>`
    VariantMap = 21 => "BTreeMap<String,Variant>",
    /// `Vec<String>`
    StringList = 22 => "Vec<String>",
}

impl Builtin {
    /// The Rust type this crate registers under the reserved id, when it is
    /// known here. `Variant` and the containers of it are defined downstream.
    pub fn rust_type(self) -> Option<TypeId> {
        let type_id = match self {
            Builtin::Bool => TypeId::of::<bool>(),
            Builtin::I8 => TypeId::of::<i8>(),
            Builtin::I16 => TypeId::of::<i16>(),
            Builtin::I32 => TypeId::of::<i32>(),
            Builtin::I64 => TypeId::of::<i64>(),
            Builtin::Isize => TypeId::of::<isize>(),
            Builtin::U8 => TypeId::of::<u8>(),
            Builtin::U16 => TypeId::of::<u16>(),
            Builtin::U32 => TypeId::of::<u32>(),
            Builtin::U64 => TypeId::of::<u64>(),
            Builtin::Usize => TypeId::of::<usize>(),
            Builtin::F32 => TypeId::of::<f32>(),
            Builtin::F64 => TypeId::of::<f64>(),
            Builtin::Char => TypeId::of::<char>(),
            Builtin::String => TypeId::of::<String>(),
            Builtin::Bytes => TypeId::of::<bytes::Bytes>(),
            #[cfg(feature = "uuid")]
            Builtin::Uuid => TypeId::of::<uuid::Uuid>(),
            Builtin::Unit => TypeId::of::<()>(),
            Builtin::StringList => TypeId::of::<Vec<String>>(),
            _ => return None,
        };
        Some(type_id)
    }
}
