/// An enumeration with named keys.
///
/// ```ignore
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Shade { Light = 1, Dark = 2 }
///
/// impl Enumeration for Shade {
///     const KEYS: &'static [(&'static str, i64)] = &[("Light", 1), ("Dark", 2)];
///     fn to_repr(self) -> i64 { self as i64 }
///     fn from_repr(repr: i64) -> Option<Self> {
///         match repr { 1 => Some(Shade::Light), 2 => Some(Shade::Dark), _ => None }
///     }
/// }
/// ```
pub trait Enumeration: Copy + 'static {
    /// Every key with its integer value.
    const KEYS: &'static [(&'static str, i64)];

    /// Whether the representation is unsigned.
    const UNSIGNED: bool = false;

    /// The integer value of `self`.
    fn to_repr(self) -> i64;

    /// The variant with integer value `repr`, if one is declared.
    fn from_repr(repr: i64) -> Option<Self>;
}

/// Keys of an enumeration type.
#[derive(Clone, Copy, Debug)]
pub struct EnumDef {
    /// Every key with its integer value
    pub keys: &'static [(&'static str, i64)],
}

impl EnumDef {
    /// Wraps a key table.
    pub const fn new(keys: &'static [(&'static str, i64)]) -> Self {
        Self { keys }
    }

    /// The first key declared for `value`.
    pub fn key_of(&self, value: i64) -> Option<&'static str> {
        self.keys
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(k, _)| *k)
    }

    /// The value of `key`.
    pub fn value_of(&self, key: &str) -> Option<i64> {
        self.keys
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }
}
