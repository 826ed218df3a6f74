use core::cmp::Ordering;

use crate::{Enumeration, PtrConst, PtrUninit};

/// Which family a numeric type belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericKind {
    /// `bool`
    Bool,
    /// Signed integers
    Signed,
    /// Unsigned integers
    Unsigned,
    /// Floating point
    Float,
    /// Enumerations, promoted through their integer representation
    Enum,
}

/// A numeric value promoted to a common representation.
///
/// Every integer type fits in `Int`, so comparing across integer types never
/// overflows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// An integer (or bool, or enum) value
    Int(i128),
    /// A floating-point value
    Float(f64),
}

// 2^127, the first float above every i128.
const I128_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

impl Number {
    /// Exact mathematical comparison. `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
            (Number::Int(a), Number::Float(b)) => compare_int_float(a, b),
            (Number::Float(a), Number::Int(b)) => compare_int_float(b, a).map(Ordering::reverse),
        }
    }

    /// The value as an integer. Floats are rounded half away from zero;
    /// non-finite or out-of-range floats give `None`.
    pub fn to_int_rounded(self) -> Option<i128> {
        match self {
            Number::Int(i) => Some(i),
            Number::Float(f) => {
                if !f.is_finite() {
                    return None;
                }
                let rounded = f.round();
                if !(-I128_BOUND..I128_BOUND).contains(&rounded) {
                    return None;
                }
                Some(rounded as i128)
            }
        }
    }

    /// The value as a float, possibly losing precision.
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Whether the value is zero.
    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

fn compare_int_float(int: i128, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    if float >= I128_BOUND {
        return Some(Ordering::Less);
    }
    if float < -I128_BOUND {
        return Some(Ordering::Greater);
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal => 0.0f64.partial_cmp(&(float - whole)),
        unequal => Some(unequal),
    }
}

/// Promote a value to a [`Number`].
///
/// # Safety
///
/// The `value` parameter must point to an initialized value of the correct type.
pub type ToNumberFn = unsafe fn(value: PtrConst) -> Number;

/// Write the value of `number` into `target`. Returns `false` (leaving
/// `target` uninitialized) when the number does not fit.
///
/// # Safety
///
/// The `target` parameter must point to aligned, uninitialized memory of the correct type.
pub type FromNumberFn = unsafe fn(number: Number, target: PtrUninit) -> bool;

/// Numeric promotion for a type.
#[derive(Clone, Copy, Debug)]
pub struct NumericDef {
    /// Which family the type belongs to
    pub kind: NumericKind,

    /// cf. [`ToNumberFn`]
    pub to_number: ToNumberFn,

    /// cf. [`FromNumberFn`]
    pub from_number: FromNumberFn,
}

unsafe fn enum_to_number<T: Enumeration>(value: PtrConst) -> Number {
    Number::Int(unsafe { value.get::<T>() }.to_repr() as i128)
}

unsafe fn enum_from_number<T: Enumeration>(number: Number, target: PtrUninit) -> bool {
    let Some(repr) = number.to_int_rounded().and_then(|i| i64::try_from(i).ok()) else {
        return false;
    };
    match T::from_repr(repr) {
        Some(value) => {
            unsafe { target.put(value) };
            true
        }
        None => false,
    }
}

impl NumericDef {
    /// Promotion for an [`Enumeration`]: only declared values convert back.
    pub fn enumeration<T: Enumeration>() -> Self {
        NumericDef {
            kind: NumericKind::Enum,
            to_number: enum_to_number::<T>,
            from_number: enum_from_number::<T>,
        }
    }
}
