use core::cmp::Ordering;

use crate::Variant;

impl Variant {
    /// Compares two variants. `None` means the values are unordered.
    ///
    /// Values of the same type compare through the type's ordering (or only
    /// its equality); a type with neither is never equal to anything.
    /// Numbers of different types (integers, floats, bools, enumerations)
    /// compare by mathematical value. Two invalid variants are equal; an
    /// invalid and a valid one are unordered, as is any other pair.
    pub fn compare(&self, other: &Variant) -> Option<Ordering> {
        let (left, right) = match (self.descriptor(), other.descriptor()) {
            (None, None) => return Some(Ordering::Equal),
            (Some(left), Some(right)) => (left, right),
            _ => return None,
        };
        let (a, b) = (self.data()?, other.data()?);
        if left == right {
            return unsafe { left.compare_values(a, b) };
        }
        let (Some(na), Some(nb)) = (left.numeric, right.numeric) else {
            return None;
        };
        unsafe { (na.to_number)(a).compare((nb.to_number)(b)) }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Variant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}
