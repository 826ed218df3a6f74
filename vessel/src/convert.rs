//! Built-in conversion rules and the conversion API of [`Variant`].
//!
//! Rules are tried in order: identical types, registered converters, nested
//! variants, scalars (numbers, chars, text, bytes, uuids), containers, and
//! object pointers.

use alloc::string::{String, ToString};
use core::mem::MaybeUninit;

use bytes::Bytes;
use vessel_core::{
    AssociationDef, ConversionRegistry, Describe, MetaId, Number, NumericKind, PtrConst,
    PtrUninit, SequenceDef, TypeDescriptor, alloc_for_layout, cast_object_ptr,
    dealloc_for_layout, descriptor_of, id_of, lookup_by_id, object_class_of,
};

use crate::Variant;
use crate::view::walk;

unsafe fn put<T>(dst: PtrUninit, value: Option<T>) -> bool {
    match value {
        Some(value) => {
            unsafe { dst.put(value) };
            true
        }
        None => false,
    }
}

fn is_integer(desc: &TypeDescriptor) -> bool {
    desc.numeric
        .is_some_and(|n| matches!(n.kind, NumericKind::Signed | NumericKind::Unsigned))
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.is_empty() || text == "0" || text.eq_ignore_ascii_case("false") {
        Some(false)
    } else if text == "1" || text.eq_ignore_ascii_case("true") {
        Some(true)
    } else {
        None
    }
}

/// Converts the value at `src` into `dst`. Returns `false` on failure,
/// leaving `dst` uninitialized.
///
/// # Safety
///
/// `src` must point to an initialized value of `from`'s type, `dst` to
/// aligned, uninitialized memory for `to`'s type.
pub(crate) unsafe fn convert_raw(
    from: &'static TypeDescriptor,
    src: PtrConst,
    to: &'static TypeDescriptor,
    dst: PtrUninit,
) -> bool {
    if from == to {
        return unsafe { from.clone_into(src, dst) };
    }
    if let Some(converter) = ConversionRegistry::global().get(from.id, to.id) {
        crate::trace!("converting {} to {} with {:?}", from.name, to.name, converter.kind);
        return unsafe { converter.convert(src, dst) };
    }

    if from.is::<Variant>() {
        let inner = unsafe { src.get::<Variant>() };
        return match (inner.descriptor(), inner.data()) {
            (Some(desc), Some(ptr)) => unsafe { convert_raw(desc, ptr, to, dst) },
            _ => false,
        };
    }
    if to.is::<Variant>() {
        let wrapped = unsafe { Variant::copy_of(from, src) };
        return unsafe { put(dst, wrapped.is_valid().then_some(wrapped)) };
    }

    if let Some(done) = unsafe { convert_scalar(from, src, to, dst) } {
        return done;
    }

    if let (Some(source), Some(target)) = (from.sequence(), to.sequence()) {
        return unsafe { convert_sequence(source, src, to, target, dst) };
    }
    if let (Some(source), Some(target)) = (from.association(), to.association()) {
        return unsafe { convert_association(source, src, to, target, dst) };
    }
    if let (Some(_), Some(target)) = (from.class, to.class) {
        return unsafe { cast_object_ptr(src, dst, target) };
    }
    false
}

/// Rules between scalar types. `None` when no rule applies.
unsafe fn convert_scalar(
    from: &'static TypeDescriptor,
    src: PtrConst,
    to: &'static TypeDescriptor,
    dst: PtrUninit,
) -> Option<bool> {
    if from.is::<char>() {
        if let Some(numeric) = to.numeric.filter(|_| is_integer(to)) {
            let code = *unsafe { src.get::<char>() } as u32;
            return Some(unsafe { (numeric.from_number)(Number::Int(code.into()), dst) });
        }
    }
    if to.is::<char>() {
        if let Some(numeric) = from.numeric.filter(|_| is_integer(from)) {
            let c = unsafe { (numeric.to_number)(src) }
                .to_int_rounded()
                .and_then(|i| u32::try_from(i).ok())
                .and_then(char::from_u32);
            return Some(unsafe { put(dst, c) });
        }
        if from.is::<String>() {
            let mut chars = unsafe { src.get::<String>() }.chars();
            let c = match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            };
            return Some(unsafe { put(dst, c) });
        }
    }

    if let (Some(source), Some(target)) = (from.numeric, to.numeric) {
        let number = unsafe { (source.to_number)(src) };
        return Some(unsafe { (target.from_number)(number, dst) });
    }

    if to.is::<String>() {
        if let (Some(keys), Some(numeric)) = (from.enumeration, from.numeric) {
            let text = match unsafe { (numeric.to_number)(src) } {
                Number::Int(repr) => i64::try_from(repr)
                    .ok()
                    .and_then(|repr| keys.key_of(repr))
                    .map_or_else(|| repr.to_string(), String::from),
                Number::Float(f) => f.to_string(),
            };
            return Some(unsafe { put(dst, Some(text)) });
        }
        if from.is::<Bytes>() {
            let bytes = unsafe { src.get::<Bytes>() };
            return Some(unsafe { put(dst, String::from_utf8(bytes.to_vec()).ok()) });
        }
        #[cfg(feature = "uuid")]
        if from.is::<uuid::Uuid>() {
            let uuid = *unsafe { src.get::<uuid::Uuid>() };
            return Some(unsafe { put(dst, Some(uuid.braced().to_string())) });
        }
        return unsafe { from.stringify(src) }.map(|text| unsafe { put(dst, Some(text)) });
    }

    if from.is::<String>() {
        let text = unsafe { src.get::<String>() };
        if to.is::<Bytes>() {
            return Some(unsafe { put(dst, Some(Bytes::copy_from_slice(text.as_bytes()))) });
        }
        if let Some(numeric) = to.numeric {
            let trimmed = text.trim();
            let number = match numeric.kind {
                NumericKind::Bool => parse_bool(trimmed).map(|b| Number::Int(b.into())),
                NumericKind::Enum => to
                    .enumeration
                    .and_then(|keys| keys.value_of(trimmed))
                    .or_else(|| trimmed.parse::<i64>().ok())
                    .map(|repr| Number::Int(repr.into())),
                NumericKind::Signed | NumericKind::Unsigned | NumericKind::Float => {
                    return to.vtable.parse.map(|parse| unsafe { parse(trimmed, dst) });
                }
            };
            return Some(match number {
                Some(number) => unsafe { (numeric.from_number)(number, dst) },
                None => false,
            });
        }
        return to.vtable.parse.map(|parse| unsafe { parse(text, dst) });
    }

    #[cfg(feature = "uuid")]
    {
        if from.is::<uuid::Uuid>() && to.is::<Bytes>() {
            let uuid = unsafe { src.get::<uuid::Uuid>() };
            return Some(unsafe { put(dst, Some(Bytes::copy_from_slice(uuid.as_bytes()))) });
        }
        if from.is::<Bytes>() && to.is::<uuid::Uuid>() {
            let bytes = unsafe { src.get::<Bytes>() };
            return Some(unsafe { put(dst, uuid::Uuid::from_slice(bytes).ok()) });
        }
    }

    None
}

/// Runs `f` on the value at `src` converted to `to`. The converted value
/// lives in a scratch allocation for the duration of the call.
unsafe fn with_converted(
    from: &'static TypeDescriptor,
    src: PtrConst,
    to: &'static TypeDescriptor,
    f: impl FnOnce(PtrConst) -> bool,
) -> bool {
    if from == to {
        return f(src);
    }
    let scratch = alloc_for_layout(to.layout);
    if !unsafe { convert_raw(from, src, to, scratch) } {
        unsafe { dealloc_for_layout(scratch, to.layout) };
        return false;
    }
    let value = unsafe { scratch.assume_init() };
    let done = f(value.as_const());
    unsafe {
        (to.ops.drop_in_place)(value);
        dealloc_for_layout(scratch, to.layout);
    }
    done
}

unsafe fn convert_sequence(
    source: &SequenceDef,
    src: PtrConst,
    to: &'static TypeDescriptor,
    target: &SequenceDef,
    dst: PtrUninit,
) -> bool {
    let (Some(default), Some(push)) = (to.ops.default_in_place, target.vtable.push_back) else {
        return false;
    };
    unsafe { default(dst) };
    let out = unsafe { dst.assume_init() };
    let done = unsafe {
        walk(&source.vtable.iter, src, |item| {
            with_converted(source.element, item, target.element, |elem| push(out, elem))
        })
    };
    if !done {
        unsafe { (to.ops.drop_in_place)(out) };
    }
    done
}

unsafe fn convert_association(
    source: &AssociationDef,
    src: PtrConst,
    to: &'static TypeDescriptor,
    target: &AssociationDef,
    dst: PtrUninit,
) -> bool {
    let (Some(default), Some(insert)) = (to.ops.default_in_place, target.vtable.insert) else {
        return false;
    };
    unsafe { default(dst) };
    let out = unsafe { dst.assume_init() };
    let done = unsafe {
        walk(&source.vtable.iter, src, |(key, value)| {
            with_converted(source.key, key, target.key, |key| {
                with_converted(source.value, value, target.value, |value| {
                    insert(out, key, value)
                })
            })
        })
    };
    if !done {
        unsafe { (to.ops.drop_in_place)(out) };
    }
    done
}

/// Whether some rule converts values of `from` to `to`. Rules that depend on
/// the value (parsing, range checks, object casts) may still fail.
pub(crate) fn can_convert_types(from: &TypeDescriptor, to: &TypeDescriptor) -> bool {
    if from == to {
        return from.has_clone();
    }
    if ConversionRegistry::global().contains(from.id, to.id) || from.is::<Variant>() {
        return true;
    }
    if to.is::<Variant>() {
        return from.has_clone();
    }

    let char_rule = (from.is::<char>() && is_integer(to))
        || (to.is::<char>() && (is_integer(from) || from.is::<String>()));
    let numeric_rule = from.numeric.is_some() && to.numeric.is_some();
    let to_text = to.is::<String>()
        && (from.enumeration.is_some()
            || from.is::<Bytes>()
            || from.vtable.display.is_some()
            || from.vtable.debug.is_some());
    let from_text = from.is::<String>()
        && (to.is::<Bytes>() || to.numeric.is_some() || to.vtable.parse.is_some());
    #[cfg(feature = "uuid")]
    let uuid_rule = (from.is::<uuid::Uuid>() && to.is::<Bytes>())
        || (from.is::<Bytes>() && to.is::<uuid::Uuid>());
    #[cfg(not(feature = "uuid"))]
    let uuid_rule = false;
    if char_rule || numeric_rule || to_text || from_text || uuid_rule {
        return true;
    }

    if let (Some(source), Some(target)) = (from.sequence(), to.sequence()) {
        return to.has_default()
            && target.vtable.push_back.is_some()
            && can_convert_types(source.element, target.element);
    }
    if let (Some(source), Some(target)) = (from.association(), to.association()) {
        return to.has_default()
            && target.vtable.insert.is_some()
            && can_convert_types(source.key, target.key)
            && can_convert_types(source.value, target.value);
    }
    if let (Some(source), Some(target)) = (from.class, to.class) {
        return source.inherits(target) || target.inherits(source);
    }
    false
}

impl Variant {
    /// The value converted to `T`, or `None` when no conversion succeeds.
    pub fn to<T: Describe>(&self) -> Option<T> {
        let from = self.descriptor()?;
        let src = self.data()?;
        let mut slot = MaybeUninit::<T>::uninit();
        let converted = unsafe {
            convert_raw(
                from,
                src,
                descriptor_of::<T>(),
                PtrUninit::from_maybe_uninit(&mut slot),
            )
        };
        converted.then(|| unsafe { slot.assume_init() })
    }

    /// The value converted to `T`, or `T::default()` when no conversion succeeds.
    pub fn to_or_default<T: Describe + Default>(&self) -> T {
        self.to::<T>().unwrap_or_default()
    }

    /// A new variant holding the value converted to the type registered
    /// under `to`.
    pub fn converted(&self, to: MetaId) -> Option<Variant> {
        crate::register_builtins();
        let from = self.descriptor()?;
        let src = self.data()?;
        let target = lookup_by_id(to)?;
        let out = Variant::build(target, |dst| unsafe { convert_raw(from, src, target, dst) });
        out.is_valid().then_some(out)
    }

    /// Converts the value in place to the type registered under `to`.
    ///
    /// On failure the variant holds the default value of `to` (or nothing,
    /// when `to` has no default) and `false` is returned.
    pub fn convert(&mut self, to: MetaId) -> bool {
        match self.converted(to) {
            Some(converted) => {
                *self = converted;
                true
            }
            None => {
                crate::debug!(
                    "cannot convert {} to {:?}",
                    self.type_name().unwrap_or("nothing"),
                    to
                );
                *self = Variant::default_of(to);
                false
            }
        }
    }

    /// Whether the value can be converted to the type registered under `to`.
    ///
    /// Object pointers are checked against the class of the object they
    /// point to.
    pub fn can_convert(&self, to: MetaId) -> bool {
        crate::register_builtins();
        let (Some(from), Some(target)) = (self.descriptor(), lookup_by_id(to)) else {
            return false;
        };
        if from.is::<Variant>() && !target.is::<Variant>() {
            return self
                .try_extract_as::<Variant>()
                .is_some_and(|inner| inner.can_convert(to));
        }
        if let (Some(_), Some(class), Some(ptr)) = (from.class, target.class, self.data()) {
            if from != target && !ConversionRegistry::global().contains(from.id, to) {
                return match unsafe { object_class_of(ptr) } {
                    Some(pointee) => pointee.inherits(class),
                    None => true,
                };
            }
        }
        can_convert_types(from, target)
    }

    /// Converts the value in place to `T`. cf. [`Variant::convert`]
    pub fn convert_to<T: Describe>(&mut self) -> bool {
        self.convert(id_of::<T>())
    }

    /// Whether the value can be converted to `T`. cf. [`Variant::can_convert`]
    pub fn can_convert_to<T: Describe>(&self) -> bool {
        self.can_convert(id_of::<T>())
    }
}
