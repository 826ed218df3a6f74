//! Writing variants to and reading them from a [`StreamWriter`]/[`StreamReader`].
//!
//! A variant is written as a `u32` type tag followed by the payload. The tag
//! is the reserved id of a built-in type, [`USER_TYPE_TAG`] followed by the
//! type name for every other type, or `0` for an invalid variant.

use alloc::borrow::Cow;

use vessel_core::{
    StreamError, StreamReader, StreamStatus, StreamWriter, Streamable, TypeDescriptor,
    TypeRegistry, lookup_by_id,
};

use crate::Variant;

/// Tag announcing that the type name follows. User type ids are assigned in
/// registration order, so they cannot be written as-is.
pub const USER_TYPE_TAG: u32 = 0xFFFF_FFFF;

const INVALID_TAG: u32 = 0;

fn write_tag(desc: &TypeDescriptor, out: &mut StreamWriter) {
    if desc.id.is_builtin() {
        out.write_u32(desc.id.raw());
    } else {
        out.write_u32(USER_TYPE_TAG);
        out.write_str(&desc.name);
    }
}

/// Whether the tag written for `desc` resolves to `desc` again. A user type
/// whose name is registered to another type cannot be read back.
fn tag_resolves(desc: &TypeDescriptor) -> bool {
    desc.id.is_builtin() || TypeRegistry::global().lookup_by_name(&desc.name) == desc.id
}

fn read_tag(input: &mut StreamReader) -> Option<Option<&'static TypeDescriptor>> {
    let tag = input.read_u32()?;
    match tag {
        INVALID_TAG => Some(None),
        USER_TYPE_TAG => {
            let name = input.read_string()?;
            match TypeRegistry::global().descriptor_by_name(&name) {
                Some(desc) => Some(Some(desc)),
                None => {
                    crate::warn!("cannot load unknown type `{}`", name);
                    input.corrupt()
                }
            }
        }
        raw => match lookup_by_id(vessel_core::MetaId::from_raw(raw)) {
            Some(desc) if desc.id.is_builtin() => Some(Some(desc)),
            _ => {
                crate::warn!("cannot load unknown type tag {}", raw);
                input.corrupt()
            }
        },
    }
}

impl Variant {
    /// Writes the type tag and the value.
    ///
    /// Fails without writing anything when the held type cannot be streamed,
    /// or when its name would load back as another type. Fails with
    /// [`StreamError::WriteFailed`] when the writer fails on the way.
    pub fn save(&self, out: &mut StreamWriter) -> Result<(), StreamError> {
        let (Some(desc), Some(ptr)) = (self.descriptor(), self.data()) else {
            out.write_u32(INVALID_TAG);
            return Ok(());
        };
        let Some(save) = desc
            .vtable
            .save
            .filter(|_| desc.is_streamable() && tag_resolves(desc))
        else {
            crate::warn!("`{}` cannot be written to a stream", desc.name);
            return Err(StreamError::NotStreamable {
                type_name: Cow::Owned(desc.name.to_string()),
            });
        };
        write_tag(desc, out);
        unsafe { save(ptr, out) };
        if out.status() != StreamStatus::Ok {
            return Err(StreamError::WriteFailed {
                type_name: Cow::Owned(desc.name.to_string()),
            });
        }
        Ok(())
    }

    /// Reads a variant written by [`Variant::save`].
    ///
    /// Unknown types and malformed payloads give an invalid variant and are
    /// reported through the reader's status. So do variants nested deeper
    /// than [`StreamReader::MAX_DEPTH`].
    pub fn load(input: &mut StreamReader) -> Variant {
        crate::register_builtins();
        input.nested(load_value).unwrap_or_else(Variant::invalid)
    }
}

fn load_value(input: &mut StreamReader) -> Variant {
    let Some(Some(desc)) = read_tag(input) else {
        return Variant::invalid();
    };
    let Some(load) = desc.vtable.load else {
        crate::warn!("`{}` cannot be read from a stream", desc.name);
        input.set_status(StreamStatus::ReadCorruptData);
        return Variant::invalid();
    };
    let value = Variant::build(desc, |dst| unsafe { load(input, dst) });
    if !value.is_valid() {
        input.set_status(StreamStatus::ReadCorruptData);
    }
    value
}

impl Streamable for Variant {
    fn save(&self, out: &mut StreamWriter) {
        if Variant::save(self, out).is_err() {
            out.write_u32(INVALID_TAG);
        }
    }

    fn load(input: &mut StreamReader) -> Option<Self> {
        let value = Variant::load(input);
        (input.status() == StreamStatus::Ok).then_some(value)
    }
}
