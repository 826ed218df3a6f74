use vessel_core::{Field, TypeDescriptor};

use crate::Variant;

impl Variant {
    fn field_of(&self, name: &str) -> Option<(&'static Field, &'static TypeDescriptor)> {
        let field = self.descriptor()?.field(name)?;
        Some((field, (field.descriptor)()))
    }

    /// A copy of the gadget field `name`. `None` when no value is held, the
    /// type has no such field, or the field type cannot be copied.
    pub fn property(&self, name: &str) -> Option<Variant> {
        let (field, desc) = self.field_of(name)?;
        let ptr = unsafe { self.data()?.field(field.offset) };
        if desc.is::<Variant>() {
            return Some(unsafe { ptr.get::<Variant>() }.clone());
        }
        let copy = unsafe { Variant::copy_of(desc, ptr) };
        copy.is_valid().then_some(copy)
    }

    /// Replaces the gadget field `name` with `value`, converted to the field
    /// type. Detaches a shared value first. Returns `false`, leaving the
    /// field untouched, when there is no such field or the value does not fit.
    pub fn set_property(&mut self, name: &str, value: &Variant) -> bool {
        let Some((field, desc)) = self.field_of(name) else {
            return false;
        };
        let Some(clone_into) = desc.ops.clone_into else {
            crate::debug!("field `{}` of `{:?}` cannot be written", name, self.type_name());
            return false;
        };
        let value = if desc.is::<Variant>() {
            Variant::new(value.clone())
        } else if value.descriptor() == Some(desc) {
            value.clone()
        } else {
            match value.converted(desc.id) {
                Some(converted) => converted,
                None => return false,
            }
        };
        let Some(src) = value.data() else {
            return false;
        };
        let Some(target) = self.data_mut() else {
            return false;
        };
        unsafe {
            let slot = target.field(field.offset);
            (desc.ops.drop_in_place)(slot);
            clone_into(src, slot.as_uninit());
        }
        true
    }
}
