use uuid::Uuid;

use crate::{
    Builtin, Describe, StreamReader, StreamVersion, StreamWriter, Streamable, TypeDescriptor,
};

impl Streamable for Uuid {
    fn save(&self, out: &mut StreamWriter) {
        if out.version() < StreamVersion::V2 {
            let (d1, d2, d3, d4) = self.as_fields();
            out.write_u32(d1);
            out.write_u16(d2);
            out.write_u16(d3);
            out.write_raw(d4);
        } else {
            out.write_raw(self.as_bytes());
        }
    }

    fn load(input: &mut StreamReader) -> Option<Self> {
        if input.version() < StreamVersion::V2 {
            let d1 = input.read_u32()?;
            let d2 = input.read_u16()?;
            let d3 = input.read_u16()?;
            let tail = input.read_raw(8)?;
            let mut d4 = [0u8; 8];
            d4.copy_from_slice(&tail);
            Some(Uuid::from_fields(d1, d2, d3, &d4))
        } else {
            let raw = input.read_raw(16)?;
            match Uuid::from_slice(&raw) {
                Ok(uuid) => Some(uuid),
                Err(_) => input.corrupt(),
            }
        }
    }
}

unsafe impl Describe for Uuid {
    fn describe() -> TypeDescriptor {
        unsafe { TypeDescriptor::builder::<Uuid>("Uuid").builtin(Builtin::Uuid) }
            .plain()
            .with_ord()
            .with_debug()
            .with_display()
            .with_parse()
            .with_stream()
            .build()
    }
}
