use alloc::string::String;

use bytes::Bytes;

use crate::{Builtin, Describe, StreamReader, StreamWriter, Streamable, TypeDescriptor};

impl Streamable for String {
    fn save(&self, out: &mut StreamWriter) {
        out.write_str(self);
    }

    fn load(input: &mut StreamReader) -> Option<Self> {
        input.read_string()
    }
}

unsafe impl Describe for String {
    fn describe() -> TypeDescriptor {
        unsafe { TypeDescriptor::builder::<String>("String").builtin(Builtin::String) }
            .with_default()
            .with_clone()
            .with_ord()
            .with_debug()
            .with_display()
            .with_parse()
            .with_stream()
            .is_null_with(String::is_empty)
            .build()
    }
}

impl Streamable for Bytes {
    fn save(&self, out: &mut StreamWriter) {
        out.write_bytes(self);
    }

    fn load(input: &mut StreamReader) -> Option<Self> {
        input.read_bytes()
    }
}

unsafe impl Describe for Bytes {
    fn describe() -> TypeDescriptor {
        unsafe { TypeDescriptor::builder::<Bytes>("Bytes").builtin(Builtin::Bytes) }
            .with_default()
            .with_clone()
            .with_ord()
            .with_debug()
            .with_stream()
            .is_null_with(Bytes::is_empty)
            .build()
    }
}
