use crate::{
    Builtin, Describe, Number, NumericDef, NumericKind, PtrConst, PtrUninit, StreamReader,
    StreamWriter, Streamable, TypeDescriptor,
};

unsafe fn int_to_number<T>(value: PtrConst) -> Number
where
    T: Copy + TryInto<i128>,
{
    // every supported integer type fits in i128
    Number::Int((*unsafe { value.get::<T>() }).try_into().unwrap_or_default())
}

unsafe fn int_from_number<T>(number: Number, target: PtrUninit) -> bool
where
    T: TryFrom<i128>,
{
    let Some(value) = number.to_int_rounded().and_then(|i| T::try_from(i).ok()) else {
        return false;
    };
    unsafe { target.put(value) };
    true
}

macro_rules! impl_describe_for_integer {
    ($($ty:ty => $builtin:ident, $kind:ident, $wire:ty, $write:ident, $read:ident;)*) => {$(
        impl Streamable for $ty {
            fn save(&self, out: &mut StreamWriter) {
                out.$write(*self as $wire);
            }

            fn load(input: &mut StreamReader) -> Option<Self> {
                let wire = input.$read()?;
                match <$ty>::try_from(wire) {
                    Ok(value) => Some(value),
                    Err(_) => input.corrupt(),
                }
            }
        }

        unsafe impl Describe for $ty {
            fn describe() -> TypeDescriptor {
                unsafe {
                    TypeDescriptor::builder::<$ty>(stringify!($ty))
                        .builtin(Builtin::$builtin)
                        .numeric(NumericDef {
                            kind: NumericKind::$kind,
                            to_number: int_to_number::<$ty>,
                            from_number: int_from_number::<$ty>,
                        })
                }
                .plain()
                .with_ord()
                .with_debug()
                .with_display()
                .with_parse()
                .with_stream()
                .build()
            }
        }
    )*};
}

impl_describe_for_integer! {
    i8 => I8, Signed, i8, write_i8, read_i8;
    i16 => I16, Signed, i16, write_i16, read_i16;
    i32 => I32, Signed, i32, write_i32, read_i32;
    i64 => I64, Signed, i64, write_i64, read_i64;
    isize => Isize, Signed, i64, write_i64, read_i64;
    u8 => U8, Unsigned, u8, write_u8, read_u8;
    u16 => U16, Unsigned, u16, write_u16, read_u16;
    u32 => U32, Unsigned, u32, write_u32, read_u32;
    u64 => U64, Unsigned, u64, write_u64, read_u64;
    usize => Usize, Unsigned, u64, write_u64, read_u64;
}

unsafe fn float_to_number<T: Copy + Into<f64>>(value: PtrConst) -> Number {
    Number::Float((*unsafe { value.get::<T>() }).into())
}

unsafe fn f32_from_number(number: Number, target: PtrUninit) -> bool {
    unsafe { target.put(number.as_f64() as f32) };
    true
}

unsafe fn f64_from_number(number: Number, target: PtrUninit) -> bool {
    unsafe { target.put(number.as_f64()) };
    true
}

macro_rules! impl_describe_for_float {
    ($($ty:ty => $builtin:ident, $from_number:ident, $write:ident, $read:ident;)*) => {$(
        impl Streamable for $ty {
            fn save(&self, out: &mut StreamWriter) {
                out.$write(*self);
            }

            fn load(input: &mut StreamReader) -> Option<Self> {
                input.$read()
            }
        }

        unsafe impl Describe for $ty {
            fn describe() -> TypeDescriptor {
                unsafe {
                    TypeDescriptor::builder::<$ty>(stringify!($ty))
                        .builtin(Builtin::$builtin)
                        .numeric(NumericDef {
                            kind: NumericKind::Float,
                            to_number: float_to_number::<$ty>,
                            from_number: $from_number,
                        })
                }
                .plain()
                .with_ord()
                .with_debug()
                .with_display()
                .with_parse()
                .with_stream()
                .build()
            }
        }
    )*};
}

impl_describe_for_float! {
    f32 => F32, f32_from_number, write_f32, read_f32;
    f64 => F64, f64_from_number, write_f64, read_f64;
}

unsafe fn bool_to_number(value: PtrConst) -> Number {
    Number::Int(*unsafe { value.get::<bool>() } as i128)
}

unsafe fn bool_from_number(number: Number, target: PtrUninit) -> bool {
    unsafe { target.put(!number.is_zero()) };
    true
}

impl Streamable for bool {
    fn save(&self, out: &mut StreamWriter) {
        out.write_bool(*self);
    }

    fn load(input: &mut StreamReader) -> Option<Self> {
        input.read_bool()
    }
}

unsafe impl Describe for bool {
    fn describe() -> TypeDescriptor {
        unsafe {
            TypeDescriptor::builder::<bool>("bool")
                .builtin(Builtin::Bool)
                .numeric(NumericDef {
                    kind: NumericKind::Bool,
                    to_number: bool_to_number,
                    from_number: bool_from_number,
                })
        }
        .plain()
        .with_ord()
        .with_debug()
        .with_display()
        .with_parse()
        .with_stream()
        .build()
    }
}

impl Streamable for char {
    fn save(&self, out: &mut StreamWriter) {
        out.write_u32(*self as u32);
    }

    fn load(input: &mut StreamReader) -> Option<Self> {
        let code = input.read_u32()?;
        match char::from_u32(code) {
            Some(c) => Some(c),
            None => input.corrupt(),
        }
    }
}

unsafe impl Describe for char {
    fn describe() -> TypeDescriptor {
        unsafe { TypeDescriptor::builder::<char>("char").builtin(Builtin::Char) }
            .plain()
            .with_ord()
            .with_debug()
            .with_display()
            .with_parse()
            .with_stream()
            .build()
    }
}

impl Streamable for () {
    fn save(&self, _out: &mut StreamWriter) {}

    fn load(_input: &mut StreamReader) -> Option<Self> {
        Some(())
    }
}

unsafe impl Describe for () {
    fn describe() -> TypeDescriptor {
        unsafe { TypeDescriptor::builder::<()>("()").builtin(Builtin::Unit) }
            .plain()
            .with_ord()
            .with_debug()
            .with_stream()
            .build()
    }
}
