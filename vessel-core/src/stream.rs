//! Binary data stream used to persist values.
//!
//! Every value is written in the stream's [`ByteOrder`] (big-endian unless
//! asked otherwise). Variable-length data is prefixed with its length as a
//! `u32`. Readers never panic on short or malformed input: they record a
//! [`StreamStatus`] and return `None`.

use alloc::string::String;
use alloc::vec::Vec;

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Byte order of multi-byte values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first
    #[default]
    BigEndian,
    /// Least significant byte first
    LittleEndian,
}

/// Version of the stream layout. Types may change their payload between
/// versions; readers must be given the version the data was written with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamVersion(pub u32);

impl StreamVersion {
    /// First layout. `Uuid` is written as its `(u32, u16, u16, [u8; 8])` fields.
    pub const V1: StreamVersion = StreamVersion(1);
    /// `Uuid` is written as 16 raw bytes.
    pub const V2: StreamVersion = StreamVersion(2);
    /// The version new streams use.
    pub const CURRENT: StreamVersion = StreamVersion::V2;
}

impl Default for StreamVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// Health of a [`StreamReader`] or a [`StreamWriter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamStatus {
    /// Every read or write so far succeeded.
    #[default]
    Ok,
    /// A read needed more bytes than were left.
    ReadPastEnd,
    /// The bytes did not form a valid value, or values nested too deep.
    ReadCorruptData,
    /// A length did not fit in its `u32` prefix. Nothing is written after it.
    WriteFailed,
}

/// Values that know how to write and read their own payload.
pub trait Streamable: Sized {
    /// Write `self` to `out`.
    fn save(&self, out: &mut StreamWriter);

    /// Read a value, or `None` on failure. Implementations report failures
    /// through the reader's status.
    fn load(input: &mut StreamReader) -> Option<Self>;
}

/// Writes values into a growable buffer.
#[derive(Debug, Default)]
pub struct StreamWriter {
    buf: BytesMut,
    order: ByteOrder,
    version: StreamVersion,
    status: StreamStatus,
}

macro_rules! put_methods {
    ($($(#[$meta:meta])* $name:ident($ty:ty) => $be:ident, $le:ident;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self, value: $ty) {
                if self.status != StreamStatus::Ok {
                    return;
                }
                match self.order {
                    ByteOrder::BigEndian => self.buf.$be(value),
                    ByteOrder::LittleEndian => self.buf.$le(value),
                }
            }
        )*
    };
}

impl StreamWriter {
    /// A big-endian writer for the current version.
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer with an explicit byte order and version.
    pub fn with_options(order: ByteOrder, version: StreamVersion) -> Self {
        Self {
            buf: BytesMut::new(),
            order,
            version,
            status: StreamStatus::Ok,
        }
    }

    /// Byte order in use.
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Version being written.
    pub fn version(&self) -> StreamVersion {
        self.version
    }

    /// Health of the stream. Once a write failed, every later write is
    /// ignored.
    pub fn status(&self) -> StreamStatus {
        self.status
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing was written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write one byte.
    pub fn write_u8(&mut self, value: u8) {
        self.write_raw(&[value]);
    }

    /// Write one signed byte.
    pub fn write_i8(&mut self, value: i8) {
        self.write_raw(&value.to_ne_bytes());
    }

    /// Write a bool as one byte.
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    put_methods! {
        /// Write a `u16`.
        write_u16(u16) => put_u16, put_u16_le;
        /// Write an `i16`.
        write_i16(i16) => put_i16, put_i16_le;
        /// Write a `u32`.
        write_u32(u32) => put_u32, put_u32_le;
        /// Write an `i32`.
        write_i32(i32) => put_i32, put_i32_le;
        /// Write a `u64`.
        write_u64(u64) => put_u64, put_u64_le;
        /// Write an `i64`.
        write_i64(i64) => put_i64, put_i64_le;
        /// Write an `f32`.
        write_f32(f32) => put_f32, put_f32_le;
        /// Write an `f64`.
        write_f64(f64) => put_f64, put_f64_le;
    }

    /// Write a collection length. Returns `false` when the stream failed,
    /// in which case the items must not be written either.
    ///
    /// A length above `u32::MAX` fails the stream with
    /// [`StreamStatus::WriteFailed`].
    pub fn write_len(&mut self, len: usize) -> bool {
        if self.status != StreamStatus::Ok {
            return false;
        }
        match u32::try_from(len) {
            Ok(len) => {
                self.write_u32(len);
                true
            }
            Err(_) => {
                crate::warn!("length {} does not fit in a stream, writing stopped", len);
                self.status = StreamStatus::WriteFailed;
                false
            }
        }
    }

    /// Write raw bytes with no length prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        if self.status == StreamStatus::Ok {
            self.buf.put_slice(bytes);
        }
    }

    /// Write a length-prefixed byte string.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.write_len(bytes.len()) {
            self.write_raw(bytes);
        }
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Everything written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Finish writing.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Reads values back out of a buffer.
#[derive(Debug, Clone)]
pub struct StreamReader {
    buf: Bytes,
    order: ByteOrder,
    version: StreamVersion,
    status: StreamStatus,
    depth: u32,
}

macro_rules! get_methods {
    ($($(#[$meta:meta])* $name:ident($ty:ty) => $be:ident, $le:ident;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self) -> Option<$ty> {
                if !self.ensure(core::mem::size_of::<$ty>()) {
                    return None;
                }
                Some(match self.order {
                    ByteOrder::BigEndian => self.buf.$be(),
                    ByteOrder::LittleEndian => self.buf.$le(),
                })
            }
        )*
    };
}

impl StreamReader {
    /// A big-endian reader for the current version.
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self::with_options(buf, ByteOrder::default(), StreamVersion::CURRENT)
    }

    /// A reader with an explicit byte order and version.
    pub fn with_options(buf: impl Into<Bytes>, order: ByteOrder, version: StreamVersion) -> Self {
        Self {
            buf: buf.into(),
            order,
            version,
            status: StreamStatus::Ok,
            depth: 0,
        }
    }

    /// How deep [`StreamReader::nested`] calls may go.
    pub const MAX_DEPTH: u32 = 128;

    /// Byte order in use.
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Version being read.
    pub fn version(&self) -> StreamVersion {
        self.version
    }

    /// Health of the stream.
    pub fn status(&self) -> StreamStatus {
        self.status
    }

    /// Record a failure. The first failure sticks.
    pub fn set_status(&mut self, status: StreamStatus) {
        if self.status == StreamStatus::Ok {
            self.status = status;
        }
    }

    /// Record corrupt data and return `None`, for use in `load` impls.
    pub fn corrupt<T>(&mut self) -> Option<T> {
        self.set_status(StreamStatus::ReadCorruptData);
        None
    }

    /// Run `f` one nesting level deeper, for values that contain values of
    /// a type only known from the stream.
    ///
    /// Past [`Self::MAX_DEPTH`] levels `f` is not run: the data is marked
    /// corrupt and `None` is returned.
    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        if self.depth >= Self::MAX_DEPTH {
            crate::warn!("values nested deeper than {} levels", Self::MAX_DEPTH);
            return self.corrupt();
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        Some(result)
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Whether everything was consumed.
    pub fn at_end(&self) -> bool {
        !self.buf.has_remaining()
    }

    fn ensure(&mut self, needed: usize) -> bool {
        if self.status != StreamStatus::Ok {
            return false;
        }
        if self.buf.remaining() < needed {
            self.set_status(StreamStatus::ReadPastEnd);
            return false;
        }
        true
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Option<u8> {
        self.ensure(1).then(|| self.buf.get_u8())
    }

    /// Read one signed byte.
    pub fn read_i8(&mut self) -> Option<i8> {
        self.ensure(1).then(|| self.buf.get_i8())
    }

    /// Read a bool. Bytes other than 0 and 1 are corrupt data.
    pub fn read_bool(&mut self) -> Option<bool> {
        match self.read_u8()? {
            0 => Some(false),
            1 => Some(true),
            _ => self.corrupt(),
        }
    }

    get_methods! {
        /// Read a `u16`.
        read_u16(u16) => get_u16, get_u16_le;
        /// Read an `i16`.
        read_i16(i16) => get_i16, get_i16_le;
        /// Read a `u32`.
        read_u32(u32) => get_u32, get_u32_le;
        /// Read an `i32`.
        read_i32(i32) => get_i32, get_i32_le;
        /// Read a `u64`.
        read_u64(u64) => get_u64, get_u64_le;
        /// Read an `i64`.
        read_i64(i64) => get_i64, get_i64_le;
        /// Read an `f32`.
        read_f32(f32) => get_f32, get_f32_le;
        /// Read an `f64`.
        read_f64(f64) => get_f64, get_f64_le;
    }

    /// Read a collection length.
    pub fn read_len(&mut self) -> Option<usize> {
        self.read_u32().map(|len| len as usize)
    }

    /// Read exactly `len` raw bytes.
    pub fn read_raw(&mut self, len: usize) -> Option<Bytes> {
        self.ensure(len).then(|| self.buf.split_to(len))
    }

    /// Read a length-prefixed byte string.
    pub fn read_bytes(&mut self) -> Option<Bytes> {
        let len = self.read_len()?;
        self.read_raw(len)
    }

    /// Read a length-prefixed UTF-8 string. Invalid UTF-8 is corrupt data.
    pub fn read_string(&mut self) -> Option<String> {
        let bytes = self.read_bytes()?;
        match String::from_utf8(Vec::from(bytes.as_ref())) {
            Ok(s) => Some(s),
            Err(_) => self.corrupt(),
        }
    }
}
