use uuid::Uuid;
use vessel::{
    Builtin, ByteOrder, MetaId, StreamError, StreamReader, StreamStatus, StreamVersion,
    StreamWriter, Streamable, USER_TYPE_TAG, Variant, VariantList, describe, id_of,
    lookup_by_name, register_type,
};
use vessel_testhelpers::test;

#[derive(Clone, Debug, Default, PartialEq)]
struct Version {
    major: u16,
    minor: u16,
}

impl Streamable for Version {
    fn save(&self, out: &mut StreamWriter) {
        out.write_u16(self.major);
        out.write_u16(self.minor);
    }

    fn load(input: &mut StreamReader) -> Option<Self> {
        Some(Version {
            major: input.read_u16()?,
            minor: input.read_u16()?,
        })
    }
}

describe!(Version => Default, Clone, PartialEq, Debug, Stream);

#[derive(Clone, Default)]
struct Scratch;

describe!(Scratch => Default, Clone);

/// Shares its name with the built-in byte buffer.
#[derive(Clone, Debug, Default, PartialEq)]
struct Bytes(u8);

impl Streamable for Bytes {
    fn save(&self, out: &mut StreamWriter) {
        out.write_u8(self.0);
    }

    fn load(input: &mut StreamReader) -> Option<Self> {
        input.read_u8().map(Bytes)
    }
}

describe!(Bytes as "Bytes" => Default, Clone, PartialEq, Debug, Stream);

#[test]
fn builtin_names_keep_loading_as_builtins() {
    let user = register_type::<Bytes>();
    assert!(user >= MetaId::FIRST_USER);
    assert_eq!(id_of::<bytes::Bytes>(), Builtin::Bytes.id());
    assert_eq!(lookup_by_name("Bytes"), Builtin::Bytes.id());

    let payload = bytes::Bytes::from_static(b"raw");
    let mut out = StreamWriter::new();
    Variant::new(payload.clone()).save(&mut out).unwrap();
    let mut expected = StreamWriter::new();
    expected.write_u32(Builtin::Bytes.id().raw());
    expected.write_bytes(&payload);
    assert_eq!(out.as_slice(), expected.as_slice());

    let mut input = StreamReader::new(out.into_bytes());
    assert_eq!(Variant::load(&mut input).try_extract_as::<bytes::Bytes>(), Some(&payload));
    assert_eq!(input.status(), StreamStatus::Ok);

    // its name would load back as the built-in
    let mut out = StreamWriter::new();
    assert!(matches!(
        Variant::new(Bytes(1)).save(&mut out),
        Err(StreamError::NotStreamable { .. })
    ));
    assert!(out.is_empty());
}

#[test]
fn user_types_are_tagged_by_name() {
    let mut out = StreamWriter::new();
    Variant::new(Version { major: 1, minor: 2 }).save(&mut out).unwrap();

    let mut expected = StreamWriter::new();
    expected.write_u32(USER_TYPE_TAG);
    expected.write_str("Version");
    expected.write_u16(1);
    expected.write_u16(2);
    assert_eq!(out.as_slice(), expected.as_slice());

    let mut input = StreamReader::new(out.into_bytes());
    assert_eq!(
        Variant::load(&mut input).try_extract_as::<Version>(),
        Some(&Version { major: 1, minor: 2 })
    );
}

#[test]
fn unstreamable_values_are_refused_before_writing() {
    let mut out = StreamWriter::new();
    let err = Variant::new(Scratch).save(&mut out).unwrap_err();
    assert_eq!(
        err,
        StreamError::NotStreamable {
            type_name: "Scratch".into()
        }
    );
    assert!(out.is_empty());
}

#[test]
fn invalid_variants_are_written_as_a_zero_tag() {
    let mut out = StreamWriter::new();
    Variant::invalid().save(&mut out).unwrap();
    assert_eq!(out.as_slice(), &[0, 0, 0, 0]);

    let mut input = StreamReader::new(out.into_bytes());
    assert!(!Variant::load(&mut input).is_valid());
    assert_eq!(input.status(), StreamStatus::Ok);
}

#[test]
fn nested_unstreamable_values_become_invalid() {
    let list = VariantList::from([Variant::new(1u8), Variant::new(Scratch), Variant::new(2u8)]);
    let mut out = StreamWriter::new();
    Variant::new(list).save(&mut out).unwrap();

    let mut input = StreamReader::new(out.into_bytes());
    let loaded = Variant::load(&mut input).extract_as::<VariantList>();
    assert_eq!(input.status(), StreamStatus::Ok);
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0], Variant::new(1u8));
    assert!(!loaded[1].is_valid());
    assert_eq!(loaded[2], Variant::new(2u8));
}

#[test]
fn uuid_layout_follows_the_version() {
    let id = Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);
    for version in [StreamVersion::V1, StreamVersion::V2] {
        let mut out = StreamWriter::with_options(ByteOrder::LittleEndian, version);
        Variant::new(id).save(&mut out).unwrap();
        let mut input =
            StreamReader::with_options(out.into_bytes(), ByteOrder::LittleEndian, version);
        assert_eq!(Variant::load(&mut input), Variant::new(id));
    }
}

#[test]
fn option_payloads() {
    for value in [Some(5i32), None] {
        let mut out = StreamWriter::new();
        Variant::new(value).save(&mut out).unwrap();
        let mut input = StreamReader::new(out.into_bytes());
        assert_eq!(Variant::load(&mut input).extract_as::<Option<i32>>(), value);
    }
}

#[test]
fn corrupt_payloads_leave_the_variant_invalid() {
    let mut out = StreamWriter::new();
    out.write_u32(vessel::Builtin::Bool.id().raw());
    out.write_u8(7);
    let mut input = StreamReader::new(out.into_bytes());
    assert!(!Variant::load(&mut input).is_valid());
    assert_eq!(input.status(), StreamStatus::ReadCorruptData);

    let mut out = StreamWriter::new();
    out.write_u32(40);
    let mut input = StreamReader::new(out.into_bytes());
    assert!(!Variant::load(&mut input).is_valid());
    assert_eq!(input.status(), StreamStatus::ReadCorruptData);
}
