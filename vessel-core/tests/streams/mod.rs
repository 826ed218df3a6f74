use core::mem::MaybeUninit;
use std::collections::BTreeMap;

use bytes::Bytes;
use vessel_core::{
    ByteOrder, PtrConst, PtrUninit, StreamReader, StreamStatus, StreamVersion, StreamWriter,
    Streamable, describe, descriptor_of,
};
use vessel_testhelpers::test;

#[derive(Clone, Debug, Default, PartialEq)]
struct Sample {
    channel: u8,
    level: f32,
}

impl Streamable for Sample {
    fn save(&self, out: &mut StreamWriter) {
        out.write_u8(self.channel);
        out.write_f32(self.level);
    }

    fn load(input: &mut StreamReader) -> Option<Self> {
        Some(Sample {
            channel: input.read_u8()?,
            level: input.read_f32()?,
        })
    }
}

describe!(Sample => Default, Clone, PartialEq, Debug, Stream);

#[test]
fn scalars_in_both_byte_orders() {
    for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
        let mut out = StreamWriter::with_options(order, StreamVersion::CURRENT);
        (-5i16).save(&mut out);
        2.5f64.save(&mut out);
        'λ'.save(&mut out);
        true.save(&mut out);
        String::from("hé").save(&mut out);

        let mut input = StreamReader::with_options(out.into_bytes(), order, StreamVersion::CURRENT);
        assert_eq!(i16::load(&mut input), Some(-5));
        assert_eq!(f64::load(&mut input), Some(2.5));
        assert_eq!(char::load(&mut input), Some('λ'));
        assert_eq!(bool::load(&mut input), Some(true));
        assert_eq!(String::load(&mut input).as_deref(), Some("hé"));
        assert!(input.at_end());
    }
}

#[test]
fn descriptor_hooks_round_trip_containers() {
    let desc = descriptor_of::<BTreeMap<String, Vec<Option<Sample>>>>();
    assert!(desc.is_streamable());

    let mut value = BTreeMap::new();
    value.insert(
        String::from("left"),
        vec![Some(Sample { channel: 1, level: 0.5 }), None],
    );
    value.insert(String::from("right"), Vec::new());

    let mut out = StreamWriter::new();
    unsafe { (desc.vtable.save.unwrap())(PtrConst::new(&value), &mut out) };

    let mut input = StreamReader::new(out.into_bytes());
    let mut loaded = MaybeUninit::<BTreeMap<String, Vec<Option<Sample>>>>::uninit();
    let load = desc.vtable.load.unwrap();
    assert!(unsafe { load(&mut input, PtrUninit::from_maybe_uninit(&mut loaded)) });
    assert_eq!(unsafe { loaded.assume_init() }, value);
    assert_eq!(input.status(), StreamStatus::Ok);
}

#[test]
fn bad_payloads_set_the_status() {
    let mut input = StreamReader::new(Bytes::from_static(&[2]));
    assert_eq!(bool::load(&mut input), None);
    assert_eq!(input.status(), StreamStatus::ReadCorruptData);

    let mut input = StreamReader::new(Bytes::from_static(&[0, 0, 0xd8, 0x00]));
    assert_eq!(char::load(&mut input), None);
    assert_eq!(input.status(), StreamStatus::ReadCorruptData);

    let mut input = StreamReader::new(Bytes::from_static(&[7]));
    assert_eq!(Sample::load(&mut input), None);
    assert_eq!(input.status(), StreamStatus::ReadPastEnd);
}

#[test]
fn unstreamable_elements_make_the_container_unstreamable() {
    #[derive(Clone, Default)]
    struct Opaque;
    describe!(Opaque => Default, Clone);

    assert!(!descriptor_of::<Opaque>().is_streamable());
    assert!(!descriptor_of::<Vec<Opaque>>().is_streamable());
    assert!(!descriptor_of::<Option<Opaque>>().is_streamable());
}
