use vessel::{
    Describe, TypeDescriptor, Variant, describe, descriptor_of, lookup_by_name, register_converter,
    register_type,
};
use vessel_testhelpers::test;

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
struct Meters(f64);

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
struct Feet(f64);

describe!(Meters => Default, Copy, PartialOrd, Debug);
describe!(Feet => Default, Copy, PartialOrd, Debug);

const FEET_PER_METER: f64 = 3.280_839_895;

#[test]
fn int_extracts_and_converts_to_text() {
    let mut v = Variant::new(42i32);
    assert_eq!(v.extract_as::<i32>(), 42);
    assert!(v.convert_to::<String>());
    assert_eq!(v.try_extract_as::<String>().map(String::as_str), Some("42"));
}

#[test]
fn text_to_int_is_strict_but_floats_round() {
    assert_eq!(Variant::new("9.9".to_string()).to::<i32>(), None);
    assert_eq!(Variant::new(9.9f64).to::<i32>(), Some(10));
}

#[test]
fn registered_converters_round_trip() {
    register_converter::<Meters, Feet, _>(|m| Feet(m.0 * FEET_PER_METER)).unwrap();
    register_converter::<Feet, Meters, _>(|f| Meters(f.0 / FEET_PER_METER)).unwrap();

    let start = Variant::new(Meters(12.5));
    assert!(start.can_convert_to::<Feet>());
    let feet = start.to::<Feet>().unwrap();
    assert!((feet.0 - 41.010_498_687_5).abs() < 1e-6);

    let mut back = Variant::new(feet);
    assert!(back.convert_to::<Meters>());
    assert!((back.extract_as::<Meters>().0 - 12.5).abs() < 1e-9);
}

#[test]
fn values_without_equality_never_compare_equal() {
    #[derive(Clone, Default)]
    struct Opaque;
    describe!(Opaque => Default, Clone);

    let a = Variant::new(Opaque);
    let b = a.clone();
    assert_ne!(a, b);
    assert_eq!(a.compare(&b), None);
    assert_ne!(a, a.clone());
}

#[test]
fn heap_copies_are_independent_after_a_write() {
    #[derive(Clone, Debug, PartialEq)]
    struct Frame([u32; 32]);

    impl Default for Frame {
        fn default() -> Self {
            Frame([0; 32])
        }
    }

    describe!(Frame => Default, Clone, PartialEq, Debug);

    let original = Variant::new(Frame([7; 32]));
    assert!(!original.is_inline());
    let copies = [original.clone(), original.clone(), original.clone()];
    assert!(copies.iter().all(Variant::is_shared));

    let mut edited = copies[1].clone();
    let ptr = edited.data_mut().unwrap();
    unsafe { ptr.as_mut::<Frame>() }.0[0] = 99;

    assert_eq!(edited.try_extract_as::<Frame>().unwrap().0[0], 99);
    for copy in copies.iter().chain([&original]) {
        assert_eq!(copy.try_extract_as::<Frame>(), Some(&Frame([7; 32])));
    }
}

struct Foo<T>(T);

unsafe impl<T: Describe> Describe for Foo<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>(format!("Foo<{}>", descriptor_of::<T>().name)).build()
    }
}

#[test]
fn spelling_of_a_name_does_not_matter() {
    let id = register_type::<Foo<i32>>();
    assert_eq!(lookup_by_name("Foo<i32 >"), id);
    assert_eq!(lookup_by_name("Foo< i32>"), id);
    assert_eq!(lookup_by_name("Foo<i32>"), id);
}
