use vessel::{
    MetaId, RegistrationError, Variant, describe, has_converter, id_of, register_converter,
    register_fallible_converter, unregister_converter,
};
use vessel_testhelpers::test;

#[derive(Clone, Debug, Default, PartialEq)]
struct Percent(u8);

describe!(Percent => Default, Clone, PartialEq, Debug);

#[derive(Clone, Debug, Default, PartialEq)]
struct Ratio(f32);

describe!(Ratio => Default, Clone, PartialEq, Debug);

#[derive(Clone, Debug, Default, PartialEq)]
struct Label(String);

describe!(Label => Default, Clone, PartialEq, Debug);

#[derive(Clone, Debug, Default, PartialEq)]
struct Code(u16);

describe!(Code => Default, Clone, PartialEq, Debug);

#[test]
fn fallible_converters_can_refuse() {
    register_fallible_converter::<Ratio, Percent, _>(|r| {
        (0.0..=1.0).contains(&r.0).then(|| Percent((r.0 * 100.0).round() as u8))
    })
    .unwrap();

    assert_eq!(Variant::new(Ratio(0.25)).to::<Percent>(), Some(Percent(25)));
    assert!(Variant::new(Ratio(2.0)).can_convert_to::<Percent>());

    let mut v = Variant::new(Ratio(2.0));
    assert!(!v.convert_to::<Percent>());
    assert_eq!(v, Variant::new(Percent::default()));
}

#[test]
fn converters_to_options_always_succeed() {
    register_converter::<Label, Option<Code>, _>(|l| l.0.parse().ok().map(Code)).unwrap();

    assert_eq!(
        Variant::new(Label("12".into())).to::<Option<Code>>(),
        Some(Some(Code(12)))
    );
    let mut v = Variant::new(Label("twelve".into()));
    assert!(v.convert_to::<Option<Code>>());
    assert!(v.is_null());
}

#[test]
fn second_registration_is_rejected() {
    register_converter::<Code, Label, _>(|c| Label(c.0.to_string())).unwrap();
    let err = register_converter::<Code, Label, _>(|_| Label::default()).unwrap_err();
    assert_eq!(
        err,
        RegistrationError::DuplicateConverter {
            from: id_of::<Code>(),
            to: id_of::<Label>(),
        }
    );
    assert_eq!(Variant::new(Code(7)).to::<Label>(), Some(Label("7".into())));
}

#[test]
fn unregistered_pairs_stop_converting() {
    register_converter::<Percent, Ratio, _>(|p| Ratio(f32::from(p.0) / 100.0)).unwrap();
    assert!(has_converter(id_of::<Percent>(), id_of::<Ratio>()));
    assert!(Variant::new(Percent(50)).can_convert_to::<Ratio>());

    assert!(unregister_converter(id_of::<Percent>(), id_of::<Ratio>()));
    assert!(!Variant::new(Percent(50)).can_convert_to::<Ratio>());
    assert_eq!(Variant::new(Percent(50)).to::<Ratio>(), None);
}

#[test]
fn converting_by_unknown_id_fails() {
    let mut v = Variant::new(1u8);
    assert!(!v.can_convert(MetaId::from_raw(0x7ffc_0000)));
    assert!(!v.convert(MetaId::from_raw(0x7ffc_0000)));
    assert!(!v.is_valid());
}
