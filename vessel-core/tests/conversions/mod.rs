use core::mem::MaybeUninit;

use vessel_core::{
    ConversionRegistry, ConverterKind, Describe, PtrConst, PtrMut, PtrUninit, RegistrationError,
    describe, id_of,
};
use vessel_testhelpers::test;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Celsius(f64);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Kelvin(f64);

describe!(Celsius => Default, Copy, PartialEq, Debug);
describe!(Kelvin => Default, Copy, PartialEq, Debug);

#[derive(Clone, Debug, Default)]
struct Reading {
    kelvin: Kelvin,
}

describe!(Reading => Default, Clone);

fn run<S: Describe, T: Describe>(registry: &ConversionRegistry, value: &S) -> Option<T> {
    let converter = registry.get(id_of::<S>(), id_of::<T>())?;
    let mut out = MaybeUninit::<T>::uninit();
    let done = unsafe {
        converter.convert(PtrConst::new(value), PtrUninit::from_maybe_uninit(&mut out))
    };
    done.then(|| unsafe { out.assume_init() })
}

#[test]
fn direct_and_fallible_converters() {
    let registry = ConversionRegistry::default();
    registry
        .register::<Celsius, Kelvin, _>(|c| Kelvin(c.0 + 273.15))
        .unwrap();
    registry
        .register_fallible::<Kelvin, Celsius, _>(|k| (k.0 >= 0.0).then(|| Celsius(k.0 - 273.15)))
        .unwrap();

    let forward = registry.get(id_of::<Celsius>(), id_of::<Kelvin>()).unwrap();
    assert_eq!(forward.kind, ConverterKind::Direct);
    assert_eq!(run::<Celsius, Kelvin>(&registry, &Celsius(0.0)), Some(Kelvin(273.15)));
    assert_eq!(run::<Kelvin, Celsius>(&registry, &Kelvin(-1.0)), None);
    assert!(registry.contains(id_of::<Kelvin>(), id_of::<Celsius>()));
}

#[test]
fn duplicates_are_rejected_and_the_first_stays() {
    let registry = ConversionRegistry::default();
    registry
        .register::<Celsius, Kelvin, _>(|c| Kelvin(c.0 + 273.15))
        .unwrap();
    let err = registry
        .register::<Celsius, Kelvin, _>(|_| Kelvin(0.0))
        .unwrap_err();
    assert_eq!(
        err,
        RegistrationError::DuplicateConverter {
            from: id_of::<Celsius>(),
            to: id_of::<Kelvin>(),
        }
    );
    assert_eq!(run::<Celsius, Kelvin>(&registry, &Celsius(1.0)), Some(Kelvin(274.15)));
}

#[test]
fn unregistering_frees_the_pair() {
    let registry = ConversionRegistry::default();
    registry.register::<Kelvin, f64, _>(|k| k.0).unwrap();
    let held = registry.get(id_of::<Kelvin>(), id_of::<f64>()).unwrap();
    assert!(registry.unregister(id_of::<Kelvin>(), id_of::<f64>()));
    assert!(!registry.unregister(id_of::<Kelvin>(), id_of::<f64>()));

    // handles taken before the removal keep working
    let mut out = MaybeUninit::<f64>::uninit();
    assert!(unsafe {
        held.convert(PtrConst::new(&Kelvin(3.0)), PtrUninit::from_maybe_uninit(&mut out))
    });
    assert_eq!(unsafe { out.assume_init() }, 3.0);

    registry.register::<Kelvin, f64, _>(|k| k.0 * 2.0).unwrap();
}

#[test]
fn mutable_views_alias_the_source() {
    let registry = ConversionRegistry::default();
    registry
        .register_mutable_view::<Reading, Kelvin>(|r| &mut r.kelvin)
        .unwrap();
    assert!(matches!(
        registry.register_mutable_view::<Reading, Kelvin>(|r| &mut r.kelvin),
        Err(RegistrationError::DuplicateMutableView { .. })
    ));

    let mut reading = Reading::default();
    let view = registry.mutable_view(id_of::<Reading>(), id_of::<Kelvin>()).unwrap();
    let kelvin = unsafe { view.project(PtrMut::new(&mut reading)).as_mut::<Kelvin>() };
    kelvin.0 = 5.0;
    assert_eq!(reading.kelvin, Kelvin(5.0));
}

#[test]
fn global_queries() {
    assert!(!vessel_core::has_converter(id_of::<Reading>(), id_of::<Celsius>()));
    vessel_core::register_converter::<Reading, Celsius, _>(|r| Celsius(r.kelvin.0 - 273.15))
        .unwrap();
    assert!(vessel_core::has_converter(id_of::<Reading>(), id_of::<Celsius>()));
    assert!(!vessel_core::has_mutable_view(id_of::<Reading>(), id_of::<Celsius>()));
}
