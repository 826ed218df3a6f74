use std::thread;

use vessel_core::{
    Builtin, Describe, MetaId, TypeDescriptor, TypeFlags, TypeRegistry, descriptor_of, describe,
    id_of, lookup_by_id, lookup_by_name, register_type,
};
use vessel_testhelpers::test;

#[derive(Clone, Debug, Default, PartialEq)]
struct Meters(f64);

describe!(Meters => Default, Clone, PartialEq, Debug);

struct Foo<T>(T);

unsafe impl<T: Describe> Describe for Foo<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>(format!("Foo<{}>", descriptor_of::<T>().name)).build()
    }
}

/// Hands out a descriptor built for another type.
struct Mislabeled(u8);

unsafe impl Describe for Mislabeled {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<String>("Mislabeled").build()
    }
}

#[test]
#[should_panic(expected = "was not built for")]
fn descriptors_of_another_type_are_refused() {
    register_type::<Mislabeled>();
}

#[test]
fn registration_is_idempotent() {
    let first = register_type::<Meters>();
    let second = register_type::<Meters>();
    assert_eq!(first, second);
    assert!(first >= MetaId::FIRST_USER);
    assert!(core::ptr::eq(descriptor_of::<Meters>(), lookup_by_id(first).unwrap()));
}

#[test]
fn concurrent_registration_converges() {
    let ids: Vec<MetaId> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(register_type::<Foo<u16>>))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn builtins_have_reserved_ids() {
    assert_eq!(id_of::<i32>(), Builtin::I32.id());
    assert_eq!(id_of::<String>(), Builtin::String.id());
    assert_eq!(id_of::<Vec<String>>(), Builtin::StringList.id());
    assert_eq!(lookup_by_name("bool"), Builtin::Bool.id());
    assert_eq!(lookup_by_name("Bytes"), Builtin::Bytes.id());
}

#[test]
fn names_are_normalized_before_lookup() {
    let id = register_type::<Foo<i32>>();
    assert_eq!(descriptor_of::<Foo<i32>>().type_name(), "Foo<i32>");
    assert_eq!(lookup_by_name("Foo<i32 >"), id);
    assert_eq!(lookup_by_name("Foo< i32>"), id);
    assert_eq!(lookup_by_name("const Foo<i32>"), id);
    assert_eq!(lookup_by_name("Foo<i32>"), id);
}

#[test]
fn unknown_lookups_give_sentinels() {
    assert_eq!(lookup_by_name("NeverRegistered"), MetaId::INVALID);
    assert!(lookup_by_id(MetaId::INVALID).is_none());
    assert!(lookup_by_id(MetaId::from_raw(0x7fff_0000)).is_none());
    // a second miss for the same id stays quiet but still misses
    assert!(lookup_by_id(MetaId::from_raw(0x7fff_0000)).is_none());
}

#[test]
fn aliases_resolve_to_their_target() {
    let registry = TypeRegistry::global();
    let id = register_type::<Foo<u8>>();
    registry.register_alias("Octets", id).unwrap();
    registry.register_alias("Octets", id).unwrap();
    assert_eq!(lookup_by_name("Octets"), id);
    assert!(registry.register_alias("Octets", id_of::<u8>()).is_err());
    assert!(registry.register_alias("Ghost", MetaId::from_raw(0x7ffe_0000)).is_err());
}

mod shadow {
    use vessel_core::describe;

    #[derive(Clone, Default)]
    pub struct Meters;

    describe!(Meters as "Meters" => Default, Clone);
}

#[test]
fn name_collisions_keep_the_first_type() {
    let first = register_type::<Meters>();
    let second = register_type::<shadow::Meters>();
    assert_ne!(first, second);
    assert_eq!(lookup_by_name("Meters"), first);
    assert_eq!(lookup_by_id(second).unwrap().type_name(), "Meters");
}

#[test]
fn flags_follow_the_declared_traits() {
    let flags = descriptor_of::<Meters>().flags;
    assert!(flags.contains(TypeFlags::RELOCATABLE | TypeFlags::NEEDS_COPY_CONSTRUCTION));
    assert!(!flags.contains(TypeFlags::NEEDS_MOVE_CONSTRUCTION));
    assert!(!flags.contains(TypeFlags::NEEDS_DESTRUCTION));
    assert!(descriptor_of::<String>().flags.contains(TypeFlags::NEEDS_DESTRUCTION));
    assert!(!descriptor_of::<u64>().flags.contains(TypeFlags::NEEDS_COPY_CONSTRUCTION));
}
