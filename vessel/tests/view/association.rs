use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use vessel::{Variant, VariantMap};
use vessel_testhelpers::test;

fn scores() -> Variant {
    let mut map = BTreeMap::new();
    map.insert(String::from("ann"), 3i64);
    map.insert(String::from("bob"), 5i64);
    Variant::new(map)
}

#[test]
fn walking_entries_in_order() {
    let v = scores();
    let view = v.association().unwrap();
    assert_eq!(view.len(), 2);
    assert_eq!(view.key_descriptor().type_name(), "String");
    assert_eq!(view.value_descriptor().type_name(), "i64");

    let entries: Vec<(String, i64)> = view
        .iter()
        .map(|(k, v)| (k.get::<String>().unwrap().clone(), *v.get::<i64>().unwrap()))
        .collect();
    assert_eq!(entries, [("ann".into(), 3), ("bob".into(), 5)]);
    let keys: Vec<Variant> = view.keys().map(|k| k.to_variant()).collect();
    assert_eq!(keys[1], Variant::new(String::from("bob")));
}

#[test]
fn keys_must_match_exactly() {
    let v = scores();
    let view = v.association().unwrap();
    assert_eq!(view.value(&Variant::new(String::from("bob"))), Variant::new(5i64));
    assert!(view.contains_key(&Variant::new(String::from("ann"))));
    assert!(!view.contains_key(&Variant::new(String::from("cid"))));

    let mut ids = HashMap::new();
    ids.insert(7u32, String::from("seven"));
    let v = Variant::new(ids);
    let view = v.association().unwrap();
    assert!(view.find(&Variant::new(7u32)).is_some());
    assert!(view.find(&Variant::new(7i32)).is_none());
    assert!(!view.value(&Variant::new(7u64)).is_valid());
}

#[test]
fn setting_and_removing() {
    let mut v = scores();
    let copy = v.clone();
    let mut view = v.association_mut().unwrap();
    let cid = Variant::new(String::from("cid"));
    assert!(view.set_value(&cid, &Variant::new(String::from("8"))));
    assert!(view.set_value(&Variant::new(String::from("ann")), &Variant::new(4u8)));
    assert!(!view.set_value(&Variant::new(1i32), &Variant::new(1i64)));
    let dan = Variant::new(String::from("dan"));
    assert!(!view.set_value(&dan, &Variant::new(String::from("x"))));
    assert!(view.remove_key(&Variant::new(String::from("bob"))));
    assert!(!view.remove_key(&Variant::new(String::from("bob"))));
    assert_eq!(view.len(), 2);

    let map = v.extract_as::<BTreeMap<String, i64>>();
    assert_eq!(map, BTreeMap::from([("ann".into(), 4), ("cid".into(), 8)]));
    assert_eq!(copy.association().unwrap().len(), 2);
    let old = copy.association().unwrap().value(&Variant::new(String::from("ann")));
    assert_eq!(old, Variant::new(3i64));
}

#[test]
fn variant_maps_wrap_values() {
    let mut v = Variant::new(VariantMap::new());
    let mut view = v.association_mut().unwrap();
    assert!(view.set_value(&Variant::new(String::from("n")), &Variant::new(1.5f32)));
    let found = v.association().unwrap().value(&Variant::new(String::from("n")));
    assert_eq!(found.type_name(), Some("f32"));
}

#[test]
fn insertion_order_is_kept() {
    let mut v = Variant::new(IndexMap::<String, u8>::new());
    let mut view = v.association_mut().unwrap();
    for key in ["z", "a", "m"] {
        assert!(view.set_value(&Variant::new(key.to_string()), &Variant::new(0u8)));
    }
    assert!(view.remove_key(&Variant::new(String::from("a"))));
    let keys: Vec<String> = v
        .association()
        .unwrap()
        .keys()
        .map(|k| k.get::<String>().unwrap().clone())
        .collect();
    assert_eq!(keys, ["z", "m"]);
}

#[test]
fn non_maps_have_no_view() {
    assert!(Variant::new(vec![1u8]).association().is_none());
    assert!(Variant::invalid().association_mut().is_none());
}
