use std::collections::{BTreeMap, HashMap, LinkedList, VecDeque};

use indexmap::IndexMap;
use vessel_core::{
    IterCapabilities, PtrConst, PtrMut, SizeCost, StringList, TypeDescriptor, describe,
    descriptor_of,
};
use vessel_testhelpers::test;

/// Element type that can be neither copied nor compared.
#[derive(Default)]
struct Token;

describe!(Token => Default);

fn walk(desc: &TypeDescriptor, value: PtrConst) -> Vec<PtrConst> {
    let iter = &desc.sequence().unwrap().vtable.iter;
    let mut items = Vec::new();
    unsafe {
        let state = (iter.init_with_value)(value);
        while let Some(item) = (iter.next)(state) {
            items.push(item);
        }
        (iter.dealloc)(state);
    }
    items
}

#[test]
fn sequence_shapes() {
    let vec = descriptor_of::<Vec<i32>>();
    assert_eq!(vec.type_name(), "Vec<i32>");
    let def = vec.sequence().unwrap();
    assert!(def.is_random_access() && def.is_bidirectional());
    assert_eq!(def.size_cost, SizeCost::Constant);
    assert!(core::ptr::eq(def.element, descriptor_of::<i32>()));

    let list = descriptor_of::<LinkedList<i32>>().sequence().unwrap();
    assert_eq!(
        list.capabilities,
        IterCapabilities::FORWARD | IterCapabilities::BIDIRECTIONAL
    );
    assert!(!list.is_random_access());
    assert!(list.vtable.get.is_none());

    assert!(descriptor_of::<VecDeque<i32>>().sequence().unwrap().is_random_access());
    assert!(descriptor_of::<BTreeMap<String, i32>>().sequence().is_none());
}

#[test]
fn hooks_follow_the_element() {
    let plain = descriptor_of::<Vec<i32>>();
    assert!(plain.has_clone() && plain.vtable.partial_cmp.is_some() && plain.is_streamable());

    let tokens = descriptor_of::<Vec<Token>>();
    assert!(!tokens.has_clone());
    assert!(tokens.vtable.partial_eq.is_none());
    assert!(!tokens.is_streamable());
    let def = tokens.sequence().unwrap();
    assert!(def.vtable.push_back.is_none());
    assert!(def.vtable.pop_back.is_some());
}

#[test]
fn sequence_vtable_edits_in_place() {
    let desc = descriptor_of::<VecDeque<i32>>();
    let def = desc.sequence().unwrap();
    let mut deque = VecDeque::from([2, 3]);
    let ptr = PtrMut::new(&mut deque);
    unsafe {
        assert!((def.vtable.push_front.unwrap())(ptr, PtrConst::new(&1)));
        assert!((def.vtable.push_back.unwrap())(ptr, PtrConst::new(&4)));
        assert_eq!((def.vtable.len)(ptr.as_const()), 4);
        assert_eq!((def.vtable.get.unwrap())(ptr.as_const(), 0).map(|p| *p.get::<i32>()), Some(1));
        assert!((def.vtable.get.unwrap())(ptr.as_const(), 9).is_none());
        *(def.vtable.get_mut.unwrap())(ptr, 3).unwrap().as_mut::<i32>() = 40;
        assert!((def.vtable.pop_front.unwrap())(ptr));
    }
    assert_eq!(deque, [2, 3, 40]);

    let items: Vec<i32> = walk(desc, PtrConst::new(&deque))
        .into_iter()
        .map(|item| unsafe { *item.get::<i32>() })
        .collect();
    assert_eq!(items, [2, 3, 40]);

    let mut empty = VecDeque::<i32>::new();
    assert!(!unsafe { (def.vtable.pop_back.unwrap())(PtrMut::new(&mut empty)) });
}

#[test]
fn association_shapes() {
    let btree = descriptor_of::<BTreeMap<String, i32>>();
    assert_eq!(btree.type_name(), "BTreeMap<String,i32>");
    let def = btree.association().unwrap();
    assert!(core::ptr::eq(def.key, descriptor_of::<String>()));
    assert!(core::ptr::eq(def.value, descriptor_of::<i32>()));

    assert_eq!(descriptor_of::<HashMap<u8, u8>>().type_name(), "HashMap<u8,u8>");
    assert!(descriptor_of::<HashMap<u8, u8>>().vtable.partial_cmp.is_none());
    assert!(descriptor_of::<HashMap<u8, Token>>().association().unwrap().vtable.insert.is_none());
}

#[test]
fn association_vtable_edits_in_place() {
    let def = descriptor_of::<IndexMap<String, i32>>().association().unwrap();
    let mut map = IndexMap::new();
    map.insert(String::from("b"), 2);
    let ptr = PtrMut::new(&mut map);
    let a = String::from("a");
    let b = String::from("b");
    unsafe {
        assert!((def.vtable.insert.unwrap())(ptr, PtrConst::new(&a), PtrConst::new(&1)));
        assert!((def.vtable.contains_key)(ptr.as_const(), PtrConst::new(&a)));
        assert_eq!(
            (def.vtable.get_value)(ptr.as_const(), PtrConst::new(&b)).map(|p| *p.get::<i32>()),
            Some(2)
        );
        assert!((def.vtable.remove.unwrap())(ptr, PtrConst::new(&b)));
        assert!(!(def.vtable.remove.unwrap())(ptr, PtrConst::new(&b)));
    }
    assert_eq!(map.into_iter().collect::<Vec<_>>(), [(String::from("a"), 1)]);
}

#[test]
fn string_list_is_a_vec_of_strings() {
    assert!(core::ptr::eq(descriptor_of::<StringList>(), descriptor_of::<Vec<String>>()));
    assert_eq!(descriptor_of::<StringList>().type_name(), "Vec<String>");
}

#[test]
fn options_are_null_when_empty() {
    let desc = descriptor_of::<Option<u8>>();
    assert_eq!(desc.type_name(), "Option<u8>");
    let is_null = desc.vtable.is_null.unwrap();
    assert!(unsafe { is_null(PtrConst::new(&None::<u8>)) });
    assert!(!unsafe { is_null(PtrConst::new(&Some(0u8))) });
    assert!(!descriptor_of::<Option<Token>>().has_clone());
}

#[test]
fn equality_hooks_compare_contents() {
    fn eq<T: vessel_core::Describe>(a: &T, b: &T) -> Option<bool> {
        unsafe { descriptor_of::<T>().eq_values(PtrConst::new(a), PtrConst::new(b)) }
    }

    assert_eq!(eq(&Some(3u8), &Some(3u8)), Some(true));
    assert_eq!(eq(&Some(3u8), &Some(4u8)), Some(false));
    assert_eq!(eq(&None::<u8>, &Some(4u8)), Some(false));

    assert_eq!(eq(&vec![1i32, 2], &vec![1, 2]), Some(true));
    assert_eq!(eq(&vec![1i32, 2], &vec![1, 3]), Some(false));
    assert_eq!(eq(&LinkedList::from([1u16]), &LinkedList::new()), Some(false));

    let a = BTreeMap::from([(String::from("k"), 1i64)]);
    let b = BTreeMap::from([(String::from("k"), 2i64)]);
    assert_eq!(eq(&a, &a.clone()), Some(true));
    assert_eq!(eq(&a, &b), Some(false));
    let c = HashMap::from([(1u8, String::from("x"))]);
    assert_eq!(eq(&c, &c.clone()), Some(true));
}
