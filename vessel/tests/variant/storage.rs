use vessel::{
    Describe, MetaId, PtrConst, TypeDescriptor, Variant, describe, id_of, register_mutable_view,
};
use vessel_testhelpers::{LiveCount, test};

/// Counts live instances, so leaks and double drops show up. Every test
/// brings its own counter.
#[derive(Debug)]
struct Tracked {
    fill: [u64; 4],
    live: &'static LiveCount,
}

static UNCOUNTED: LiveCount = LiveCount::new();

impl Tracked {
    fn new(fill: u64, live: &'static LiveCount) -> Self {
        live.created();
        Tracked {
            fill: [fill; 4],
            live,
        }
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.fill == other.fill
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Tracked::new(self.fill[0], self.live)
    }
}

impl Default for Tracked {
    fn default() -> Self {
        Tracked::new(0, &UNCOUNTED)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.live.dropped();
    }
}

describe!(Tracked => Default, Clone, PartialEq, Debug);

#[test]
fn every_instance_is_dropped_once() {
    static LIVE: LiveCount = LiveCount::new();
    {
        let mut a = Variant::new(Tracked::new(1, &LIVE));
        let b = a.clone();
        let c = b.clone();
        assert_eq!(LIVE.live(), 1);

        a.try_extract_as_mut::<Tracked>().unwrap().fill[0] = 2;
        assert_eq!(LIVE.live(), 2);
        drop(b);
        assert!(!c.is_shared());

        a.emplace(Tracked::new(3, &LIVE));
        assert_eq!(LIVE.live(), 2);
        let moved = a.take();
        assert!(!a.is_valid());
        assert_eq!(moved.into_value::<Tracked>().unwrap().fill[0], 3);
    }
    assert_eq!(LIVE.live(), 0);
}

#[test]
fn shared_values_detach_per_thread() {
    static LIVE: LiveCount = LiveCount::new();
    const THREADS: u64 = 8;

    let original = Variant::new(Tracked::new(7, &LIVE));
    assert!(!original.is_inline());

    std::thread::scope(|scope| {
        for n in 0..THREADS {
            let mut copy = original.clone();
            scope.spawn(move || {
                for round in 0..100 {
                    let value = copy.try_extract_as_mut::<Tracked>().unwrap();
                    value.fill[0] = 100 * n + round;
                    assert_eq!(copy.try_extract_as::<Tracked>().unwrap().fill[0], 100 * n + round);
                    let shared = copy.clone();
                    assert!(copy.is_shared());
                    drop(shared);
                }
                assert!(!copy.is_shared());
            });
        }
    });

    assert_eq!(original.try_extract_as::<Tracked>().unwrap().fill, [7; 4]);
    assert!(!original.is_shared());
    assert_eq!(LIVE.live(), 1);
    drop(original);
    assert_eq!(LIVE.live(), 0);
}

#[test]
fn pinned_types_never_go_inline() {
    #[derive(Clone, Default)]
    struct Handle(u8);

    unsafe impl Describe for Handle {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::builder::<Handle>("Handle")
                .with_default()
                .with_clone()
                .not_relocatable()
                .build()
        }
    }

    assert!(Variant::new(1u64).is_inline());
    assert!(!Variant::new(Handle(1)).is_inline());
}

#[test]
fn invalid_variants_are_inert() {
    let mut v = Variant::invalid();
    assert!(!v.is_valid());
    assert!(v.is_null());
    assert_eq!(v.meta_id(), MetaId::INVALID);
    assert_eq!(v.type_name(), None);
    assert!(v.data().is_none());
    assert!(v.data_mut().is_none());
    assert!(!v.detach());
    assert_eq!(v.extract_as::<i32>(), 0);
    assert!(!v.can_convert_to::<i32>());
    assert!(!v.convert_to::<i32>());
    assert_eq!(v.extract_as::<i32>(), 0);
    assert!(Variant::default().clone().data().is_none());
}

#[test]
fn null_follows_the_type() {
    assert!(Variant::new(None::<u8>).is_null());
    assert!(!Variant::new(Some(0u8)).is_null());
    assert!(!Variant::new(0u8).is_null());
    assert!(Variant::new(Variant::invalid()).is_null());

    assert!(Variant::new(String::new()).is_null());
    assert!(!Variant::new(String::from(" ")).is_null());
    assert!(Variant::new(bytes::Bytes::new()).is_null());
    assert!(!Variant::new(bytes::Bytes::from_static(b"\0")).is_null());
    assert!(Variant::default_of(id_of::<String>()).is_null());
}

#[test]
fn typed_extraction() {
    let v = Variant::new(String::from("text"));
    assert!(v.is::<String>());
    assert_eq!(v.try_extract_as::<i32>(), None);
    assert_eq!(v.extract_as::<i32>(), 0);
    assert_eq!(v.extract_as::<String>(), "text");
    assert_eq!(v.to_or_default::<u8>(), 0);
}

#[test]
fn construction_by_id() {
    assert_eq!(Variant::default_of(id_of::<u16>()), Variant::new(0u16));
    assert!(!Variant::default_of(MetaId::from_raw(0x7ffd_0000)).is_valid());

    let value = 2.5f32;
    let copy = unsafe { Variant::from_raw(id_of::<f32>(), PtrConst::new(&value)) };
    assert_eq!(copy, Variant::new(2.5f32));
}

#[test]
fn swap_and_clear() {
    let mut a = Variant::new(1u8);
    let mut b = Variant::new(String::from("b"));
    a.swap(&mut b);
    assert_eq!(a.extract_as::<String>(), "b");
    assert_eq!(b.extract_as::<u8>(), 1);
    b.clear();
    assert!(!b.is_valid());
}

#[test]
fn failed_conversion_leaves_the_default() {
    let mut v = Variant::new(String::from("not a number"));
    assert!(!v.convert_to::<i64>());
    assert_eq!(v, Variant::new(0i64));
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Envelope {
    stamp: u64,
    body: Vec<u8>,
}

describe!(Envelope => Default, Clone, PartialEq, Debug);

#[test]
fn mutable_views_edit_the_held_value() {
    register_mutable_view::<Envelope, Vec<u8>>(|e| &mut e.body).unwrap();

    let mut v = Variant::new(Envelope::default());
    let shared = v.clone();
    v.view_mut::<Vec<u8>>().unwrap().push(1);
    assert_eq!(v.try_extract_as::<Envelope>().unwrap().body, [1]);
    assert!(shared.try_extract_as::<Envelope>().unwrap().body.is_empty());

    assert!(v.view_mut::<String>().is_none());
    v.view_mut::<Envelope>().unwrap().stamp = 9;
    assert_eq!(v.try_extract_as::<Envelope>().unwrap().stamp, 9);
}
