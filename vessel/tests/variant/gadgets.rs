use core::mem::offset_of;

use vessel::{Describe, TypeDescriptor, TypeFlags, Variant, VariantList, descriptor_of};
use vessel_testhelpers::test;

#[derive(Clone, Debug, Default, PartialEq)]
struct Margins {
    left: f32,
    right: f32,
}

unsafe impl Describe for Margins {
    fn describe() -> TypeDescriptor {
        let builder = TypeDescriptor::builder::<Margins>("Margins")
            .with_default()
            .with_clone()
            .with_eq()
            .with_debug();
        unsafe {
            builder
                .field::<f32>("left", offset_of!(Margins, left))
                .field::<f32>("right", offset_of!(Margins, right))
        }
        .build()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Page {
    title: String,
    margins: Margins,
    extra: Variant,
}

unsafe impl Describe for Page {
    fn describe() -> TypeDescriptor {
        let builder = TypeDescriptor::builder::<Page>("Page")
            .with_default()
            .with_clone()
            .with_eq()
            .with_debug();
        unsafe {
            builder
                .field::<String>("title", offset_of!(Page, title))
                .field::<Margins>("margins", offset_of!(Page, margins))
                .field::<Variant>("extra", offset_of!(Page, extra))
        }
        .build()
    }
}

#[test]
fn gadgets_are_flagged() {
    assert!(descriptor_of::<Page>().flags.contains(TypeFlags::IS_GADGET));
    assert!(!descriptor_of::<String>().flags.contains(TypeFlags::IS_GADGET));
    let names: Vec<_> = descriptor_of::<Page>().fields.iter().map(|f| f.name).collect();
    assert_eq!(names, ["title", "margins", "extra"]);
}

#[test]
fn nested_gadgets_read_through_copies() {
    let page = Variant::new(Page {
        title: "intro".into(),
        margins: Margins {
            left: 1.0,
            right: 2.0,
        },
        extra: Variant::invalid(),
    });
    let margins = page.property("margins").unwrap();
    assert_eq!(margins.property("right"), Some(Variant::new(2.0f32)));
    assert_eq!(page.property("title").unwrap().extract_as::<String>(), "intro");
    assert_eq!(page.property("extra"), Some(Variant::invalid()));
}

#[test]
fn variant_fields_take_any_value() {
    let mut page = Variant::new(Page::default());
    let list = VariantList::from([Variant::new(1u8)]);
    assert!(page.set_property("extra", &Variant::new(list.clone())));
    assert_eq!(
        page.try_extract_as::<Page>().unwrap().extra,
        Variant::new(list)
    );

    assert!(page.set_property("margins", &Variant::new(Margins { left: 4.0, right: 0.0 })));
    assert!(!page.set_property("margins", &Variant::new(4.0f32)));
    assert_eq!(page.property("margins").unwrap().property("left"), Some(Variant::new(4.0f32)));
}
