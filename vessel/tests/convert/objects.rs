use vessel::{
    Class, ClassInfo, Describe, Object, ObjectPtr, TypeDescriptor, TypeFlags, Variant,
    descriptor_of,
};
use vessel_testhelpers::test;

struct Widget;

impl Class for Widget {
    const CLASS: &'static ClassInfo = &ClassInfo {
        name: "Widget",
        parent: None,
    };
}

impl Object for Widget {
    fn class_info(&self) -> &'static ClassInfo {
        Self::CLASS
    }
}

unsafe impl Describe for Widget {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::builder::<Widget>("Widget").build()
    }
}

struct Button {
    label: &'static str,
}

impl Class for Button {
    const CLASS: &'static ClassInfo = &ClassInfo {
        name: "Button",
        parent: Some(Widget::CLASS),
    };
}

impl Object for Button {
    fn class_info(&self) -> &'static ClassInfo {
        Self::CLASS
    }
}

#[test]
fn pointer_descriptors() {
    let desc = descriptor_of::<ObjectPtr<Button>>();
    assert_eq!(desc.type_name(), "ObjectPtr<Button>");
    assert!(desc.flags.contains(TypeFlags::IS_POINTER | TypeFlags::POINTER_TO_OBJECT));
    assert!(Variant::new(ObjectPtr::<Button>::null()).is_null());
}

#[test]
fn upcasts_always_succeed() {
    let button = Variant::new(ObjectPtr::new(Button { label: "ok" }));
    assert!(button.can_convert_to::<ObjectPtr<Widget>>());
    let widget = button.to::<ObjectPtr<Widget>>().unwrap();
    assert_eq!(widget.class_info().map(|c| c.name), Some("Button"));
    assert_eq!(widget.downcast::<Button>().map(|b| b.label), Some("ok"));
}

#[test]
fn downcasts_check_the_pointee() {
    let upcast = ObjectPtr::new(Button { label: "b" }).upcast::<Widget>();
    let button_as_widget = Variant::new(upcast.unwrap());
    assert!(button_as_widget.can_convert_to::<ObjectPtr<Button>>());
    assert!(button_as_widget.to::<ObjectPtr<Button>>().is_some());

    let mut plain = Variant::new(ObjectPtr::new(Widget));
    assert!(!plain.can_convert_to::<ObjectPtr<Button>>());
    assert!(!plain.convert_to::<ObjectPtr<Button>>());
    assert!(plain.is::<ObjectPtr<Button>>());
    assert!(plain.is_null());
}

#[test]
fn null_pointers_cast_to_null() {
    let null = Variant::new(ObjectPtr::<Widget>::null());
    assert!(null.can_convert_to::<ObjectPtr<Button>>());
    assert!(null.to::<ObjectPtr<Button>>().unwrap().is_null());
}

#[test]
fn values_and_pointers_do_not_mix() {
    let pointer = Variant::new(ObjectPtr::new(Widget));
    assert!(!pointer.can_convert_to::<Widget>());
    assert!(pointer.to::<Widget>().is_none());
    assert!(!Variant::new(Widget).can_convert_to::<ObjectPtr<Widget>>());
}

#[test]
fn copies_share_the_object() {
    let a = Variant::new(ObjectPtr::new(Widget));
    let b = a.clone();
    assert_eq!(a, b);
    assert_ne!(a, Variant::new(ObjectPtr::new(Widget)));
}
