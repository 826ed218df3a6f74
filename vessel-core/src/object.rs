//! Class metadata and class-tagged object pointers.

use alloc::format;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

use crate::{Describe, PtrConst, PtrUninit, TypeDescriptor};

/// Static description of a class: its name and its parent class.
#[derive(Debug)]
pub struct ClassInfo {
    /// Class name
    pub name: &'static str,
    /// Parent class, if any
    pub parent: Option<&'static ClassInfo>,
}

impl ClassInfo {
    /// Whether `self` is `ancestor` or derives from it, directly or not.
    ///
    /// Classes are matched by name, so metadata duplicated across
    /// compilation units still matches.
    pub fn inherits(&self, ancestor: &ClassInfo) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if core::ptr::eq(class, ancestor) || class.name == ancestor.name {
                return true;
            }
            current = class.parent;
        }
        false
    }
}

impl PartialEq for ClassInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// An instance of some class.
pub trait Object: Any + Send + Sync {
    /// The class of this instance (its most derived class).
    fn class_info(&self) -> &'static ClassInfo;
}

/// A concrete class.
///
/// ```ignore
/// struct Widget;
/// impl Class for Widget {
///     const CLASS: &'static ClassInfo = &ClassInfo { name: "Widget", parent: None };
/// }
/// impl Object for Widget {
///     fn class_info(&self) -> &'static ClassInfo { Self::CLASS }
/// }
/// ```
pub trait Class: Object {
    /// Metadata of the class.
    const CLASS: &'static ClassInfo;
}

/// A shared, nullable pointer to an object, tagged with the class `T` it is
/// declared to point to.
///
/// The pointee's dynamic class is `T` or a class derived from it. Pointers
/// to different classes share one layout, which is what lets conversions
/// re-tag them.
#[repr(transparent)]
pub struct ObjectPtr<T: Class> {
    raw: Option<Arc<dyn Object>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Class> ObjectPtr<T> {
    /// Wraps a new object.
    pub fn new(object: T) -> Self {
        Self::from_arc(Arc::new(object))
    }

    /// Shares an existing object.
    pub fn from_arc(object: Arc<T>) -> Self {
        let object: Arc<dyn Object> = object;
        Self {
            raw: Some(object),
            _marker: PhantomData,
        }
    }

    /// The null pointer.
    pub fn null() -> Self {
        Self {
            raw: None,
            _marker: PhantomData,
        }
    }

    /// Whether this points nowhere.
    pub fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    /// The pointee as an object of unknown concrete type.
    pub fn object(&self) -> Option<&dyn Object> {
        self.raw.as_deref()
    }

    /// The pointee's dynamic class.
    pub fn class_info(&self) -> Option<&'static ClassInfo> {
        self.raw.as_ref().map(|o| o.class_info())
    }

    /// The pointee, if its concrete type is `T`.
    pub fn get(&self) -> Option<&T> {
        self.downcast::<T>()
    }

    /// The pointee, if its concrete type is `U`.
    pub fn downcast<U: Class>(&self) -> Option<&U> {
        let object: &dyn Any = self.raw.as_deref()?;
        object.downcast_ref::<U>()
    }

    /// Re-tag as a pointer to a base class. Always succeeds for base classes,
    /// gives `None` when `U` is not an ancestor of `T`.
    pub fn upcast<U: Class>(&self) -> Option<ObjectPtr<U>> {
        T::CLASS.inherits(U::CLASS).then(|| ObjectPtr {
            raw: self.raw.clone(),
            _marker: PhantomData,
        })
    }

    /// Re-tag as a pointer to class `U` if the pointee's dynamic class is `U`
    /// or derives from it.
    pub fn cast<U: Class>(&self) -> Option<ObjectPtr<U>> {
        let class = self.class_info()?;
        class.inherits(U::CLASS).then(|| ObjectPtr {
            raw: self.raw.clone(),
            _marker: PhantomData,
        })
    }

    /// Whether both point to the same object (or both are null).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.raw, &other.raw) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Class> Clone for ObjectPtr<T> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Class> Default for ObjectPtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: Class> PartialEq for ObjectPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: Class> fmt::Debug for ObjectPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Some(object) => write!(
                f,
                "ObjectPtr<{}>({} @ {:p})",
                T::CLASS.name,
                object.class_info().name,
                Arc::as_ptr(object) as *const ()
            ),
            None => write!(f, "ObjectPtr<{}>(null)", T::CLASS.name),
        }
    }
}

unsafe impl<T: Class> Describe for ObjectPtr<T> {
    fn describe() -> TypeDescriptor {
        let builder = TypeDescriptor::builder::<Self>(format!("ObjectPtr<{}>", T::CLASS.name))
            .with_default()
            .with_clone()
            .with_eq()
            .with_debug()
            .is_null_with(Self::is_null);
        unsafe { builder.class(T::CLASS) }.build()
    }
}

/// Re-tag the object pointer at `src` as a pointer to `target` and write it
/// to `dst`, if the pointee is an instance of `target`. A null source gives a
/// null result. Returns `false` (leaving `dst` uninitialized) when the
/// pointee's class does not derive from `target`.
///
/// # Safety
///
/// `src` must point to an initialized `ObjectPtr` of any class, `dst` to
/// aligned, uninitialized memory for an `ObjectPtr`.
pub unsafe fn cast_object_ptr(src: PtrConst, dst: PtrUninit, target: &ClassInfo) -> bool {
    let raw = unsafe { src.get::<Option<Arc<dyn Object>>>() };
    if let Some(object) = raw {
        if !object.class_info().inherits(target) {
            return false;
        }
    }
    unsafe { dst.put(raw.clone()) };
    true
}

/// The dynamic class of the object behind an `ObjectPtr` of any class.
///
/// # Safety
///
/// `src` must point to an initialized `ObjectPtr`.
pub unsafe fn object_class_of(src: PtrConst) -> Option<&'static ClassInfo> {
    unsafe { src.get::<Option<Arc<dyn Object>>>() }
        .as_ref()
        .map(|object| object.class_info())
}
