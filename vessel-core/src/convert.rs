//! Process-wide table of user-registered conversions.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;
use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::RwLock;

use crate::{Describe, MetaId, PtrConst, PtrMut, PtrUninit, RegistrationError, descriptor_of};

/// Whether a converter can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConverterKind {
    /// Always produces a value.
    Direct,
    /// May refuse, in which case the conversion fails.
    Fallible,
}

type ErasedConvertFn = dyn Fn(PtrConst, PtrUninit) -> bool + Send + Sync;
type ErasedViewFn = dyn Fn(PtrMut) -> PtrMut + Send + Sync;

/// A registered conversion between two types.
pub struct Converter {
    /// Source type
    pub from: MetaId,
    /// Destination type
    pub to: MetaId,
    /// Whether the conversion can fail
    pub kind: ConverterKind,
    func: Box<ErasedConvertFn>,
}

impl Converter {
    /// Run the conversion. Returns `false` on failure, leaving `dst` uninitialized.
    ///
    /// # Safety
    ///
    /// `src` must point to an initialized value of the source type, `dst` to
    /// aligned, uninitialized memory for the destination type.
    pub unsafe fn convert(&self, src: PtrConst, dst: PtrUninit) -> bool {
        (self.func)(src, dst)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A registered projection from a value to a part of it that can be
/// mutated in place.
pub struct MutableView {
    /// Source type
    pub from: MetaId,
    /// View type
    pub to: MetaId,
    func: Box<ErasedViewFn>,
}

impl MutableView {
    /// Project `src` to the view.
    ///
    /// # Safety
    ///
    /// `src` must point to an initialized value of the source type that the
    /// caller may mutate. The returned pointer borrows from it.
    pub unsafe fn project(&self, src: PtrMut) -> PtrMut {
        (self.func)(src)
    }
}

/// Converters keyed by `(from, to)`, plus mutable views keyed the same way.
#[derive(Default)]
pub struct ConversionRegistry {
    converters: RwLock<HashMap<(MetaId, MetaId), Arc<Converter>>>,
    views: RwLock<HashMap<(MetaId, MetaId), Arc<MutableView>>>,
}

static GLOBAL: LazyLock<ConversionRegistry> = LazyLock::new(ConversionRegistry::default);

impl ConversionRegistry {
    /// The process-wide registry.
    pub fn global() -> &'static ConversionRegistry {
        &GLOBAL
    }

    fn insert(&self, converter: Converter) -> Result<(), RegistrationError> {
        let key = (converter.from, converter.to);
        let mut converters = self.converters.write();
        if converters.contains_key(&key) {
            crate::warn!(
                "a converter from {:?} to {:?} is already registered, keeping the first one",
                key.0,
                key.1
            );
            return Err(RegistrationError::DuplicateConverter {
                from: key.0,
                to: key.1,
            });
        }
        crate::debug!("registered {:?} converter {:?} -> {:?}", converter.kind, key.0, key.1);
        converters.insert(key, Arc::new(converter));
        Ok(())
    }

    /// Register a conversion that always succeeds.
    ///
    /// A second registration for the same pair is rejected and the first one
    /// stays in place.
    pub fn register<Source, Target, F>(&self, f: F) -> Result<(), RegistrationError>
    where
        Source: Describe,
        Target: Describe,
        F: Fn(&Source) -> Target + Send + Sync + 'static,
    {
        self.insert(Converter {
            from: descriptor_of::<Source>().id,
            to: descriptor_of::<Target>().id,
            kind: ConverterKind::Direct,
            func: Box::new(move |src, dst| {
                let value = f(unsafe { src.get::<Source>() });
                unsafe { dst.put(value) };
                true
            }),
        })
    }

    /// Register a conversion that may fail by returning `None`.
    pub fn register_fallible<Source, Target, F>(&self, f: F) -> Result<(), RegistrationError>
    where
        Source: Describe,
        Target: Describe,
        F: Fn(&Source) -> Option<Target> + Send + Sync + 'static,
    {
        self.insert(Converter {
            from: descriptor_of::<Source>().id,
            to: descriptor_of::<Target>().id,
            kind: ConverterKind::Fallible,
            func: Box::new(move |src, dst| match f(unsafe { src.get::<Source>() }) {
                Some(value) => {
                    unsafe { dst.put(value) };
                    true
                }
                None => false,
            }),
        })
    }

    /// Remove the converter for a pair. Returns whether one was registered.
    pub fn unregister(&self, from: MetaId, to: MetaId) -> bool {
        self.converters.write().remove(&(from, to)).is_some()
    }

    /// The converter for a pair, if registered.
    ///
    /// The returned handle stays valid even if the converter is unregistered
    /// while it is in use.
    pub fn get(&self, from: MetaId, to: MetaId) -> Option<Arc<Converter>> {
        self.converters.read().get(&(from, to)).cloned()
    }

    /// Whether a converter is registered for the pair.
    pub fn contains(&self, from: MetaId, to: MetaId) -> bool {
        self.converters.read().contains_key(&(from, to))
    }

    /// Register a mutable view from `Source` to a `View` it contains.
    pub fn register_mutable_view<Source, View>(
        &self,
        f: fn(&mut Source) -> &mut View,
    ) -> Result<(), RegistrationError>
    where
        Source: Describe,
        View: Describe,
    {
        let key = (descriptor_of::<Source>().id, descriptor_of::<View>().id);
        let mut views = self.views.write();
        if views.contains_key(&key) {
            crate::warn!(
                "a mutable view from {:?} to {:?} is already registered, keeping the first one",
                key.0,
                key.1
            );
            return Err(RegistrationError::DuplicateMutableView {
                from: key.0,
                to: key.1,
            });
        }
        views.insert(
            key,
            Arc::new(MutableView {
                from: key.0,
                to: key.1,
                func: Box::new(move |src| {
                    let view = f(unsafe { src.as_mut::<Source>() });
                    PtrMut::new(view as *mut View)
                }),
            }),
        );
        Ok(())
    }

    /// The mutable view for a pair, if registered.
    pub fn mutable_view(&self, from: MetaId, to: MetaId) -> Option<Arc<MutableView>> {
        self.views.read().get(&(from, to)).cloned()
    }
}

/// Register a conversion in the global registry. cf. [`ConversionRegistry::register`]
pub fn register_converter<Source, Target, F>(f: F) -> Result<(), RegistrationError>
where
    Source: Describe,
    Target: Describe,
    F: Fn(&Source) -> Target + Send + Sync + 'static,
{
    ConversionRegistry::global().register(f)
}

/// Register a fallible conversion in the global registry. cf. [`ConversionRegistry::register_fallible`]
pub fn register_fallible_converter<Source, Target, F>(f: F) -> Result<(), RegistrationError>
where
    Source: Describe,
    Target: Describe,
    F: Fn(&Source) -> Option<Target> + Send + Sync + 'static,
{
    ConversionRegistry::global().register_fallible(f)
}

/// Register a mutable view in the global registry. cf. [`ConversionRegistry::register_mutable_view`]
pub fn register_mutable_view<Source, View>(
    f: fn(&mut Source) -> &mut View,
) -> Result<(), RegistrationError>
where
    Source: Describe,
    View: Describe,
{
    ConversionRegistry::global().register_mutable_view(f)
}

/// Remove a conversion from the global registry.
pub fn unregister_converter(from: MetaId, to: MetaId) -> bool {
    ConversionRegistry::global().unregister(from, to)
}

/// Whether the global registry has a converter for the pair.
pub fn has_converter(from: MetaId, to: MetaId) -> bool {
    ConversionRegistry::global().contains(from, to)
}

/// Whether the global registry has a mutable view for the pair.
pub fn has_mutable_view(from: MetaId, to: MetaId) -> bool {
    ConversionRegistry::global().mutable_view(from, to).is_some()
}
