//! Process-wide table of type descriptors.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use core::alloc::Layout;
use core::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{LazyLock, Once};

use parking_lot::{Mutex, RwLock};

use crate::{Builtin, Describe, MetaId, RegistrationError, TypeDescriptor};

mod normalize;
pub use normalize::normalize_type_name;

mod slots;
use slots::SlotTable;

#[derive(Default)]
struct State {
    by_type: HashMap<TypeId, &'static TypeDescriptor>,
    by_name: HashMap<String, MetaId>,
    next_user: u32,
}

/// Maps names, ids and Rust types to their [`TypeDescriptor`].
///
/// Registration takes one lock; looking up a descriptor by id reads an
/// append-only slot table without locking.
pub struct TypeRegistry {
    state: RwLock<State>,
    slots: SlotTable,
    warned: Mutex<HashSet<MetaId>>,
    builtins: Once,
}

static GLOBAL: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::new);

impl TypeRegistry {
    /// How many distinct unknown ids get a warning.
    const MAX_WARNED: usize = 256;

    fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_user: MetaId::FIRST_USER.raw(),
                ..State::default()
            }),
            slots: SlotTable::new(),
            warned: Mutex::new(HashSet::new()),
            builtins: Once::new(),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    /// Register `T` and return its descriptor. Idempotent.
    ///
    /// `T::describe()` runs without the lock held, so it may register other
    /// types (element types, field types). If two threads race to register
    /// the same type, both get the descriptor that was published first.
    ///
    /// # Panics
    ///
    /// When `T::describe()` returns a descriptor built for another type.
    pub fn register<T: Describe>(&self) -> &'static TypeDescriptor {
        let type_id = TypeId::of::<T>();
        if let Some(desc) = self.state.read().by_type.get(&type_id) {
            return desc;
        }

        let desc = T::describe();
        assert!(
            desc.type_id == type_id && desc.layout == Layout::new::<T>(),
            "descriptor `{}` was not built for `{}`",
            desc.name,
            core::any::type_name::<T>()
        );
        self.publish(desc)
    }

    fn publish(&self, mut desc: TypeDescriptor) -> &'static TypeDescriptor {
        let mut state = self.state.write();
        if let Some(existing) = state.by_type.get(&desc.type_id) {
            return existing;
        }

        desc.name = Cow::Owned(normalize_type_name(&desc.name));
        let reserved = desc
            .reserved
            .filter(|builtin| match builtin.rust_type() {
                Some(expected) if expected != desc.type_id => {
                    crate::warn!(
                        "`{}` claims the reserved id of `{}` but is another type",
                        desc.name,
                        builtin.name()
                    );
                    false
                }
                _ => true,
            })
            .map(Builtin::id)
            .filter(|id| self.slots.is_free(*id));

        desc.id = match reserved {
            Some(id) => id,
            None => {
                let id = MetaId::from_raw(state.next_user);
                state.next_user += 1;
                if state.next_user - MetaId::FIRST_USER.raw() > SlotTable::USER_CAPACITY {
                    crate::warn!("type registry is full, `{}` cannot be looked up by id", desc.name);
                }
                id
            }
        };

        let desc: &'static TypeDescriptor = Box::leak(Box::new(desc));
        self.slots.publish(desc.id, desc);
        state.by_type.insert(desc.type_id, desc);
        match state.by_name.get(desc.name.as_ref()).copied() {
            Some(previous) if reserved.is_some() => {
                crate::warn!(
                    "type name `{}` now names {:?}, {:?} is only reachable by id",
                    desc.name,
                    desc.id,
                    previous
                );
                state.by_name.insert(desc.name.to_string(), desc.id);
            }
            Some(previous) => {
                crate::warn!(
                    "type name `{}` is already registered as {:?}, {:?} is only reachable by id",
                    desc.name,
                    previous,
                    desc.id
                );
            }
            None => {
                state.by_name.insert(desc.name.to_string(), desc.id);
            }
        }
        crate::trace!("registered `{}` as {:?}", desc.name, desc.id);
        desc
    }

    /// Makes every built-in type of this crate known, so that lookups by
    /// reserved id or name succeed before the type was used.
    fn ensure_builtins(&self) {
        self.builtins.call_once(crate::impls::register_builtins);
    }

    /// Look up a descriptor by id. Unknown ids give `None` and are logged once.
    pub fn lookup_by_id(&self, id: MetaId) -> Option<&'static TypeDescriptor> {
        if !id.is_valid() {
            return None;
        }
        if let Some(desc) = self.slots.get(id) {
            return Some(desc);
        }
        self.ensure_builtins();
        let found = self.slots.get(id);
        if found.is_none() && self.note_unknown(id) {
            crate::warn!("no type is registered under {:?}", id);
        }
        found
    }

    /// Whether `id` is looked up unregistered for the first time. Once
    /// [`Self::MAX_WARNED`] ids were seen, every further one reports `false`.
    fn note_unknown(&self, id: MetaId) -> bool {
        let mut warned = self.warned.lock();
        if warned.len() >= Self::MAX_WARNED {
            if warned.len() == Self::MAX_WARNED {
                crate::warn!("too many unknown type ids, no longer logging them");
                // never looked up, so it only marks the cap as reached
                warned.insert(MetaId::INVALID);
            }
            return false;
        }
        warned.insert(id)
    }

    /// Look up an id by name. The name is normalized first; unknown names
    /// give [`MetaId::INVALID`].
    pub fn lookup_by_name(&self, name: &str) -> MetaId {
        self.ensure_builtins();
        let normalized = normalize_type_name(name);
        self.state
            .read()
            .by_name
            .get(&normalized)
            .copied()
            .unwrap_or(MetaId::INVALID)
    }

    /// Look up a descriptor by name.
    pub fn descriptor_by_name(&self, name: &str) -> Option<&'static TypeDescriptor> {
        self.lookup_by_id(self.lookup_by_name(name))
    }

    /// The descriptor of `T` if it was registered, without registering it.
    pub fn get<T: 'static>(&self) -> Option<&'static TypeDescriptor> {
        self.state.read().by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Make `alias` resolve to `id` in name lookups.
    ///
    /// Re-registering the same alias for the same id is allowed.
    pub fn register_alias(&self, alias: &str, id: MetaId) -> Result<(), RegistrationError> {
        if self.lookup_by_id(id).is_none() {
            return Err(RegistrationError::UnknownType(id));
        }
        let alias = normalize_type_name(alias);
        let mut state = self.state.write();
        match state.by_name.get(&alias) {
            Some(existing) if *existing != id => Err(RegistrationError::AliasConflict {
                alias: Cow::Owned(alias),
                existing: *existing,
            }),
            Some(_) => Ok(()),
            None => {
                crate::debug!("alias `{}` now names {:?}", alias, id);
                state.by_name.insert(alias, id);
                Ok(())
            }
        }
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.state.read().by_type.len()
    }

    /// Whether no type was registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Looks up an id by name in the global registry.
#[inline]
pub fn lookup_by_name(name: &str) -> MetaId {
    TypeRegistry::global().lookup_by_name(name)
}

/// Looks up a descriptor by id in the global registry.
#[inline]
pub fn lookup_by_id(id: MetaId) -> Option<&'static TypeDescriptor> {
    TypeRegistry::global().lookup_by_id(id)
}
