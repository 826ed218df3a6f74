use core::hash::Hash;

use indexmap::IndexMap;

use super::map::{Association, describe_association};
use crate::{Describe, IterCapabilities, TypeDescriptor};

// Entries keep their insertion order, removal shifts the rest down.
impl<K: Describe + Hash + Eq, V: Describe> Association for IndexMap<K, V> {
    type Key = K;
    type Value = V;
    type Iter<'a> = indexmap::map::Iter<'a, K, V>;

    const KIND: &'static str = "IndexMap";

    fn len(&self) -> usize {
        IndexMap::len(self)
    }

    fn entries(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn get(&self, key: &K) -> Option<&V> {
        IndexMap::get(self, key)
    }

    fn insert(&mut self, key: K, value: V) {
        IndexMap::insert(self, key, value);
    }

    fn remove(&mut self, key: &K) -> bool {
        self.shift_remove(key).is_some()
    }
}

unsafe impl<K: Describe + Hash + Eq, V: Describe> Describe for IndexMap<K, V> {
    fn describe() -> TypeDescriptor {
        describe_association::<Self>(IterCapabilities::FORWARD)
    }
}
