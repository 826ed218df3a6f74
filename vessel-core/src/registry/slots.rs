//! Append-only id -> descriptor table.
//!
//! Slots are `OnceLock`s: written once under the registry lock, then read
//! without any lock. Chunks are allocated on demand and never moved, so a
//! published `&'static TypeDescriptor` stays reachable while the table grows.

use alloc::boxed::Box;
use std::sync::OnceLock;

use crate::{MetaId, TypeDescriptor};

const CHUNK_SIZE: usize = 256;
const MAX_CHUNKS: usize = 4096;

type Slot = OnceLock<&'static TypeDescriptor>;
type Chunk = Box<[Slot; CHUNK_SIZE]>;

pub(crate) struct SlotTable {
    builtin: [Slot; MetaId::BUILTIN_LIMIT as usize],
    user: Box<[OnceLock<Chunk>]>,
}

impl SlotTable {
    pub(crate) fn new() -> Self {
        Self {
            builtin: [const { OnceLock::new() }; MetaId::BUILTIN_LIMIT as usize],
            user: (0..MAX_CHUNKS).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Highest number of user ids the table can hold.
    pub(crate) const USER_CAPACITY: u32 = (CHUNK_SIZE * MAX_CHUNKS) as u32;

    fn user_position(id: MetaId) -> Option<(usize, usize)> {
        let index = id.raw().checked_sub(MetaId::FIRST_USER.raw())? as usize;
        let chunk = index / CHUNK_SIZE;
        (chunk < MAX_CHUNKS).then_some((chunk, index % CHUNK_SIZE))
    }

    pub(crate) fn get(&self, id: MetaId) -> Option<&'static TypeDescriptor> {
        if id.is_builtin() {
            return self.builtin[id.raw() as usize].get().copied();
        }
        let (chunk, slot) = Self::user_position(id)?;
        self.user[chunk].get()?[slot].get().copied()
    }

    /// Publish `desc` under `id`. Returns `false` if the slot is taken or out of range.
    pub(crate) fn publish(&self, id: MetaId, desc: &'static TypeDescriptor) -> bool {
        if id.is_builtin() {
            return self.builtin[id.raw() as usize].set(desc).is_ok();
        }
        let Some((chunk, slot)) = Self::user_position(id) else {
            return false;
        };
        let chunk = self.user[chunk].get_or_init(|| Box::new([const { OnceLock::new() }; CHUNK_SIZE]));
        chunk[slot].set(desc).is_ok()
    }

    pub(crate) fn is_free(&self, id: MetaId) -> bool {
        id.is_valid() && self.get(id).is_none()
    }
}
