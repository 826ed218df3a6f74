//! The type-erased value container and its storage.

use alloc::alloc::{alloc, dealloc, handle_alloc_error};
use core::alloc::Layout;
use core::fmt;
use core::mem::{self, MaybeUninit};
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering, fence};

use vessel_core::{
    Builtin, ConversionRegistry, Describe, MetaId, PtrConst, PtrMut, PtrUninit, TypeDescriptor,
    TypeFlags, descriptor_of, id_of, lookup_by_id,
};

const INLINE_WORDS: usize = 3;

type InlineBuf = [MaybeUninit<usize>; INLINE_WORDS];

/// Header of a heap block. The payload follows at `offset`.
struct HeapHeader {
    refs: AtomicUsize,
    block: Layout,
    offset: usize,
    payload: Layout,
}

impl HeapHeader {
    /// Allocates a block with room for a `payload`, with one reference.
    fn alloc(payload: Layout) -> NonNull<HeapHeader> {
        let (block, offset) = match Layout::new::<HeapHeader>().extend(payload) {
            Ok(extended) => extended,
            // the payload layout comes from a real type, so it fits
            Err(_) => handle_alloc_error(payload),
        };
        let block = block.pad_to_align();
        let raw = unsafe { alloc(block) } as *mut HeapHeader;
        let Some(header) = NonNull::new(raw) else {
            handle_alloc_error(block)
        };
        unsafe {
            header.write(HeapHeader {
                refs: AtomicUsize::new(1),
                block,
                offset,
                payload,
            })
        };
        header
    }

    /// Pointer to the payload of `header`.
    fn payload(header: NonNull<HeapHeader>) -> PtrMut {
        let offset = unsafe { header.as_ref() }.offset;
        PtrMut::new(unsafe { header.cast::<u8>().as_ptr().add(offset) })
    }

    /// Frees the block without touching the payload.
    ///
    /// # Safety
    ///
    /// No handle may use `header` afterwards, the payload must already be
    /// dropped or moved out.
    unsafe fn free(header: NonNull<HeapHeader>) {
        let block = unsafe { header.as_ref() }.block;
        unsafe { dealloc(header.cast::<u8>().as_ptr(), block) };
    }

    /// Gives up one reference, dropping the payload with `desc` and freeing
    /// the block when it was the last one.
    ///
    /// # Safety
    ///
    /// `header` must hold an initialized value of `desc`'s type, and the
    /// caller must own one reference.
    unsafe fn release(header: NonNull<HeapHeader>, desc: &TypeDescriptor) {
        if unsafe { header.as_ref() }.refs.fetch_sub(1, Ordering::Release) != 1 {
            return;
        }
        fence(Ordering::Acquire);
        unsafe {
            (desc.ops.drop_in_place)(Self::payload(header));
            Self::free(header);
        }
    }

    fn is_unique(header: NonNull<HeapHeader>) -> bool {
        let refs = &unsafe { header.as_ref() }.refs;
        refs.load(Ordering::Acquire) == 1
    }
}

enum Storage {
    Empty,
    Inline(InlineBuf),
    Heap(NonNull<HeapHeader>),
}

/// Whether values of `desc` are stored in the variant itself.
///
/// Inline values are copied through their copy hook on every clone, so only
/// small, relocatable, copyable types qualify.
pub(crate) fn fits_inline(desc: &TypeDescriptor) -> bool {
    desc.layout.size() <= mem::size_of::<InlineBuf>()
        && desc.layout.align() <= mem::align_of::<InlineBuf>()
        && desc.flags.contains(TypeFlags::RELOCATABLE)
        && desc.has_clone()
}

/// A value of any registered type.
///
/// Small copyable values live inline; everything else lives in a shared,
/// reference-counted heap block that is copied on the first write through a
/// shared handle. A variant without a value is *invalid*.
///
/// ```
/// use vessel::Variant;
///
/// let v = Variant::new(42i32);
/// assert_eq!(v.extract_as::<i32>(), 42);
/// assert_eq!(v.to::<String>().as_deref(), Some("42"));
/// assert!(!Variant::invalid().is_valid());
/// ```
pub struct Variant {
    desc: Option<&'static TypeDescriptor>,
    storage: Storage,
}

// Payloads are `Send + Sync` (a `Describe` bound), the heap refcount is atomic
// and shared payloads are only written after a detach.
unsafe impl Send for Variant {}
unsafe impl Sync for Variant {}

impl Variant {
    /// A variant holding nothing.
    pub const fn invalid() -> Self {
        Variant {
            desc: None,
            storage: Storage::Empty,
        }
    }

    /// Wraps `value`.
    pub fn new<T: Describe>(value: T) -> Self {
        Self::build(descriptor_of::<T>(), |dst| {
            unsafe { dst.put(value) };
            true
        })
    }

    /// The default value of the type registered under `id`. Invalid when the
    /// id is unknown or the type has no default.
    pub fn default_of(id: MetaId) -> Self {
        crate::register_builtins();
        let Some(desc) = lookup_by_id(id) else {
            return Self::invalid();
        };
        match desc.ops.default_in_place {
            Some(default) => Self::build(desc, |dst| {
                unsafe { default(dst) };
                true
            }),
            None => Self::invalid(),
        }
    }

    /// Copies the value at `ptr`, of the type registered under `id`. Invalid
    /// when the id is unknown or the type cannot be copied.
    ///
    /// # Safety
    ///
    /// `ptr` must point to an initialized value of the type registered under `id`.
    pub unsafe fn from_raw(id: MetaId, ptr: PtrConst) -> Self {
        crate::register_builtins();
        match lookup_by_id(id) {
            Some(desc) => unsafe { Self::copy_of(desc, ptr) },
            None => Self::invalid(),
        }
    }

    /// Copies the value of `desc`'s type at `ptr`. Invalid when the type
    /// cannot be copied.
    ///
    /// # Safety
    ///
    /// `ptr` must point to an initialized value of `desc`'s type.
    pub(crate) unsafe fn copy_of(desc: &'static TypeDescriptor, ptr: PtrConst) -> Self {
        Self::build(desc, |dst| unsafe { desc.clone_into(ptr, dst) })
    }

    /// Makes room for a value of `desc` and lets `init` write it. When `init`
    /// returns `false` it must have left the memory uninitialized, and the
    /// result is invalid.
    pub(crate) fn build(
        desc: &'static TypeDescriptor,
        init: impl FnOnce(PtrUninit) -> bool,
    ) -> Self {
        if fits_inline(desc) {
            let mut buf: InlineBuf = [MaybeUninit::uninit(); INLINE_WORDS];
            if !init(PtrUninit::new(buf.as_mut_ptr())) {
                return Self::invalid();
            }
            Variant {
                desc: Some(desc),
                storage: Storage::Inline(buf),
            }
        } else {
            let header = HeapHeader::alloc(desc.layout);
            if !init(HeapHeader::payload(header).as_uninit()) {
                unsafe { HeapHeader::free(header) };
                return Self::invalid();
            }
            Variant {
                desc: Some(desc),
                storage: Storage::Heap(header),
            }
        }
    }

    /// Whether a value is held.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.desc.is_some()
    }

    /// Whether the variant is invalid or holds a value its type considers
    /// null (a null object pointer, `None`).
    pub fn is_null(&self) -> bool {
        match (self.desc, self.data()) {
            (Some(desc), Some(ptr)) => match desc.vtable.is_null {
                Some(is_null) => unsafe { is_null(ptr) },
                None => false,
            },
            _ => true,
        }
    }

    /// Id of the held type, [`MetaId::INVALID`] when empty.
    #[inline]
    pub fn meta_id(&self) -> MetaId {
        self.desc.map_or(MetaId::INVALID, |desc| desc.id)
    }

    /// Descriptor of the held type.
    #[inline]
    pub fn descriptor(&self) -> Option<&'static TypeDescriptor> {
        self.desc
    }

    /// Normalized name of the held type.
    pub fn type_name(&self) -> Option<&'static str> {
        self.desc.map(|desc| desc.type_name())
    }

    /// Whether the held value is a `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.desc.is_some_and(|desc| desc.is::<T>())
    }

    /// The held value, if it is a `T`.
    pub fn try_extract_as<T: 'static>(&self) -> Option<&T> {
        if !self.is::<T>() {
            return None;
        }
        Some(unsafe { self.data()?.get::<T>() })
    }

    /// The held value for writing, if it is a `T`. Detaches a shared value.
    pub fn try_extract_as_mut<T: 'static>(&mut self) -> Option<&mut T> {
        if !self.is::<T>() {
            return None;
        }
        Some(unsafe { self.data_mut()?.as_mut::<T>() })
    }

    /// A copy of the held value. When the variant does not hold a `T` this
    /// logs a warning and gives `T::default()`; use [`Variant::to`] to
    /// convert instead.
    pub fn extract_as<T: Clone + Default + 'static>(&self) -> T {
        match self.try_extract_as::<T>() {
            Some(value) => value.clone(),
            None => {
                crate::warn!(
                    "extracting {} from a variant holding {}",
                    core::any::type_name::<T>(),
                    self.type_name().unwrap_or("nothing")
                );
                T::default()
            }
        }
    }

    /// Moves the value out if it is a `T`, otherwise gives the variant back.
    ///
    /// A shared heap value is copied out, or given back when it cannot be copied.
    pub fn into_value<T: 'static>(mut self) -> Result<T, Variant> {
        let Some(desc) = self.desc.filter(|desc| desc.is::<T>()) else {
            return Err(self);
        };
        match mem::replace(&mut self.storage, Storage::Empty) {
            Storage::Inline(buf) => {
                self.desc = None;
                Ok(unsafe { PtrConst::new(buf.as_ptr()).read::<T>() })
            }
            Storage::Heap(header) if HeapHeader::is_unique(header) => {
                self.desc = None;
                let value = unsafe { HeapHeader::payload(header).read::<T>() };
                unsafe { HeapHeader::free(header) };
                Ok(value)
            }
            Storage::Heap(header) => {
                self.storage = Storage::Heap(header);
                let mut slot = MaybeUninit::<T>::uninit();
                let src = HeapHeader::payload(header).as_const();
                if unsafe { desc.clone_into(src, PtrUninit::from_maybe_uninit(&mut slot)) } {
                    Ok(unsafe { slot.assume_init() })
                } else {
                    Err(self)
                }
            }
            Storage::Empty => Err(self),
        }
    }

    /// Pointer to the held value, without copying a shared one.
    #[inline]
    pub fn data(&self) -> Option<PtrConst> {
        match &self.storage {
            Storage::Empty => None,
            Storage::Inline(buf) => Some(PtrConst::new(buf.as_ptr())),
            Storage::Heap(header) => Some(HeapHeader::payload(*header).as_const()),
        }
    }

    /// Pointer to the held value for writing. A shared value is detached
    /// first; `None` when empty or when a shared value cannot be copied.
    pub fn data_mut(&mut self) -> Option<PtrMut> {
        if !self.detach() {
            return None;
        }
        self.raw_mut()
    }

    // Pointer to the payload, shared or not.
    fn raw_mut(&mut self) -> Option<PtrMut> {
        match &mut self.storage {
            Storage::Empty => None,
            Storage::Inline(buf) => Some(PtrMut::new(buf.as_mut_ptr())),
            Storage::Heap(header) => Some(HeapHeader::payload(*header)),
        }
    }

    /// Makes sure no other variant shares the held value, copying it if
    /// needed. Returns `false` when the variant is empty or the value is
    /// shared and cannot be copied.
    pub fn detach(&mut self) -> bool {
        let Some(desc) = self.desc else {
            return false;
        };
        let Storage::Heap(shared) = self.storage else {
            return true;
        };
        if HeapHeader::is_unique(shared) {
            return true;
        }
        if !desc.has_clone() {
            crate::warn!("cannot detach a shared {}: the type cannot be copied", desc.name);
            return false;
        }
        let copy = HeapHeader::alloc(desc.layout);
        unsafe {
            desc.clone_into(
                HeapHeader::payload(shared).as_const(),
                HeapHeader::payload(copy).as_uninit(),
            );
            HeapHeader::release(shared, desc);
        }
        self.storage = Storage::Heap(copy);
        crate::trace!("detached a shared {}", desc.name);
        true
    }

    /// Whether the held value lives in a heap block shared with another variant.
    pub fn is_shared(&self) -> bool {
        match self.storage {
            Storage::Heap(header) => !HeapHeader::is_unique(header),
            _ => false,
        }
    }

    /// Whether the held value lives inside the variant.
    pub fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline(_))
    }

    /// Replaces the held value with `value` and returns it for writing.
    ///
    /// The current storage is reused when it can hold a `T`: the inline
    /// buffer, or an unshared heap block large enough.
    pub fn emplace<T: Describe>(&mut self, value: T) -> &mut T {
        let desc = descriptor_of::<T>();
        let reusable = match self.storage {
            Storage::Inline(_) => fits_inline(desc),
            Storage::Heap(header) => {
                let payload = unsafe { header.as_ref() }.payload;
                !fits_inline(desc)
                    && HeapHeader::is_unique(header)
                    && payload.size() >= desc.layout.size()
                    && payload.align() >= desc.layout.align()
            }
            Storage::Empty => false,
        };

        if reusable {
            if let (Some(old), Some(ptr)) = (self.desc.take(), self.raw_mut()) {
                unsafe {
                    (old.ops.drop_in_place)(ptr);
                    ptr.as_uninit().put(value);
                }
                self.desc = Some(desc);
            }
        } else {
            *self = Variant::new(value);
        }

        match self.raw_mut() {
            Some(ptr) => unsafe { ptr.as_mut::<T>() },
            None => unreachable!("a value was just stored"),
        }
    }

    /// Takes the value out, leaving the variant invalid.
    #[inline]
    pub fn take(&mut self) -> Variant {
        mem::take(self)
    }

    /// Drops the held value.
    #[inline]
    pub fn clear(&mut self) {
        *self = Variant::invalid();
    }

    /// Exchanges the values of two variants.
    #[inline]
    pub fn swap(&mut self, other: &mut Variant) {
        mem::swap(self, other);
    }

    /// A mutable view into the held value through a registered
    /// [mutable view](vessel_core::register_mutable_view), or the value itself
    /// when it is a `V`.
    pub fn view_mut<V: Describe>(&mut self) -> Option<&mut V> {
        let from = self.meta_id();
        let to = id_of::<V>();
        if from == to {
            return self.try_extract_as_mut::<V>();
        }
        let view = ConversionRegistry::global().mutable_view(from, to)?;
        let ptr = self.data_mut()?;
        Some(unsafe { view.project(ptr).as_mut::<V>() })
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self::invalid()
    }
}

impl Clone for Variant {
    fn clone(&self) -> Self {
        let Some(desc) = self.desc else {
            return Variant::invalid();
        };
        match &self.storage {
            Storage::Inline(buf) => unsafe { Self::copy_of(desc, PtrConst::new(buf.as_ptr())) },
            Storage::Heap(header) => {
                unsafe { header.as_ref() }.refs.fetch_add(1, Ordering::Relaxed);
                Variant {
                    desc: Some(desc),
                    storage: Storage::Heap(*header),
                }
            }
            Storage::Empty => Variant::invalid(),
        }
    }
}

impl Drop for Variant {
    fn drop(&mut self) {
        let Some(desc) = self.desc.take() else {
            return;
        };
        match &mut self.storage {
            Storage::Inline(buf) => unsafe { (desc.ops.drop_in_place)(PtrMut::new(buf.as_mut_ptr())) },
            Storage::Heap(header) => unsafe { HeapHeader::release(*header, desc) },
            Storage::Empty => {}
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.desc, self.data()) {
            (Some(desc), Some(ptr)) => write!(
                f,
                "Variant({}, {:?})",
                desc.name,
                unsafe { desc.debug_value(ptr) }
            ),
            _ => f.write_str("Variant(Invalid)"),
        }
    }
}

unsafe impl Describe for Variant {
    fn describe() -> TypeDescriptor {
        unsafe { TypeDescriptor::builder::<Variant>("Variant").builtin(Builtin::Variant) }
            .with_default()
            .with_clone()
            .with_ord()
            .with_debug()
            .with_stream()
            .is_null_with(Variant::is_null)
            .build()
    }
}
