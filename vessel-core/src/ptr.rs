//! Erased pointers passed to descriptor hooks.
//!
//! Hooks never see a typed reference; they get one of three thin pointers
//! and cast back to the concrete type they were monomorphized for:
//!
//! - [`PtrConst`] points to an initialized value that is only read,
//! - [`PtrMut`] points to an initialized value that may be written or dropped,
//! - [`PtrUninit`] points to storage a hook is expected to initialize.
//!
//! None of them carries a lifetime. Whoever hands one to a hook vouches for
//! the type, the alignment and the liveness of what it points to.

use core::alloc::Layout;
use core::fmt;
use core::mem::MaybeUninit;

/// Pointer to an initialized value that may be written.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PtrMut {
    raw: *mut u8,
}

impl fmt::Debug for PtrMut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PtrMut({:p})", self.raw)
    }
}

impl PtrMut {
    /// Erases `ptr`.
    #[inline]
    pub const fn new<T>(ptr: *mut T) -> Self {
        Self { raw: ptr.cast() }
    }

    /// Read-only view of the same address.
    #[inline]
    pub const fn as_const(self) -> PtrConst {
        PtrConst { inner: self }
    }

    /// The same address, treated as storage to be initialized again.
    #[inline]
    pub const fn as_uninit(self) -> PtrUninit {
        PtrUninit { inner: self }
    }

    /// Typed raw pointer to the same address.
    #[inline]
    pub const fn as_mut_ptr<T>(self) -> *mut T {
        self.raw.cast()
    }

    /// Shared reference to the value.
    ///
    /// # Safety
    ///
    /// A live `T` must sit at this address for `'a`, with no writer.
    #[inline]
    pub unsafe fn get<'a, T>(self) -> &'a T {
        unsafe { &*self.as_mut_ptr::<T>() }
    }

    /// Exclusive reference to the value.
    ///
    /// # Safety
    ///
    /// A live `T` must sit at this address for `'a`, reachable through no
    /// other pointer in the meantime.
    #[inline]
    pub unsafe fn as_mut<'a, T>(self) -> &'a mut T {
        unsafe { &mut *self.as_mut_ptr::<T>() }
    }

    /// Moves the value out, leaving the storage logically uninitialized.
    ///
    /// # Safety
    ///
    /// A live `T` must sit at this address and must not be used again.
    #[inline]
    pub unsafe fn read<T>(self) -> T {
        unsafe { self.as_mut_ptr::<T>().read() }
    }

    /// Runs the destructor of the `T` at this address.
    ///
    /// # Safety
    ///
    /// A live `T` must sit at this address and must not be used again.
    #[inline]
    pub unsafe fn drop_in_place<T>(self) {
        unsafe { self.as_mut_ptr::<T>().drop_in_place() }
    }

    /// Pointer to the field `offset` bytes into the value.
    ///
    /// # Safety
    ///
    /// `offset` must stay inside the value.
    #[inline]
    pub unsafe fn field(self, offset: usize) -> PtrMut {
        PtrMut {
            raw: unsafe { self.raw.add(offset) },
        }
    }
}

/// Pointer to an initialized value that is only read.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PtrConst {
    inner: PtrMut,
}

impl fmt::Debug for PtrConst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PtrConst({:p})", self.inner.raw)
    }
}

impl PtrConst {
    /// Erases `ptr`.
    #[inline]
    pub const fn new<T>(ptr: *const T) -> Self {
        Self {
            inner: PtrMut::new(ptr.cast_mut()),
        }
    }

    /// Shared reference to the value. cf. [`PtrMut::get`]
    ///
    /// # Safety
    ///
    /// A live `T` must sit at this address for `'a`, with no writer.
    #[inline]
    pub unsafe fn get<'a, T>(self) -> &'a T {
        unsafe { self.inner.get::<T>() }
    }

    /// Bitwise copy of the value.
    ///
    /// # Safety
    ///
    /// A live `T` must sit at this address, and the caller takes over the
    /// ownership the copy implies.
    #[inline]
    pub unsafe fn read<T>(self) -> T {
        unsafe { self.inner.read::<T>() }
    }

    /// Pointer to the field `offset` bytes into the value.
    ///
    /// # Safety
    ///
    /// `offset` must stay inside the value.
    #[inline]
    pub unsafe fn field(self, offset: usize) -> PtrConst {
        unsafe { self.inner.field(offset) }.as_const()
    }
}

/// Pointer to storage that does not hold a value yet.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PtrUninit {
    inner: PtrMut,
}

impl fmt::Debug for PtrUninit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PtrUninit({:p})", self.inner.raw)
    }
}

impl PtrUninit {
    /// Erases `ptr`.
    #[inline]
    pub const fn new<T>(ptr: *mut T) -> Self {
        Self {
            inner: PtrMut::new(ptr),
        }
    }

    /// Storage of a stack slot.
    #[inline]
    pub fn from_maybe_uninit<T>(slot: &mut MaybeUninit<T>) -> Self {
        Self::new(slot.as_mut_ptr())
    }

    /// Untyped address of the storage.
    #[inline]
    pub const fn as_mut_byte_ptr(self) -> *mut u8 {
        self.inner.raw
    }

    /// Declares the storage initialized.
    ///
    /// # Safety
    ///
    /// A hook or [`PtrUninit::put`] must have written a value here.
    #[inline]
    pub const unsafe fn assume_init(self) -> PtrMut {
        self.inner
    }

    /// Moves `value` into the storage.
    ///
    /// # Safety
    ///
    /// The storage must be large enough and aligned for `T`.
    #[inline]
    pub unsafe fn put<T>(self, value: T) -> PtrMut {
        unsafe { self.inner.as_mut_ptr::<T>().write(value) };
        self.inner
    }
}

/// Allocates storage for `layout`. Zero-sized layouts get an aligned dangling
/// address and no allocation.
pub fn alloc_for_layout(layout: Layout) -> PtrUninit {
    if layout.size() == 0 {
        return PtrUninit::new(core::ptr::without_provenance_mut::<u8>(layout.align()));
    }
    let raw = unsafe { alloc::alloc::alloc(layout) };
    if raw.is_null() {
        alloc::alloc::handle_alloc_error(layout);
    }
    PtrUninit::new(raw)
}

/// Frees storage from [`alloc_for_layout`].
///
/// # Safety
///
/// `ptr` must come from [`alloc_for_layout`] with the same `layout`, and must
/// not have been freed yet. Any value in it must already be dropped.
pub unsafe fn dealloc_for_layout(ptr: PtrUninit, layout: Layout) {
    if layout.size() != 0 {
        unsafe { alloc::alloc::dealloc(ptr.as_mut_byte_ptr(), layout) }
    }
}
