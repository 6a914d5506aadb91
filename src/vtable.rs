//! Dispatch table for type-erased callables.
//!
//! Every function here is instantiated with the concrete callable type `F` and
//! operates on an untyped pointer to an `F`. The pointer may refer to the inline
//! buffer or to a heap allocation, the functions don't care which.

use core::ptr::{self, NonNull};

use alloc::boxed::Box;

use crate::callable::Callable;

unsafe fn invoke<F, Args>(ptr: *mut u8, args: Args) -> F::Output
where
    F: Callable<Args>,
{
    // Safety: It was initialized as `F`.
    let f: &mut F = unsafe { &mut *ptr.cast::<F>() };
    f.invoke(args)
}

unsafe fn clone_boxed<F: Clone>(ptr: *const u8) -> NonNull<u8> {
    // Safety: It was initialized as `F`.
    let f: &F = unsafe { &*ptr.cast::<F>() };
    NonNull::from(Box::leak(Box::new(f.clone()))).cast()
}

unsafe fn clone_into<F: Clone>(src: *const u8, dst: *mut u8) {
    // Safety: It was initialized as `F`.
    let f: &F = unsafe { &*src.cast::<F>() };

    // Clone first, `dst` stays untouched if it panics.
    let cloned = f.clone();

    // Safety: `dst` is valid for writes of `F` and properly aligned.
    unsafe { dst.cast::<F>().write(cloned) }
}

unsafe fn relocate_into<F>(src: *mut u8, dst: *mut u8) {
    // Safety: `src` was initialized as `F`, `dst` is valid for writes of `F`.
    // After this `src` is logically uninitialized.
    unsafe { ptr::copy_nonoverlapping(src.cast::<F>(), dst.cast::<F>(), 1) }
}

unsafe fn drop_in_place<F>(ptr: *mut u8) {
    // Safety: It was initialized as `F`.
    unsafe { ptr::drop_in_place(ptr.cast::<F>()) }
}

unsafe fn drop_boxed<F>(ptr: NonNull<u8>) {
    // Safety: It was allocated as `Box<F>`.
    drop(unsafe { Box::from_raw(ptr.as_ptr().cast::<F>()) });
}

/// Lifecycle operations of one concrete callable type.
pub(crate) struct HolderVTable {
    /// Clones the value into a new heap allocation.
    clone_boxed: unsafe fn(*const u8) -> NonNull<u8>,
    /// Clones the value into uninitialized memory.
    clone_into: unsafe fn(*const u8, *mut u8),
    /// Moves the value into uninitialized memory.
    relocate_into: unsafe fn(*mut u8, *mut u8),
    /// Drops the value in place.
    drop_in_place: unsafe fn(*mut u8),
    /// Drops the value and frees its heap allocation.
    drop_boxed: unsafe fn(NonNull<u8>),
}

impl HolderVTable {
    /// Returns the vtable for callable type `F`.
    #[inline(always)]
    pub fn of<F: Clone>() -> &'static Self {
        &HolderVTable {
            clone_boxed: clone_boxed::<F>,
            clone_into: clone_into::<F>,
            relocate_into: relocate_into::<F>,
            drop_in_place: drop_in_place::<F>,
            drop_boxed: drop_boxed::<F>,
        }
    }

    /// # Safety
    ///
    /// `ptr` must point to a live value of the type this vtable was made for.
    #[inline(always)]
    pub unsafe fn clone_boxed(&self, ptr: *const u8) -> NonNull<u8> {
        unsafe { (self.clone_boxed)(ptr) }
    }

    /// # Safety
    ///
    /// `src` must point to a live value of the type this vtable was made for.
    /// `dst` must be valid for writes of that type and not hold a live value.
    #[inline(always)]
    pub unsafe fn clone_into(&self, src: *const u8, dst: *mut u8) {
        unsafe { (self.clone_into)(src, dst) }
    }

    /// # Safety
    ///
    /// Same as [`HolderVTable::clone_into`].
    /// In addition `src` must be treated as uninitialized afterwards.
    #[inline(always)]
    pub unsafe fn relocate_into(&self, src: *mut u8, dst: *mut u8) {
        unsafe { (self.relocate_into)(src, dst) }
    }

    /// # Safety
    ///
    /// `ptr` must point to a live value of the type this vtable was made for.
    /// The value must not be used afterwards.
    #[inline(always)]
    pub unsafe fn drop_in_place(&self, ptr: *mut u8) {
        unsafe { (self.drop_in_place)(ptr) }
    }

    /// # Safety
    ///
    /// `ptr` must come from [`HolderVTable::clone_boxed`] or from a leaked `Box`
    /// of the type this vtable was made for. It must not be used afterwards.
    #[inline(always)]
    pub unsafe fn drop_boxed(&self, ptr: NonNull<u8>) {
        unsafe { (self.drop_boxed)(ptr) }
    }
}

/// Erasure record of a stored callable.
///
/// `invoke` lives outside of the `'static` vtable,
/// so the argument types are free to borrow.
pub(crate) struct Dispatch<Args, R> {
    pub vtable: &'static HolderVTable,
    invoke: unsafe fn(*mut u8, Args) -> R,
}

impl<Args, R> Clone for Dispatch<Args, R> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<Args, R> Copy for Dispatch<Args, R> {}

impl<Args, R> Dispatch<Args, R> {
    /// Returns the erasure record for callable type `F`.
    #[inline(always)]
    pub fn of<F>() -> Self
    where
        F: Callable<Args, Output = R> + Clone,
    {
        Dispatch {
            vtable: HolderVTable::of::<F>(),
            invoke: invoke::<F, Args>,
        }
    }

    /// # Safety
    ///
    /// `ptr` must point to a live value of the type this record was made for.
    #[inline(always)]
    pub unsafe fn invoke(&self, ptr: *mut u8, args: Args) -> R {
        unsafe { (self.invoke)(ptr, args) }
    }
}
