use core::{mem, ptr::NonNull};

use alloc::boxed::Box;

use crate::{
    callable::Callable,
    storage::InlineStorage,
    vtable::Dispatch,
};

/// Callable stored in place, inside of the inline buffer.
pub(crate) struct InlineHolder<Args, R> {
    dispatch: Dispatch<Args, R>,
    storage: InlineStorage,
}

impl<Args, R> Drop for InlineHolder<Args, R> {
    #[inline(always)]
    fn drop(&mut self) {
        // Safety: Storage holds a live value described by `dispatch`.
        unsafe {
            self.dispatch.vtable.drop_in_place(self.storage.as_mut_ptr());
        }
    }
}

impl<Args, R> InlineHolder<Args, R> {
    /// Moves `f` into a fresh inline buffer.
    ///
    /// Panics if `F` doesn't fit. Check with [`InlineStorage::fits`] first.
    #[inline]
    pub fn new<F>(f: F) -> Self
    where
        F: Callable<Args, Output = R> + Clone + 'static,
    {
        let mut storage = InlineStorage::new();
        storage.as_mut::<F>().write(f);

        InlineHolder {
            dispatch: Dispatch::of::<F>(),
            storage,
        }
    }

    #[inline(always)]
    pub fn call(&mut self, args: Args) -> R {
        // Safety: Storage holds a live value described by `dispatch`.
        unsafe { self.dispatch.invoke(self.storage.as_mut_ptr(), args) }
    }

    /// Clones the stored callable into a new inline holder.
    #[inline]
    pub fn duplicate(&self) -> Self {
        let mut storage = InlineStorage::new();

        // Safety: Storage holds a live value described by `dispatch`.
        // New storage is empty and suits the same type.
        unsafe {
            self.dispatch
                .vtable
                .clone_into(self.storage.as_ptr(), storage.as_mut_ptr());
        }

        InlineHolder {
            dispatch: self.dispatch,
            storage,
        }
    }

    /// Moves the stored callable into a new inline holder.
    ///
    /// # Safety
    ///
    /// `self` is left without a value.
    /// It must be overwritten without being dropped.
    #[inline]
    pub unsafe fn relocate(&mut self) -> Self {
        let mut storage = InlineStorage::new();

        // Safety: Storage holds a live value described by `dispatch`.
        // Caller guarantees the source is not used again.
        unsafe {
            self.dispatch
                .vtable
                .relocate_into(self.storage.as_mut_ptr(), storage.as_mut_ptr());
        }

        InlineHolder {
            dispatch: self.dispatch,
            storage,
        }
    }

    /// Exchanges stored callables of two inline holders.
    ///
    /// Values are relocated through a scratch buffer:
    /// `self` to scratch, `other` to `self`, scratch to `other`.
    /// Dispatch records are exchanged afterwards.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        let mut scratch = InlineStorage::new();

        // Safety: Both storages hold live values described by their dispatch records.
        // Each value is moved exactly once per step and every slot is refilled
        // before the records are exchanged.
        unsafe {
            self.dispatch
                .vtable
                .relocate_into(self.storage.as_mut_ptr(), scratch.as_mut_ptr());
            other
                .dispatch
                .vtable
                .relocate_into(other.storage.as_mut_ptr(), self.storage.as_mut_ptr());
            self.dispatch
                .vtable
                .relocate_into(scratch.as_mut_ptr(), other.storage.as_mut_ptr());
        }

        mem::swap(&mut self.dispatch, &mut other.dispatch);
    }
}

/// Callable stored in its own heap allocation.
pub(crate) struct HeapHolder<Args, R> {
    dispatch: Dispatch<Args, R>,
    ptr: NonNull<u8>,
}

impl<Args, R> Drop for HeapHolder<Args, R> {
    #[inline(always)]
    fn drop(&mut self) {
        // Safety: `ptr` is a leaked box of the type described by `dispatch`.
        unsafe {
            self.dispatch.vtable.drop_boxed(self.ptr);
        }
    }
}

impl<Args, R> HeapHolder<Args, R> {
    /// Adopts already boxed callable.
    #[inline]
    pub fn from_box<F>(boxed: Box<F>) -> Self
    where
        F: Callable<Args, Output = R> + Clone + 'static,
    {
        HeapHolder {
            dispatch: Dispatch::of::<F>(),
            ptr: NonNull::from(Box::leak(boxed)).cast(),
        }
    }

    #[inline(always)]
    pub fn call(&mut self, args: Args) -> R {
        // Safety: `ptr` points to a live value described by `dispatch`.
        unsafe { self.dispatch.invoke(self.ptr.as_ptr(), args) }
    }

    /// Clones the stored callable into a new heap allocation.
    #[inline]
    pub fn duplicate(&self) -> Self {
        tracing::trace!("duplicating heap-stored callable");

        // Safety: `ptr` points to a live value described by `dispatch`.
        let ptr = unsafe { self.dispatch.vtable.clone_boxed(self.ptr.as_ptr()) };

        HeapHolder {
            dispatch: self.dispatch,
            ptr,
        }
    }
}
