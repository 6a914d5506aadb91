use core::{
    fmt,
    marker::PhantomData,
    mem::{self, align_of, size_of},
    ptr,
};

use alloc::boxed::Box;

use crate::{
    callable::Callable,
    error::CallError,
    holder::{HeapHolder, InlineHolder},
    storage::InlineStorage,
};

enum Repr<Args, R> {
    Empty,
    Inline(InlineHolder<Args, R>),
    Heap(HeapHolder<Args, R>),
}

/// Moves inline holder from `inline` into `other` and `other`'s content into `inline`.
/// `other` must not be inline.
fn swap_mixed<Args, R>(inline: &mut Repr<Args, R>, other: &mut Repr<Args, R>) {
    let saved = mem::replace(other, Repr::Empty);

    let Repr::Inline(holder) = inline else {
        unreachable!("`swap_mixed` called without inline holder");
    };

    // Safety: `inline` is overwritten below without dropping the moved-out holder.
    let relocated = unsafe { holder.relocate() };
    *other = Repr::Inline(relocated);

    // Safety: Old value of `inline` is a relocated holder that must not be dropped.
    unsafe {
        ptr::write(inline, saved);
    }
}

/// `FnMut` with fixed-size inlined storage.
/// Callables that fit in the storage are stored without allocation.
/// Callables that are too large are boxed.
/// Stored callables may not implement `Send` and `Sync`.
/// For thread-safe version see [`TFn`].
///
/// `Args` is a tuple of argument types and `R` is the return type,
/// i.e. `LTFn<(u32, u32), u32>` can hold any `FnMut(u32, u32) -> u32 + Clone`.
pub struct LTFn<Args, R> {
    repr: Repr<Args, R>,
    unsend: PhantomData<*mut u8>,
}

impl<Args, R> Default for LTFn<Args, R> {
    #[inline(always)]
    fn default() -> Self {
        LTFn::empty()
    }
}

impl<Args, R> Clone for LTFn<Args, R> {
    /// Clones the stored callable.
    /// The clone uses the same storage mode as the original.
    #[inline]
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            Repr::Empty => Repr::Empty,
            Repr::Inline(holder) => Repr::Inline(holder.duplicate()),
            Repr::Heap(holder) => Repr::Heap(holder.duplicate()),
        };

        LTFn {
            repr,
            unsend: PhantomData,
        }
    }

    /// Replaces stored callable with a clone of `source`'s.
    ///
    /// If cloning panics, `self` is left unmodified.
    #[inline]
    fn clone_from(&mut self, source: &Self) {
        let mut tmp = source.clone();
        self.swap(&mut tmp);
    }
}

impl<Args, R> fmt::Debug for LTFn<Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = match &self.repr {
            Repr::Empty => "empty",
            Repr::Inline(_) => "inline",
            Repr::Heap(_) => "heap",
        };

        f.debug_struct("LTFn").field("storage", &storage).finish()
    }
}

impl<Args, R> LTFn<Args, R> {
    /// Returns `true` if the callable type `F` fits and can be stored without allocation.
    /// If `true`, then `LTFn::new::<F>` is guaranteed to not allocate.
    ///
    /// # Example
    ///
    /// ```
    /// # use tfn::LTFn;
    /// fn answer() -> u32 {
    ///     42
    /// }
    ///
    /// assert!(LTFn::<(), u32>::fits::<fn() -> u32>());
    /// let f: LTFn<(), u32> = LTFn::new(answer as fn() -> u32);
    /// assert!(f.is_inline());
    /// ```
    pub const fn fits<F>() -> bool {
        InlineStorage::fits::<F>()
    }

    /// Construct new [`LTFn`] without a callable.
    ///
    /// Calling it fails with [`CallError::Empty`].
    ///
    /// # Example
    ///
    /// ```
    /// # use tfn::{CallError, LTFn};
    /// let mut f: LTFn<(), i32> = LTFn::empty();
    ///
    /// assert!(f.is_empty());
    /// assert_eq!(f.call(()), Err(CallError::Empty));
    /// ```
    #[inline(always)]
    pub const fn empty() -> Self {
        LTFn {
            repr: Repr::Empty,
            unsend: PhantomData,
        }
    }

    /// Construct new [`LTFn`] with the given callable.
    ///
    /// If the type `F` fits in the storage, it is stored without allocation.
    /// Otherwise, it will be boxed.
    ///
    /// Type of callable may not implement `Send` or `Sync`.
    /// But [`LTFn`] itself does not implement `Send` and `Sync`.
    /// For `Send` and `Sync` container see [`TFn`].
    ///
    /// # Example
    ///
    /// ```
    /// # use tfn::LTFn;
    /// let mut f: LTFn<(u32, u32), u32> = LTFn::new(|a: u32, b: u32| a + b);
    ///
    /// assert_eq!(f.call((2, 3)), Ok(5));
    /// ```
    #[inline]
    pub fn new<F>(f: F) -> Self
    where
        F: Callable<Args, Output = R> + Clone + 'static,
    {
        let inline = InlineStorage::fits::<F>();

        tracing::trace!(
            size = size_of::<F>(),
            align = align_of::<F>(),
            inline,
            "storing callable"
        );

        let repr = if inline {
            Repr::Inline(InlineHolder::new(f))
        } else {
            Repr::Heap(HeapHolder::from_box(Box::new(f)))
        };

        LTFn {
            repr,
            unsend: PhantomData,
        }
    }

    /// Construct new [`LTFn`] from the given boxed callable.
    ///
    /// If type fits in the storage, callable will be unboxed.
    /// Otherwise it will be stored as boxed, but no allocation will be performed.
    ///
    /// # Example
    ///
    /// ```
    /// # use tfn::LTFn;
    /// let table = [7u64; 32];
    /// let boxed = Box::new(move |i: usize| table[i]);
    ///
    /// // No additional allocation is performed.
    /// let mut f: LTFn<(usize,), u64> = LTFn::from_box(boxed);
    ///
    /// assert!(!f.is_inline());
    /// assert_eq!(f.call((3,)), Ok(7));
    /// ```
    #[inline]
    pub fn from_box<F>(boxed: Box<F>) -> Self
    where
        F: Callable<Args, Output = R> + Clone + 'static,
    {
        let inline = InlineStorage::fits::<F>();

        tracing::trace!(
            size = size_of::<F>(),
            align = align_of::<F>(),
            inline,
            "storing boxed callable"
        );

        let repr = if inline {
            Repr::Inline(InlineHolder::new(*boxed))
        } else {
            Repr::Heap(HeapHolder::from_box(boxed))
        };

        LTFn {
            repr,
            unsend: PhantomData,
        }
    }

    /// Construct new [`LTFn`] from optional callable.
    /// `None` produces empty container.
    ///
    /// # Example
    ///
    /// ```
    /// # use tfn::LTFn;
    /// let f: LTFn<(), i32> = LTFn::from_option(None::<fn() -> i32>);
    /// assert!(f.is_empty());
    ///
    /// let f: LTFn<(), i32> = LTFn::from_option(Some(|| 1));
    /// assert!(!f.is_empty());
    /// ```
    #[inline]
    pub fn from_option<F>(f: Option<F>) -> Self
    where
        F: Callable<Args, Output = R> + Clone + 'static,
    {
        match f {
            None => LTFn::empty(),
            Some(f) => LTFn::new(f),
        }
    }

    /// Returns `true` if there is no stored callable.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        matches!(self.repr, Repr::Empty)
    }

    /// Returns `true` if the stored callable lives in the inline storage.
    /// Returns `false` if it is boxed or there is none.
    #[inline(always)]
    pub fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline(_))
    }

    /// Calls the stored callable.
    ///
    /// Returns [`CallError::Empty`] if there is none.
    /// Panics raised by the callable propagate as is.
    ///
    /// # Example
    ///
    /// ```
    /// # use tfn::LTFn;
    /// let mut calls = 0;
    /// let mut f: LTFn<(), i32> = LTFn::new(move || {
    ///     calls += 1;
    ///     calls
    /// });
    ///
    /// assert_eq!(f.call(()), Ok(1));
    /// assert_eq!(f.call(()), Ok(2));
    /// ```
    #[inline]
    pub fn call(&mut self, args: Args) -> Result<R, CallError> {
        match &mut self.repr {
            Repr::Empty => Err(CallError::Empty),
            Repr::Inline(holder) => Ok(holder.call(args)),
            Repr::Heap(holder) => Ok(holder.call(args)),
        }
    }

    /// Exchanges stored callables of two containers.
    ///
    /// # Example
    ///
    /// ```
    /// # use tfn::LTFn;
    /// let mut a: LTFn<(), i32> = LTFn::new(|| 1);
    /// let mut b: LTFn<(), i32> = LTFn::new(|| 2);
    ///
    /// a.swap(&mut b);
    ///
    /// assert_eq!(a.call(()), Ok(2));
    /// assert_eq!(b.call(()), Ok(1));
    /// ```
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        match (&mut self.repr, &mut other.repr) {
            (Repr::Inline(a), Repr::Inline(b)) => a.swap(b),
            (Repr::Inline(_), _) => swap_mixed(&mut self.repr, &mut other.repr),
            (_, Repr::Inline(_)) => swap_mixed(&mut other.repr, &mut self.repr),
            (a, b) => mem::swap(a, b),
        }
    }

    /// Takes the stored callable out, leaving empty container in its place.
    ///
    /// # Example
    ///
    /// ```
    /// # use tfn::LTFn;
    /// let mut a: LTFn<(), i32> = LTFn::new(|| 2);
    /// let mut b = a.take();
    ///
    /// assert!(a.is_empty());
    /// assert_eq!(b.call(()), Ok(2));
    /// ```
    #[inline]
    pub fn take(&mut self) -> Self {
        let mut taken = LTFn::empty();
        self.swap(&mut taken);
        taken
    }

    /// Replaces the stored callable with `f`.
    ///
    /// The previous callable is dropped after the new one is in place.
    ///
    /// # Example
    ///
    /// ```
    /// # use tfn::LTFn;
    /// let mut f: LTFn<(), i32> = LTFn::empty();
    /// f.set(|| 1);
    ///
    /// assert_eq!(f.call(()), Ok(1));
    /// ```
    #[inline]
    pub fn set<F>(&mut self, f: F)
    where
        F: Callable<Args, Output = R> + Clone + 'static,
    {
        let mut tmp = LTFn::new(f);
        self.swap(&mut tmp);
    }

    /// Drops the stored callable, leaving container empty.
    #[inline]
    pub fn clear(&mut self) {
        drop(self.take());
    }
}

/// `FnMut` with fixed-size inlined storage.
/// Callables that fit in the storage are stored without allocation.
/// Callables that are too large are boxed.
/// Requires `Send` and `Sync`.
/// For thread-local version see [`LTFn`].
pub struct TFn<Args, R> {
    inner: LTFn<Args, R>,
}

// Safety: Only `Send + Sync` callables can be stored.
// Arguments and results are never stored.
unsafe impl<Args, R> Send for TFn<Args, R> {}
unsafe impl<Args, R> Sync for TFn<Args, R> {}

impl<Args, R> From<TFn<Args, R>> for LTFn<Args, R> {
    #[inline(always)]
    fn from(value: TFn<Args, R>) -> Self {
        value.inner
    }
}

impl<Args, R> Default for TFn<Args, R> {
    #[inline(always)]
    fn default() -> Self {
        TFn::empty()
    }
}

impl<Args, R> Clone for TFn<Args, R> {
    #[inline]
    fn clone(&self) -> Self {
        TFn {
            inner: self.inner.clone(),
        }
    }

    #[inline]
    fn clone_from(&mut self, source: &Self) {
        self.inner.clone_from(&source.inner);
    }
}

impl<Args, R> fmt::Debug for TFn<Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = if self.inner.is_empty() {
            "empty"
        } else if self.inner.is_inline() {
            "inline"
        } else {
            "heap"
        };

        f.debug_struct("TFn").field("storage", &storage).finish()
    }
}

impl<Args, R> TFn<Args, R> {
    /// Returns `true` if the callable type `F` fits and can be stored without allocation.
    /// If `true`, then `TFn::new::<F>` is guaranteed to not allocate.
    pub const fn fits<F>() -> bool {
        InlineStorage::fits::<F>()
    }

    /// Construct new [`TFn`] without a callable.
    #[inline(always)]
    pub const fn empty() -> Self {
        TFn {
            inner: LTFn::empty(),
        }
    }

    /// Construct new [`TFn`] with the given callable.
    ///
    /// If the type `F` fits in the storage, it is stored without allocation.
    /// Otherwise, it will be boxed.
    ///
    /// Type of callable must implement both `Send` and `Sync`.
    /// And [`TFn`] itself implement `Send` and `Sync`.
    /// For callables that do not implement `Send` or `Sync`, use [`LTFn`].
    ///
    /// # Example
    ///
    /// ```
    /// # use tfn::TFn;
    /// let mut f: TFn<(u32,), u32> = TFn::new(|x: u32| x * 2);
    ///
    /// let handle = std::thread::spawn(move || f.call((21,)));
    /// assert_eq!(handle.join().unwrap(), Ok(42));
    /// ```
    #[inline]
    pub fn new<F>(f: F) -> Self
    where
        F: Callable<Args, Output = R> + Clone + Send + Sync + 'static,
    {
        TFn {
            inner: LTFn::new(f),
        }
    }

    /// Construct new [`TFn`] from the given boxed callable.
    ///
    /// If type fits in the storage, callable will be unboxed.
    /// Otherwise it will be stored as boxed, but no allocation will be performed.
    #[inline]
    pub fn from_box<F>(boxed: Box<F>) -> Self
    where
        F: Callable<Args, Output = R> + Clone + Send + Sync + 'static,
    {
        TFn {
            inner: LTFn::from_box(boxed),
        }
    }

    /// Construct new [`TFn`] from optional callable.
    /// `None` produces empty container.
    #[inline]
    pub fn from_option<F>(f: Option<F>) -> Self
    where
        F: Callable<Args, Output = R> + Clone + Send + Sync + 'static,
    {
        TFn {
            inner: LTFn::from_option(f),
        }
    }

    /// Returns `true` if there is no stored callable.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` if the stored callable lives in the inline storage.
    #[inline(always)]
    pub fn is_inline(&self) -> bool {
        self.inner.is_inline()
    }

    /// Calls the stored callable.
    ///
    /// Returns [`CallError::Empty`] if there is none.
    #[inline]
    pub fn call(&mut self, args: Args) -> Result<R, CallError> {
        self.inner.call(args)
    }

    /// Exchanges stored callables of two containers.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        self.inner.swap(&mut other.inner);
    }

    /// Takes the stored callable out, leaving empty container in its place.
    #[inline]
    pub fn take(&mut self) -> Self {
        TFn {
            inner: self.inner.take(),
        }
    }

    /// Replaces the stored callable with `f`.
    #[inline]
    pub fn set<F>(&mut self, f: F)
    where
        F: Callable<Args, Output = R> + Clone + Send + Sync + 'static,
    {
        self.inner.set(f);
    }

    /// Drops the stored callable, leaving container empty.
    #[inline]
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
