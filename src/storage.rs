use core::mem::{align_of, size_of, MaybeUninit};

/// Capacity in bytes of the inline buffer.
/// Callables larger than this are stored on the heap.
pub const MAX_SIZE: usize = 64;

/// Alignment of the inline buffer.
/// Callables with stricter alignment are stored on the heap.
pub const MAX_ALIGN: usize = 64;

/// Storage type that can hold any value of size `MAX_SIZE` and alignment `MAX_ALIGN`.
#[repr(C, align(64))] // alignment value is kept in sync with `MAX_ALIGN`
#[derive(Clone, Copy)]
pub(crate) struct InlineStorage {
    pub storage: MaybeUninit<[u8; MAX_SIZE]>,
}

impl InlineStorage {
    /// Construct new storage without initializing any value in it.
    pub const fn new() -> Self {
        InlineStorage {
            storage: MaybeUninit::uninit(),
        }
    }

    /// Returns `true` if the type `T` fits into the storage.
    pub const fn fits<T>() -> bool {
        size_of::<T>() <= MAX_SIZE && align_of::<T>() <= MAX_ALIGN
    }

    /// Returns mutable reference to the potentially uninitialized value.
    /// Type must be not larger than `MAX_SIZE` and not more aligned than `MAX_ALIGN`.
    ///
    /// The caller is responsible to ensure that the type is correct and the value is initialized before accessing it.
    pub fn as_mut<T>(&mut self) -> &mut MaybeUninit<T> {
        // This can't be const, because then it'll be checked in branches that are not taken.
        assert!(size_of::<T>() <= MAX_SIZE);
        assert!(align_of::<T>() <= MAX_ALIGN);

        // Safety: This cast is safe due to the size and alignment constraints.
        unsafe { &mut *self.storage.as_mut_ptr().cast() }
    }

    /// Untyped pointer to the start of the buffer.
    #[inline(always)]
    pub fn as_ptr(&self) -> *const u8 {
        self.storage.as_ptr().cast()
    }

    /// Untyped mutable pointer to the start of the buffer.
    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.storage.as_mut_ptr().cast()
    }
}

const _: () = assert!(size_of::<InlineStorage>() == MAX_SIZE);
const _: () = assert!(align_of::<InlineStorage>() == MAX_ALIGN);
