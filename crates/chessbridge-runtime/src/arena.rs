//! Call-scoped scratch memory in the native module's address space
//!
//! Every region comes from the module's own `malloc` and goes back through its
//! `free` when the [`ScratchBuffer`] guard drops, which covers normal return,
//! early return and unwinding alike.

use crate::error::{EngineError, EngineResult};
use crate::ffi::marshal::{decode_bounded, MarshalError};
use crate::ffi::types::{FreeFn, MallocFn};
use std::cell::Cell;
use std::os::raw::{c_char, c_int};
use std::ptr::NonNull;
use tracing::debug;

/// The module's allocator pair
#[derive(Clone, Copy)]
pub struct NativeAllocator {
    pub(crate) malloc: MallocFn,
    pub(crate) free: FreeFn,
}

impl NativeAllocator {
    pub fn new(malloc: MallocFn, free: FreeFn) -> Self {
        Self { malloc, free }
    }
}

/// Acquire/release counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStats {
    pub acquired: u64,
    pub released: u64,
}

impl ArenaStats {
    /// Regions currently held
    pub fn outstanding(&self) -> u64 {
        self.acquired - self.released
    }
}

/// Allocates scratch regions for one call at a time
pub struct ScratchArena {
    allocator: Option<NativeAllocator>,
    acquired: Cell<u64>,
    released: Cell<u64>,
}

impl ScratchArena {
    /// Arena over a module allocator; `None` for modules that only return text directly
    pub fn new(allocator: Option<NativeAllocator>) -> Self {
        Self {
            allocator,
            acquired: Cell::new(0),
            released: Cell::new(0),
        }
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            acquired: self.acquired.get(),
            released: self.released.get(),
        }
    }

    /// Allocate a region of `capacity` bytes
    ///
    /// Contents are unspecified until a native call fills them.
    pub fn acquire(&self, capacity: usize) -> EngineResult<ScratchBuffer<'_>> {
        let allocator = self
            .allocator
            .ok_or_else(|| EngineError::DecodingUnavailable {
                symbol: "malloc".to_string(),
            })?;

        let raw = unsafe { (allocator.malloc)(capacity) };
        let ptr = NonNull::new(raw).ok_or(EngineError::AllocationFailed { capacity })?;

        self.acquired.set(self.acquired.get() + 1);
        debug!(capacity, "scratch region acquired");

        Ok(ScratchBuffer {
            arena: self,
            free: allocator.free,
            ptr,
            capacity,
        })
    }

    /// Run `body` with a fresh region, releasing it afterwards
    ///
    /// `body` is not invoked if the allocation fails.
    pub fn with_scratch<R>(
        &self,
        capacity: usize,
        body: impl FnOnce(&mut ScratchBuffer<'_>) -> R,
    ) -> EngineResult<R> {
        let mut buffer = self.acquire(capacity)?;
        Ok(body(&mut buffer))
    }

    fn note_release(&self) {
        self.released.set(self.released.get() + 1);
    }
}

/// A region owned for the duration of one native call
pub struct ScratchBuffer<'a> {
    arena: &'a ScratchArena,
    free: FreeFn,
    ptr: NonNull<u8>,
    capacity: usize,
}

impl ScratchBuffer<'_> {
    /// Pointer handed to the native writer
    pub fn as_mut_ptr(&mut self) -> *mut c_char {
        self.ptr.as_ptr() as *mut c_char
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Capacity as passed across the C boundary
    pub fn capacity_c_int(&self) -> c_int {
        c_int::try_from(self.capacity).unwrap_or(c_int::MAX)
    }

    /// Decode the region as text, never reading past its capacity
    ///
    /// Only meaningful after the filling call reported success.
    pub fn read_string(&self) -> Result<String, MarshalError> {
        // The region is `capacity` bytes long and exclusively ours
        unsafe { decode_bounded(self.ptr.as_ptr() as *const c_char, self.capacity) }
    }
}

impl Drop for ScratchBuffer<'_> {
    fn drop(&mut self) {
        unsafe { (self.free)(self.ptr.as_ptr()) };
        self.arena.note_release();
        debug!(capacity = self.capacity, "scratch region released");
    }
}
