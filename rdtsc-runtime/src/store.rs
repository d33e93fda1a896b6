//! Fixed-capacity concurrent record store.
//!
//! Capture works in two phases. During the capture phase, any number of
//! threads share `&RecordStore` and call [`RecordStore::allocate_slot`],
//! which hands out globally unique slot indices from a single
//! sequentially-consistent atomic counter. Each returned [`Slot`] token owns
//! its index exclusively, so the subsequent record write needs no locks.
//!
//! Reading the store back requires `&mut RecordStore`: the embedder must have
//! joined (or otherwise quiesced) all writer threads to obtain it, which is
//! exactly the happens-before relation the readers rely on. The borrow
//! checker enforces the phase boundary instead of a runtime flag.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Error;
use crate::record::CallRecord;

/// Default maximum number of records a store can hold.
pub const CAPTURE_LIMIT: usize = 10_000;

pub struct RecordStore {
    slots: Box<[UnsafeCell<CallRecord>]>,
    next: AtomicU64,
}

// SAFETY: concurrent mutation only happens through `Slot::store`, and the
// allocator never hands out the same index twice, so writers touch disjoint
// cells. Reads go through `&mut self`, which excludes live `Slot` tokens.
unsafe impl Sync for RecordStore {}

impl RecordStore {
    /// Preallocate a store of `capacity` zeroed records.
    pub fn with_capacity(capacity: usize) -> Self {
        let slots: Vec<UnsafeCell<CallRecord>> = (0..capacity)
            .map(|_| UnsafeCell::new(CallRecord::default()))
            .collect();
        Self {
            slots: slots.into_boxed_slice(),
            next: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots handed out so far (and therefore populated, once the
    /// writers holding their tokens have finished).
    pub fn populated(&self) -> u64 {
        self.next.load(Ordering::SeqCst).min(self.slots.len() as u64)
    }

    /// Claim the next free slot.
    ///
    /// Fails with [`Error::CaptureLimitReached`] once the store is full; the
    /// counter and every stored record are left untouched in that case, so
    /// the caller may drop the record or treat the condition as fatal.
    pub fn allocate_slot(&self) -> Result<Slot<'_>, Error> {
        let capacity = self.slots.len() as u64;
        let index = self
            .next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if n < capacity {
                    Some(n + 1)
                } else {
                    None
                }
            })
            .map_err(|_| Error::CaptureLimitReached { limit: capacity })?;
        Ok(Slot { store: self, index })
    }

    /// The first `n` records, in slot order.
    ///
    /// `n` beyond the populated count yields zeroed records (the store is
    /// preallocated); `n` beyond the capacity is a caller error.
    pub fn records(&mut self, n: u64) -> Result<&[CallRecord], Error> {
        if n > self.slots.len() as u64 {
            return Err(Error::CountOutOfRange {
                n,
                capacity: self.slots.len() as u64,
            });
        }
        // SAFETY: `&mut self` proves no `Slot` token is live, so no cell is
        // being written. `UnsafeCell<CallRecord>` is repr(transparent) over
        // `CallRecord`, making the pointer cast layout-valid.
        Ok(unsafe {
            std::slice::from_raw_parts(self.slots.as_ptr().cast::<CallRecord>(), n as usize)
        })
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::with_capacity(CAPTURE_LIMIT)
    }
}

/// Exclusive claim on one slot of a [`RecordStore`].
///
/// Obtained from [`RecordStore::allocate_slot`]; consumed by [`Slot::store`].
/// Dropping a token without storing leaves the slot zeroed.
#[must_use = "an allocated slot should be filled with `store()`"]
pub struct Slot<'a> {
    store: &'a RecordStore,
    index: u64,
}

impl Slot<'_> {
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Write the record into the claimed slot.
    pub fn store(self, record: CallRecord) {
        // SAFETY: this token is the only handle to `self.index` (the atomic
        // allocator never repeats an index), and readers require `&mut` on
        // the store, so this write cannot race.
        unsafe { *self.store.slots[self.index as usize].get() = record };
    }
}
