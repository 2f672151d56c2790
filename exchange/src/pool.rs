// Object pool for `PriceLevel`s.
//
// Generalizes `common::mem_pool::MemPool`'s free-list-of-indices design from
// a fixed-size `[MaybeUninit<T>; N]` array to a growable `Vec<T>`: a book's
// working set of live price levels is not known ahead of time the way, say,
// a fixed connection pool's size is, so slots are handed out from storage
// that grows on demand rather than being capped at a const generic `N`.
//
// Unlike `MemPool`, which uses `UnsafeCell` so multiple `PoolPtr`s can alias
// into the pool concurrently, `LevelPool` is only ever touched through
// `&mut Book`, so ordinary `&mut self` methods are enough — no interior
// mutability needed.

use crate::price_level::PriceLevel;
use common::Price;

/// A lightweight, `Copy` reference to a level living in a `LevelPool`.
///
/// Stored as the value half of both `OrderedPriceIndex<Price, LevelHandle>`
/// and the side's `HashMap<Price, LevelHandle>` cache, so looking either one
/// up and then indexing the pool are both O(1)/O(log n) without touching
/// the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelHandle(usize);

pub struct LevelPool {
    storage: Vec<PriceLevel>,
    free_list: Vec<usize>,
    initial_queue_capacity: usize,
}

impl LevelPool {
    pub fn new(initial_queue_capacity: usize) -> Self {
        Self {
            storage: Vec::new(),
            free_list: Vec::new(),
            initial_queue_capacity,
        }
    }

    /// Reserves room for `hint` more slots without constructing any
    /// `PriceLevel`s. Cheap: it grows the pointer-sized `Vec<PriceLevel>`
    /// backing array, not the ring buffer each `PriceLevel` owns — acquiring
    /// a slot (and thus allocating its `initial_queue_capacity`-sized ring
    /// buffer) still happens lazily, on first touch at a price.
    pub fn reserve(&mut self, hint: usize) {
        self.storage.reserve(hint);
    }

    /// Hands out a level initialized at `price`, reusing a freed slot if one
    /// is available before growing storage.
    pub fn acquire(&mut self, price: Price) -> LevelHandle {
        if let Some(index) = self.free_list.pop() {
            self.storage[index].reset(price);
            LevelHandle(index)
        } else {
            let index = self.storage.len();
            self.storage
                .push(PriceLevel::new(price, self.initial_queue_capacity));
            LevelHandle(index)
        }
    }

    /// Returns a slot to the free list for reuse.
    ///
    /// # Panics
    ///
    /// Panics (debug only) if the level still has resting orders — the
    /// caller must fully drain a level before releasing it, otherwise the
    /// next `acquire` at a different price would silently discard them.
    pub fn release(&mut self, handle: LevelHandle) {
        debug_assert!(
            self.storage[handle.0].is_empty(),
            "released a LevelPool slot with resting orders still queued"
        );
        self.storage[handle.0].clear();
        self.free_list.push(handle.0);
    }

    #[inline]
    pub fn get(&self, handle: LevelHandle) -> &PriceLevel {
        &self.storage[handle.0]
    }

    #[inline]
    pub fn get_mut(&mut self, handle: LevelHandle) -> &mut PriceLevel {
        &mut self.storage[handle.0]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len() - self.free_list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
