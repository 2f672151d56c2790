// A single price's FIFO order queue, plus the running total it caches so
// the book never has to re-sum a queue to answer `total_volume()`.

use crate::order::Order;
use crate::ring_deque::RingDeque;
use common::{Price, Quantity};

pub struct PriceLevel {
    price: Price,
    total_volume: Quantity,
    queue: RingDeque<Order>,
}

impl PriceLevel {
    /// `initial_queue_capacity` must be a nonzero power of two; it is
    /// validated once by `BookConfig::validate` rather than on every level.
    pub(crate) fn new(price: Price, initial_queue_capacity: usize) -> Self {
        Self {
            price,
            total_volume: 0,
            queue: RingDeque::with_capacity(initial_queue_capacity),
        }
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub fn total_volume(&self) -> Quantity {
        self.total_volume
    }

    #[inline]
    pub fn order_count(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    pub fn front(&self) -> &Order {
        self.queue.front()
    }

    /// Oldest-to-newest iterator over resting orders. Used by invariant
    /// checks (e.g. `total_volume == Σ residuals`), not by matching.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.queue.iter()
    }

    /// Drops all resting orders and zeroes the cached volume. Called before
    /// a slot is returned to the pool, so a stale queue can never leak into
    /// the next price that reuses the slot.
    pub(crate) fn clear(&mut self) {
        self.queue.clear();
        self.total_volume = 0;
    }

    /// Re-homes an evicted pool slot onto a new price, for `LevelPool` reuse.
    pub(crate) fn reset(&mut self, price: Price) {
        self.clear();
        self.price = price;
    }

    /// Appends a new resting order to the back of the queue.
    pub(crate) fn enqueue(&mut self, order: Order) {
        self.total_volume += order.residual_quantity();
        self.queue.push_back(order);
    }

    /// Executes up to `amount` of resting quantity against the front of the
    /// queue, oldest order first, partially filling the front order before
    /// fully consuming it. Returns the quantity actually executed, which is
    /// `amount` unless the level runs dry first.
    pub(crate) fn fill(&mut self, amount: Quantity) -> Quantity {
        let mut remaining = amount;
        while remaining > 0 && !self.queue.is_empty() {
            let residual = self.queue.front().residual_quantity();
            if remaining >= residual {
                self.queue.pop_front();
                self.total_volume -= residual;
                remaining -= residual;
            } else {
                self.queue.front_mut().executed_quantity += remaining;
                self.total_volume -= remaining;
                remaining = 0;
            }
        }
        amount - remaining
    }
}
