// Core fixed-point type definitions shared across the order book crate.
//
// Prices are fixed-point ticks rather than floats: the matching engine and
// its side-cache hash maps key on price equality, and binary-float equality
// on arbitrary caller input is a latent hazard. Callers are responsible for
// snapping prices to valid ticks before submission.

pub type AccountId = u64;
pub type SequenceId = u64;
pub type Price = i64;
pub type Quantity = u64;

/// Which side of the book an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// Returns the opposite side.
    #[inline]
    pub fn opposite(&self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}
