// Order types: what callers submit, and what the book stores once resting.

use common::{AccountId, Price, Quantity, SequenceId, Side};

/// Whether an order crosses at any price (market) or only at prices at
/// least as favourable as its own limit (limit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Limit,
    Market,
}

/// An order as handed to `Book::submit`.
///
/// Taken by value: once submitted, the caller has no further access to it,
/// which rules out the class of bug where a caller mutates an order after
/// handing it to the book while the book is still matching against it.
#[derive(Debug, Clone, Copy)]
pub struct IncomingOrder {
    pub account: AccountId,
    pub side: Side,
    pub kind: OrderKind,
    /// Ignored for the crossing test on a market order, but still carried
    /// through onto the resting `Order` if one is created — not relevant
    /// for a market order, since market orders never rest.
    pub price: Price,
    pub quantity: Quantity,
}

impl IncomingOrder {
    pub fn limit(account: AccountId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            account,
            side,
            kind: OrderKind::Limit,
            price,
            quantity,
        }
    }

    pub fn market(account: AccountId, side: Side, quantity: Quantity) -> Self {
        Self {
            account,
            side,
            kind: OrderKind::Market,
            price: 0,
            quantity,
        }
    }
}

/// An order resting in a `PriceLevel`'s queue.
///
/// Distinct from `IncomingOrder`: once accepted onto the book an order has
/// a `sequence` (its arrival rank, breaking ties within a price) and tracks
/// how much of it has executed so far. Market orders never reach this form,
/// since they never rest.
#[derive(Debug, Clone, Copy)]
pub struct Order {
    pub sequence: SequenceId,
    pub account: AccountId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub executed_quantity: Quantity,
}

impl Order {
    /// Builds the resting representation of `incoming`, crediting
    /// `executed_quantity` already filled by the matching loop before this
    /// order reached the book (e.g. a limit order that partially crossed
    /// before its residual rested).
    pub fn new(sequence: SequenceId, incoming: &IncomingOrder, executed_quantity: Quantity) -> Self {
        Self {
            sequence,
            account: incoming.account,
            side: incoming.side,
            price: incoming.price,
            quantity: incoming.quantity,
            executed_quantity,
        }
    }

    /// Quantity not yet executed.
    #[inline]
    pub fn residual_quantity(&self) -> Quantity {
        self.quantity - self.executed_quantity
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.residual_quantity() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_quantity_tracks_fills() {
        let incoming = IncomingOrder::limit(1, Side::Bid, 100, 10);
        let mut order = Order::new(0, &incoming, 0);
        assert_eq!(order.residual_quantity(), 10);
        assert!(!order.is_filled());
        order.executed_quantity = 10;
        assert_eq!(order.residual_quantity(), 0);
        assert!(order.is_filled());
    }

    #[test]
    fn new_credits_quantity_already_executed_before_resting() {
        let incoming = IncomingOrder::limit(1, Side::Bid, 100, 10);
        let order = Order::new(0, &incoming, 4);
        assert_eq!(order.executed_quantity, 4);
        assert_eq!(order.residual_quantity(), 6);
    }

    #[test]
    fn market_order_constructor_ignores_price() {
        let incoming = IncomingOrder::market(1, Side::Ask, 10);
        assert_eq!(incoming.kind, OrderKind::Market);
        assert_eq!(incoming.price, 0);
    }
}
