//! In-memory view of the persisted ledger.

use crate::order::Order;

/// Orders in insertion (file) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    orders: Vec<Order>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_orders(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub fn push(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn last(&self) -> Option<&Order> {
        self.orders.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}
