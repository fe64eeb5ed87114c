use std::fmt;

use rust_decimal::Decimal;

use crate::money;
use crate::purchase::Purchase;

/// The open balance one client carries with one supplier.
///
/// Purchases accumulate in insertion order and the debt is always derived
/// from them, never stored separately.
#[derive(Debug, Clone)]
pub struct Account {
    supplier: String,
    purchases: Vec<Purchase>,
}

impl Account {
    pub fn new(supplier: impl Into<String>) -> Self {
        Self {
            supplier: supplier.into(),
            purchases: Vec::new(),
        }
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    /// Appends a purchase. Identical purchases are kept as separate entries.
    pub fn add_purchase(&mut self, purchase: Purchase) {
        self.purchases.push(purchase);
    }

    /// Sum of the recorded prices; zero while the account has no purchases.
    pub fn debt(&self) -> Decimal {
        self.purchases.iter().map(Purchase::price).sum()
    }

    /// Purchases in the order they were recorded.
    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.supplier, money::display_brl(self.debt()))
    }
}
