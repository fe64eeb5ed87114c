use std::fmt;

use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::money;

/// Distinguishes plain catalog entries from discounted bundles.
#[derive(Debug, Clone)]
pub enum ProductKind {
    Simple,
    Combo {
        factor: Decimal,
        components: Vec<String>,
    },
}

/// A catalog entry, keyed in its supplier's map by `"{name} {description}"`.
#[derive(Debug, Clone)]
pub struct Product {
    name: String,
    description: String,
    price: Decimal,
    kind: ProductKind,
}

impl Product {
    pub fn new(name: &str, description: &str, price: Decimal) -> LedgerResult<Self> {
        Self::validated(name, description, price, ProductKind::Simple)
    }

    /// Builds a bundle over `base_price`, the price total of its components.
    /// The constructed price is `base_price * (1 - factor)`.
    pub fn combo(
        name: &str,
        description: &str,
        base_price: Decimal,
        factor: Decimal,
        components: Vec<String>,
    ) -> LedgerResult<Self> {
        validate_factor(factor)?;
        let mut combo = Self::validated(
            name,
            description,
            base_price,
            ProductKind::Combo { factor, components },
        )?;
        combo.price = base_price * (Decimal::ONE - factor);
        Ok(combo)
    }

    fn validated(
        name: &str,
        description: &str,
        price: Decimal,
        kind: ProductKind,
    ) -> LedgerResult<Self> {
        if name.trim().is_empty() {
            return Err(LedgerError::validation("product name cannot be empty"));
        }
        if description.trim().is_empty() {
            return Err(LedgerError::validation("product description cannot be empty"));
        }
        if price <= Decimal::ZERO {
            return Err(LedgerError::validation("price must be positive"));
        }

        Ok(Self {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            price,
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn kind(&self) -> &ProductKind {
        &self.kind
    }

    pub fn is_combo(&self) -> bool {
        matches!(self.kind, ProductKind::Combo { .. })
    }

    /// Catalog key of this product.
    pub fn key(&self) -> String {
        Self::key_of(&self.name, &self.description)
    }

    /// Catalog key derived from a raw name and description.
    pub fn key_of(name: &str, description: &str) -> String {
        format!("{} {}", name.trim(), description.trim())
    }

    /// Overwrites the price. Edits are not re-validated; only creation
    /// checks positivity.
    pub fn set_price(&mut self, price: Decimal) {
        self.price = price;
    }

    /// Applies a new discount to a bundle. The factor multiplies the current
    /// price by `1 - factor`, so repeated calls compound.
    pub fn set_factor(&mut self, factor: Decimal) -> LedgerResult<()> {
        validate_factor(factor)?;
        match &mut self.kind {
            ProductKind::Simple => Err(LedgerError::validation("product is not a combo")),
            ProductKind::Combo { factor: stored, .. } => {
                *stored = factor;
                self.price *= Decimal::ONE - factor;
                Ok(())
            }
        }
    }

    /// Sort key for catalog listings: ascending name, then description.
    pub fn sort_key(&self) -> (&str, &str) {
        (&self.name, &self.description)
    }
}

fn validate_factor(factor: Decimal) -> LedgerResult<()> {
    if factor <= Decimal::ZERO || factor >= Decimal::ONE {
        return Err(LedgerError::validation(
            "discount factor must be between 0 and 1",
        ));
    }
    Ok(())
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.name,
            self.description,
            money::display_brl(self.price)
        )
    }
}
