use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::product::Product;

/// A seller identified by name, publishing the catalog clients buy from.
#[derive(Debug, Clone)]
pub struct Supplier {
    name: String,
    email: String,
    phone: String,
    products: HashMap<String, Product>,
}

impl Supplier {
    pub fn new(name: &str, email: &str, phone: &str) -> LedgerResult<Self> {
        if name.trim().is_empty() {
            return Err(LedgerError::validation("name cannot be empty"));
        }
        if email.trim().is_empty() {
            return Err(LedgerError::validation("email cannot be empty"));
        }
        if phone.trim().is_empty() {
            return Err(LedgerError::validation("phone cannot be empty"));
        }

        Ok(Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
            products: HashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    // Setters store the value as given; only the constructor trims. The name
    // is the registry key and has no setter.
    pub fn set_email(&mut self, email: &str) -> LedgerResult<()> {
        validate_new_value(email)?;
        self.email = email.to_string();
        Ok(())
    }

    pub fn set_phone(&mut self, phone: &str) -> LedgerResult<()> {
        validate_new_value(phone)?;
        self.phone = phone.to_string();
        Ok(())
    }

    /// Adds a plain product to the catalog.
    pub fn register_product(
        &mut self,
        name: &str,
        description: &str,
        price: Decimal,
    ) -> LedgerResult<()> {
        let product = Product::new(name, description, price)?;
        self.insert_product(product)
    }

    /// Adds a bundle priced off its components' current prices. Components
    /// are given as catalog keys, must exist, and cannot be bundles
    /// themselves.
    pub fn register_combo(
        &mut self,
        name: &str,
        description: &str,
        factor: Decimal,
        components: &[String],
    ) -> LedgerResult<()> {
        if components.is_empty() {
            return Err(LedgerError::validation(
                "combo must include at least one product",
            ));
        }

        let mut base_price = Decimal::ZERO;
        for key in components {
            let key = key.trim();
            let component = self
                .products
                .get(key)
                .ok_or_else(|| self.product_not_found(key))?;
            if component.is_combo() {
                return Err(LedgerError::validation(
                    "combo cannot contain another combo",
                ));
            }
            base_price += component.price();
        }

        let combo = Product::combo(
            name,
            description,
            base_price,
            factor,
            components.iter().map(|key| key.trim().to_string()).collect(),
        )?;
        self.insert_product(combo)
    }

    fn insert_product(&mut self, product: Product) -> LedgerResult<()> {
        match self.products.entry(product.key()) {
            Entry::Occupied(_) => Err(LedgerError::conflict(format!(
                "product {} already registered",
                product.key()
            ))),
            Entry::Vacant(slot) => {
                debug!(supplier = %self.name, product = %slot.key(), "product registered");
                slot.insert(product);
                Ok(())
            }
        }
    }

    /// Overwrites a product's price. Edits are not re-validated.
    pub fn set_product_price(&mut self, key: &str, price: Decimal) -> LedgerResult<()> {
        self.product_mut(key)?.set_price(price);
        Ok(())
    }

    /// Applies a new discount to a bundle; fails for plain products.
    pub fn set_combo_factor(&mut self, key: &str, factor: Decimal) -> LedgerResult<()> {
        self.product_mut(key)?.set_factor(factor)
    }

    /// Display string for the product under `key`.
    pub fn product_display(&self, key: &str) -> LedgerResult<String> {
        let product = self
            .products
            .get(key)
            .ok_or_else(|| self.product_not_found(key))?;
        Ok(product.to_string())
    }

    /// Every product as `"{supplier} - {product}"`, ascending by name then
    /// description. An empty catalog yields an empty string.
    pub fn catalog(&self) -> String {
        let mut products: Vec<&Product> = self.products.values().collect();
        products.sort_by_key(|product| product.sort_key());
        products
            .iter()
            .map(|product| format!("{} - {}", self.name, product))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Removes a product; `false` when the key is unknown.
    pub fn remove_product(&mut self, key: &str) -> bool {
        self.products.remove(key).is_some()
    }

    pub fn products(&self) -> &HashMap<String, Product> {
        &self.products
    }

    fn product_mut(&mut self, key: &str) -> LedgerResult<&mut Product> {
        let name = &self.name;
        self.products.get_mut(key).ok_or_else(|| {
            LedgerError::not_found(format!("no product {key} registered with {name}"))
        })
    }

    fn product_not_found(&self, key: &str) -> LedgerError {
        LedgerError::not_found(format!("no product {key} registered with {}", self.name))
    }
}

fn validate_new_value(value: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::validation("new value cannot be empty"));
    }
    Ok(())
}

impl PartialEq for Supplier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Supplier {}

impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.name, self.email, self.phone)
    }
}
