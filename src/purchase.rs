use std::fmt;

use rust_decimal::Decimal;

/// One recorded sale on an account. Immutable once appended; the price is
/// whatever the catalog said at the moment of sale.
#[derive(Debug, Clone)]
pub struct Purchase {
    supplier: String,
    buyer: String,
    product_name: String,
    product_description: String,
    date: String,
    price: Decimal,
}

impl Purchase {
    pub fn new(
        supplier: impl Into<String>,
        buyer: impl Into<String>,
        product_name: impl Into<String>,
        product_description: impl Into<String>,
        date: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            supplier: supplier.into(),
            buyer: buyer.into(),
            product_name: product_name.into(),
            product_description: product_description.into(),
            date: date.into(),
            price,
        }
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn buyer(&self) -> &str {
        &self.buyer
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn product_description(&self) -> &str {
        &self.product_description
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn price(&self) -> Decimal {
        self.price
    }
}

impl fmt::Display for Purchase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.product_name, self.date.replace('/', "-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_swaps_date_slashes_for_dashes() {
        let purchase = Purchase::new(
            "Merc1",
            "Maria",
            "Arroz",
            "Tipo1",
            "03/12/2013",
            Decimal::new(2000, 2),
        );
        assert_eq!(purchase.to_string(), "Arroz - 03-12-2013");
    }

    #[test]
    fn test_date_kept_verbatim() {
        let purchase = Purchase::new("Merc1", "Maria", "Arroz", "Tipo1", "ontem", Decimal::ONE);
        assert_eq!(purchase.date(), "ontem");
        assert_eq!(purchase.to_string(), "Arroz - ontem");
    }
}
