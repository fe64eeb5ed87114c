use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use tracing::debug;

use crate::account::Account;
use crate::error::{LedgerError, LedgerResult};
use crate::purchase::Purchase;

/// A buyer identified by cpf, holding one open account per supplier bought
/// from. Accounts open lazily on the first purchase and disappear when the
/// debt is settled.
#[derive(Debug, Clone)]
pub struct Client {
    cpf: String,
    name: String,
    email: String,
    location: String,
    accounts: HashMap<String, Account>,
}

impl Client {
    /// Validates and builds a client. The cpf must be exactly 11 characters
    /// as given, before trimming; every field is stored trimmed.
    pub fn new(cpf: &str, name: &str, email: &str, location: &str) -> LedgerResult<Self> {
        if cpf.chars().count() != 11 {
            return Err(LedgerError::validation("cpf must be exactly 11 characters"));
        }
        if cpf.trim().is_empty() {
            return Err(LedgerError::validation("cpf cannot be blank"));
        }
        if name.trim().is_empty() {
            return Err(LedgerError::validation("name cannot be empty"));
        }
        if email.trim().is_empty() {
            return Err(LedgerError::validation("email cannot be empty"));
        }
        if location.trim().is_empty() {
            return Err(LedgerError::validation("location cannot be empty"));
        }

        Ok(Self {
            cpf: cpf.trim().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            location: location.trim().to_string(),
            accounts: HashMap::new(),
        })
    }

    pub fn cpf(&self) -> &str {
        &self.cpf
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    // Setters store the value as given; only the constructor trims.
    pub fn set_name(&mut self, name: &str) -> LedgerResult<()> {
        validate_new_value(name)?;
        self.name = name.to_string();
        Ok(())
    }

    pub fn set_email(&mut self, email: &str) -> LedgerResult<()> {
        validate_new_value(email)?;
        self.email = email.to_string();
        Ok(())
    }

    pub fn set_location(&mut self, location: &str) -> LedgerResult<()> {
        validate_new_value(location)?;
        self.location = location.to_string();
        Ok(())
    }

    /// Records a purchase on the supplier's account, opening the account on
    /// first use. The price is taken as given; resolving it from a catalog
    /// is the caller's job. Returns the supplier identifier.
    pub fn add_purchase(
        &mut self,
        supplier: &str,
        date: &str,
        product_name: &str,
        product_description: &str,
        price: Decimal,
    ) -> String {
        let purchase = Purchase::new(
            supplier,
            self.name.clone(),
            product_name,
            product_description,
            date,
            price,
        );
        self.accounts
            .entry(supplier.to_string())
            .or_insert_with(|| Account::new(supplier))
            .add_purchase(purchase);
        debug!(client = %self.cpf, supplier, "purchase recorded");

        supplier.to_string()
    }

    /// Current debt with one supplier.
    pub fn debt(&self, supplier: &str) -> LedgerResult<Decimal> {
        self.account(supplier).map(Account::debt)
    }

    /// Display line for the account held with one supplier.
    pub fn account_summary(&self, supplier: &str) -> LedgerResult<String> {
        let account = self.account(supplier)?;
        Ok(format!("Cliente: {} | {}", self.name, account))
    }

    /// Display line covering every open account, ordered by supplier.
    /// Fails when the client has no open accounts at all.
    pub fn summary(&self) -> LedgerResult<String> {
        if self.accounts.is_empty() {
            return Err(LedgerError::not_found(format!(
                "client {} has no open accounts",
                self.cpf
            )));
        }

        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by_key(|account| account.supplier());
        let rendered: Vec<String> = accounts.iter().map(|account| account.to_string()).collect();

        Ok(format!("Cliente: {} | {}", self.name, rendered.join(" | ")))
    }

    /// Settles the debt with one supplier. The whole account is dropped,
    /// purchase history included.
    pub fn settle(&mut self, supplier: &str) -> LedgerResult<()> {
        if self.accounts.remove(supplier).is_none() {
            return Err(account_not_found(supplier));
        }
        debug!(client = %self.cpf, supplier, "account settled");
        Ok(())
    }

    /// Every purchase across every open account. Purchases keep their order
    /// within an account; accounts themselves come in no particular order.
    pub fn purchases(&self) -> Vec<&Purchase> {
        self.accounts
            .values()
            .flat_map(|account| account.purchases())
            .collect()
    }

    pub fn accounts(&self) -> &HashMap<String, Account> {
        &self.accounts
    }

    fn account(&self, supplier: &str) -> LedgerResult<&Account> {
        self.accounts
            .get(supplier)
            .ok_or_else(|| account_not_found(supplier))
    }
}

fn account_not_found(supplier: &str) -> LedgerError {
    LedgerError::not_found(format!("client has no open account with {supplier}"))
}

fn validate_new_value(value: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::validation("new value cannot be empty"));
    }
    Ok(())
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.cpf == other.cpf
    }
}

impl Eq for Client {}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.name, self.location, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::prelude::Zero;
    use std::str::FromStr;

    fn decimal_str(decimal: &str) -> Decimal {
        Decimal::from_str(decimal).unwrap()
    }

    fn maria() -> Client {
        Client::new("12345678901", "Maria", "maria@email.com", "Centro").unwrap()
    }

    #[test]
    fn test_new_trims_every_field() {
        let client = Client::new(" 1234567890", " Maria ", " maria@email.com ", " Centro ").unwrap();

        assert_eq!("1234567890", client.cpf());
        assert_eq!("Maria", client.name());
        assert_eq!("maria@email.com", client.email());
        assert_eq!("Centro", client.location());
    }

    #[test]
    fn test_cpf_length_is_checked_on_the_raw_value() {
        let err = Client::new("1234567890", "Maria", "m@e.com", "Centro").unwrap_err();
        assert_eq!(
            LedgerError::validation("cpf must be exactly 11 characters"),
            err
        );

        let err = Client::new(" 12345678901", "Maria", "m@e.com", "Centro").unwrap_err();
        assert_eq!(
            LedgerError::validation("cpf must be exactly 11 characters"),
            err
        );
    }

    #[test]
    fn test_blank_cpf_of_valid_length_is_rejected() {
        let err = Client::new("           ", "Maria", "m@e.com", "Centro").unwrap_err();

        assert_eq!(LedgerError::validation("cpf cannot be blank"), err);
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let err = Client::new("12345678901", "  ", "m@e.com", "Centro").unwrap_err();
        assert_eq!(LedgerError::validation("name cannot be empty"), err);

        let err = Client::new("12345678901", "Maria", "", "Centro").unwrap_err();
        assert_eq!(LedgerError::validation("email cannot be empty"), err);

        let err = Client::new("12345678901", "Maria", "m@e.com", " ").unwrap_err();
        assert_eq!(LedgerError::validation("location cannot be empty"), err);
    }

    #[test]
    fn test_setters_store_the_raw_value() {
        let mut client = maria();
        client.set_name(" Maria Clara ").unwrap();
        client.set_email("mc@email.com").unwrap();
        client.set_location(" Zona Sul").unwrap();

        assert_eq!(" Maria Clara ", client.name());
        assert_eq!("mc@email.com", client.email());
        assert_eq!(" Zona Sul", client.location());
    }

    #[test]
    fn test_setters_reject_blank_values() {
        let mut client = maria();

        let err = client.set_name("  ").unwrap_err();
        assert_eq!(LedgerError::validation("new value cannot be empty"), err);
        let err = client.set_email("").unwrap_err();
        assert_eq!(LedgerError::validation("new value cannot be empty"), err);
        let err = client.set_location(" ").unwrap_err();
        assert_eq!(LedgerError::validation("new value cannot be empty"), err);

        assert_eq!("Maria", client.name());
    }

    #[test]
    fn test_add_purchase_opens_account_and_returns_supplier() {
        let mut client = maria();
        let supplier = client.add_purchase("Merc1", "03/12/2013", "Arroz", "Tipo1", decimal_str("20"));

        assert_eq!("Merc1", supplier);
        assert_eq!(decimal_str("20"), client.debt("Merc1").unwrap());
    }

    #[test]
    fn test_debt_accumulates_per_supplier() {
        let mut client = maria();
        client.add_purchase("Merc1", "03/12/2013", "Arroz", "Tipo1", decimal_str("20"));
        client.add_purchase("Merc1", "04/12/2013", "Feijao", "Preto", decimal_str("10"));
        client.add_purchase("Merc2", "04/12/2013", "Cafe", "Moido", decimal_str("8"));

        assert_eq!(decimal_str("30"), client.debt("Merc1").unwrap());
        assert_eq!(decimal_str("8"), client.debt("Merc2").unwrap());
    }

    #[test]
    fn test_debt_with_unknown_supplier_fails() {
        let client = maria();
        let err = client.debt("Merc1").unwrap_err();

        assert_eq!(
            LedgerError::not_found("client has no open account with Merc1"),
            err
        );
    }

    #[test]
    fn test_account_summary_format() {
        let mut client = maria();
        client.add_purchase("Merc1", "03/12/2013", "Arroz", "Tipo1", decimal_str("20"));
        client.add_purchase("Merc1", "04/12/2013", "Feijao", "Preto", decimal_str("10"));

        assert_eq!(
            "Cliente: Maria | Merc1 | R$30,00",
            client.account_summary("Merc1").unwrap()
        );
    }

    #[test]
    fn test_summary_orders_accounts_by_supplier() {
        let mut client = maria();
        client.add_purchase("Quitanda", "03/12/2013", "Banana", "Prata", decimal_str("5"));
        client.add_purchase("Merc1", "03/12/2013", "Arroz", "Tipo1", decimal_str("20"));

        assert_eq!(
            "Cliente: Maria | Merc1 | R$20,00 | Quitanda | R$5,00",
            client.summary().unwrap()
        );
    }

    #[test]
    fn test_summary_without_accounts_fails() {
        let client = maria();
        let err = client.summary().unwrap_err();

        assert_eq!(
            LedgerError::not_found("client 12345678901 has no open accounts"),
            err
        );
    }

    #[test]
    fn test_settle_drops_the_whole_account() {
        let mut client = maria();
        client.add_purchase("Merc1", "03/12/2013", "Arroz", "Tipo1", decimal_str("20"));
        client.settle("Merc1").unwrap();

        assert!(client.debt("Merc1").is_err());
        assert!(client.purchases().is_empty());

        let err = client.settle("Merc1").unwrap_err();
        assert_eq!(
            LedgerError::not_found("client has no open account with Merc1"),
            err
        );
    }

    #[test]
    fn test_purchases_span_every_account() {
        let mut client = maria();
        client.add_purchase("Merc1", "03/12/2013", "Arroz", "Tipo1", decimal_str("20"));
        client.add_purchase("Merc1", "04/12/2013", "Feijao", "Preto", decimal_str("10"));
        client.add_purchase("Merc2", "05/12/2013", "Cafe", "Moido", decimal_str("8"));

        let purchases = client.purchases();
        assert_eq!(3, purchases.len());

        let merc1: Vec<&str> = purchases
            .iter()
            .filter(|purchase| purchase.supplier() == "Merc1")
            .map(|purchase| purchase.product_name())
            .collect();
        assert_eq!(vec!["Arroz", "Feijao"], merc1);
    }

    #[test]
    fn test_purchase_records_current_buyer_name() {
        let mut client = maria();
        client.add_purchase("Merc1", "03/12/2013", "Arroz", "Tipo1", decimal_str("20"));
        client.set_name("Maria Clara").unwrap();
        client.add_purchase("Merc1", "04/12/2013", "Feijao", "Preto", decimal_str("10"));

        let buyers: Vec<&str> = client.purchases().iter().map(|p| p.buyer()).collect();
        assert!(buyers.contains(&"Maria"));
        assert!(buyers.contains(&"Maria Clara"));
    }

    #[test]
    fn test_equality_is_by_cpf() {
        let a = Client::new("12345678901", "Maria", "m@e.com", "Centro").unwrap();
        let b = Client::new("12345678901", "Outra", "o@e.com", "Leste").unwrap();
        let c = Client::new("10987654321", "Maria", "m@e.com", "Centro").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        assert_eq!("Maria - Centro - maria@email.com", maria().to_string());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn wrong_length_cpf_is_always_rejected(cpf in "[0-9]{0,20}") {
            prop_assume!(cpf.chars().count() != 11);

            let err = Client::new(&cpf, "Maria", "m@e.com", "Centro").unwrap_err();
            prop_assert!(matches!(err, LedgerError::Validation(_)));
        }

        #[test]
        fn debt_matches_recorded_prices(cents in prop::collection::vec(1i64..100_000, 1..24)) {
            let mut client = maria();
            let mut expected = Decimal::zero();
            for (index, amount) in cents.iter().enumerate() {
                let price = Decimal::new(*amount, 2);
                expected += price;
                client.add_purchase("Merc1", "03/12/2013", &format!("Produto{index}"), "Tipo1", price);
            }

            prop_assert_eq!(expected, client.debt("Merc1").unwrap());
        }
    }
}
