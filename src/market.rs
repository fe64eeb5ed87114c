use std::collections::hash_map::Entry;
use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::account::Account;
use crate::client::Client;
use crate::error::{LedgerError, LedgerResult};
use crate::money;
use crate::product::Product;
use crate::purchase::Purchase;
use crate::supplier::Supplier;

/// Top-level registry: owns every client and supplier and routes
/// identifier-keyed operations to them. Clients are keyed by cpf, suppliers
/// by name.
#[derive(Debug, Default)]
pub struct Market {
    clients: HashMap<String, Client>,
    suppliers: HashMap<String, Supplier>,
}

/// One open (client, supplier) balance, shaped for the csv report.
#[derive(Debug, Serialize)]
pub struct BalanceRow {
    pub cpf: String,
    #[serde(rename = "cliente")]
    pub client: String,
    #[serde(rename = "fornecedor")]
    pub supplier: String,
    #[serde(rename = "debito", serialize_with = "money::serialize_normalized")]
    pub debt: Decimal,
}

impl Market {
    pub fn new() -> Self {
        Market::default()
    }

    /// Registers a client under its cpf and returns the stored cpf.
    pub fn register_client(
        &mut self,
        cpf: &str,
        name: &str,
        email: &str,
        location: &str,
    ) -> LedgerResult<String> {
        let client = Client::new(cpf, name, email, location)?;
        let cpf = client.cpf().to_string();
        match self.clients.entry(cpf.clone()) {
            Entry::Occupied(_) => Err(LedgerError::conflict(format!(
                "client {cpf} already registered"
            ))),
            Entry::Vacant(slot) => {
                info!(client = %cpf, "client registered");
                slot.insert(client);
                Ok(cpf)
            }
        }
    }

    pub fn client_display(&self, cpf: &str) -> LedgerResult<String> {
        Ok(self.client(cpf)?.to_string())
    }

    /// Every client ordered by name (cpf as tiebreak), joined with `" | "`.
    pub fn clients_display(&self) -> String {
        let mut clients: Vec<&Client> = self.clients.values().collect();
        clients.sort_by_key(|client| (client.name(), client.cpf()));
        clients
            .iter()
            .map(|client| client.to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Edits one client attribute: `nome`, `email` or `localizacao`. The cpf
    /// is the identity and cannot be edited.
    pub fn edit_client(&mut self, cpf: &str, attribute: &str, value: &str) -> LedgerResult<()> {
        if attribute.trim().is_empty() {
            return Err(LedgerError::validation("attribute cannot be empty"));
        }
        let client = self.client_mut(cpf)?;
        match attribute {
            "nome" => client.set_name(value),
            "email" => client.set_email(value),
            "localizacao" => client.set_location(value),
            "cpf" => Err(LedgerError::validation("cpf cannot be edited")),
            _ => Err(LedgerError::validation(format!(
                "unknown client attribute {attribute}"
            ))),
        }
    }

    pub fn remove_client(&mut self, cpf: &str) -> LedgerResult<()> {
        if self.clients.remove(cpf).is_none() {
            return Err(client_not_found(cpf));
        }
        info!(client = %cpf, "client removed");
        Ok(())
    }

    /// Registers a supplier under its name and returns the stored name.
    pub fn register_supplier(
        &mut self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> LedgerResult<String> {
        let supplier = Supplier::new(name, email, phone)?;
        let name = supplier.name().to_string();
        match self.suppliers.entry(name.clone()) {
            Entry::Occupied(_) => Err(LedgerError::conflict(format!(
                "supplier {name} already registered"
            ))),
            Entry::Vacant(slot) => {
                info!(supplier = %name, "supplier registered");
                slot.insert(supplier);
                Ok(name)
            }
        }
    }

    pub fn supplier_display(&self, name: &str) -> LedgerResult<String> {
        Ok(self.supplier(name)?.to_string())
    }

    /// Every supplier ordered by name, joined with `" | "`.
    pub fn suppliers_display(&self) -> String {
        let mut suppliers: Vec<&Supplier> = self.suppliers.values().collect();
        suppliers.sort_by_key(|supplier| supplier.name());
        suppliers
            .iter()
            .map(|supplier| supplier.to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Edits one supplier attribute: `email` or `telefone`. The name is the
    /// identity and cannot be edited.
    pub fn edit_supplier(&mut self, name: &str, attribute: &str, value: &str) -> LedgerResult<()> {
        if attribute.trim().is_empty() {
            return Err(LedgerError::validation("attribute cannot be empty"));
        }
        let supplier = self.supplier_mut(name)?;
        match attribute {
            "email" => supplier.set_email(value),
            "telefone" => supplier.set_phone(value),
            "nome" => Err(LedgerError::validation("supplier name cannot be edited")),
            _ => Err(LedgerError::validation(format!(
                "unknown supplier attribute {attribute}"
            ))),
        }
    }

    pub fn remove_supplier(&mut self, name: &str) -> LedgerResult<()> {
        if self.suppliers.remove(name).is_none() {
            return Err(supplier_not_found(name));
        }
        info!(supplier = %name, "supplier removed");
        Ok(())
    }

    pub fn register_product(
        &mut self,
        supplier: &str,
        name: &str,
        description: &str,
        price: Decimal,
    ) -> LedgerResult<()> {
        self.supplier_mut(supplier)?
            .register_product(name, description, price)
    }

    pub fn register_combo(
        &mut self,
        supplier: &str,
        name: &str,
        description: &str,
        factor: Decimal,
        components: &[String],
    ) -> LedgerResult<()> {
        self.supplier_mut(supplier)?
            .register_combo(name, description, factor, components)
    }

    pub fn set_product_price(
        &mut self,
        supplier: &str,
        key: &str,
        price: Decimal,
    ) -> LedgerResult<()> {
        self.supplier_mut(supplier)?.set_product_price(key, price)
    }

    pub fn set_combo_factor(
        &mut self,
        supplier: &str,
        key: &str,
        factor: Decimal,
    ) -> LedgerResult<()> {
        self.supplier_mut(supplier)?.set_combo_factor(key, factor)
    }

    pub fn product_display(&self, supplier: &str, key: &str) -> LedgerResult<String> {
        self.supplier(supplier)?.product_display(key)
    }

    pub fn supplier_catalog(&self, supplier: &str) -> LedgerResult<String> {
        Ok(self.supplier(supplier)?.catalog())
    }

    /// Every non-empty catalog, suppliers in name order, joined with `" | "`.
    pub fn all_catalogs(&self) -> String {
        let mut suppliers: Vec<&Supplier> = self.suppliers.values().collect();
        suppliers.sort_by_key(|supplier| supplier.name());
        suppliers
            .iter()
            .map(|supplier| supplier.catalog())
            .filter(|catalog| !catalog.is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    pub fn remove_product(&mut self, supplier: &str, key: &str) -> LedgerResult<bool> {
        Ok(self.supplier_mut(supplier)?.remove_product(key))
    }

    /// Records a purchase, pricing it from the supplier's catalog at the
    /// moment of sale. Returns the supplier identifier.
    pub fn add_purchase(
        &mut self,
        cpf: &str,
        supplier: &str,
        date: &str,
        product_name: &str,
        product_description: &str,
    ) -> LedgerResult<String> {
        self.client(cpf)?;
        let key = Product::key_of(product_name, product_description);
        let price = self
            .supplier(supplier)?
            .products()
            .get(&key)
            .ok_or_else(|| {
                LedgerError::not_found(format!("no product {key} registered with {supplier}"))
            })?
            .price();

        Ok(self
            .client_mut(cpf)?
            .add_purchase(supplier, date, product_name, product_description, price))
    }

    pub fn debt(&self, cpf: &str, supplier: &str) -> LedgerResult<Decimal> {
        self.client(cpf)?.debt(supplier)
    }

    pub fn account_summary(&self, cpf: &str, supplier: &str) -> LedgerResult<String> {
        self.client(cpf)?.account_summary(supplier)
    }

    pub fn client_summary(&self, cpf: &str) -> LedgerResult<String> {
        self.client(cpf)?.summary()
    }

    /// Settles a client's debt with one supplier, dropping that account.
    pub fn settle(&mut self, cpf: &str, supplier: &str) -> LedgerResult<()> {
        self.client_mut(cpf)?.settle(supplier)?;
        info!(client = %cpf, supplier, "debt settled");
        Ok(())
    }

    pub fn purchases(&self, cpf: &str) -> LedgerResult<Vec<&Purchase>> {
        Ok(self.client(cpf)?.purchases())
    }

    /// Open balances for the report: one row per (client, supplier) pair,
    /// ordered by client name, cpf, then supplier.
    pub fn open_balances(&self) -> Vec<BalanceRow> {
        let mut clients: Vec<&Client> = self.clients.values().collect();
        clients.sort_by_key(|client| (client.name(), client.cpf()));

        let mut rows = Vec::new();
        for client in clients {
            let mut accounts: Vec<&Account> = client.accounts().values().collect();
            accounts.sort_by_key(|account| account.supplier());
            for account in accounts {
                rows.push(BalanceRow {
                    cpf: client.cpf().to_string(),
                    client: client.name().to_string(),
                    supplier: account.supplier().to_string(),
                    debt: account.debt(),
                });
            }
        }
        rows
    }

    pub fn clients(&self) -> &HashMap<String, Client> {
        &self.clients
    }

    pub fn suppliers(&self) -> &HashMap<String, Supplier> {
        &self.suppliers
    }

    fn client(&self, cpf: &str) -> LedgerResult<&Client> {
        self.clients.get(cpf).ok_or_else(|| client_not_found(cpf))
    }

    fn client_mut(&mut self, cpf: &str) -> LedgerResult<&mut Client> {
        self.clients
            .get_mut(cpf)
            .ok_or_else(|| client_not_found(cpf))
    }

    fn supplier(&self, name: &str) -> LedgerResult<&Supplier> {
        self.suppliers
            .get(name)
            .ok_or_else(|| supplier_not_found(name))
    }

    fn supplier_mut(&mut self, name: &str) -> LedgerResult<&mut Supplier> {
        self.suppliers
            .get_mut(name)
            .ok_or_else(|| supplier_not_found(name))
    }
}

fn client_not_found(cpf: &str) -> LedgerError {
    LedgerError::not_found(format!("no client registered under {cpf}"))
}

fn supplier_not_found(name: &str) -> LedgerError {
    LedgerError::not_found(format!("no supplier registered under {name}"))
}
