//! In-memory open-account commerce ledger.
//!
//! Suppliers publish product catalogs, clients buy on credit, and every
//! (client, supplier) pair carries a running debt that a payment settles in
//! full. A csv command script drives the whole thing through [`script::run`],
//! and [`market::Market`] is the programmatic entry point.

pub mod account;
pub mod client;
pub mod error;
pub mod market;
pub mod money;
pub mod product;
pub mod purchase;
pub mod script;
pub mod supplier;

use std::sync::Once;

pub use account::Account;
pub use client::Client;
pub use error::{LedgerError, LedgerResult};
pub use market::{BalanceRow, Market};
pub use product::{Product, ProductKind};
pub use purchase::Purchase;
pub use supplier::Supplier;

static INIT_TRACING: Once = Once::new();

/// Installs the global tracing subscriber. Filtering follows `RUST_LOG`,
/// with `fiado=info` as the default. Safe to call more than once.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::from_default_env().add_directive("fiado=info".parse().unwrap());
        fmt().with_env_filter(filter).init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
