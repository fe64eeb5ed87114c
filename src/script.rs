use std::io;

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::{LedgerError, LedgerResult};
use crate::market::Market;

/// Replays a headerless csv command script against a market.
///
/// Each record is one operation; the first field names it and the rest are
/// its arguments. Returns one line per record that produced output, with
/// failed records rendered as `error: {message}` lines so a bad record never
/// stops the replay.
pub fn run<R: io::Read>(market: &mut Market, input: R) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!(%err, "skipping unreadable record");
                lines.push(format!("error: {err}"));
                continue;
            }
        };

        match apply(market, &record) {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => {}
            Err(err) => lines.push(format!("error: {err}")),
        }
    }

    lines
}

fn apply(market: &mut Market, record: &csv::StringRecord) -> LedgerResult<Option<String>> {
    let operation = field(record, 0)?;
    match operation {
        "register_client" => {
            let cpf = market.register_client(
                field(record, 1)?,
                field(record, 2)?,
                field(record, 3)?,
                field(record, 4)?,
            )?;
            Ok(Some(cpf))
        }
        "client" => Ok(Some(market.client_display(field(record, 1)?)?)),
        "clients" => Ok(Some(market.clients_display())),
        "edit_client" => {
            market.edit_client(field(record, 1)?, field(record, 2)?, field(record, 3)?)?;
            Ok(None)
        }
        "remove_client" => {
            market.remove_client(field(record, 1)?)?;
            Ok(None)
        }
        "register_supplier" => {
            let name =
                market.register_supplier(field(record, 1)?, field(record, 2)?, field(record, 3)?)?;
            Ok(Some(name))
        }
        "supplier" => Ok(Some(market.supplier_display(field(record, 1)?)?)),
        "suppliers" => Ok(Some(market.suppliers_display())),
        "edit_supplier" => {
            market.edit_supplier(field(record, 1)?, field(record, 2)?, field(record, 3)?)?;
            Ok(None)
        }
        "remove_supplier" => {
            market.remove_supplier(field(record, 1)?)?;
            Ok(None)
        }
        "register_product" => {
            market.register_product(
                field(record, 1)?,
                field(record, 2)?,
                field(record, 3)?,
                decimal_field(record, 4)?,
            )?;
            Ok(None)
        }
        "register_combo" => {
            // Fields after the factor are the component keys.
            let components: Vec<String> = record.iter().skip(5).map(str::to_string).collect();
            market.register_combo(
                field(record, 1)?,
                field(record, 2)?,
                field(record, 3)?,
                decimal_field(record, 4)?,
                &components,
            )?;
            Ok(None)
        }
        "edit_price" => {
            market.set_product_price(
                field(record, 1)?,
                field(record, 2)?,
                decimal_field(record, 3)?,
            )?;
            Ok(None)
        }
        "edit_combo" => {
            market.set_combo_factor(
                field(record, 1)?,
                field(record, 2)?,
                decimal_field(record, 3)?,
            )?;
            Ok(None)
        }
        "product" => Ok(Some(
            market.product_display(field(record, 1)?, field(record, 2)?)?,
        )),
        "catalog" => Ok(Some(market.supplier_catalog(field(record, 1)?)?)),
        "catalogs" => Ok(Some(market.all_catalogs())),
        "remove_product" => {
            let removed = market.remove_product(field(record, 1)?, field(record, 2)?)?;
            Ok(Some(removed.to_string()))
        }
        "add_purchase" => {
            let supplier = market.add_purchase(
                field(record, 1)?,
                field(record, 2)?,
                field(record, 3)?,
                field(record, 4)?,
                field(record, 5)?,
            )?;
            Ok(Some(supplier))
        }
        "debt" => {
            let debt = market.debt(field(record, 1)?, field(record, 2)?)?;
            Ok(Some(crate::money::display_plain(debt)))
        }
        "account" => Ok(Some(
            market.account_summary(field(record, 1)?, field(record, 2)?)?,
        )),
        "accounts" => Ok(Some(market.client_summary(field(record, 1)?)?)),
        "settle" => {
            market.settle(field(record, 1)?, field(record, 2)?)?;
            Ok(None)
        }
        "purchases" => {
            let purchases = market.purchases(field(record, 1)?)?;
            let rendered: Vec<String> = purchases
                .iter()
                .map(|purchase| purchase.to_string())
                .collect();
            Ok(Some(rendered.join(" | ")))
        }
        _ => Err(LedgerError::validation(format!(
            "unknown operation {operation}"
        ))),
    }
}

fn field<'r>(record: &'r csv::StringRecord, index: usize) -> LedgerResult<&'r str> {
    record
        .get(index)
        .ok_or_else(|| LedgerError::validation(format!("missing field {index}")))
}

fn decimal_field(record: &csv::StringRecord, index: usize) -> LedgerResult<Decimal> {
    let raw = field(record, index)?;
    raw.parse()
        .map_err(|_| LedgerError::validation(format!("invalid amount {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(script: &str) -> Vec<String> {
        let mut market = Market::new();
        run(&mut market, script.as_bytes())
    }

    #[test]
    fn test_purchase_flow_produces_expected_lines() {
        let script = "\
register_supplier, Merc1, merc1@email.com, 99999-1111
register_product, Merc1, Arroz, Tipo1, 20
register_product, Merc1, Feijao, Preto, 10
register_client, 12345678901, Maria, maria@email.com, Centro
add_purchase, 12345678901, Merc1, 03/12/2013, Arroz, Tipo1
add_purchase, 12345678901, Merc1, 03/12/2013, Feijao, Preto
debt, 12345678901, Merc1
account, 12345678901, Merc1
";

        assert_eq!(
            vec![
                "Merc1",
                "12345678901",
                "Merc1",
                "Merc1",
                "30.00",
                "Cliente: Maria | Merc1 | R$30,00",
            ],
            run_script(script)
        );
    }

    #[test]
    fn test_failed_records_become_error_lines() {
        let script = "\
register_supplier, Merc1, merc1@email.com, 99999-1111
register_supplier, Merc1, outro@email.com, 88888-2222
debt, 12345678901, Merc1
explode
";

        assert_eq!(
            vec![
                "Merc1",
                "error: conflict: supplier Merc1 already registered",
                "error: not found: no client registered under 12345678901",
                "error: validation failed: unknown operation explode",
            ],
            run_script(script)
        );
    }

    #[test]
    fn test_missing_fields_become_error_lines() {
        let script = "register_client, 12345678901, Maria\n";

        assert_eq!(
            vec!["error: validation failed: missing field 3"],
            run_script(script)
        );
    }

    #[test]
    fn test_invalid_amount_becomes_error_line() {
        let script = "\
register_supplier, Merc1, merc1@email.com, 99999-1111
register_product, Merc1, Arroz, Tipo1, caro
";

        assert_eq!(
            vec!["Merc1", "error: validation failed: invalid amount caro"],
            run_script(script)
        );
    }

    #[test]
    fn test_combo_takes_trailing_fields_as_components() {
        let script = "\
register_supplier, Merc1, merc1@email.com, 99999-1111
register_product, Merc1, Arroz, Tipo1, 20
register_product, Merc1, Feijao, Preto, 10
register_combo, Merc1, Cesta, Basica, 0.5, Arroz Tipo1, Feijao Preto
product, Merc1, Cesta Basica
";

        assert_eq!(
            vec!["Merc1", "Cesta - Basica - R$15,00"],
            run_script(script)
        );
    }

    #[test]
    fn test_combo_without_components_fails() {
        let script = "\
register_supplier, Merc1, merc1@email.com, 99999-1111
register_combo, Merc1, Cesta, Basica, 0.5
";

        assert_eq!(
            vec![
                "Merc1",
                "error: validation failed: combo must include at least one product",
            ],
            run_script(script)
        );
    }

    #[test]
    fn test_settle_produces_no_line_and_clears_debt() {
        let script = "\
register_supplier, Merc1, merc1@email.com, 99999-1111
register_product, Merc1, Arroz, Tipo1, 20
register_client, 12345678901, Maria, maria@email.com, Centro
add_purchase, 12345678901, Merc1, 03/12/2013, Arroz, Tipo1
settle, 12345678901, Merc1
debt, 12345678901, Merc1
";

        assert_eq!(
            vec![
                "Merc1",
                "12345678901",
                "Merc1",
                "error: not found: client has no open account with Merc1",
            ],
            run_script(script)
        );
    }

    #[test]
    fn test_purchases_listing_and_removal_flag() {
        let script = "\
register_supplier, Merc1, merc1@email.com, 99999-1111
register_product, Merc1, Arroz, Tipo1, 20
register_client, 12345678901, Maria, maria@email.com, Centro
add_purchase, 12345678901, Merc1, 03/12/2013, Arroz, Tipo1
purchases, 12345678901
remove_product, Merc1, Arroz Tipo1
remove_product, Merc1, Arroz Tipo1
";

        assert_eq!(
            vec![
                "Merc1",
                "12345678901",
                "Merc1",
                "Arroz - 03-12-2013",
                "true",
                "false",
            ],
            run_script(script)
        );
    }
}
