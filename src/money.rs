use rust_decimal::{Decimal, RoundingStrategy};

fn round_to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Renders a value as a plain two-decimal amount with a dot separator.
pub fn display_plain(value: Decimal) -> String {
    format!("{:.2}", round_to_cents(value))
}

/// Renders a value the way catalog and account lines show money: `R$`
/// prefix, two decimals, comma separator.
pub fn display_brl(value: Decimal) -> String {
    format!("R${}", display_plain(value).replace('.', ","))
}

/// Serializes an amount as a string with trailing zeros normalized away.
pub fn serialize_normalized<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    rust_decimal::serde::str::serialize(&value.normalize(), serializer)
}
