use domain::types::AmountType;
use rust_decimal::{Decimal, RoundingStrategy};

/// Сколько знаков после запятой разрешено в активной единице
pub fn max_decimals(
    amount_type: AmountType,
    token_decimals: Option<u32>,
    currency_decimals: u32,
    default_max_decimals: u32,
) -> u32 {
    match amount_type {
        AmountType::Coin => token_decimals.unwrap_or(default_max_decimals),
        AmountType::Currency => currency_decimals,
    }
}

/// Blank text is a cleared amount, not a number. `1e-9` is accepted too.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Проверка ввода.
/// - пусто -> ok (сброс)
/// - число с лишними знаками -> отказ
/// - мусор -> ok, дальше он станет "нет суммы"
pub fn is_valid(text: &str, max_decimals: u32) -> bool {
    match parse_amount(text) {
        Some(v) => v.scale() <= max_decimals,
        None => true,
    }
}

/// Round toward negative infinity.
pub fn floor_to(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::ToNegativeInfinity)
}

/// Floor, strip trailing zeros, plain notation.
pub fn plain_text(value: Decimal, decimals: u32) -> String {
    floor_to(value, decimals).normalize().to_string()
}

/// `balance * percent / 100`, never rounded up.
pub fn percent_of(balance: Decimal, percent: u32, decimals: u32) -> Option<Decimal> {
    let raw = balance
        .checked_mul(Decimal::from(percent))?
        .checked_div(Decimal::ONE_HUNDRED)?;
    Some(floor_to(raw, decimals))
}
