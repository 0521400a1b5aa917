use domain::types::{AmountInfo, CurrencyValue};
use policy::decimal_policy::plain_text;
use rust_decimal::Decimal;

/// How many coin decimals the default formatter shows.
const COIN_DISPLAY_DECIMALS: u32 = 8;

/// Number formatting is owned by the presentation layer.
pub trait Formatter: Send + Sync {
    fn coin_amount(&self, value: Decimal, code: &str) -> String;
    fn currency_amount(&self, value: &CurrencyValue) -> String;

    fn amount_info(&self, info: &AmountInfo) -> String {
        match info {
            AmountInfo::Coin(c) => self.coin_amount(c.value, &c.token.code),
            AmountInfo::Currency(c) => self.currency_amount(c),
        }
    }
}

/// Localized strings.
pub trait Translator: Send + Sync {
    fn not_available(&self) -> String;
}

/// `1.5 ETH`, `$3000.5`
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn coin_amount(&self, value: Decimal, code: &str) -> String {
        format!("{} {}", plain_text(value, COIN_DISPLAY_DECIMALS), code)
    }

    fn currency_amount(&self, value: &CurrencyValue) -> String {
        format!(
            "{}{}",
            value.currency.symbol,
            plain_text(value.value, value.currency.decimals)
        )
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishTranslator;

impl Translator for EnglishTranslator {
    fn not_available(&self) -> String {
        "n/a".to_string()
    }
}
