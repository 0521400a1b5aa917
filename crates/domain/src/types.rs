//! Core domain types.
//!
//! Цель:
//! - одна сумма, две единицы (coin / currency)
//! - "неизвестно" это `None`, а не ошибка
//! - единица измерения всегда видна по типу

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// В какой единице пользователь вводит сумму
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountType {
    Coin,
    Currency,
}

impl AmountType {
    pub fn toggled(self) -> Self {
        match self {
            Self::Coin => Self::Currency,
            Self::Currency => Self::Coin,
        }
    }
}

/// Base asset of a card (ETH, USDT, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub coin_uid: String,
    pub code: String,
    /// native precision of the asset
    pub decimals: u32,
}

impl Token {
    pub fn new(coin_uid: impl Into<String>, code: impl Into<String>, decimals: u32) -> Self {
        Self {
            coin_uid: coin_uid.into(),
            code: code.into(),
            decimals,
        }
    }
}

/// Reference currency (USD, EUR, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    pub decimals: u32,
}

impl Currency {
    pub fn new(code: impl Into<String>, symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            code: code.into(),
            symbol: symbol.into(),
            decimals,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new("USD", "$", 2)
    }
}

/// Количество base asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinValue {
    pub token: Token,
    pub value: Decimal,
}

/// Сумма в reference currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyValue {
    pub currency: Currency,
    pub value: Decimal,
}

/// A value tagged with the unit it is expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AmountInfo {
    Coin(CoinValue),
    Currency(CurrencyValue),
}

impl AmountInfo {
    pub fn value(&self) -> Decimal {
        match self {
            Self::Coin(c) => c.value,
            Self::Currency(c) => c.value,
        }
    }

    pub fn amount_type(&self) -> AmountType {
        match self {
            Self::Coin(_) => AmountType::Coin,
            Self::Currency(_) => AmountType::Currency,
        }
    }
}

/// Both representations of one amount after conversion.
///
/// `primary` is in the active unit, `coin_amount` is always in the base asset
/// no matter which unit is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledAmount {
    pub primary: AmountInfo,
    pub primary_decimals: u32,
    pub secondary: Option<AmountInfo>,
    pub coin_amount: Option<Decimal>,
}

impl ReconciledAmount {
    pub fn primary_value(&self) -> Decimal {
        self.primary.value()
    }

    /// Currency symbol to show in front of the input, only for currency input.
    pub fn primary_prefix(&self) -> Option<&str> {
        match &self.primary {
            AmountInfo::Currency(c) => Some(c.currency.symbol.as_str()),
            AmountInfo::Coin(_) => None,
        }
    }
}

/// Presentation snapshot of the input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputParams {
    pub amount_type: AmountType,
    pub primary_prefix: Option<String>,
    pub switch_enabled: bool,
}

impl InputParams {
    pub fn new(amount_type: AmountType, currency: &Currency, switch_enabled: bool) -> Self {
        let primary_prefix = match amount_type {
            AmountType::Currency => Some(currency.symbol.clone()),
            AmountType::Coin => None,
        };
        Self {
            amount_type,
            primary_prefix,
            switch_enabled,
        }
    }
}

/// Balance fetch failure reported by the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardError(pub String);

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CardError {}

/// Что карточка знает прямо сейчас
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardSnapshot {
    pub token: Option<Token>,
    pub balance: Option<Decimal>,
    pub amount: Option<Decimal>,
    /// amount was computed by a quote, not typed
    pub estimated: bool,
    pub error: Option<CardError>,
}

/// Marker that makes a re-emitted amount observable as a new event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayToken(pub Uuid);

impl DisplayToken {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DisplayToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// What the amount input field should show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountDisplay {
    pub token: Option<DisplayToken>,
    pub text: Option<String>,
    pub prefix: Option<String>,
}

impl AmountDisplay {
    /// Empty input with a fresh token.
    pub fn cleared(token: DisplayToken) -> Self {
        Self {
            token: Some(token),
            text: Some(String::new()),
            prefix: None,
        }
    }
}
