use domain::types::{CardError, Token};
use rust_decimal::Decimal;

use crate::price::PriceBook;

/// Everything that can happen to a card, in one ordered stream.
#[derive(Debug, Clone)]
pub enum CardEvent {
    /// first event after spawn, seeds state from the card
    Subscribed,

    // --- presentation ---------------------------------------------------
    AmountTextEntered(String),
    PercentOfBalance(u32),
    SelectToken(Token),
    ToggleUnit,

    // --- card streams ---------------------------------------------------
    CardTokenChanged(Option<Token>),
    CardBalanceChanged(Option<Decimal>),
    CardAmountChanged(Option<Decimal>),
    CardEstimatedChanged(bool),
    CardErrorChanged(Option<CardError>),

    // --- price feed -----------------------------------------------------
    PricesChanged(PriceBook),
}
