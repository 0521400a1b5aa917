use domain::types::{AmountDisplay, InputParams, Token};
use rust_decimal::Decimal;

/// Output of one handled event. Applied in order by the sink.
#[derive(Debug, Clone, PartialEq)]
pub enum CardEffect {
    // --- card -----------------------------------------------------------
    WriteAmount(Option<Decimal>),
    SelectToken(Token),

    // --- display --------------------------------------------------------
    Amount(AmountDisplay),
    SecondaryInfo(Option<String>),
    Balance {
        text: Option<String>,
        has_non_zero: Option<bool>,
    },
    BalanceError(bool),
    Token(Option<Token>),
    Estimated(bool),
    InputParams(InputParams),
}
