use domain::types::{AmountDisplay, InputParams, Token};
use tokio::sync::watch;
use tracing::debug;

use crate::card::CoinCardService;
use crate::effect::CardEffect;

/// Read side for the presentation layer. Every field always holds the latest value.
#[derive(Clone)]
pub struct CardView {
    pub amount: watch::Receiver<AmountDisplay>,
    pub secondary_info: watch::Receiver<Option<String>>,
    pub balance: watch::Receiver<Option<String>>,
    pub balance_error: watch::Receiver<bool>,
    pub has_non_zero_balance: watch::Receiver<Option<bool>>,
    pub token: watch::Receiver<Option<Token>>,
    pub estimated: watch::Receiver<bool>,
    pub input_params: watch::Receiver<InputParams>,
}

pub struct CardSink {
    amount: watch::Sender<AmountDisplay>,
    secondary_info: watch::Sender<Option<String>>,
    balance: watch::Sender<Option<String>>,
    balance_error: watch::Sender<bool>,
    has_non_zero_balance: watch::Sender<Option<bool>>,
    token: watch::Sender<Option<Token>>,
    estimated: watch::Sender<bool>,
    input_params: watch::Sender<InputParams>,
}

pub fn channel(input_params: InputParams) -> (CardSink, CardView) {
    let (amount, amount_rx) = watch::channel(AmountDisplay::default());
    let (secondary_info, secondary_info_rx) = watch::channel(None);
    let (balance, balance_rx) = watch::channel(None);
    let (balance_error, balance_error_rx) = watch::channel(false);
    let (has_non_zero_balance, has_non_zero_balance_rx) = watch::channel(None);
    let (token, token_rx) = watch::channel(None);
    let (estimated, estimated_rx) = watch::channel(false);
    let (input_params, input_params_rx) = watch::channel(input_params);

    let sink = CardSink {
        amount,
        secondary_info,
        balance,
        balance_error,
        has_non_zero_balance,
        token,
        estimated,
        input_params,
    };
    let view = CardView {
        amount: amount_rx,
        secondary_info: secondary_info_rx,
        balance: balance_rx,
        balance_error: balance_error_rx,
        has_non_zero_balance: has_non_zero_balance_rx,
        token: token_rx,
        estimated: estimated_rx,
        input_params: input_params_rx,
    };
    (sink, view)
}

impl CardSink {
    /// Effects of one event, in order. Display values always notify, even if equal.
    pub fn apply(&self, effects: Vec<CardEffect>, card: &dyn CoinCardService) {
        for e in effects {
            match e {
                CardEffect::WriteAmount(amount) => {
                    debug!(?amount, "card.set_amount");
                    card.set_amount(amount);
                }
                CardEffect::SelectToken(token) => {
                    debug!(code = %token.code, "card.select_token");
                    card.select_token(token);
                }
                CardEffect::Amount(a) => {
                    self.amount.send_replace(a);
                }
                CardEffect::SecondaryInfo(s) => {
                    self.secondary_info.send_replace(s);
                }
                CardEffect::Balance { text, has_non_zero } => {
                    self.balance.send_replace(text);
                    self.has_non_zero_balance.send_replace(has_non_zero);
                }
                CardEffect::BalanceError(v) => {
                    self.balance_error.send_replace(v);
                }
                CardEffect::Token(t) => {
                    self.token.send_replace(t);
                }
                CardEffect::Estimated(v) => {
                    self.estimated.send_replace(v);
                }
                CardEffect::InputParams(p) => {
                    self.input_params.send_replace(p);
                }
            }
        }
    }
}
