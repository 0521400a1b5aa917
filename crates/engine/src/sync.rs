//! Reconciliation of one card's amount.
//!
//! Every source ends up here as a [`CardEvent`]. Handling is pure: state in,
//! effects out. The runtime applies the effects (write-back to the card,
//! display channels) in order.

use std::sync::Arc;

use domain::types::{
    AmountDisplay, AmountType, CardError, CardSnapshot, CurrencyValue, DisplayToken, InputParams,
    ReconciledAmount, Token,
};
use fiat::converter::FiatService;
use fiat::format::{Formatter, Translator};
use policy::decimal_policy::{parse_amount, percent_of, plain_text};
use policy::write_back::{AmountOrigin, SyncDecision, sync_decision};
use rust_decimal::Decimal;
use state_machine::switch::{AmountTypeSwitch, SwitchChange};
use tracing::debug;

use crate::config::EngineConfig;
use crate::effect::CardEffect;
use crate::event::CardEvent;
use crate::price::PriceBook;

pub struct SyncEngine {
    config: EngineConfig,
    converter: FiatService,
    switch: AmountTypeSwitch,
    /// refreshed from the card before every event
    card: CardSnapshot,
    prices: PriceBook,

    formatter: Arc<dyn Formatter>,
    translator: Arc<dyn Translator>,

    last_token: Option<DisplayToken>,
    last_amount: Option<ReconciledAmount>,
    /// asset changed since the last reconciliation
    reprice_pending: bool,
}

impl SyncEngine {
    pub fn new(
        config: EngineConfig,
        formatter: Arc<dyn Formatter>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let converter = FiatService::new(config.currency.clone(), config.initial_amount_type);
        let switch = AmountTypeSwitch::new(config.initial_amount_type);

        Self {
            config,
            converter,
            switch,
            card: CardSnapshot::default(),
            prices: PriceBook::default(),
            formatter,
            translator,
            last_token: None,
            last_amount: None,
            reprice_pending: false,
        }
    }

    pub fn with_prices(mut self, prices: PriceBook) -> Self {
        self.prices = prices;
        self
    }

    pub fn amount_type(&self) -> AmountType {
        self.switch.amount_type()
    }

    pub fn last_amount(&self) -> Option<&ReconciledAmount> {
        self.last_amount.as_ref()
    }

    pub fn input_params(&self) -> InputParams {
        InputParams::new(
            self.switch.amount_type(),
            &self.config.currency,
            self.switch.toggle_available(),
        )
    }

    pub fn is_valid_input(&self, text: &str) -> bool {
        self.config.is_valid_input(
            text,
            self.switch.amount_type(),
            self.converter.token().map(|t| t.decimals),
        )
    }

    /// One event, run to completion.
    pub fn handle(&mut self, card: CardSnapshot, event: CardEvent) -> Vec<CardEffect> {
        self.card = card;
        debug!(?event, estimated = self.card.estimated, "card event");

        let mut out = Vec::new();
        match event {
            CardEvent::Subscribed => self.on_subscribed(&mut out),

            CardEvent::AmountTextEntered(text) => self.on_user_amount_changed(&text, &mut out),
            CardEvent::PercentOfBalance(percent) => self.on_percent_of_balance(percent, &mut out),
            CardEvent::SelectToken(token) => self.on_select_token(token, &mut out),
            CardEvent::ToggleUnit => self.on_toggle_unit(&mut out),

            CardEvent::CardTokenChanged(token) => self.on_token_changed(token, &mut out),
            CardEvent::CardBalanceChanged(balance) => self.on_balance_changed(balance, &mut out),
            CardEvent::CardAmountChanged(amount) => {
                self.on_card_amount(amount, AmountOrigin::CardUpdate, &mut out)
            }
            CardEvent::CardEstimatedChanged(estimated) => {
                out.push(CardEffect::Estimated(estimated))
            }
            CardEvent::CardErrorChanged(error) => self.on_error_changed(error.as_ref(), &mut out),

            CardEvent::PricesChanged(book) => self.on_prices_changed(book, &mut out),
        }
        out
    }

    // --- handlers -------------------------------------------------------

    fn on_subscribed(&mut self, out: &mut Vec<CardEffect>) {
        out.push(CardEffect::Estimated(self.card.estimated));

        let token = self.card.token.clone();
        self.on_token_changed(token, out);

        let amount = self.card.amount;
        self.on_card_amount(amount, AmountOrigin::Seed, out);

        let balance = self.card.balance;
        self.on_balance_changed(balance, out);

        let error = self.card.error.clone();
        self.on_error_changed(error.as_ref(), out);
    }

    fn on_user_amount_changed(&mut self, text: &str, out: &mut Vec<CardEffect>) {
        let amount = parse_amount(text);
        let info = self.converter.convert(amount);
        self.reconcile(info, AmountOrigin::UserInput, out);
    }

    fn on_percent_of_balance(&mut self, percent: u32, out: &mut Vec<CardEffect>) {
        let (Some(token), Some(balance)) = (self.card.token.as_ref(), self.card.balance) else {
            debug!(percent, "percent of balance ignored: no token or balance");
            return;
        };
        let Some(amount) = percent_of(balance, percent, token.decimals) else {
            return;
        };

        let info = self.converter.build_for_coin(Some(amount));
        self.reconcile(info, AmountOrigin::UserInput, out);
    }

    fn on_card_amount(
        &mut self,
        amount: Option<Decimal>,
        origin: AmountOrigin,
        out: &mut Vec<CardEffect>,
    ) {
        let decision = sync_decision(origin, self.card.estimated);
        if !decision.accepts() {
            debug!(?origin, reason = ?decision.reason, "card amount ignored");
            return;
        }

        let info = self.converter.build_for_coin(amount);
        self.apply(info, decision, out);
    }

    /// Context only. The amount is re-expressed on the next price update.
    fn on_token_changed(&mut self, token: Option<Token>, out: &mut Vec<CardEffect>) {
        if self.converter.token() != token.as_ref() {
            self.reprice_pending = true;
        }
        self.converter.set_token(token.clone());
        let price = self.current_price();
        self.converter.set_price(price);
        self.sync_toggle_available(out);

        out.push(CardEffect::Token(token));
    }

    fn on_select_token(&mut self, token: Token, out: &mut Vec<CardEffect>) {
        out.push(CardEffect::SelectToken(token.clone()));
        self.on_token_changed(Some(token), out);

        if self.config.reset_amount_on_select {
            out.push(CardEffect::Amount(AmountDisplay::cleared(self.fresh_token())));
            self.on_user_amount_changed("", out);
        }
    }

    fn on_toggle_unit(&mut self, out: &mut Vec<CardEffect>) {
        let Some(change) = self.switch.toggle() else {
            debug!("toggle ignored: unavailable");
            return;
        };
        if let SwitchChange::AmountType(amount_type) = change {
            debug!(?amount_type, "amount type changed");
            self.converter.set_amount_type(amount_type);
        }
        out.push(CardEffect::InputParams(self.input_params()));

        let info = self.converter.recompute();
        self.reconcile(info, AmountOrigin::Conversion, out);
    }

    fn on_prices_changed(&mut self, book: PriceBook, out: &mut Vec<CardEffect>) {
        self.prices = book;

        let before = self.converter.price();
        let price = self.current_price();
        self.converter.set_price(price);
        // same price, same asset: nothing to re-express
        if self.converter.price() == before && !self.reprice_pending {
            return;
        }
        debug!(price = ?self.converter.price(), "price changed");

        self.sync_toggle_available(out);
        let info = self.converter.recompute();
        self.reconcile(info, AmountOrigin::Conversion, out);
    }

    fn on_balance_changed(&mut self, balance: Option<Decimal>, out: &mut Vec<CardEffect>) {
        let (text, has_non_zero) = match (self.card.token.as_ref(), balance) {
            (None, _) => (Some(self.translator.not_available()), None),
            (Some(_), None) => (None, None),
            (Some(token), Some(b)) => (
                Some(self.formatter.coin_amount(b, &token.code)),
                Some(b > Decimal::ZERO),
            ),
        };
        out.push(CardEffect::Balance { text, has_non_zero });
    }

    fn on_error_changed(&mut self, error: Option<&CardError>, out: &mut Vec<CardEffect>) {
        if let Some(e) = error {
            debug!(error = %e, "balance error");
        }
        out.push(CardEffect::BalanceError(error.is_some()));
    }

    // --- reconciliation -------------------------------------------------

    fn reconcile(
        &mut self,
        info: Option<ReconciledAmount>,
        origin: AmountOrigin,
        out: &mut Vec<CardEffect>,
    ) {
        let decision = sync_decision(origin, self.card.estimated);
        self.apply(info, decision, out);
    }

    /// Steps: input params, write-back (if the gate allows), amount display,
    /// secondary info, estimated flag.
    fn apply(
        &mut self,
        info: Option<ReconciledAmount>,
        decision: SyncDecision,
        out: &mut Vec<CardEffect>,
    ) {
        out.push(CardEffect::InputParams(self.input_params()));

        let token = self.fresh_token();
        let (display, secondary, coin_amount) = match &info {
            None => (
                AmountDisplay::cleared(token),
                self.secondary_placeholder(),
                None,
            ),
            Some(info) => (
                AmountDisplay {
                    token: Some(token),
                    text: Some(plain_text(info.primary_value(), info.primary_decimals)),
                    prefix: info.primary_prefix().map(str::to_string),
                },
                info.secondary.as_ref().map(|s| self.formatter.amount_info(s)),
                info.coin_amount,
            ),
        };

        if decision.writes_back() {
            debug!(?coin_amount, reason = ?decision.reason, "write back");
            out.push(CardEffect::WriteAmount(coin_amount));
        } else {
            debug!(reason = ?decision.reason, "write back skipped");
        }

        out.push(CardEffect::Amount(display));
        out.push(CardEffect::SecondaryInfo(secondary));
        out.push(CardEffect::Estimated(self.card.estimated));

        self.last_amount = info;
        self.reprice_pending = false;
    }

    /// Zero in the other unit, so the secondary line keeps its unit.
    fn secondary_placeholder(&self) -> Option<String> {
        match self.switch.amount_type() {
            AmountType::Coin => Some(self.formatter.currency_amount(&CurrencyValue {
                currency: self.config.currency.clone(),
                value: Decimal::ZERO,
            })),
            AmountType::Currency => self
                .converter
                .token()
                .map(|t| self.formatter.coin_amount(Decimal::ZERO, &t.code)),
        }
    }

    fn sync_toggle_available(&mut self, out: &mut Vec<CardEffect>) {
        let available = self.converter.toggle_available();
        if let Some(change) = self.switch.set_toggle_available(available) {
            debug!(?change, "toggle availability changed");
            out.push(CardEffect::InputParams(self.input_params()));
        }
    }

    fn current_price(&self) -> Option<Decimal> {
        let token = self.converter.token()?;
        self.prices.get(&token.coin_uid).copied()
    }

    fn fresh_token(&mut self) -> DisplayToken {
        let mut token = DisplayToken::fresh();
        while Some(token) == self.last_token {
            token = DisplayToken::fresh();
        }
        self.last_token = Some(token);
        token
    }
}
