use std::fmt;
use std::sync::Arc;

use domain::types::Token;
use fiat::format::{Formatter, Translator};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::card::CoinCardService;
use crate::config::EngineConfig;
use crate::event::CardEvent;
use crate::price::PriceBook;
use crate::sink::{self, CardSink, CardView};
use crate::sync::SyncEngine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// the card engine is no longer running
    Closed,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "card engine closed"),
        }
    }
}

impl std::error::Error for EngineError {}

/// A running card. Dropping it aborts every task of the card at once.
pub struct CardHandle {
    commands: mpsc::Sender<CardEvent>,
    view: CardView,
    config: EngineConfig,
    tasks: JoinSet<()>,
}

/// Spawns the engine and one forwarder per source. Must run inside a tokio runtime.
pub fn spawn_card(
    card: Arc<dyn CoinCardService>,
    mut prices: watch::Receiver<PriceBook>,
    config: EngineConfig,
    formatter: Arc<dyn Formatter>,
    translator: Arc<dyn Translator>,
) -> CardHandle {
    let (tx, rx) = mpsc::channel(config.channel_capacity);

    let initial_prices = prices.borrow_and_update().clone();
    let engine = SyncEngine::new(config.clone(), formatter, translator).with_prices(initial_prices);
    let (sink, view) = sink::channel(engine.input_params());

    let subs = card.subscribe();
    let mut tasks = JoinSet::new();

    tasks.spawn(run(engine, card, rx, sink));

    tasks.spawn(forward(subs.token, tx.clone(), CardEvent::CardTokenChanged));
    tasks.spawn(forward(subs.balance, tx.clone(), CardEvent::CardBalanceChanged));
    tasks.spawn(forward(subs.amount, tx.clone(), CardEvent::CardAmountChanged));
    tasks.spawn(forward(subs.estimated, tx.clone(), CardEvent::CardEstimatedChanged));
    tasks.spawn(forward(subs.error, tx.clone(), CardEvent::CardErrorChanged));
    tasks.spawn(forward(prices, tx.clone(), CardEvent::PricesChanged));

    info!("card engine started");

    CardHandle {
        commands: tx,
        view,
        config,
        tasks,
    }
}

impl CardHandle {
    pub fn view(&self) -> &CardView {
        &self.view
    }

    pub async fn set_amount_text(&self, text: impl Into<String>) -> Result<(), EngineError> {
        self.send(CardEvent::AmountTextEntered(text.into())).await
    }

    pub async fn set_percent_of_balance(&self, percent: u32) -> Result<(), EngineError> {
        self.send(CardEvent::PercentOfBalance(percent)).await
    }

    pub async fn select_token(&self, token: Token) -> Result<(), EngineError> {
        self.send(CardEvent::SelectToken(token)).await
    }

    pub async fn toggle_unit(&self) -> Result<(), EngineError> {
        self.send(CardEvent::ToggleUnit).await
    }

    /// Checked against the unit and asset currently shown.
    pub fn is_valid_input(&self, text: &str) -> bool {
        let amount_type = self.view.input_params.borrow().amount_type;
        let token_decimals = self.view.token.borrow().as_ref().map(|t| t.decimals);
        self.config.is_valid_input(text, amount_type, token_decimals)
    }

    /// Aborts all subscriptions and waits for them to finish.
    pub async fn shutdown(mut self) {
        self.tasks.shutdown().await;
        info!("card engine stopped");
    }

    async fn send(&self, event: CardEvent) -> Result<(), EngineError> {
        self.commands.send(event).await.map_err(|e| {
            warn!(event = ?e.0, "command dropped: engine closed");
            EngineError::Closed
        })
    }
}

async fn run(
    mut engine: SyncEngine,
    card: Arc<dyn CoinCardService>,
    mut rx: mpsc::Receiver<CardEvent>,
    sink: CardSink,
) {
    let effects = engine.handle(card.snapshot(), CardEvent::Subscribed);
    sink.apply(effects, card.as_ref());

    while let Some(event) = rx.recv().await {
        let effects = engine.handle(card.snapshot(), event);
        sink.apply(effects, card.as_ref());
    }
    debug!("event channel closed");
}

/// Source order is kept; intermediate values may be skipped (latest wins).
async fn forward<T>(mut rx: watch::Receiver<T>, tx: mpsc::Sender<CardEvent>, wrap: fn(T) -> CardEvent)
where
    T: Clone + Send + Sync + 'static,
{
    while rx.changed().await.is_ok() {
        let value = rx.borrow_and_update().clone();
        if tx.send(wrap(value)).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use domain::types::AmountType;
    use fiat::format::{EnglishTranslator, PlainFormatter};
    use rust_decimal::Decimal;
    use tokio::time::timeout;

    use super::*;
    use crate::card::InMemoryCard;
    use crate::price::InMemoryPriceFeed;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn eth() -> Token {
        Token::new("ethereum", "ETH", 8)
    }

    fn start(card: Arc<InMemoryCard>, feed: &InMemoryPriceFeed) -> CardHandle {
        spawn_card(
            card,
            feed.subscribe(),
            EngineConfig::default(),
            Arc::new(PlainFormatter),
            Arc::new(EnglishTranslator),
        )
    }

    async fn wait_text(view: &CardView, text: &str) {
        let mut rx = view.amount.clone();
        timeout(
            Duration::from_secs(2),
            rx.wait_for(|a| a.text.as_deref() == Some(text)),
        )
        .await
        .expect("timed out")
        .expect("engine stopped");
    }

    async fn wait_seeded(view: &CardView) {
        let mut rx = view.amount.clone();
        timeout(Duration::from_secs(2), rx.wait_for(|a| a.token.is_some()))
            .await
            .expect("timed out")
            .expect("engine stopped");
    }

    #[tokio::test]
    async fn user_text_is_written_to_card() {
        let card = Arc::new(InMemoryCard::with_token(eth()));
        let feed = InMemoryPriceFeed::new();
        feed.set_price("ethereum", Some(d("2000")));
        let handle = start(card.clone(), &feed);

        handle.set_amount_text("0.25").await.unwrap();
        wait_text(handle.view(), "0.25").await;

        let s = card.snapshot();
        assert_eq!(s.amount, Some(d("0.25")));
        assert!(!s.estimated);
        assert_eq!(
            handle.view().secondary_info.borrow().as_deref(),
            Some("$500")
        );
    }

    #[tokio::test]
    async fn estimate_is_displayed_without_echo() {
        let card = Arc::new(InMemoryCard::with_token(eth()));
        let feed = InMemoryPriceFeed::new();
        let handle = start(card.clone(), &feed);
        wait_seeded(handle.view()).await;

        let writes_before = card.amount_writes();
        card.apply_estimate(Some(d("1.5")));
        wait_text(handle.view(), "1.5").await;

        assert_eq!(card.amount_writes(), writes_before);
        assert_eq!(card.snapshot().amount, Some(d("1.5")));
    }

    #[tokio::test]
    async fn toggle_follows_price_feed() {
        let card = Arc::new(InMemoryCard::with_token(eth()));
        let feed = InMemoryPriceFeed::new();
        let handle = start(card.clone(), &feed);
        wait_seeded(handle.view()).await;
        assert!(!handle.view().input_params.borrow().switch_enabled);

        feed.set_price("ethereum", Some(d("2000")));
        let mut params = handle.view().input_params.clone();
        timeout(Duration::from_secs(2), params.wait_for(|p| p.switch_enabled))
            .await
            .unwrap()
            .unwrap();

        handle.set_amount_text("1").await.unwrap();
        handle.toggle_unit().await.unwrap();
        wait_text(handle.view(), "2000").await;

        let p = handle.view().input_params.borrow().clone();
        assert_eq!(p.amount_type, AmountType::Currency);
        assert_eq!(p.primary_prefix.as_deref(), Some("$"));
        assert!(!handle.is_valid_input("1.001"));
        assert!(handle.is_valid_input("1.01"));
    }

    #[tokio::test]
    async fn balance_and_error_are_projected() {
        let card = Arc::new(InMemoryCard::with_token(eth()));
        let feed = InMemoryPriceFeed::new();
        let handle = start(card.clone(), &feed);
        wait_seeded(handle.view()).await;

        card.set_balance(Some(d("3")));
        let mut balance = handle.view().balance.clone();
        timeout(
            Duration::from_secs(2),
            balance.wait_for(|b| b.as_deref() == Some("3 ETH")),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(*handle.view().has_non_zero_balance.borrow(), Some(true));

        card.set_error(Some(domain::types::CardError("offline".into())));
        let mut error = handle.view().balance_error.clone();
        timeout(Duration::from_secs(2), error.wait_for(|e| *e))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn shutdown_releases_every_subscription() {
        let card = Arc::new(InMemoryCard::with_token(eth()));
        let feed = InMemoryPriceFeed::new();
        let handle = start(card.clone(), &feed);
        wait_seeded(handle.view()).await;

        let mut amount = handle.view().amount.clone();
        amount.borrow_and_update();
        assert_eq!(feed.subscriber_count(), 1);

        handle.shutdown().await;

        assert!(amount.changed().await.is_err());
        assert_eq!(feed.subscriber_count(), 0);
        assert_eq!(card.subscriber_count(), 0);
    }
}
