use std::sync::atomic::{AtomicUsize, Ordering};

use domain::types::{CardError, CardSnapshot, Token};
use rust_decimal::Decimal;
use tokio::sync::watch;

/// One receiver per card field. `None` is the "cleared" marker.
pub struct CardSubscription {
    pub token: watch::Receiver<Option<Token>>,
    pub balance: watch::Receiver<Option<Decimal>>,
    pub amount: watch::Receiver<Option<Decimal>>,
    pub estimated: watch::Receiver<bool>,
    pub error: watch::Receiver<Option<CardError>>,
}

/// Owner of one side of a swap: asset, balance and the amount itself.
pub trait CoinCardService: Send + Sync {
    fn snapshot(&self) -> CardSnapshot;
    /// coin amount typed or confirmed by the user
    fn set_amount(&self, amount: Option<Decimal>);
    fn select_token(&self, token: Token);
    fn subscribe(&self) -> CardSubscription;
}

/// Card backed by watch channels.
pub struct InMemoryCard {
    token: watch::Sender<Option<Token>>,
    balance: watch::Sender<Option<Decimal>>,
    amount: watch::Sender<Option<Decimal>>,
    estimated: watch::Sender<bool>,
    error: watch::Sender<Option<CardError>>,

    amount_writes: AtomicUsize,
}

impl InMemoryCard {
    pub fn new() -> Self {
        Self {
            token: watch::channel(None).0,
            balance: watch::channel(None).0,
            amount: watch::channel(None).0,
            estimated: watch::channel(false).0,
            error: watch::channel(None).0,
            amount_writes: AtomicUsize::new(0),
        }
    }

    pub fn with_token(token: Token) -> Self {
        let card = Self::new();
        replace(&card.token, Some(token));
        card
    }

    pub fn set_balance(&self, balance: Option<Decimal>) {
        replace(&self.balance, balance);
    }

    pub fn set_error(&self, error: Option<CardError>) {
        replace(&self.error, error);
    }

    /// Amount computed by a quote: the card flips to estimated first.
    pub fn apply_estimate(&self, amount: Option<Decimal>) {
        replace(&self.estimated, true);
        replace(&self.amount, amount);
    }

    /// Live subscriptions (counted on the amount stream).
    pub fn subscriber_count(&self) -> usize {
        self.amount.receiver_count()
    }

    /// How many times `set_amount` was called.
    pub fn amount_writes(&self) -> usize {
        self.amount_writes.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryCard {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinCardService for InMemoryCard {
    fn snapshot(&self) -> CardSnapshot {
        CardSnapshot {
            token: self.token.borrow().clone(),
            balance: *self.balance.borrow(),
            amount: *self.amount.borrow(),
            estimated: *self.estimated.borrow(),
            error: self.error.borrow().clone(),
        }
    }

    fn set_amount(&self, amount: Option<Decimal>) {
        self.amount_writes.fetch_add(1, Ordering::SeqCst);
        replace(&self.estimated, false);
        replace(&self.amount, amount);
    }

    fn select_token(&self, token: Token) {
        if self.token.borrow().as_ref() == Some(&token) {
            return;
        }
        // баланс нового актива ещё не загружен
        replace(&self.balance, None);
        replace(&self.token, Some(token));
    }

    fn subscribe(&self) -> CardSubscription {
        CardSubscription {
            token: self.token.subscribe(),
            balance: self.balance.subscribe(),
            amount: self.amount.subscribe(),
            estimated: self.estimated.subscribe(),
            error: self.error.subscribe(),
        }
    }
}

/// Notify only on a real change, so an echoed write stays silent.
fn replace<T: PartialEq>(tx: &watch::Sender<T>, value: T) {
    tx.send_if_modified(|current| {
        if *current == value {
            return false;
        }
        *current = value;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_write_clears_estimate() {
        let card = InMemoryCard::with_token(Token::new("ethereum", "ETH", 18));
        card.apply_estimate(Some(Decimal::ONE));
        assert!(card.snapshot().estimated);

        card.set_amount(Some(Decimal::TWO));
        let s = card.snapshot();
        assert!(!s.estimated);
        assert_eq!(s.amount, Some(Decimal::TWO));
        assert_eq!(card.amount_writes(), 1);
    }

    #[test]
    fn same_value_does_not_notify() {
        let card = InMemoryCard::new();
        let sub = card.subscribe();

        card.set_amount(None);
        assert!(!sub.amount.has_changed().unwrap());

        card.set_amount(Some(Decimal::ONE));
        assert!(sub.amount.has_changed().unwrap());
    }

    #[test]
    fn selecting_another_token_forgets_balance() {
        let card = InMemoryCard::with_token(Token::new("ethereum", "ETH", 18));
        card.set_balance(Some(Decimal::TEN));

        card.select_token(Token::new("bitcoin", "BTC", 8));
        let s = card.snapshot();
        assert_eq!(s.balance, None);
        assert_eq!(s.token.map(|t| t.code), Some("BTC".to_string()));
    }
}
