use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::watch;

/// coin uid -> price in the configured currency
pub type PriceBook = Arc<HashMap<String, Decimal>>;

/// Price source shared by any number of cards.
pub struct InMemoryPriceFeed {
    tx: watch::Sender<PriceBook>,
}

impl InMemoryPriceFeed {
    pub fn new() -> Self {
        Self {
            tx: watch::channel(PriceBook::default()).0,
        }
    }

    /// `None` забывает цену
    pub fn set_price(&self, coin_uid: &str, price: Option<Decimal>) {
        self.tx.send_modify(|book| {
            let book = Arc::make_mut(book);
            match price {
                Some(p) => {
                    book.insert(coin_uid.to_string(), p);
                }
                None => {
                    book.remove(coin_uid);
                }
            }
        });
    }

    pub fn book(&self) -> PriceBook {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PriceBook> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for InMemoryPriceFeed {
    fn default() -> Self {
        Self::new()
    }
}
