//! Coin <-> currency conversion for one card.
//!
//! Держит обе стороны суммы и цену. Авторитетная сторона та, что совпадает с
//! активной единицей; вторая всегда пересчитывается из неё.

use domain::types::{
    AmountInfo, AmountType, CoinValue, Currency, CurrencyValue, ReconciledAmount, Token,
};
use policy::decimal_policy::floor_to;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct FiatService {
    currency: Currency,
    token: Option<Token>,
    price: Option<Decimal>,
    amount_type: AmountType,

    coin_amount: Option<Decimal>,
    currency_amount: Option<Decimal>,
}

impl FiatService {
    pub fn new(currency: Currency, amount_type: AmountType) -> Self {
        Self {
            currency,
            token: None,
            price: None,
            amount_type,
            coin_amount: None,
            currency_amount: None,
        }
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    /// Both a price and an asset are needed to show the other unit.
    pub fn toggle_available(&self) -> bool {
        self.token.is_some() && self.price.is_some()
    }

    /// Asset context only; amounts are re-derived on the next price update.
    pub fn set_token(&mut self, token: Option<Token>) {
        self.token = token;
    }

    /// Zero or negative price means "no price".
    pub fn set_price(&mut self, price: Option<Decimal>) {
        self.price = price.filter(|p| p.is_sign_positive() && !p.is_zero());
    }

    pub fn set_amount_type(&mut self, amount_type: AmountType) {
        self.amount_type = amount_type;
    }

    /// Raw value typed in the active unit.
    pub fn convert(&mut self, amount: Option<Decimal>) -> Option<ReconciledAmount> {
        match self.amount_type {
            AmountType::Coin => {
                self.coin_amount = amount;
                self.sync_currency_amount();
            }
            AmountType::Currency => {
                self.currency_amount = amount;
                self.sync_coin_amount();
            }
        }
        self.full_info()
    }

    /// Value already expressed in the base asset (percent of balance, quotes).
    pub fn build_for_coin(&mut self, amount: Option<Decimal>) -> Option<ReconciledAmount> {
        self.coin_amount = amount;
        self.sync_currency_amount();
        self.full_info()
    }

    /// После смены цены или единицы: авторитетная сторона остаётся, вторая пересчитывается.
    pub fn recompute(&mut self) -> Option<ReconciledAmount> {
        match self.amount_type {
            AmountType::Coin => self.sync_currency_amount(),
            AmountType::Currency => {
                // after a toggle the currency side may not exist yet
                if self.currency_amount.is_none() {
                    self.sync_currency_amount();
                } else {
                    self.sync_coin_amount();
                }
            }
        }
        self.full_info()
    }

    fn sync_currency_amount(&mut self) {
        self.currency_amount = match (self.coin_amount, self.price) {
            (Some(coin), Some(price)) => coin.checked_mul(price),
            _ => None,
        };
    }

    fn sync_coin_amount(&mut self) {
        self.coin_amount = match (self.currency_amount, self.price, &self.token) {
            (Some(value), Some(price), Some(token)) => value
                .checked_div(price)
                .map(|coin| floor_to(coin, token.decimals)),
            _ => None,
        };
    }

    fn full_info(&self) -> Option<ReconciledAmount> {
        let token = self.token.as_ref()?;
        let coin = self.coin_amount?;

        let coin_info = AmountInfo::Coin(CoinValue {
            token: token.clone(),
            value: coin,
        });

        match self.amount_type {
            AmountType::Coin => Some(ReconciledAmount {
                primary: coin_info,
                primary_decimals: token.decimals,
                secondary: self.currency_amount.map(|value| {
                    AmountInfo::Currency(CurrencyValue {
                        currency: self.currency.clone(),
                        value,
                    })
                }),
                coin_amount: Some(coin),
            }),
            AmountType::Currency => {
                let value = self.currency_amount?;
                Some(ReconciledAmount {
                    primary: AmountInfo::Currency(CurrencyValue {
                        currency: self.currency.clone(),
                        value,
                    }),
                    primary_decimals: self.currency.decimals,
                    secondary: Some(coin_info),
                    coin_amount: Some(coin),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn eth_usd(amount_type: AmountType) -> FiatService {
        let mut f = FiatService::new(Currency::default(), amount_type);
        f.set_token(Some(Token::new("ethereum", "ETH", 6)));
        f.set_price(Some(d("2000")));
        f
    }

    #[test]
    fn coin_input_derives_currency() {
        let mut f = eth_usd(AmountType::Coin);
        let info = f.convert(Some(d("1.5"))).unwrap();

        assert_eq!(info.primary_value(), d("1.5"));
        assert_eq!(info.primary_decimals, 6);
        assert_eq!(info.coin_amount, Some(d("1.5")));
        assert_eq!(info.secondary.map(|s| s.value()), Some(d("3000")));
    }

    #[test]
    fn currency_input_derives_floored_coin() {
        let mut f = eth_usd(AmountType::Currency);
        let info = f.convert(Some(d("100"))).unwrap();

        assert_eq!(info.primary_value(), d("100"));
        assert_eq!(info.primary_decimals, 2);
        // 100 / 2000 = 0.05
        assert_eq!(info.coin_amount, Some(d("0.05")));

        f.set_price(Some(d("3")));
        let info = f.recompute().unwrap();
        // 100 / 3 = 33.333333(3) -> 6 decimals, floor
        assert_eq!(info.coin_amount, Some(d("33.333333")));
        assert_eq!(info.primary_value(), d("100"));
    }

    #[test]
    fn no_token_means_no_amount() {
        let mut f = FiatService::new(Currency::default(), AmountType::Coin);
        assert_eq!(f.convert(Some(d("1"))), None);
        assert!(!f.toggle_available());
    }

    #[test]
    fn coin_without_price_has_no_secondary() {
        let mut f = FiatService::new(Currency::default(), AmountType::Coin);
        f.set_token(Some(Token::new("ethereum", "ETH", 18)));

        let info = f.convert(Some(d("2"))).unwrap();
        assert_eq!(info.secondary, None);
        assert_eq!(info.coin_amount, Some(d("2")));
        assert!(!f.toggle_available());
    }

    #[test]
    fn currency_without_price_is_unknown() {
        let mut f = eth_usd(AmountType::Currency);
        f.set_price(None);
        assert_eq!(f.convert(Some(d("10"))), None);
    }

    #[test]
    fn zero_price_is_no_price() {
        let mut f = eth_usd(AmountType::Coin);
        f.set_price(Some(Decimal::ZERO));
        assert_eq!(f.price(), None);
        assert!(!f.toggle_available());
    }

    #[test]
    fn toggle_reexpresses_existing_amount() {
        let mut f = eth_usd(AmountType::Coin);
        f.convert(Some(d("0.5")));

        f.set_amount_type(AmountType::Currency);
        let info = f.recompute().unwrap();
        assert_eq!(info.primary_value(), d("1000"));
        assert_eq!(info.coin_amount, Some(d("0.5")));
    }

    #[test]
    fn cleared_input_clears_both_sides() {
        let mut f = eth_usd(AmountType::Coin);
        f.convert(Some(d("1")));
        assert_eq!(f.convert(None), None);
    }
}
