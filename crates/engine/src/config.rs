use domain::types::{AmountType, Currency};
use policy::decimal_policy::{is_valid, max_decimals};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub currency: Currency,
    /// coin decimals when the asset is not known yet
    pub default_max_decimals: u32,
    /// clear the amount when the user picks another asset
    pub reset_amount_on_select: bool,
    pub initial_amount_type: AmountType,
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            default_max_decimals: 8,
            reset_amount_on_select: false,
            initial_amount_type: AmountType::Coin,
            channel_capacity: 2048,
        }
    }
}

impl EngineConfig {
    pub fn max_decimals(&self, amount_type: AmountType, token_decimals: Option<u32>) -> u32 {
        max_decimals(
            amount_type,
            token_decimals,
            self.currency.decimals,
            self.default_max_decimals,
        )
    }

    /// Input check for the active unit; `token_decimals` is `None` until an asset is known.
    pub fn is_valid_input(
        &self,
        text: &str,
        amount_type: AmountType,
        token_decimals: Option<u32>,
    ) -> bool {
        is_valid(text, self.max_decimals(amount_type, token_decimals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_falls_back_until_asset_known() {
        let c = EngineConfig::default();
        assert_eq!(c.max_decimals(AmountType::Coin, None), 8);
        assert_eq!(c.max_decimals(AmountType::Coin, Some(18)), 18);
        assert_eq!(c.max_decimals(AmountType::Currency, Some(18)), 2);
    }

    #[test]
    fn input_checked_against_active_unit() {
        let c = EngineConfig::default();
        assert!(c.is_valid_input("0.123456789", AmountType::Coin, Some(18)));
        assert!(!c.is_valid_input("0.123456789", AmountType::Coin, None));
        assert!(!c.is_valid_input("10.001", AmountType::Currency, Some(18)));
        assert!(c.is_valid_input("", AmountType::Currency, None));
    }
}
