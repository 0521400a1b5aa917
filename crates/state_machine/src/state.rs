use domain::types::AmountType;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SwitchState {
    pub amount_type: AmountType,
    pub toggle_available: bool,
}

impl SwitchState {
    pub fn new(amount_type: AmountType) -> Self {
        Self {
            amount_type,
            toggle_available: false,
        }
    }
}
