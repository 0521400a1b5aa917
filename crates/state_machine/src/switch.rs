use domain::types::AmountType;

use crate::cause::SwitchCause;
use crate::state::SwitchState;
use crate::transition::transition;

/// Notification emitted when the switch changes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SwitchChange {
    AmountType(AmountType),
    ToggleAvailable(bool),
}

/// Which unit is primary, and whether the user may flip it.
#[derive(Debug, Clone)]
pub struct AmountTypeSwitch {
    state: SwitchState,
}

impl AmountTypeSwitch {
    pub fn new(amount_type: AmountType) -> Self {
        Self {
            state: SwitchState::new(amount_type),
        }
    }

    pub fn amount_type(&self) -> AmountType {
        self.state.amount_type
    }

    pub fn toggle_available(&self) -> bool {
        self.state.toggle_available
    }

    /// No-op while toggling is unavailable.
    pub fn toggle(&mut self) -> Option<SwitchChange> {
        let next = transition(self.state, SwitchCause::Toggle).ok()?;
        self.state = next;
        Some(SwitchChange::AmountType(next.amount_type))
    }

    /// Returns a notification only if the flag actually changed.
    pub fn set_toggle_available(&mut self, available: bool) -> Option<SwitchChange> {
        if self.state.toggle_available == available {
            return None;
        }

        let cause = if available {
            SwitchCause::PriceKnown
        } else {
            SwitchCause::PriceLost
        };
        self.state = transition(self.state, cause).ok()?;
        Some(SwitchChange::ToggleAvailable(available))
    }
}
