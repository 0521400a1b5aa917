use crate::cause::SwitchCause;
use crate::state::SwitchState;

#[derive(Debug, PartialEq, Eq)]
pub enum TransitionError {
    IllegalTransition {
        from: SwitchState,
        cause: SwitchCause,
    },
}

pub fn transition(state: SwitchState, cause: SwitchCause) -> Result<SwitchState, TransitionError> {
    let next = match (state.toggle_available, cause) {
        // --- Toggle ---------------------------------------------------------
        (true, SwitchCause::Toggle) => SwitchState {
            amount_type: state.amount_type.toggled(),
            ..state
        },

        // --- Availability ---------------------------------------------------
        // amount_type не трогаем: валюта остаётся валютой, просто без переключения
        (_, SwitchCause::PriceKnown) => SwitchState {
            toggle_available: true,
            ..state
        },
        (_, SwitchCause::PriceLost) => SwitchState {
            toggle_available: false,
            ..state
        },

        // --- Illegal --------------------------------------------------------
        (false, SwitchCause::Toggle) => {
            return Err(TransitionError::IllegalTransition { from: state, cause });
        }
    };

    Ok(next)
}
