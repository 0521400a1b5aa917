use domain::types::AmountType;

use crate::cause::SwitchCause;
use crate::state::SwitchState;
use crate::switch::{AmountTypeSwitch, SwitchChange};
use crate::transition::{TransitionError, transition};

#[test]
fn happy_path_coin_currency_coin() {
    let mut s = SwitchState::new(AmountType::Coin);

    s = transition(s, SwitchCause::PriceKnown).unwrap();
    s = transition(s, SwitchCause::Toggle).unwrap();
    assert_eq!(s.amount_type, AmountType::Currency);

    s = transition(s, SwitchCause::Toggle).unwrap();
    assert_eq!(s.amount_type, AmountType::Coin);
}

#[test]
fn illegal_toggle_without_price() {
    let s = SwitchState::new(AmountType::Coin);
    assert_eq!(
        transition(s, SwitchCause::Toggle),
        Err(TransitionError::IllegalTransition {
            from: s,
            cause: SwitchCause::Toggle
        })
    );
}

#[test]
fn losing_price_keeps_amount_type() {
    let mut s = SwitchState::new(AmountType::Coin);
    s = transition(s, SwitchCause::PriceKnown).unwrap();
    s = transition(s, SwitchCause::Toggle).unwrap();
    s = transition(s, SwitchCause::PriceLost).unwrap();

    assert_eq!(s.amount_type, AmountType::Currency);
    assert!(!s.toggle_available);
}

#[test]
fn switch_toggle_is_noop_when_unavailable() {
    let mut sw = AmountTypeSwitch::new(AmountType::Coin);
    assert_eq!(sw.toggle(), None);
    assert_eq!(sw.amount_type(), AmountType::Coin);
}

#[test]
fn switch_stays_in_currency_after_toggle_disabled() {
    let mut sw = AmountTypeSwitch::new(AmountType::Coin);
    sw.set_toggle_available(true);
    assert_eq!(
        sw.toggle(),
        Some(SwitchChange::AmountType(AmountType::Currency))
    );

    assert_eq!(
        sw.set_toggle_available(false),
        Some(SwitchChange::ToggleAvailable(false))
    );
    assert_eq!(sw.toggle(), None);
    assert_eq!(sw.amount_type(), AmountType::Currency);
}

#[test]
fn availability_notifies_only_on_change() {
    let mut sw = AmountTypeSwitch::new(AmountType::Coin);
    assert_eq!(sw.set_toggle_available(false), None);
    assert_eq!(
        sw.set_toggle_available(true),
        Some(SwitchChange::ToggleAvailable(true))
    );
    assert_eq!(sw.set_toggle_available(true), None);
}
