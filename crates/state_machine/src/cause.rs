#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SwitchCause {
    // user
    Toggle,

    // converter context
    PriceKnown,
    PriceLost,
}
