/// Откуда пришло значение суммы
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AmountOrigin {
    /// typed text or percent-of-balance
    UserInput,
    /// card amount read once when the engine subscribes
    Seed,
    /// card's own amount stream
    CardUpdate,
    /// converter re-expressed the amount (price tick, unit toggle)
    Conversion,
}

/// Что делаем с суммой
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyncMode {
    Ignore,
    DisplayOnly,
    DisplayAndWrite,
}

/// Причина решения (для логов)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyncReason {
    UserEdit,
    SeedFromCard,
    SeedOfEstimate,
    UserOwnsAmount,
    EstimateFromQuote,
    Reconverted,
    EstimateNotEchoed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SyncDecision {
    pub mode: SyncMode,
    pub reason: SyncReason,
}

impl SyncDecision {
    pub fn accepts(self) -> bool {
        self.mode != SyncMode::Ignore
    }

    pub fn writes_back(self) -> bool {
        self.mode == SyncMode::DisplayAndWrite
    }
}

/// Write-back gate: origin × estimated.
///
/// An estimated amount belongs to the quote process, so it is shown but never
/// written back to the card. A non-estimated amount belongs to the user, so the
/// card's own amount stream must not overwrite what the engine already shows.
pub fn sync_decision(origin: AmountOrigin, estimated: bool) -> SyncDecision {
    let (mode, reason) = match (origin, estimated) {
        (AmountOrigin::UserInput, _) => (SyncMode::DisplayAndWrite, SyncReason::UserEdit),

        (AmountOrigin::Seed, false) => (SyncMode::DisplayAndWrite, SyncReason::SeedFromCard),
        (AmountOrigin::Seed, true) => (SyncMode::DisplayOnly, SyncReason::SeedOfEstimate),

        (AmountOrigin::CardUpdate, false) => (SyncMode::Ignore, SyncReason::UserOwnsAmount),
        (AmountOrigin::CardUpdate, true) => (SyncMode::DisplayOnly, SyncReason::EstimateFromQuote),

        (AmountOrigin::Conversion, false) => (SyncMode::DisplayAndWrite, SyncReason::Reconverted),
        (AmountOrigin::Conversion, true) => (SyncMode::DisplayOnly, SyncReason::EstimateNotEchoed),
    };

    SyncDecision { mode, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_input_always_writes() {
        for estimated in [false, true] {
            let d = sync_decision(AmountOrigin::UserInput, estimated);
            assert!(d.accepts());
            assert!(d.writes_back());
            assert_eq!(d.reason, SyncReason::UserEdit);
        }
    }

    #[test]
    fn card_update_of_estimate_is_displayed_but_not_echoed() {
        let d = sync_decision(AmountOrigin::CardUpdate, true);
        assert_eq!(d.mode, SyncMode::DisplayOnly);
        assert!(!d.writes_back());
    }

    #[test]
    fn card_update_of_user_amount_is_ignored() {
        let d = sync_decision(AmountOrigin::CardUpdate, false);
        assert!(!d.accepts());
        assert_eq!(d.reason, SyncReason::UserOwnsAmount);
    }

    #[test]
    fn seed_is_accepted_regardless_of_estimate() {
        assert!(sync_decision(AmountOrigin::Seed, true).accepts());
        assert!(sync_decision(AmountOrigin::Seed, false).accepts());
        assert!(!sync_decision(AmountOrigin::Seed, true).writes_back());
        assert!(sync_decision(AmountOrigin::Seed, false).writes_back());
    }

    #[test]
    fn conversion_writes_only_when_not_estimated() {
        assert!(sync_decision(AmountOrigin::Conversion, false).writes_back());
        let d = sync_decision(AmountOrigin::Conversion, true);
        assert_eq!(d.mode, SyncMode::DisplayOnly);
        assert_eq!(d.reason, SyncReason::EstimateNotEchoed);
    }

    #[test]
    fn no_origin_writes_back_an_estimate_except_user() {
        for origin in [
            AmountOrigin::Seed,
            AmountOrigin::CardUpdate,
            AmountOrigin::Conversion,
        ] {
            assert!(!sync_decision(origin, true).writes_back(), "{:?}", origin);
        }
    }
}
