//! Rescind ledger — the two scheduled-effect queues.
//!
//! A rescind has two follow-ups sharing one scheduled time: the public
//! revelation (flips the source record's flag, purges the agent's private
//! info) and the supply injection (extra tokens for the target period).
//! They stay in separate queues because different components consume them
//! at different sub-steps of period start: the driver drains revelations
//! before observations are built, while the period runner sums injections
//! when computing the period's supply.

use rust_decimal::Decimal;

use crate::types::{PendingRescind, SupplyInjection};

/// Delay, in periods, between a rescind and both of its effects.
pub const REVEAL_DELAY: usize = 2;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RescindLedger {
    pending: Vec<PendingRescind>,
    injections: Vec<SupplyInjection>,
}

impl RescindLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue both follow-ups of a rescind.
    pub fn push(&mut self, pending: PendingRescind) {
        debug_assert_eq!(pending.reveal_at, pending.rescinded_at + REVEAL_DELAY);
        self.injections.push(SupplyInjection {
            target_absolute: pending.reveal_at,
            tokens: pending.tokens,
            provenance: format!("rescind stage {} period {}", pending.stage, pending.period),
        });
        self.pending.push(pending);
    }

    /// Remove and return every pending rescind whose reveal period has
    /// arrived. Supply injections are left in place; they are consumed by
    /// [`supply_due`](Self::supply_due).
    pub fn reveal_due(&mut self, absolute: usize) -> Vec<PendingRescind> {
        let mut due = Vec::new();
        self.pending.retain(|p| {
            if p.reveal_at <= absolute {
                due.push(p.clone());
                false
            } else {
                true
            }
        });
        due
    }

    /// Sum of injected tokens targeting exactly this period.
    pub fn supply_due(&self, absolute: usize) -> Decimal {
        self.injections
            .iter()
            .filter(|i| i.target_absolute == absolute)
            .map(|i| i.tokens)
            .sum()
    }

    /// Pending rescinds not yet revealed (inspection only).
    pub fn pending(&self) -> &[PendingRescind] {
        &self.pending
    }

    /// All injections ever scheduled (inspection only).
    pub fn injections(&self) -> &[SupplyInjection] {
        &self.injections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pending(agent: &str, rescinded_at: usize, tokens: Decimal) -> PendingRescind {
        PendingRescind {
            agent_id: agent.to_string(),
            stage: 0,
            period: rescinded_at,
            tokens,
            price_refunded: dec!(11),
            total_refunded: tokens * dec!(11),
            rescinded_at,
            reveal_at: rescinded_at + REVEAL_DELAY,
        }
    }

    #[test]
    fn push_schedules_injection_at_reveal_period() {
        let mut ledger = RescindLedger::new();
        ledger.push(pending("x", 3, dec!(100)));
        assert_eq!(ledger.supply_due(5), dec!(100));
        assert_eq!(ledger.supply_due(4), Decimal::ZERO);
        assert_eq!(ledger.supply_due(6), Decimal::ZERO);
    }

    #[test]
    fn reveal_due_drains_only_matured_entries() {
        let mut ledger = RescindLedger::new();
        ledger.push(pending("x", 0, dec!(100)));
        ledger.push(pending("y", 3, dec!(50)));

        assert!(ledger.reveal_due(1).is_empty());
        let due = ledger.reveal_due(2);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].agent_id, "x");
        assert_eq!(ledger.pending().len(), 1);

        let later = ledger.reveal_due(5);
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].agent_id, "y");
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn injections_from_same_target_accumulate() {
        let mut ledger = RescindLedger::new();
        ledger.push(pending("x", 3, dec!(100)));
        ledger.push(pending("y", 3, dec!(40)));
        assert_eq!(ledger.supply_due(5), dec!(140));
    }
}
