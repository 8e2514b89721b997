//! tba-state
//!
//! Single source of truth for one tournament:
//! - Per-agent runtime state (budget, holdings, materialised counters,
//!   private rescind info)
//! - Append-only period log with the delayed-revelation rescinded flag
//! - Rescind ledger: pending revelations + scheduled supply injections
//! - Rank queries with deterministic id tiebreaks
//!
//! Pure deterministic logic — no IO, no time, no randomness.

mod ledger;
mod store;
mod types;

pub use ledger::{RescindLedger, REVEAL_DELAY};
pub use store::{StoreError, TournamentStore};
pub use types::{
    AgentRuntime, Holding, PendingRescind, PeriodPosition, PeriodRecord, PrivateRescind,
    SupplyInjection,
};
