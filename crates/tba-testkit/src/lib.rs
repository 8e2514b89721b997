//! tba-testkit
//!
//! Deterministic scripted agents and config builders for exercising the
//! engine end to end. The integration scenarios live in `tests/`.

mod agents;

pub use agents::{
    FailingBidder, FlakyRescinder, IncrementBidder, ObservationLog, Probe, RescindBidder,
    ScriptedBidder, SeededBidder, SilentBidder,
};

use rust_decimal::Decimal;
use tba_config::{ScoringConfig, StageConfig, TournamentConfig};
use tba_mech::MechanismKind;

/// A single-stage tournament for focused scenarios.
pub fn single_stage_config(
    starting_budget: Decimal,
    base_supply: Decimal,
    floor_price: Decimal,
    periods: usize,
    mechanism: MechanismKind,
) -> TournamentConfig {
    TournamentConfig {
        starting_budget,
        stages: vec![StageConfig {
            base_supply,
            points_per_token: Decimal::ONE,
            floor_price,
            periods,
            max_bids_per_agent: 1,
            mechanism,
        }],
        scoring: ScoringConfig {
            sp_awards: vec![3, 2, 1],
            overall_bonus_sp: 1,
        },
    }
}
