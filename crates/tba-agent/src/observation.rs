//! The observation — everything an agent sees at the start of a period.
//!
//! An observation is an owned value, deep-copied out of the store at
//! construction. Agents can hold onto it, mutate their copy, or ship it
//! elsewhere; none of that reaches engine state. What is public and what is
//! private is decided here by construction, not by access control:
//!
//! - the private block carries only the observed agent's own budget,
//!   holdings, and pending-rescind knowledge;
//! - the leaderboard carries every agent's token counts, weighted points,
//!   and SP — never budgets, never private rescind info;
//! - history records reflect their current rescinded flag, so a rescind
//!   inside its two-period window still reads as unset.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tba_state::{Holding, PeriodRecord, PrivateRescind};

/// One row of the public leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub agent_id: String,
    pub stage_tokens: Vec<Decimal>,
    pub weighted_points: Decimal,
    pub sp: u32,
}

/// Everything one agent sees at the start of one period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    // --- position ---
    pub stage: usize,
    pub period_in_stage: usize,
    pub absolute_period: usize,
    pub periods_remaining_in_stage: usize,
    pub stages_remaining: usize,

    // --- agent-private ---
    pub budget: Decimal,
    pub holdings: Vec<Holding>,
    pub weighted_points: Decimal,
    pub stage_tokens: Vec<Decimal>,
    pub sp: u32,
    pub private_info: Vec<PrivateRescind>,

    // --- period framing ---
    pub tokens_available: Decimal,
    pub floor_price: Decimal,
    pub points_per_token: Decimal,

    // --- public ---
    pub history: Vec<PeriodRecord>,
    pub leaderboard: Vec<LeaderboardRow>,
}
