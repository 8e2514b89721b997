use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tba_config::{ConfigError, TournamentConfig};
use tba_mech::MechanismError;
use tba_state::{PeriodRecord, StoreError};

/// Tournament lifecycle phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Created,
    StageActive,
    Completed,
}

/// One row of the final leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub agent_id: String,
    pub stage_tokens: Vec<Decimal>,
    pub weighted_points: Decimal,
    pub sp: u32,
}

/// Per-agent summary attached to the result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub sp: u32,
    pub weighted_points: Decimal,
    pub stage_tokens: Vec<Decimal>,
    /// Net cash spent on retained holdings.
    pub spent: Decimal,
    pub remaining_budget: Decimal,
    /// Single-winner periods won and kept (rescinded wins excluded).
    pub periods_won: usize,
    pub rescinds_made: usize,
    /// Volume-weighted mean price over retained allocations.
    pub mean_price: Decimal,
    /// Weighted points per unit of spent budget; zero when nothing was
    /// spent.
    pub points_per_spent: Decimal,
}

/// Everything a caller gets back from a finished tournament.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentResult {
    /// Configuration echo.
    pub config: TournamentConfig,
    /// Canonical config hash when the config came through the loader.
    pub config_hash: Option<String>,
    /// Sorted by SP descending, weighted points, then agent id.
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Winner's agent id; empty string when no agents participated.
    pub winner: String,
    /// The complete period log.
    pub periods: Vec<PeriodRecord>,
    pub summaries: BTreeMap<String, AgentSummary>,
}

/// Fatal engine failures. Everything here stops the tournament; agent
/// decision failures never appear — those are contained in the period
/// runner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed configuration at construction.
    Config(ConfigError),
    /// Two agents share an id at construction.
    DuplicateAgent { agent_id: String },
    /// Unknown or unimplemented mechanism tag at period time.
    Mechanism(MechanismError),
    /// A store contract was violated mid-run. Settlement deductions are
    /// pre-constrained by admission, so this indicates an engine bug, not
    /// a user error.
    Store(StoreError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration rejected: {e}"),
            Self::DuplicateAgent { agent_id } => {
                write!(f, "duplicate agent id '{agent_id}'")
            }
            Self::Mechanism(e) => write!(f, "mechanism failure: {e}"),
            Self::Store(e) => write!(f, "store violation: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<MechanismError> for EngineError {
    fn from(e: MechanismError) -> Self {
        Self::Mechanism(e)
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
