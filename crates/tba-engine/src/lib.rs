//! tba-engine
//!
//! The tournament engine:
//! - Period runner: OBSERVE -> COLLECT -> ADMIT -> CLEAR -> SETTLE ->
//!   RESCIND OFFER -> RECORD
//! - Tournament driver: stage/period loop, delayed rescind revelation,
//!   supply injections, SP awards, overall bonus, result assembly
//! - Single-threaded, synchronous, deterministic replay (same config +
//!   same agent decisions => identical logs and leaderboards)
//! - Agent failures contained per call; engine errors are fatal

mod driver;
mod observe;
mod period;
mod result;
mod types;

pub use driver::Tournament;
pub use types::{AgentSummary, EngineError, LeaderboardEntry, Phase, TournamentResult};
