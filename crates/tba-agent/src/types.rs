use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tba_state::PeriodRecord;

use crate::Observation;

/// One bid offer: a price per token for the full period batch. The engine
/// derives the committed cost as `price * supply` at admission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidOffer {
    pub price: Decimal,
}

impl BidOffer {
    pub fn new(price: Decimal) -> Self {
        Self { price }
    }
}

/// An agent's bid decision for one period. Empty means "skip".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidSheet {
    pub offers: Vec<BidOffer>,
}

impl BidSheet {
    pub fn skip() -> Self {
        Self::default()
    }

    pub fn single(price: Decimal) -> Self {
        Self {
            offers: vec![BidOffer::new(price)],
        }
    }
}

/// An agent's answer to the rescind prompt.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescindChoice {
    pub rescind: bool,
}

impl RescindChoice {
    pub const KEEP: RescindChoice = RescindChoice { rescind: false };
    pub const RESCIND: RescindChoice = RescindChoice { rescind: true };
}

/// A failure signalled by an agent decision. The engine recovers locally:
/// failed bid decisions drop that agent's offers for the period, failed
/// rescind decisions keep the tokens. Nothing propagates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentError {
    message: String,
}

impl AgentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent decision failed: {}", self.message)
    }
}

impl std::error::Error for AgentError {}

/// A bidding agent.
///
/// Both operations are value-in/value-out: the observation and record are
/// owned snapshots, and nothing an agent does to them can touch engine
/// state. A `Err` from either operation is contained by the engine. Agent
/// ids must be unique within a tournament; duplicates are a fatal
/// construction error.
pub trait Agent: Send {
    fn agent_id(&self) -> &str;

    /// Called once per period after observation construction.
    fn decide_bids(&mut self, obs: &Observation) -> Result<BidSheet, AgentError>;

    /// Called only when this agent is the single winner of the just-cleared
    /// period and rescinding is allowed. `record` is the preliminary period
    /// record; its rescinded field is still unset.
    fn decide_rescind(
        &mut self,
        obs: &Observation,
        record: &PeriodRecord,
    ) -> Result<RescindChoice, AgentError>;
}
