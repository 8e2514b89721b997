//! Deterministic scripted agents for driving tournaments in tests.
//!
//! No agent here inspects opponents or adapts; each one is a fixed rule so
//! scenario outcomes are hand-computable. The one randomised agent takes an
//! explicit seed, keeping whole runs reproducible.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use tba_agent::{Agent, AgentError, BidSheet, Observation, RescindChoice};
use tba_state::PeriodRecord;

// ---------------------------------------------------------------------------
// IncrementBidder
// ---------------------------------------------------------------------------

/// Bids `floor + increment` every period; never rescinds.
pub struct IncrementBidder {
    id: String,
    increment: Decimal,
}

impl IncrementBidder {
    pub fn new(id: impl Into<String>, increment: Decimal) -> Self {
        Self {
            id: id.into(),
            increment,
        }
    }
}

impl Agent for IncrementBidder {
    fn agent_id(&self) -> &str {
        &self.id
    }

    fn decide_bids(&mut self, obs: &Observation) -> Result<BidSheet, AgentError> {
        Ok(BidSheet::single(obs.floor_price + self.increment))
    }

    fn decide_rescind(
        &mut self,
        _obs: &Observation,
        _record: &PeriodRecord,
    ) -> Result<RescindChoice, AgentError> {
        Ok(RescindChoice::KEEP)
    }
}

// ---------------------------------------------------------------------------
// RescindBidder
// ---------------------------------------------------------------------------

/// Bids `floor + increment` every period and rescinds every win it is
/// asked about.
pub struct RescindBidder {
    id: String,
    increment: Decimal,
}

impl RescindBidder {
    pub fn new(id: impl Into<String>, increment: Decimal) -> Self {
        Self {
            id: id.into(),
            increment,
        }
    }
}

impl Agent for RescindBidder {
    fn agent_id(&self) -> &str {
        &self.id
    }

    fn decide_bids(&mut self, obs: &Observation) -> Result<BidSheet, AgentError> {
        Ok(BidSheet::single(obs.floor_price + self.increment))
    }

    fn decide_rescind(
        &mut self,
        _obs: &Observation,
        _record: &PeriodRecord,
    ) -> Result<RescindChoice, AgentError> {
        Ok(RescindChoice::RESCIND)
    }
}

// ---------------------------------------------------------------------------
// ScriptedBidder
// ---------------------------------------------------------------------------

/// Plays a fixed script: entry `n` holds the prices offered in absolute
/// period `n`. Beyond the script it skips.
pub struct ScriptedBidder {
    id: String,
    script: Vec<Vec<Decimal>>,
    rescind_wins: bool,
}

impl ScriptedBidder {
    pub fn new(id: impl Into<String>, script: Vec<Vec<Decimal>>) -> Self {
        Self {
            id: id.into(),
            script,
            rescind_wins: false,
        }
    }

    /// A scripted bidder that rescinds every win it is asked about.
    pub fn rescinding(id: impl Into<String>, script: Vec<Vec<Decimal>>) -> Self {
        Self {
            id: id.into(),
            script,
            rescind_wins: true,
        }
    }
}

impl Agent for ScriptedBidder {
    fn agent_id(&self) -> &str {
        &self.id
    }

    fn decide_bids(&mut self, obs: &Observation) -> Result<BidSheet, AgentError> {
        let offers = self
            .script
            .get(obs.absolute_period)
            .map(|prices| prices.iter().map(|p| tba_agent::BidOffer::new(*p)).collect())
            .unwrap_or_default();
        Ok(BidSheet { offers })
    }

    fn decide_rescind(
        &mut self,
        _obs: &Observation,
        _record: &PeriodRecord,
    ) -> Result<RescindChoice, AgentError> {
        Ok(RescindChoice {
            rescind: self.rescind_wins,
        })
    }
}

// ---------------------------------------------------------------------------
// SilentBidder
// ---------------------------------------------------------------------------

/// Never bids.
pub struct SilentBidder {
    id: String,
}

impl SilentBidder {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Agent for SilentBidder {
    fn agent_id(&self) -> &str {
        &self.id
    }

    fn decide_bids(&mut self, _obs: &Observation) -> Result<BidSheet, AgentError> {
        Ok(BidSheet::skip())
    }

    fn decide_rescind(
        &mut self,
        _obs: &Observation,
        _record: &PeriodRecord,
    ) -> Result<RescindChoice, AgentError> {
        Ok(RescindChoice::KEEP)
    }
}

// ---------------------------------------------------------------------------
// FailingBidder
// ---------------------------------------------------------------------------

/// Signals a failure from every `decide_bids` call.
pub struct FailingBidder {
    id: String,
}

impl FailingBidder {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Agent for FailingBidder {
    fn agent_id(&self) -> &str {
        &self.id
    }

    fn decide_bids(&mut self, _obs: &Observation) -> Result<BidSheet, AgentError> {
        Err(AgentError::new("scripted bid failure"))
    }

    fn decide_rescind(
        &mut self,
        _obs: &Observation,
        _record: &PeriodRecord,
    ) -> Result<RescindChoice, AgentError> {
        Ok(RescindChoice::KEEP)
    }
}

// ---------------------------------------------------------------------------
// FlakyRescinder
// ---------------------------------------------------------------------------

/// Bids `floor + increment` but signals a failure whenever asked about a
/// rescind; the engine must treat that as keeping the tokens.
pub struct FlakyRescinder {
    id: String,
    increment: Decimal,
}

impl FlakyRescinder {
    pub fn new(id: impl Into<String>, increment: Decimal) -> Self {
        Self {
            id: id.into(),
            increment,
        }
    }
}

impl Agent for FlakyRescinder {
    fn agent_id(&self) -> &str {
        &self.id
    }

    fn decide_bids(&mut self, obs: &Observation) -> Result<BidSheet, AgentError> {
        Ok(BidSheet::single(obs.floor_price + self.increment))
    }

    fn decide_rescind(
        &mut self,
        _obs: &Observation,
        _record: &PeriodRecord,
    ) -> Result<RescindChoice, AgentError> {
        Err(AgentError::new("scripted rescind failure"))
    }
}

// ---------------------------------------------------------------------------
// SeededBidder
// ---------------------------------------------------------------------------

/// Bids `floor + r` with `r` drawn in whole cents from `[0, spread_cents]`
/// using a caller-supplied seed. Identical seeds replay identical bids.
pub struct SeededBidder {
    id: String,
    rng: StdRng,
    spread_cents: i64,
}

impl SeededBidder {
    pub fn new(id: impl Into<String>, seed: u64, spread_cents: i64) -> Self {
        Self {
            id: id.into(),
            rng: StdRng::seed_from_u64(seed),
            spread_cents,
        }
    }
}

impl Agent for SeededBidder {
    fn agent_id(&self) -> &str {
        &self.id
    }

    fn decide_bids(&mut self, obs: &Observation) -> Result<BidSheet, AgentError> {
        let cents = self.rng.gen_range(0..=self.spread_cents);
        Ok(BidSheet::single(obs.floor_price + Decimal::new(cents, 2)))
    }

    fn decide_rescind(
        &mut self,
        _obs: &Observation,
        _record: &PeriodRecord,
    ) -> Result<RescindChoice, AgentError> {
        Ok(RescindChoice::KEEP)
    }
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

/// Shared handle to the observations a [`Probe`] has seen.
pub type ObservationLog = Arc<Mutex<Vec<Observation>>>;

/// Wraps any agent, recording every observation it receives into a shared
/// log before delegating, so tests can assert on mid-run views after the
/// tournament finishes.
pub struct Probe {
    inner: Box<dyn Agent>,
    log: ObservationLog,
}

impl Probe {
    pub fn wrap(inner: Box<dyn Agent>) -> (Self, ObservationLog) {
        let log: ObservationLog = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                inner,
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl Agent for Probe {
    fn agent_id(&self) -> &str {
        self.inner.agent_id()
    }

    fn decide_bids(&mut self, obs: &Observation) -> Result<BidSheet, AgentError> {
        self.log
            .lock()
            .map_err(|_| AgentError::new("observation log poisoned"))?
            .push(obs.clone());
        self.inner.decide_bids(obs)
    }

    fn decide_rescind(
        &mut self,
        obs: &Observation,
        record: &PeriodRecord,
    ) -> Result<RescindChoice, AgentError> {
        self.inner.decide_rescind(obs, record)
    }
}
