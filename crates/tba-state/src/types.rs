use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tba_mech::{Allocation, Bid, MechanismKind};

/// A retained allocation: tokens an agent holds and has not rescinded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub stage: usize,
    pub period: usize,
    pub tokens: Decimal,
    /// Price paid per token at settlement.
    pub price_paid: Decimal,
    /// Ranking-point multiplier echoed from the stage config.
    pub points_per_token: Decimal,
}

impl Holding {
    /// Weighted-point contribution of this holding.
    pub fn points(&self) -> Decimal {
        self.tokens * self.points_per_token
    }

    /// Total cash the holding cost.
    pub fn total_paid(&self) -> Decimal {
        self.tokens * self.price_paid
    }
}

/// Private knowledge of one not-yet-public rescind, carried only by the
/// rescinding agent until the reveal period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateRescind {
    /// Stage the returned tokens will re-enter.
    pub target_stage: usize,
    /// Period within that stage.
    pub target_period: usize,
    pub tokens: Decimal,
    /// Absolute period at which the rescind becomes public.
    pub reveal_at: usize,
}

/// Runtime state for one participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRuntime {
    pub agent_id: String,
    pub budget: Decimal,
    pub holdings: Vec<Holding>,
    /// Token count per stage, indexed by stage. Derived from holdings but
    /// kept materialised for ranking.
    pub stage_tokens: Vec<Decimal>,
    /// Derived: sum of tokens * points_per_token across holdings.
    pub weighted_points: Decimal,
    /// Accumulated stage points.
    pub sp: u32,
    pub private_info: Vec<PrivateRescind>,
}

impl AgentRuntime {
    pub fn new(agent_id: impl Into<String>, budget: Decimal, stage_count: usize) -> Self {
        Self {
            agent_id: agent_id.into(),
            budget,
            holdings: Vec::new(),
            stage_tokens: vec![Decimal::ZERO; stage_count],
            weighted_points: Decimal::ZERO,
            sp: 0,
            private_info: Vec::new(),
        }
    }

    /// Recompute stage token counts from holdings. Must always equal
    /// `stage_tokens`; the materialised counters exist for ranking speed,
    /// not as a second source of truth.
    pub fn recomputed_stage_tokens(&self) -> Vec<Decimal> {
        let mut tokens = vec![Decimal::ZERO; self.stage_tokens.len()];
        for h in &self.holdings {
            tokens[h.stage] += h.tokens;
        }
        tokens
    }

    /// Recompute weighted points from holdings. Must always equal
    /// `weighted_points`.
    pub fn recomputed_weighted_points(&self) -> Decimal {
        self.holdings.iter().map(Holding::points).sum()
    }
}

/// A rescind waiting for its reveal period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRescind {
    pub agent_id: String,
    /// Source stage / period-within-stage of the rescinded win.
    pub stage: usize,
    pub period: usize,
    pub tokens: Decimal,
    pub price_refunded: Decimal,
    pub total_refunded: Decimal,
    /// Absolute period the rescind was made.
    pub rescinded_at: usize,
    /// Absolute period it becomes public: always rescinded_at + 2.
    pub reveal_at: usize,
}

/// Extra tokens scheduled into a future period's supply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyInjection {
    pub target_absolute: usize,
    pub tokens: Decimal,
    /// Where the tokens came from, e.g. "rescind stage 0 period 3".
    pub provenance: String,
}

/// Position of a period within the tournament.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodPosition {
    pub stage: usize,
    /// Period within the stage.
    pub period: usize,
    /// Monotonic zero-based index over the whole tournament.
    pub absolute: usize,
}

/// One completed period in the append-only log.
///
/// `rescinded` is `None` until the 2-period revelation delay elapses and
/// `Some(true)` afterwards; no other value is ever stored, so observers can
/// never see a transient state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub position: PeriodPosition,
    /// Tokens actually auctioned: base share plus matured injections.
    pub tokens_available: Decimal,
    pub floor_price: Decimal,
    pub points_per_token: Decimal,
    pub clearing_price: Decimal,
    pub allocations: Vec<Allocation>,
    /// The single winner when the mechanism is single-winner, else `None`.
    pub winner: Option<String>,
    pub rescinded: Option<bool>,
    /// The complete admitted bid set, kept for post-hoc analysis.
    pub bids: Vec<Bid>,
    pub mechanism: MechanismKind,
}
