//! Tournament store — single source of truth for one tournament.
//!
//! # Purpose
//! Owns per-agent runtime state, the append-only period log, and the
//! rescind ledger. Every mutation arising from clearing or rescinding goes
//! through here, so the invariants (non-negative budgets, counters that
//! match the holdings they summarize) have exactly one enforcement
//! boundary.
//!
//! # Determinism
//! Agents live in a `BTreeMap` keyed by id, so every iteration — including
//! both rank queries — is ordered by agent id without extra work.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;

use tba_config::TournamentConfig;

use crate::ledger::{RescindLedger, REVEAL_DELAY};
use crate::types::{AgentRuntime, Holding, PendingRescind, PeriodRecord, PrivateRescind};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Store operation failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// No agent with this id is registered.
    UnknownAgent { agent_id: String },
    /// A deduction would push the budget negative.
    Insufficient {
        agent_id: String,
        requested: Decimal,
        available: Decimal,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAgent { agent_id } => write!(f, "unknown agent '{agent_id}'"),
            Self::Insufficient {
                agent_id,
                requested,
                available,
            } => write!(
                f,
                "insufficient budget for '{agent_id}': requested {requested}, available {available}"
            ),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// TournamentStore
// ---------------------------------------------------------------------------

pub struct TournamentStore {
    config: TournamentConfig,
    agents: BTreeMap<String, AgentRuntime>,
    records: Vec<PeriodRecord>,
    ledger: RescindLedger,
}

impl TournamentStore {
    /// Create a store with zeroed agent state for each id.
    pub fn new(config: &TournamentConfig, agent_ids: &[String]) -> Self {
        let stage_count = config.stages.len();
        let agents = agent_ids
            .iter()
            .map(|id| {
                (
                    id.clone(),
                    AgentRuntime::new(id.clone(), config.starting_budget, stage_count),
                )
            })
            .collect();
        Self {
            config: config.clone(),
            agents,
            records: Vec::new(),
            ledger: RescindLedger::new(),
        }
    }

    pub fn starting_budget(&self) -> Decimal {
        self.config.starting_budget
    }

    pub fn agent(&self, agent_id: &str) -> Option<&AgentRuntime> {
        self.agents.get(agent_id)
    }

    /// All agents, ordered by id.
    pub fn agents(&self) -> impl Iterator<Item = &AgentRuntime> {
        self.agents.values()
    }

    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    // --- budget ---

    /// Subtract `amount`; returns the new balance.
    pub fn deduct_budget(&mut self, agent_id: &str, amount: Decimal) -> Result<Decimal, StoreError> {
        let agent = self.agent_mut(agent_id)?;
        if amount > agent.budget {
            return Err(StoreError::Insufficient {
                agent_id: agent_id.to_string(),
                requested: amount,
                available: agent.budget,
            });
        }
        agent.budget -= amount;
        Ok(agent.budget)
    }

    /// Add `amount` back. The refund path never fails on balance.
    pub fn refund_budget(&mut self, agent_id: &str, amount: Decimal) -> Result<(), StoreError> {
        let agent = self.agent_mut(agent_id)?;
        agent.budget += amount;
        Ok(())
    }

    // --- holdings ---

    /// Append a holding and keep the derived counters consistent.
    ///
    /// Callers keep `(stage, period)` unique per agent — the period runner
    /// settles at most one combined holding per agent per period, which is
    /// what lets [`remove_holding`](Self::remove_holding) match by that key
    /// alone.
    pub fn add_holding(&mut self, agent_id: &str, holding: Holding) -> Result<(), StoreError> {
        let agent = self.agent_mut(agent_id)?;
        agent.stage_tokens[holding.stage] += holding.tokens;
        agent.weighted_points += holding.points();
        agent.holdings.push(holding);
        Ok(())
    }

    /// Remove the holding matching (stage, period). `Ok(None)` when nothing
    /// matches — removal is a no-op then.
    pub fn remove_holding(
        &mut self,
        agent_id: &str,
        stage: usize,
        period: usize,
    ) -> Result<Option<Holding>, StoreError> {
        let agent = self.agent_mut(agent_id)?;
        let idx = agent
            .holdings
            .iter()
            .position(|h| h.stage == stage && h.period == period);
        Ok(idx.map(|i| {
            let removed = agent.holdings.remove(i);
            agent.stage_tokens[removed.stage] -= removed.tokens;
            agent.weighted_points -= removed.points();
            removed
        }))
    }

    // --- period log ---

    pub fn append_record(&mut self, record: PeriodRecord) {
        self.records.push(record);
    }

    /// Set the record's rescinded flag to `true`. No-op when the record is
    /// absent. This is the only transition the flag ever makes.
    pub fn flip_rescinded(&mut self, stage: usize, period: usize) {
        if let Some(r) = self
            .records
            .iter_mut()
            .find(|r| r.position.stage == stage && r.position.period == period)
        {
            r.rescinded = Some(true);
        }
    }

    // --- scoring ---

    pub fn award_sp(&mut self, agent_id: &str, points: u32) -> Result<(), StoreError> {
        let agent = self.agent_mut(agent_id)?;
        agent.sp += points;
        Ok(())
    }

    // --- rescind protocol ---

    /// Execute the full rescind transition for the winner of (stage,
    /// period) at absolute period `absolute`:
    /// remove the holding, refund the full payment, enqueue the pending
    /// revelation and the supply injection for `absolute + 2`, and hand the
    /// agent its private-info entry. `Ok(None)` when no matching holding
    /// exists.
    ///
    /// The caller is responsible for not offering rescinds whose target
    /// would fall outside the tournament horizon.
    pub fn apply_rescind(
        &mut self,
        agent_id: &str,
        stage: usize,
        period: usize,
        absolute: usize,
    ) -> Result<Option<PendingRescind>, StoreError> {
        let Some(removed) = self.remove_holding(agent_id, stage, period)? else {
            return Ok(None);
        };

        let total_refunded = removed.total_paid();
        self.refund_budget(agent_id, total_refunded)?;

        let reveal_at = absolute + REVEAL_DELAY;
        debug_assert!(
            self.config.position_of(reveal_at).is_some(),
            "rescind target must lie within the tournament horizon"
        );
        let (target_stage, target_period) = self.config.position_of(reveal_at).unwrap_or_default();

        let pending = PendingRescind {
            agent_id: agent_id.to_string(),
            stage,
            period,
            tokens: removed.tokens,
            price_refunded: removed.price_paid,
            total_refunded,
            rescinded_at: absolute,
            reveal_at,
        };
        self.ledger.push(pending.clone());

        let agent = self.agent_mut(agent_id)?;
        agent.private_info.push(PrivateRescind {
            target_stage,
            target_period,
            tokens: removed.tokens,
            reveal_at,
        });

        Ok(Some(pending))
    }

    /// Drain every pending rescind due at `absolute`, flip the source
    /// records' flags, and purge the matching private-info entries.
    pub fn reveal_due_rescinds(&mut self, absolute: usize) -> Vec<PendingRescind> {
        let due = self.ledger.reveal_due(absolute);
        for r in &due {
            self.flip_rescinded(r.stage, r.period);
            if let Some(agent) = self.agents.get_mut(&r.agent_id) {
                agent.private_info.retain(|p| p.reveal_at != r.reveal_at);
            }
        }
        due
    }

    /// Injected tokens maturing into exactly this period.
    pub fn supply_due(&self, absolute: usize) -> Decimal {
        self.ledger.supply_due(absolute)
    }

    /// Pending rescinds not yet revealed (inspection only).
    pub fn pending_rescinds(&self) -> &[PendingRescind] {
        self.ledger.pending()
    }

    // --- rank queries ---

    /// Agents holding > 0 tokens in the stage, by token count descending,
    /// then agent id ascending.
    pub fn stage_ranking(&self, stage: usize) -> Vec<(String, Decimal)> {
        let mut ranked: Vec<(String, Decimal)> = self
            .agents
            .values()
            .filter(|a| a.stage_tokens.get(stage).copied().unwrap_or_default() > Decimal::ZERO)
            .map(|a| (a.agent_id.clone(), a.stage_tokens[stage]))
            .collect();
        // BTreeMap iteration is id-ascending; a stable sort preserves that
        // order inside token ties.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// All agents by weighted points descending, then agent id ascending.
    pub fn overall_ranking(&self) -> Vec<(String, Decimal)> {
        let mut ranked: Vec<(String, Decimal)> = self
            .agents
            .values()
            .map(|a| (a.agent_id.clone(), a.weighted_points))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    // --- internals ---

    fn agent_mut(&mut self, agent_id: &str) -> Result<&mut AgentRuntime, StoreError> {
        self.agents.get_mut(agent_id).ok_or_else(|| StoreError::UnknownAgent {
            agent_id: agent_id.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
