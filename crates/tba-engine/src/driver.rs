//! Tournament driver — stages, periods, revelation, scoring.
//!
//! The driver owns every component for its run: the store, the registered
//! agents, and the mechanism registry. Each period it reveals due
//! rescinds, computes the period supply (even base share plus matured
//! injections), decides whether the rescind window still fits the horizon,
//! and hands off to the period runner. Stage points are awarded at stage
//! end from the configured SP vector; the overall bonus goes to the
//! strictly positive weighted-points leader after the terminal stage.
//!
//! Determinism: same config, same agent order, same agent decisions —
//! identical period logs and leaderboards, including tiebreak-sensitive
//! allocations.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::{debug, info};

use tba_agent::Agent;
use tba_config::TournamentConfig;
use tba_mech::{round_tokens, MechanismRegistry};
use tba_state::{PeriodPosition, TournamentStore};

use crate::period::{run_period, PeriodParams};
use crate::result::assemble_result;
use crate::types::{EngineError, Phase, TournamentResult};

pub struct Tournament {
    config: TournamentConfig,
    config_hash: Option<String>,
    store: TournamentStore,
    agents: Vec<Box<dyn Agent>>,
    registry: MechanismRegistry,
    phase: Phase,
    absolute: usize,
}

impl Tournament {
    /// Build a tournament over `agents` in registration order.
    ///
    /// # Errors
    /// [`EngineError::Config`] for a malformed configuration and
    /// [`EngineError::DuplicateAgent`] when two agents share an id. Both
    /// are fatal: no tournament exists afterwards.
    pub fn new(
        config: TournamentConfig,
        agents: Vec<Box<dyn Agent>>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let mut seen = BTreeSet::new();
        for agent in &agents {
            if !seen.insert(agent.agent_id().to_string()) {
                return Err(EngineError::DuplicateAgent {
                    agent_id: agent.agent_id().to_string(),
                });
            }
        }

        let ids: Vec<String> = agents.iter().map(|a| a.agent_id().to_string()).collect();
        let store = TournamentStore::new(&config, &ids);

        Ok(Self {
            config,
            config_hash: None,
            store,
            agents,
            registry: MechanismRegistry::with_builtins(),
            phase: Phase::Created,
            absolute: 0,
        })
    }

    /// Attach the canonical config hash so the result echoes it.
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Replace the default registry, e.g. to install a custom mechanism
    /// under a reserved tag.
    pub fn with_registry(mut self, registry: MechanismRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drive the whole tournament and produce the result. Consumes the
    /// tournament: once the result exists, the run state is gone.
    pub fn run(mut self) -> Result<TournamentResult, EngineError> {
        self.phase = Phase::StageActive;
        let stage_count = self.config.stages.len();

        for stage_idx in 0..stage_count {
            let stage = self.config.stages[stage_idx].clone();
            // Even base share at the committed token precision; the final
            // period absorbs the division residue so the stage supply sums
            // exactly to the configured base.
            let share = round_tokens(stage.base_supply / Decimal::from(stage.periods as u64));
            let last_share =
                stage.base_supply - share * Decimal::from((stage.periods - 1) as u64);
            let terminal = stage_idx + 1 == stage_count;

            for period in 0..stage.periods {
                let absolute = self.absolute;

                // (a) Revelation happens strictly before observations.
                let revealed = self.store.reveal_due_rescinds(absolute);
                if !revealed.is_empty() {
                    debug!(absolute, count = revealed.len(), "rescinds revealed");
                }

                // (b) Supply: base share + injections due now.
                let base_share = if period + 1 == stage.periods {
                    last_share
                } else {
                    share
                };
                let supply = base_share + self.store.supply_due(absolute);

                // (c) The take-back window must fit the horizon: no rescind
                // offers in the last two periods of the terminal stage.
                let rescind_allowed = !(terminal && stage.periods - period <= 2);

                let params = PeriodParams {
                    position: PeriodPosition {
                        stage: stage_idx,
                        period,
                        absolute,
                    },
                    stage: &stage,
                    stage_count,
                    supply,
                    rescind_allowed,
                };
                run_period(&mut self.store, &mut self.agents, &self.registry, &params)?;

                self.absolute += 1;
            }

            // Stage-end SP: ranking truncated to the award vector; agents
            // with zero stage tokens never rank.
            let ranking = self.store.stage_ranking(stage_idx);
            let awards = &self.config.scoring.sp_awards;
            for (place, (agent_id, tokens)) in ranking.iter().take(awards.len()).enumerate() {
                self.store.award_sp(agent_id, awards[place])?;
                info!(
                    stage = stage_idx,
                    agent_id = %agent_id,
                    place = place + 1,
                    tokens = %tokens,
                    sp = awards[place],
                    "stage points awarded"
                );
            }
        }

        // Overall bonus: strictly positive weighted-points leader only.
        if let Some((leader, points)) = self.store.overall_ranking().into_iter().next() {
            if points > Decimal::ZERO {
                self.store
                    .award_sp(&leader, self.config.scoring.overall_bonus_sp)?;
                info!(agent_id = %leader, points = %points, "overall bonus awarded");
            }
        }

        self.phase = Phase::Completed;
        let result = assemble_result(self.config, self.config_hash, &self.store);
        info!(winner = %result.winner, periods = result.periods.len(), "tournament completed");
        Ok(result)
    }
}
