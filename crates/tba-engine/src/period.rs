//! Period runner — one full bidding round.
//!
//! Pipeline per period:
//! OBSERVE -> COLLECT -> ADMIT -> CLEAR -> SETTLE -> RESCIND OFFER -> RECORD
//!
//! Admission is the only budget gate: a bid is admitted iff its price is
//! positive, at or above the floor, and `price * supply` fits the agent's
//! remaining budget net of the agent's own already-admitted offers this
//! period. Mechanism clearing prices never exceed an admitted price, so
//! settlement deductions cannot underflow — if one does, that is an engine
//! bug and surfaces as a fatal [`EngineError::Store`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use tba_agent::{Agent, BidSheet, Observation};
use tba_config::StageConfig;
use tba_mech::{Bid, MechanismRegistry};
use tba_state::{Holding, PeriodPosition, PeriodRecord, TournamentStore};

use crate::observe::build_observation;
use crate::types::EngineError;

/// Everything the runner needs to know about the period being run.
pub(crate) struct PeriodParams<'a> {
    pub position: PeriodPosition,
    pub stage: &'a StageConfig,
    pub stage_count: usize,
    /// Base share plus injections matured into this period.
    pub supply: Decimal,
    pub rescind_allowed: bool,
}

pub(crate) fn run_period(
    store: &mut TournamentStore,
    agents: &mut [Box<dyn Agent>],
    registry: &MechanismRegistry,
    params: &PeriodParams<'_>,
) -> Result<(), EngineError> {
    let mechanism = registry.resolve(params.stage.mechanism)?;
    let pos = params.position;

    // 1. One consistent snapshot per agent, all built before any bid is
    //    collected.
    let mut observations: Vec<Observation> = Vec::with_capacity(agents.len());
    for agent in agents.iter() {
        observations.push(build_observation(store, agent.agent_id(), params)?);
    }

    // 2. Collect decisions. A failure drops that agent's offers for the
    //    period and nothing else.
    let mut sheets: Vec<BidSheet> = Vec::with_capacity(agents.len());
    for (agent, obs) in agents.iter_mut().zip(&observations) {
        match agent.decide_bids(obs) {
            Ok(sheet) => sheets.push(sheet),
            Err(e) => {
                warn!(agent_id = agent.agent_id(), error = %e, "bid decision failed; dropping offers");
                sheets.push(BidSheet::skip());
            }
        }
    }

    // 3. Admission. Offers are trimmed to the per-agent cap, then filtered
    //    by floor, positivity, and affordability. Affordability is checked
    //    against a running balance that commits each admitted offer's cost,
    //    so an agent can never be admitted for more than it can pay even if
    //    every one of its offers wins. Submission timestamps are stamped in
    //    registration order across agents, offer order within.
    let mut bids: Vec<Bid> = Vec::new();
    let mut seq: u64 = 0;
    for (agent, sheet) in agents.iter().zip(&sheets) {
        // Step 1 already resolved every agent id, so this lookup holds.
        let Some(budget) = store.agent(agent.agent_id()).map(|a| a.budget) else {
            continue;
        };
        let mut uncommitted = budget;
        for offer in sheet.offers.iter().take(params.stage.max_bids_per_agent) {
            let cost = offer.price * params.supply;
            if offer.price > Decimal::ZERO
                && offer.price >= params.stage.floor_price
                && cost <= uncommitted
            {
                bids.push(Bid::new(agent.agent_id(), offer.price, cost, seq));
                uncommitted -= cost;
                seq += 1;
            }
        }
    }

    // 4. Clearing.
    let outcome = mechanism.clear(&bids, params.supply, params.stage.floor_price)?;

    // 5. Settlement: one deduction and one holding per agent. Every
    //    allocation in a period fills at the same per-token price, so a
    //    multi-bid winner settles its combined fill as a single holding and
    //    the (stage, period) key stays unique per agent.
    let mut fills: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    for alloc in &outcome.allocations {
        let (tokens, total_paid) = fills.entry(alloc.agent_id.as_str()).or_default();
        *tokens += alloc.tokens;
        *total_paid += alloc.total_paid;
    }
    for (agent_id, (tokens, total_paid)) in &fills {
        store.deduct_budget(agent_id, *total_paid)?;
        store.add_holding(
            agent_id,
            Holding {
                stage: pos.stage,
                period: pos.period,
                tokens: *tokens,
                price_paid: outcome.clearing_price,
                points_per_token: params.stage.points_per_token,
            },
        )?;
    }

    let record = PeriodRecord {
        position: pos,
        tokens_available: params.supply,
        floor_price: params.stage.floor_price,
        points_per_token: params.stage.points_per_token,
        clearing_price: outcome.clearing_price,
        allocations: outcome.allocations.clone(),
        winner: if params.stage.mechanism.is_single_winner() {
            outcome.allocations.first().map(|a| a.agent_id.clone())
        } else {
            None
        },
        rescinded: None,
        bids,
        mechanism: params.stage.mechanism,
    };

    // 6. Rescind offer: only for a lone allocation, only when the take-back
    //    window still fits the horizon. A failed decision keeps the tokens.
    if params.rescind_allowed && outcome.allocations.len() == 1 {
        let winner_id = outcome.allocations[0].agent_id.clone();
        if let Some(idx) = agents.iter().position(|a| a.agent_id() == winner_id) {
            match agents[idx].decide_rescind(&observations[idx], &record) {
                Ok(choice) if choice.rescind => {
                    store.apply_rescind(&winner_id, pos.stage, pos.period, pos.absolute)?;
                    debug!(agent_id = %winner_id, absolute = pos.absolute, "winner rescinded");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(agent_id = %winner_id, error = %e, "rescind decision failed; keeping tokens");
                }
            }
        }
    }

    // 7. Emit. The rescinded field stays unset either way; its public
    //    transition happens at revelation.
    debug!(
        stage = pos.stage,
        period = pos.period,
        absolute = pos.absolute,
        clearing_price = %outcome.clearing_price,
        allocations = outcome.allocations.len(),
        supply = %params.supply,
        "period cleared"
    );
    store.append_record(record);

    Ok(())
}
