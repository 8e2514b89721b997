//! Observation construction — one consistent snapshot per agent per period.
//!
//! Built after revelation and before any bid is collected, so every agent
//! in a period sees the same post-revelation history and nobody sees a
//! same-period rival bid. Everything is cloned out of the store; the
//! resulting value is the agent's to keep.

use tba_agent::{LeaderboardRow, Observation};
use tba_state::{StoreError, TournamentStore};

use crate::period::PeriodParams;

pub(crate) fn build_observation(
    store: &TournamentStore,
    agent_id: &str,
    params: &PeriodParams<'_>,
) -> Result<Observation, StoreError> {
    let me = store.agent(agent_id).ok_or_else(|| StoreError::UnknownAgent {
        agent_id: agent_id.to_string(),
    })?;

    let leaderboard = store
        .agents()
        .map(|a| LeaderboardRow {
            agent_id: a.agent_id.clone(),
            stage_tokens: a.stage_tokens.clone(),
            weighted_points: a.weighted_points,
            sp: a.sp,
        })
        .collect();

    Ok(Observation {
        stage: params.position.stage,
        period_in_stage: params.position.period,
        absolute_period: params.position.absolute,
        periods_remaining_in_stage: params.stage.periods - params.position.period - 1,
        stages_remaining: params.stage_count - params.position.stage - 1,

        budget: me.budget,
        holdings: me.holdings.clone(),
        weighted_points: me.weighted_points,
        stage_tokens: me.stage_tokens.clone(),
        sp: me.sp,
        private_info: me.private_info.clone(),

        tokens_available: params.supply,
        floor_price: params.stage.floor_price,
        points_per_token: params.stage.points_per_token,

        history: store.records().to_vec(),
        leaderboard,
    })
}
