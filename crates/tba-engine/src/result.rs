//! Result assembly — the final leaderboard and per-agent summaries.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use tba_config::TournamentConfig;
use tba_state::{AgentRuntime, TournamentStore};

use crate::types::{AgentSummary, LeaderboardEntry, TournamentResult};

pub(crate) fn assemble_result(
    config: TournamentConfig,
    config_hash: Option<String>,
    store: &TournamentStore,
) -> TournamentResult {
    let mut leaderboard: Vec<LeaderboardEntry> = store
        .agents()
        .map(|a| LeaderboardEntry {
            agent_id: a.agent_id.clone(),
            stage_tokens: a.stage_tokens.clone(),
            weighted_points: a.weighted_points,
            sp: a.sp,
        })
        .collect();
    leaderboard.sort_by(|a, b| {
        b.sp.cmp(&a.sp)
            .then(b.weighted_points.cmp(&a.weighted_points))
            .then(a.agent_id.cmp(&b.agent_id))
    });

    let winner = leaderboard
        .first()
        .map(|e| e.agent_id.clone())
        .unwrap_or_default();

    let summaries: BTreeMap<String, AgentSummary> = store
        .agents()
        .map(|a| (a.agent_id.clone(), summarize(a, store)))
        .collect();

    TournamentResult {
        config,
        config_hash,
        leaderboard,
        winner,
        periods: store.records().to_vec(),
        summaries,
    }
}

fn summarize(agent: &AgentRuntime, store: &TournamentStore) -> AgentSummary {
    let spent = store.starting_budget() - agent.budget;

    let mut periods_won = 0;
    let mut rescinds_made = 0;
    let mut tokens_bought = Decimal::ZERO;
    let mut cash_paid = Decimal::ZERO;

    for r in store.records() {
        let rescinded = r.rescinded == Some(true);

        if r.winner.as_deref() == Some(agent.agent_id.as_str()) && !rescinded {
            periods_won += 1;
        }
        // A rescinded record always carries exactly one allocation — the
        // rescinding winner's.
        if rescinded
            && r.allocations.len() == 1
            && r.allocations[0].agent_id == agent.agent_id
        {
            rescinds_made += 1;
            continue;
        }
        for alloc in r.allocations.iter().filter(|a| a.agent_id == agent.agent_id) {
            tokens_bought += alloc.tokens;
            cash_paid += alloc.total_paid;
        }
    }

    let mean_price = if tokens_bought > Decimal::ZERO {
        cash_paid / tokens_bought
    } else {
        Decimal::ZERO
    };
    let points_per_spent = if spent > Decimal::ZERO {
        agent.weighted_points / spent
    } else {
        Decimal::ZERO
    };

    AgentSummary {
        sp: agent.sp,
        weighted_points: agent.weighted_points,
        stage_tokens: agent.stage_tokens.clone(),
        spent,
        remaining_budget: agent.budget,
        periods_won,
        rescinds_made,
        mean_price,
        points_per_spent,
    }
}
