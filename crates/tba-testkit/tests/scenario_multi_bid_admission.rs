//! With a multi-bid cap, admission charges each admitted offer against a
//! running balance, and a winner of several bids in one period settles as
//! a single combined holding — never a second deduction from an
//! already-reduced budget.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tba_config::{ScoringConfig, StageConfig, TournamentConfig};
use tba_engine::Tournament;
use tba_mech::MechanismKind;
use tba_testkit::ScriptedBidder;

fn uniform_two_bid_config(starting_budget: Decimal) -> TournamentConfig {
    TournamentConfig {
        starting_budget,
        stages: vec![StageConfig {
            base_supply: dec!(100),
            points_per_token: Decimal::ONE,
            floor_price: dec!(8),
            periods: 1,
            max_bids_per_agent: 2,
            mechanism: MechanismKind::UniformPrice,
        }],
        scoring: ScoringConfig {
            sp_awards: vec![3, 2, 1],
            overall_bonus_sp: 1,
        },
    }
}

#[test]
fn second_offer_is_dropped_when_the_first_commits_the_budget() {
    // Each offer alone fits the 1500 budget, but not both: 1200 + 1100
    // would overcommit, so only the first is admitted.
    let tournament = Tournament::new(
        uniform_two_bid_config(dec!(1500)),
        vec![
            Box::new(ScriptedBidder::new("a", vec![vec![dec!(12), dec!(11)]])),
            Box::new(ScriptedBidder::new("b", vec![vec![dec!(10)]])),
        ],
    )
    .unwrap();
    let result = tournament.run().unwrap();

    let record = &result.periods[0];
    assert_eq!(record.bids.len(), 2);
    assert_eq!(record.bids[0].agent_id, "a");
    assert_eq!(record.bids[0].price, dec!(12));
    assert_eq!(record.bids[1].agent_id, "b");

    // a's lone admitted bid covers the whole supply at the margin.
    assert_eq!(record.clearing_price, dec!(12));
    assert_eq!(record.allocations.len(), 1);
    assert_eq!(record.allocations[0].agent_id, "a");
    assert_eq!(record.allocations[0].tokens, dec!(100));

    assert_eq!(result.summaries["a"].remaining_budget, dec!(300));
    assert_eq!(result.summaries["b"].spent, Decimal::ZERO);
}

#[test]
fn multi_bid_winner_settles_one_combined_holding() {
    // Both of a's offers are affordable together; both tie at the margin
    // and split the supply, but settlement merges them into one fill.
    let tournament = Tournament::new(
        uniform_two_bid_config(dec!(10000)),
        vec![
            Box::new(ScriptedBidder::new("a", vec![vec![dec!(12), dec!(12)]])),
            Box::new(ScriptedBidder::new("b", vec![vec![dec!(9)]])),
        ],
    )
    .unwrap();
    let result = tournament.run().unwrap();

    let record = &result.periods[0];
    assert_eq!(record.clearing_price, dec!(12));
    assert_eq!(record.allocations.len(), 2);
    assert!(record.allocations.iter().all(|al| al.agent_id == "a"));
    assert_eq!(record.allocations[0].tokens, dec!(50));
    assert_eq!(record.allocations[1].tokens, dec!(50));

    // One deduction for the combined fill, counters counted once.
    let a = &result.summaries["a"];
    assert_eq!(a.spent, dec!(1200));
    assert_eq!(a.remaining_budget, dec!(8800));
    assert_eq!(a.stage_tokens, vec![dec!(100)]);
    assert_eq!(a.weighted_points, dec!(100));
    assert_eq!(result.summaries["b"].spent, Decimal::ZERO);
}
