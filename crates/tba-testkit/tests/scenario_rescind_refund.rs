//! A winner who rescinds gets the exact payment back, holds nothing, and
//! stays invisible to everyone else for two periods: the record's flag
//! stays unset until the reveal period, and the returned tokens surface as
//! extra supply exactly two periods later.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tba_config::TournamentConfig;
use tba_engine::Tournament;
use tba_testkit::{IncrementBidder, Probe, RescindBidder};

#[test]
fn scenario_rescind_refund_and_delayed_revelation() {
    let config = TournamentConfig::test_defaults();

    let (x, x_log) = Probe::wrap(Box::new(RescindBidder::new("x", dec!(5))));
    let tournament = Tournament::new(
        config,
        vec![Box::new(x), Box::new(IncrementBidder::new("y", dec!(1)))],
    )
    .unwrap();
    let result = tournament.run().unwrap();

    let log = x_log.lock().unwrap();

    // Period 0: fresh state, base supply only.
    assert_eq!(log[0].tokens_available, dec!(100));
    assert_eq!(log[0].budget, dec!(10000));
    assert!(log[0].history.is_empty());

    // Period 1: x won period 0 at y's bid and rescinded. The refund is
    // already visible to x, the rescind is not visible in history, and the
    // private-info entry names the target two periods out.
    assert_eq!(log[1].budget, dec!(10000));
    assert_eq!(log[1].stage_tokens[0], Decimal::ZERO);
    assert_eq!(log[1].weighted_points, Decimal::ZERO);
    assert_eq!(log[1].history[0].winner.as_deref(), Some("x"));
    assert_eq!(log[1].history[0].clearing_price, dec!(11));
    assert_eq!(log[1].history[0].allocations[0].total_paid, dec!(1100));
    assert_eq!(log[1].history[0].rescinded, None);
    assert_eq!(log[1].private_info.len(), 1);
    assert_eq!(log[1].private_info[0].target_stage, 0);
    assert_eq!(log[1].private_info[0].target_period, 2);
    assert_eq!(log[1].private_info[0].tokens, dec!(100));
    assert_eq!(log[1].private_info[0].reveal_at, 2);

    // Period 2: revelation happened before this observation. The flag is
    // public, the period-0 entry is purged (only period 1's remains), and
    // the returned tokens are in the supply.
    assert_eq!(log[2].tokens_available, dec!(200));
    assert_eq!(log[2].history[0].rescinded, Some(true));
    assert_eq!(log[2].private_info.len(), 1);
    assert_eq!(log[2].private_info[0].reveal_at, 3);

    // Final log agrees.
    assert_eq!(result.periods[0].rescinded, Some(true));
    assert_eq!(result.periods[1].rescinded, Some(true));
    assert_eq!(result.periods[2].tokens_available, dec!(200));

    // x rescinded every stage-0 win, so it retains nothing there and its
    // budget identity holds: remaining + retained payments = starting.
    let x_summary = &result.summaries["x"];
    assert_eq!(result.leaderboard.iter().find(|e| e.agent_id == "x").unwrap().stage_tokens[0], Decimal::ZERO);
    let retained_paid: Decimal = result
        .periods
        .iter()
        .filter(|r| r.rescinded != Some(true))
        .flat_map(|r| r.allocations.iter())
        .filter(|a| a.agent_id == "x")
        .map(|a| a.total_paid)
        .sum();
    assert_eq!(x_summary.remaining_budget + retained_paid, dec!(10000));
}
