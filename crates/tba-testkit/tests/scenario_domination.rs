//! One agent outbids the other by a constant margin in every period of the
//! canonical three-stage tournament: it must win every period at the
//! rival's price, sweep every stage award, and take the overall bonus.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tba_config::TournamentConfig;
use tba_engine::Tournament;
use tba_testkit::IncrementBidder;

#[test]
fn scenario_domination_sweeps_all_stage_points() {
    let config = TournamentConfig {
        starting_budget: dec!(100000),
        ..TournamentConfig::test_defaults()
    };

    let tournament = Tournament::new(
        config,
        vec![
            Box::new(IncrementBidder::new("x", dec!(2))),
            Box::new(IncrementBidder::new("y", dec!(1))),
        ],
    )
    .unwrap();
    let result = tournament.run().unwrap();

    assert_eq!(result.periods.len(), 27);
    for record in &result.periods {
        // x wins every period, paying y's bid (floor + 1).
        assert_eq!(record.winner.as_deref(), Some("x"));
        assert_eq!(record.clearing_price, record.floor_price + dec!(1));
        assert_eq!(record.allocations.len(), 1);
        assert_eq!(record.allocations[0].agent_id, "x");
        assert_eq!(record.rescinded, None);
        assert_eq!(record.bids.len(), 2);
    }

    let x = &result.summaries["x"];
    assert_eq!(x.sp, 10); // 3 per stage + overall bonus
    assert_eq!(x.stage_tokens, vec![dec!(900), dec!(600), dec!(300)]);
    assert_eq!(x.weighted_points, dec!(2550));
    assert_eq!(x.spent, dec!(20409)); // 9900 + 6900 + 3609
    assert_eq!(x.remaining_budget, dec!(79591));
    assert_eq!(x.periods_won, 27);
    assert_eq!(x.rescinds_made, 0);

    let y = &result.summaries["y"];
    assert_eq!(y.sp, 0);
    assert_eq!(y.weighted_points, Decimal::ZERO);
    assert_eq!(y.spent, Decimal::ZERO);
    assert_eq!(y.periods_won, 0);

    assert_eq!(result.winner, "x");
    assert_eq!(result.leaderboard[0].agent_id, "x");
    assert_eq!(result.leaderboard[1].agent_id, "y");
}
