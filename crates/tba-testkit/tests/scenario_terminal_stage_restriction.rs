//! In the last two periods of the terminal stage the take-back window
//! would fall outside the horizon: the winner keeps tokens unconditionally
//! and those records' flags stay unset forever.

use rust_decimal_macros::dec;
use tba_engine::Tournament;
use tba_mech::MechanismKind;
use tba_testkit::{single_stage_config, IncrementBidder, RescindBidder};

#[test]
fn scenario_terminal_periods_never_rescind() {
    // Four periods, 10 tokens each. x rescinds whenever it is asked.
    let config = single_stage_config(
        dec!(10000),
        dec!(40),
        dec!(10),
        4,
        MechanismKind::SecondPrice,
    );

    let tournament = Tournament::new(
        config,
        vec![
            Box::new(RescindBidder::new("x", dec!(5))),
            Box::new(IncrementBidder::new("y", dec!(1))),
        ],
    )
    .unwrap();
    let result = tournament.run().unwrap();

    // Periods 0 and 1 rescind and reveal on schedule; their tokens come
    // back as supply in periods 2 and 3.
    assert_eq!(result.periods[0].rescinded, Some(true));
    assert_eq!(result.periods[1].rescinded, Some(true));
    assert_eq!(result.periods[2].tokens_available, dec!(20));
    assert_eq!(result.periods[3].tokens_available, dec!(20));

    // Periods 2 and 3 sit in the restricted window: x wins and keeps, and
    // the flags stay unset even though x would have rescinded.
    assert_eq!(result.periods[2].winner.as_deref(), Some("x"));
    assert_eq!(result.periods[2].rescinded, None);
    assert_eq!(result.periods[3].rescinded, None);

    let x = &result.summaries["x"];
    assert_eq!(x.rescinds_made, 2);
    assert_eq!(x.periods_won, 2);
    assert_eq!(x.stage_tokens, vec![dec!(40)]);
    assert_eq!(x.weighted_points, dec!(40));
    // two kept wins of 20 tokens at y's bid of 11
    assert_eq!(x.remaining_budget, dec!(10000) - dec!(440));
    assert_eq!(x.sp, 4); // stage first place + overall bonus
}
