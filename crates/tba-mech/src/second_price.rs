//! Second-price single-winner clearing.
//!
//! The period's entire supply goes to the highest bidder; the per-token
//! price is the second-highest admitted price. With a single admitted bid
//! the price is the floor, and with no admitted bids there is no allocation
//! and the reported clearing price is the floor. Tied top bids break by
//! earliest submission (`seq` ascending).
//!
//! Under this rule truthful bidding is the dominant strategy, which is why
//! it is the default: bidder authors can reason locally about their own
//! valuation without modeling opponents.

use rust_decimal::Decimal;

use crate::types::{check_inputs, Allocation, Bid, ClearingOutcome, Mechanism, MechanismError, MechanismKind};

pub struct SecondPrice;

impl Mechanism for SecondPrice {
    fn kind(&self) -> MechanismKind {
        MechanismKind::SecondPrice
    }

    fn clear(
        &self,
        bids: &[Bid],
        supply: Decimal,
        floor: Decimal,
    ) -> Result<ClearingOutcome, MechanismError> {
        check_inputs(supply, floor)?;

        let Some(winner) = best_bid(bids) else {
            return Ok(ClearingOutcome::empty(floor, "no admitted bids"));
        };

        // Second-highest admitted price across the remaining bids; floor if
        // the winner stood alone. Tied top bids land here as well, so the
        // winner pays the tied price.
        let runner_up = bids
            .iter()
            .filter(|b| !std::ptr::eq(*b, winner))
            .map(|b| b.price)
            .max();
        let payment = runner_up.unwrap_or(floor).max(floor);

        let allocation = Allocation::new(winner.agent_id.clone(), supply, payment);
        let tokens_allocated = allocation.tokens;

        Ok(ClearingOutcome {
            clearing_price: payment,
            allocations: vec![allocation],
            tokens_allocated,
            detail: match runner_up {
                Some(p) => format!("second-highest admitted price {p}"),
                None => "single admitted bid; price is the floor".to_string(),
            },
        })
    }
}

/// Highest price, earliest `seq` on ties.
fn best_bid(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().reduce(|best, b| {
        if b.price > best.price || (b.price == best.price && b.seq < best.seq) {
            b
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bid(agent: &str, price: Decimal, seq: u64) -> Bid {
        Bid::new(agent, price, price * dec!(100), seq)
    }

    // --- No / single bid ---

    #[test]
    fn no_bids_clears_at_floor_with_no_allocation() {
        let out = SecondPrice.clear(&[], dec!(100), dec!(10)).unwrap();
        assert_eq!(out.clearing_price, dec!(10));
        assert!(out.allocations.is_empty());
        assert_eq!(out.tokens_allocated, Decimal::ZERO);
    }

    #[test]
    fn single_bid_pays_floor() {
        let bids = vec![bid("a", dec!(15), 0)];
        let out = SecondPrice.clear(&bids, dec!(100), dec!(10)).unwrap();
        assert_eq!(out.clearing_price, dec!(10));
        assert_eq!(out.allocations.len(), 1);
        assert_eq!(out.allocations[0].agent_id, "a");
        assert_eq!(out.allocations[0].tokens, dec!(100));
        assert_eq!(out.allocations[0].total_paid, dec!(1000));
    }

    // --- Two or more bids ---

    #[test]
    fn winner_pays_second_highest_price() {
        let bids = vec![bid("a", dec!(15), 0), bid("b", dec!(12), 1)];
        let out = SecondPrice.clear(&bids, dec!(100), dec!(10)).unwrap();
        assert_eq!(out.clearing_price, dec!(12));
        assert_eq!(out.allocations[0].agent_id, "a");
        assert_eq!(out.allocations[0].total_paid, dec!(1200));
    }

    #[test]
    fn tied_top_bids_break_by_earliest_seq_and_pay_the_tied_price() {
        let bids = vec![bid("b", dec!(15), 1), bid("a", dec!(15), 0)];
        let out = SecondPrice.clear(&bids, dec!(100), dec!(10)).unwrap();
        assert_eq!(out.allocations[0].agent_id, "a");
        assert_eq!(out.clearing_price, dec!(15));
    }

    #[test]
    fn winner_chosen_by_price_not_order() {
        let bids = vec![bid("a", dec!(11), 0), bid("b", dec!(14), 1), bid("c", dec!(12), 2)];
        let out = SecondPrice.clear(&bids, dec!(100), dec!(10)).unwrap();
        assert_eq!(out.allocations[0].agent_id, "b");
        assert_eq!(out.clearing_price, dec!(12));
    }

    // --- Degenerate inputs ---

    #[test]
    fn zero_supply_allocates_zero_tokens() {
        let bids = vec![bid("a", dec!(15), 0), bid("b", dec!(12), 1)];
        let out = SecondPrice.clear(&bids, Decimal::ZERO, dec!(10)).unwrap();
        assert_eq!(out.allocations[0].tokens, Decimal::ZERO);
        assert_eq!(out.allocations[0].total_paid, Decimal::ZERO);
    }

    #[test]
    fn probe_shape_succeeds() {
        let out = SecondPrice.clear(&[], Decimal::ZERO, Decimal::ZERO).unwrap();
        assert!(out.allocations.is_empty());
    }

    #[test]
    fn negative_supply_rejected() {
        let err = SecondPrice.clear(&[], dec!(-1), Decimal::ZERO);
        assert!(matches!(err, Err(MechanismError::NegativeSupply { .. })));
    }
}
