//! Uniform-price multi-winner clearing with pro-rata rationing.
//!
//! Each admitted bid carries a price per token and a total-cost budget; the
//! implied demand is `cost / price`. Bids sort price-descending with FIFO
//! tiebreak. Under-subscription fills everyone in full at the floor.
//! Otherwise the clearing price is the marginal bid's price — the first
//! point at which cumulative demand reaches the supply. Bids strictly above
//! the clearing price fill in full at the clearing price; bids exactly at
//! it share the residual pro-rata by demanded quantity.
//!
//! # Rounding policy
//!
//! Pro-rata shares round with banker's rounding
//! ([`RoundingStrategy::MidpointNearestEven`]) at [`FRACTIONAL_DIGITS`]
//! fractional digits. The last tied bid absorbs the rounding residue, so
//! the at-clearing shares always sum exactly to the residual supply. This
//! identity is load-bearing: settlement and the supply invariants assume
//! allocated tokens never exceed supply by even one ulp.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{check_inputs, Allocation, Bid, ClearingOutcome, Mechanism, MechanismError, MechanismKind};

/// Fractional digits used when rounding pro-rata token shares.
pub const FRACTIONAL_DIGITS: u32 = 8;

/// Round a token quantity to the pro-rata precision with banker's rounding.
pub fn round_tokens(x: Decimal) -> Decimal {
    x.round_dp_with_strategy(FRACTIONAL_DIGITS, RoundingStrategy::MidpointNearestEven)
}

pub struct UniformPrice;

impl Mechanism for UniformPrice {
    fn kind(&self) -> MechanismKind {
        MechanismKind::UniformPrice
    }

    fn clear(
        &self,
        bids: &[Bid],
        supply: Decimal,
        floor: Decimal,
    ) -> Result<ClearingOutcome, MechanismError> {
        check_inputs(supply, floor)?;

        if bids.is_empty() || supply == Decimal::ZERO {
            return Ok(ClearingOutcome::empty(floor, "no admitted bids or no supply"));
        }
        for b in bids {
            if b.price <= Decimal::ZERO {
                return Err(MechanismError::NonPositiveBidPrice {
                    agent_id: b.agent_id.clone(),
                    price: b.price,
                });
            }
        }

        // Price descending, submission order ascending on ties.
        let mut book: Vec<&Bid> = bids.iter().collect();
        book.sort_by(|a, b| b.price.cmp(&a.price).then(a.seq.cmp(&b.seq)));

        let total_demand: Decimal = book.iter().map(|b| b.quantity()).sum();

        if total_demand <= supply {
            // Under-subscription: everyone fills in full at the floor.
            let allocations: Vec<Allocation> = book
                .iter()
                .map(|b| Allocation::new(b.agent_id.clone(), b.quantity(), floor))
                .collect();
            let tokens_allocated = allocations.iter().map(|a| a.tokens).sum();
            return Ok(ClearingOutcome {
                clearing_price: floor,
                allocations,
                tokens_allocated,
                detail: "under-subscribed; all bids filled at the floor".to_string(),
            });
        }

        // Marginal bid: the first point where cumulative demand reaches supply.
        let mut cumulative = Decimal::ZERO;
        let mut clearing_price = floor;
        for b in &book {
            cumulative += b.quantity();
            if cumulative >= supply {
                clearing_price = b.price;
                break;
            }
        }

        // Above the clearing price: full fills at the clearing price.
        let mut allocations = Vec::new();
        let mut filled = Decimal::ZERO;
        for b in book.iter().filter(|b| b.price > clearing_price) {
            let alloc = Allocation::new(b.agent_id.clone(), b.quantity(), clearing_price);
            filled += alloc.tokens;
            allocations.push(alloc);
        }

        // At the clearing price: pro-rata over the residual, last tied bid
        // absorbs the rounding residue.
        let residual = supply - filled;
        let tied: Vec<&&Bid> = book.iter().filter(|b| b.price == clearing_price).collect();
        let tied_demand: Decimal = tied.iter().map(|b| b.quantity()).sum();

        let mut handed_out = Decimal::ZERO;
        for (i, b) in tied.iter().enumerate() {
            let tokens = if i + 1 == tied.len() {
                residual - handed_out
            } else {
                round_tokens(residual * b.quantity() / tied_demand)
            };
            handed_out += tokens;
            if tokens > Decimal::ZERO {
                allocations.push(Allocation::new(b.agent_id.clone(), tokens, clearing_price));
            }
        }

        let tokens_allocated = allocations.iter().map(|a| a.tokens).sum();
        Ok(ClearingOutcome {
            clearing_price,
            allocations,
            tokens_allocated,
            detail: format!("over-subscribed; marginal price {clearing_price}"),
        })
    }
}
