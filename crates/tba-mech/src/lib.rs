//! tba-mech
//!
//! Clearing mechanisms for sealed-bid token auctions:
//! - Mechanism contract: pure function of (admitted bids, supply, floor)
//! - Second-price single-winner (default; truthful bidding is dominant)
//! - Uniform-price multi-winner with pro-rata rationing at the margin
//! - Tag registry with factories and an availability probe
//! - Decimal clearing math; banker's rounding at 8 fractional digits

mod registry;
mod second_price;
mod types;
mod uniform_price;

pub use registry::{MechanismFactory, MechanismRegistry};
pub use second_price::SecondPrice;
pub use types::{Allocation, Bid, ClearingOutcome, Mechanism, MechanismError, MechanismKind};
pub use uniform_price::{round_tokens, UniformPrice, FRACTIONAL_DIGITS};
