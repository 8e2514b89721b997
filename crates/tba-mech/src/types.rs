use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tag identifying a clearing mechanism.
///
/// `SecondPrice` and `UniformPrice` are implemented. The remaining tags are
/// reserved: the registry enumerates them, but resolving one fails with
/// [`MechanismError::Unimplemented`](crate::MechanismError::Unimplemented)
/// and the availability probe returns `false`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanismKind {
    SecondPrice,
    UniformPrice,
    PayAsBid,
    DescendingClock,
    FirstPrice,
}

impl MechanismKind {
    /// Every known tag, implemented and reserved, in canonical order.
    pub const ALL: [MechanismKind; 5] = [
        MechanismKind::SecondPrice,
        MechanismKind::UniformPrice,
        MechanismKind::PayAsBid,
        MechanismKind::DescendingClock,
        MechanismKind::FirstPrice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MechanismKind::SecondPrice => "second_price",
            MechanismKind::UniformPrice => "uniform_price",
            MechanismKind::PayAsBid => "pay_as_bid",
            MechanismKind::DescendingClock => "descending_clock",
            MechanismKind::FirstPrice => "first_price",
        }
    }

    /// Whether this mechanism awards the full supply to a single winner.
    pub fn is_single_winner(self) -> bool {
        matches!(self, MechanismKind::SecondPrice)
    }
}

impl fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MechanismKind {
    type Err = MechanismError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MechanismKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| MechanismError::UnknownTag { tag: s.to_string() })
    }
}

/// An admitted bid as seen by a mechanism.
///
/// `price` is price per token. `cost` is the total-cost budget the bid
/// commits; under the full-batch interpretation the caller stamps
/// `cost = price * supply`, but the mechanism only ever reads the pair, so
/// heterogeneous costs work too. `seq` is the admission-order timestamp used
/// for FIFO tiebreaks; lower wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub agent_id: String,
    pub price: Decimal,
    pub cost: Decimal,
    pub seq: u64,
}

impl Bid {
    pub fn new(agent_id: impl Into<String>, price: Decimal, cost: Decimal, seq: u64) -> Self {
        debug_assert!(price > Decimal::ZERO, "Bid.price must be > 0");
        debug_assert!(cost >= Decimal::ZERO, "Bid.cost must be >= 0");
        Self {
            agent_id: agent_id.into(),
            price,
            cost,
            seq,
        }
    }

    /// Quantity of tokens this bid demands.
    pub fn quantity(&self) -> Decimal {
        self.cost / self.price
    }
}

/// One winner's share of a cleared period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub agent_id: String,
    pub tokens: Decimal,
    pub price_per_token: Decimal,
    pub total_paid: Decimal,
}

impl Allocation {
    pub fn new(agent_id: impl Into<String>, tokens: Decimal, price_per_token: Decimal) -> Self {
        debug_assert!(tokens >= Decimal::ZERO, "Allocation.tokens must be >= 0");
        Self {
            agent_id: agent_id.into(),
            tokens,
            price_per_token,
            total_paid: tokens * price_per_token,
        }
    }
}

/// The result of clearing one period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingOutcome {
    /// Price per token at which tokens changed hands. Equals the floor when
    /// no allocation occurred.
    pub clearing_price: Decimal,
    pub allocations: Vec<Allocation>,
    /// Sum of tokens across `allocations`.
    pub tokens_allocated: Decimal,
    /// Human-readable note about how the price was formed.
    pub detail: String,
}

impl ClearingOutcome {
    /// An outcome with no allocations at the floor price.
    pub fn empty(floor: Decimal, detail: impl Into<String>) -> Self {
        Self {
            clearing_price: floor,
            allocations: Vec::new(),
            tokens_allocated: Decimal::ZERO,
            detail: detail.into(),
        }
    }
}

/// A clearing mechanism: a pure, deterministic function of the admitted bid
/// set, the period supply, and the floor price.
///
/// Callers pre-filter bids to the floor and positivity; the mechanism must
/// not be handed bids below the floor. Tiebreaks must depend only on the
/// inputs (`seq` carries submission order).
pub trait Mechanism: Send + Sync {
    fn kind(&self) -> MechanismKind;

    fn clear(
        &self,
        bids: &[Bid],
        supply: Decimal,
        floor: Decimal,
    ) -> Result<ClearingOutcome, MechanismError>;
}

/// Mechanism and registry error variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MechanismError {
    /// The tag is recognized but reserved without an implementation.
    Unimplemented { kind: MechanismKind },
    /// The string does not name any known mechanism tag.
    UnknownTag { tag: String },
    /// A mechanism with this tag is already registered.
    DuplicateKind { kind: MechanismKind },
    /// Supply handed to a mechanism was negative.
    NegativeSupply { supply: Decimal },
    /// Floor handed to a mechanism was negative.
    NegativeFloor { floor: Decimal },
    /// A bid with non-positive price reached a mechanism (caller-side
    /// admission must prevent this).
    NonPositiveBidPrice { agent_id: String, price: Decimal },
}

impl fmt::Display for MechanismError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unimplemented { kind } => {
                write!(f, "mechanism '{kind}' is reserved but not implemented")
            }
            Self::UnknownTag { tag } => write!(f, "unknown mechanism tag '{tag}'"),
            Self::DuplicateKind { kind } => {
                write!(f, "mechanism '{kind}' is already registered")
            }
            Self::NegativeSupply { supply } => {
                write!(f, "mechanism input: supply must be >= 0, got {supply}")
            }
            Self::NegativeFloor { floor } => {
                write!(f, "mechanism input: floor must be >= 0, got {floor}")
            }
            Self::NonPositiveBidPrice { agent_id, price } => write!(
                f,
                "mechanism input: bid from '{agent_id}' has non-positive price {price}"
            ),
        }
    }
}

impl std::error::Error for MechanismError {}

/// Shared input validation for mechanism implementations.
pub(crate) fn check_inputs(supply: Decimal, floor: Decimal) -> Result<(), MechanismError> {
    if supply < Decimal::ZERO {
        return Err(MechanismError::NegativeSupply { supply });
    }
    if floor < Decimal::ZERO {
        return Err(MechanismError::NegativeFloor { floor });
    }
    Ok(())
}
