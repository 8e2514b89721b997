use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tba_mech::MechanismKind;

/// One contiguous block of periods with fixed auction parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Base token supply for the whole stage, split evenly across periods.
    pub base_supply: Decimal,
    /// Ranking-point multiplier applied to every token won in this stage.
    pub points_per_token: Decimal,
    /// Minimum admissible price per token; bids strictly below are dropped.
    pub floor_price: Decimal,
    /// Number of periods in the stage.
    pub periods: usize,
    /// Maximum bids admitted per agent per period (first N in offer order).
    pub max_bids_per_agent: usize,
    /// Which clearing mechanism the stage runs.
    pub mechanism: MechanismKind,
}

/// Stage-point awards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// SP by place: index 0 is 1st place. The stage ranking is truncated to
    /// this vector's length.
    pub sp_awards: Vec<u32>,
    /// SP awarded after the terminal stage to the agent with the strictly
    /// positive maximum weighted points.
    pub overall_bonus_sp: u32,
}

/// Immutable configuration for one tournament run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Budget each agent starts with; shared across stages, never reset.
    pub starting_budget: Decimal,
    pub stages: Vec<StageConfig>,
    pub scoring: ScoringConfig,
}

impl TournamentConfig {
    /// The canonical three-stage tournament used throughout the test suite:
    /// supplies 900/600/300 over 9 periods each, floors 10.00/10.50/11.03,
    /// multipliers 1.0/1.5/2.5, SP vector [3,2,1], overall bonus 1,
    /// starting budget 10 000.
    pub fn test_defaults() -> Self {
        // Decimal::new(mantissa, scale): 1050 at scale 2 is 10.50.
        let stage = |supply: i64, points: Decimal, floor: Decimal| StageConfig {
            base_supply: Decimal::from(supply),
            points_per_token: points,
            floor_price: floor,
            periods: 9,
            max_bids_per_agent: 1,
            mechanism: MechanismKind::SecondPrice,
        };
        Self {
            starting_budget: Decimal::from(10_000),
            stages: vec![
                stage(900, Decimal::new(10, 1), Decimal::new(1000, 2)),
                stage(600, Decimal::new(15, 1), Decimal::new(1050, 2)),
                stage(300, Decimal::new(25, 1), Decimal::new(1103, 2)),
            ],
            scoring: ScoringConfig {
                sp_awards: vec![3, 2, 1],
                overall_bonus_sp: 1,
            },
        }
    }

    /// Fatal-at-construction validation. A tournament must never be built
    /// from a config that fails this.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_budget <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveBudget {
                budget: self.starting_budget,
            });
        }
        if self.stages.is_empty() {
            return Err(ConfigError::NoStages);
        }
        for (stage, cfg) in self.stages.iter().enumerate() {
            if cfg.periods == 0 {
                return Err(ConfigError::NonPositivePeriods { stage });
            }
            if cfg.base_supply <= Decimal::ZERO {
                return Err(ConfigError::NonPositiveSupply {
                    stage,
                    supply: cfg.base_supply,
                });
            }
            if cfg.floor_price < Decimal::ZERO {
                return Err(ConfigError::NegativeFloor {
                    stage,
                    floor: cfg.floor_price,
                });
            }
            if cfg.points_per_token <= Decimal::ZERO {
                return Err(ConfigError::NonPositivePoints {
                    stage,
                    points: cfg.points_per_token,
                });
            }
            if cfg.max_bids_per_agent == 0 {
                return Err(ConfigError::ZeroMaxBids { stage });
            }
        }
        if self.scoring.sp_awards.is_empty() {
            return Err(ConfigError::EmptySpAwards);
        }
        Ok(())
    }

    /// Period counts per stage, in order.
    pub fn stage_lengths(&self) -> Vec<usize> {
        self.stages.iter().map(|s| s.periods).collect()
    }

    /// Total periods across all stages — the tournament horizon.
    pub fn total_periods(&self) -> usize {
        self.stages.iter().map(|s| s.periods).sum()
    }

    /// Decompose an absolute period into (stage, period-within-stage).
    /// `None` if the absolute period lies outside the horizon.
    pub fn position_of(&self, absolute: usize) -> Option<(usize, usize)> {
        let mut rest = absolute;
        for (stage, cfg) in self.stages.iter().enumerate() {
            if rest < cfg.periods {
                return Some((stage, rest));
            }
            rest -= cfg.periods;
        }
        None
    }
}

/// Configuration rejection reasons. All of these are fatal at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    NonPositiveBudget { budget: Decimal },
    NoStages,
    NonPositivePeriods { stage: usize },
    NonPositiveSupply { stage: usize, supply: Decimal },
    NegativeFloor { stage: usize, floor: Decimal },
    NonPositivePoints { stage: usize, points: Decimal },
    ZeroMaxBids { stage: usize },
    EmptySpAwards,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveBudget { budget } => {
                write!(f, "config: starting budget must be > 0, got {budget}")
            }
            Self::NoStages => write!(f, "config: at least one stage is required"),
            Self::NonPositivePeriods { stage } => {
                write!(f, "config: stage {stage} must have > 0 periods")
            }
            Self::NonPositiveSupply { stage, supply } => {
                write!(f, "config: stage {stage} base supply must be > 0, got {supply}")
            }
            Self::NegativeFloor { stage, floor } => {
                write!(f, "config: stage {stage} floor must be >= 0, got {floor}")
            }
            Self::NonPositivePoints { stage, points } => write!(
                f,
                "config: stage {stage} points-per-token must be > 0, got {points}"
            ),
            Self::ZeroMaxBids { stage } => {
                write!(f, "config: stage {stage} max bids per agent must be > 0")
            }
            Self::EmptySpAwards => write!(f, "config: SP award vector must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_validate() {
        TournamentConfig::test_defaults().validate().unwrap();
    }

    #[test]
    fn defaults_match_canonical_tournament() {
        let cfg = TournamentConfig::test_defaults();
        assert_eq!(cfg.starting_budget, dec!(10000));
        assert_eq!(cfg.stages.len(), 3);
        assert_eq!(cfg.stages[0].base_supply, dec!(900));
        assert_eq!(cfg.stages[2].floor_price, dec!(11.03));
        assert_eq!(cfg.stages[1].points_per_token, dec!(1.5));
        assert_eq!(cfg.scoring.sp_awards, vec![3, 2, 1]);
        assert_eq!(cfg.total_periods(), 27);
    }

    // --- validate ---

    #[test]
    fn zero_periods_rejected() {
        let mut cfg = TournamentConfig::test_defaults();
        cfg.stages[1].periods = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositivePeriods { stage: 1 }));
    }

    #[test]
    fn negative_floor_rejected() {
        let mut cfg = TournamentConfig::test_defaults();
        cfg.stages[0].floor_price = dec!(-1);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NegativeFloor { stage: 0, .. })
        ));
    }

    #[test]
    fn no_stages_rejected() {
        let mut cfg = TournamentConfig::test_defaults();
        cfg.stages.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::NoStages));
    }

    #[test]
    fn non_positive_budget_rejected() {
        let mut cfg = TournamentConfig::test_defaults();
        cfg.starting_budget = Decimal::ZERO;
        assert!(matches!(cfg.validate(), Err(ConfigError::NonPositiveBudget { .. })));
    }

    #[test]
    fn empty_sp_awards_rejected() {
        let mut cfg = TournamentConfig::test_defaults();
        cfg.scoring.sp_awards.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptySpAwards));
    }

    // --- geometry ---

    #[test]
    fn position_of_spans_stages() {
        let cfg = TournamentConfig::test_defaults();
        assert_eq!(cfg.position_of(0), Some((0, 0)));
        assert_eq!(cfg.position_of(8), Some((0, 8)));
        assert_eq!(cfg.position_of(9), Some((1, 0)));
        assert_eq!(cfg.position_of(10), Some((1, 1)));
        assert_eq!(cfg.position_of(26), Some((2, 8)));
        assert_eq!(cfg.position_of(27), None);
    }
}
