//! tba-config
//!
//! Tournament configuration:
//! - Typed stage/scoring/tournament config with fatal-at-construction
//!   validation
//! - Layered YAML loading (later layers override via deep-merge)
//! - Canonical sorted-key JSON + SHA-256 config hash (the configuration
//!   echo carried in results)

mod load;
mod types;

pub use load::{hash_config, load_layered_yaml, load_layered_yaml_from_strings, LoadedTournamentConfig};
pub use types::{ConfigError, ScoringConfig, StageConfig, TournamentConfig};
