//! Layered YAML loading + canonical config hashing.
//!
//! Tournament configs are loaded from an ordered list of YAML layers
//! (defaults first, overrides after). Layers deep-merge — objects merge
//! recursively, arrays and scalars are replaced — then the merged value is
//! canonicalized to sorted-key compact JSON and hashed with SHA-256. The
//! hex hash travels into the tournament result as the configuration echo,
//! so two runs can be compared without shipping the whole config around.

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

use crate::types::TournamentConfig;

/// A parsed, validated config together with its canonical form and hash.
#[derive(Debug, Clone)]
pub struct LoadedTournamentConfig {
    pub config: TournamentConfig,
    pub canonical_json: String,
    pub config_hash: String,
}

/// Load + merge YAML files in order, canonicalize, hash, parse, validate.
/// Later files override earlier files via deep-merge.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedTournamentConfig> {
    let mut layers = Vec::with_capacity(paths.len());
    for p in paths {
        let s = fs::read_to_string(p).with_context(|| format!("read config: {p}"))?;
        layers.push(s);
    }
    let refs: Vec<&str> = layers.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&refs)
}

/// String-input variant for tests and embedded defaults.
pub fn load_layered_yaml_from_strings(yamls: &[&str]) -> Result<LoadedTournamentConfig> {
    let mut merged = Value::Object(Default::default());

    for (i, s) in yamls.iter().enumerate() {
        let yaml_val: serde_yaml::Value =
            serde_yaml::from_str(s).with_context(|| format!("parse yaml layer #{i}"))?;
        let json_val = serde_json::to_value(yaml_val).context("yaml->json conversion failed")?;
        deep_merge(&mut merged, json_val);
    }

    let canonical = canonicalize_json(&merged);

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let hash = hex::encode(hasher.finalize());

    let config: TournamentConfig =
        serde_json::from_value(merged).context("merged config does not match schema")?;
    config.validate()?;

    Ok(LoadedTournamentConfig {
        config,
        canonical_json: canonical,
        config_hash: hash,
    })
}

/// Compute the canonical hash of an in-memory config, for callers that
/// build configs in code rather than from YAML layers.
pub fn hash_config(config: &TournamentConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("config serialization failed")?;
    let canonical = canonicalize_json(&value);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Deep-merge: objects merge recursively; arrays replaced; scalars overwritten.
fn deep_merge(dst: &mut Value, src: Value) {
    match (dst, src) {
        (Value::Object(dst_map), Value::Object(src_map)) => {
            for (k, v) in src_map {
                match dst_map.get_mut(&k) {
                    Some(existing) => deep_merge(existing, v),
                    None => {
                        dst_map.insert(k, v);
                    }
                }
            }
        }
        (dst_slot, src_val) => {
            *dst_slot = src_val;
        }
    }
}

/// Canonicalize JSON by sorting all object keys recursively and emitting
/// compact JSON.
fn canonicalize_json(v: &Value) -> String {
    let sorted = sort_keys(v);
    serde_json::to_string(&sorted).expect("json serialization must not fail")
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tba_mech::MechanismKind;

    const BASE: &str = r#"
starting_budget: "10000"
stages:
  - base_supply: "900"
    points_per_token: "1.0"
    floor_price: "10.00"
    periods: 9
    max_bids_per_agent: 1
    mechanism: second_price
scoring:
  sp_awards: [3, 2, 1]
  overall_bonus_sp: 1
"#;

    #[test]
    fn single_layer_parses_and_validates() {
        let loaded = load_layered_yaml_from_strings(&[BASE]).unwrap();
        assert_eq!(loaded.config.starting_budget, dec!(10000));
        assert_eq!(loaded.config.stages.len(), 1);
        assert_eq!(loaded.config.stages[0].mechanism, MechanismKind::SecondPrice);
        assert_eq!(loaded.config_hash.len(), 64);
    }

    #[test]
    fn override_layer_replaces_scalars() {
        let over = r#"
starting_budget: "350"
"#;
        let loaded = load_layered_yaml_from_strings(&[BASE, over]).unwrap();
        assert_eq!(loaded.config.starting_budget, dec!(350));
        // stages untouched by the override layer
        assert_eq!(loaded.config.stages[0].base_supply, dec!(900));
    }

    #[test]
    fn hash_is_stable_across_key_order() {
        let reordered = r#"
scoring:
  overall_bonus_sp: 1
  sp_awards: [3, 2, 1]
stages:
  - points_per_token: "1.0"
    base_supply: "900"
    floor_price: "10.00"
    periods: 9
    max_bids_per_agent: 1
    mechanism: second_price
starting_budget: "10000"
"#;
        let a = load_layered_yaml_from_strings(&[BASE]).unwrap();
        let b = load_layered_yaml_from_strings(&[reordered]).unwrap();
        assert_eq!(a.config_hash, b.config_hash);
        assert_eq!(a.canonical_json, b.canonical_json);
    }

    #[test]
    fn invalid_merged_config_is_rejected() {
        let over = r#"
starting_budget: "0"
"#;
        let err = load_layered_yaml_from_strings(&[BASE, over]);
        assert!(err.is_err());
    }

    #[test]
    fn hash_config_matches_loaded_shape() {
        let loaded = load_layered_yaml_from_strings(&[BASE]).unwrap();
        // Hashing the typed config re-serializes it; the digest is stable
        // for the same typed value.
        let h1 = hash_config(&loaded.config).unwrap();
        let h2 = hash_config(&loaded.config).unwrap();
        assert_eq!(h1, h2);
    }
}
