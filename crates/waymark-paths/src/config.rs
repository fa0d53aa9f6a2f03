//! Startup configuration.

use std::fmt;

use serde::{Deserialize, Serialize};
use waymark_core::RegionId;

use crate::traits::SearchOptions;

/// Options for [`PathOrchestrator`](crate::PathOrchestrator).
///
/// Every field has a default, so a partial document deserializes:
///
/// ```
/// # use waymark_paths::Config;
/// let cfg: Config = serde_json::from_str(r#"{"blocked_regions": ["W3N3"]}"#).unwrap();
/// assert_eq!(cfg.cross_region_validity, 40_000);
/// assert_eq!(cfg.blocked_regions.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Regions that are never routed through.
    pub blocked_regions: Vec<RegionId>,
    /// Ticks a cost-matrix snapshot stays fresh.
    pub cost_matrix_validity: u32,
    /// Ticks a same-region path stays cached.
    pub same_region_validity: u32,
    /// Ticks a cross-region path stays cached.
    pub cross_region_validity: u32,
    /// Hop distance above which macro routes prefer highways.
    pub highway_threshold: u32,
    /// Cost every matrix tile starts with.
    pub default_cost: u8,
    /// Cost written for paved tiles.
    pub paved_cost: u8,
    /// Tile-search parameters.
    pub search: SearchTuning,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blocked_regions: Vec::new(),
            cost_matrix_validity: 10_000,
            same_region_validity: 5_000,
            cross_region_validity: 40_000,
            highway_threshold: 4,
            default_cost: 0,
            paved_cost: 1,
            search: SearchTuning::default(),
        }
    }
}

/// Tile-search parameters shared by every request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchTuning {
    pub plain_cost: u8,
    pub swamp_cost: u8,
    pub heuristic_weight: f32,
    /// Operation budget per search.
    pub max_ops: u32,
    /// Region cap for searches not confined to a corridor.
    pub max_regions: u32,
    /// How close to the destination a path must end.
    pub goal_range: u32,
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            plain_cost: 2,
            swamp_cost: 10,
            heuristic_weight: 1.5,
            max_ops: 4_000,
            max_regions: 16,
            goal_range: 1,
        }
    }
}

impl Config {
    /// Set the block-list (builder).
    pub fn with_blocked_regions(mut self, regions: impl IntoIterator<Item = RegionId>) -> Self {
        self.blocked_regions = regions.into_iter().collect();
        self
    }

    /// Set the three validity windows (builder).
    pub fn with_validity(mut self, cost_matrix: u32, same_region: u32, cross_region: u32) -> Self {
        self.cost_matrix_validity = cost_matrix;
        self.same_region_validity = same_region;
        self.cross_region_validity = cross_region;
        self
    }

    /// Set the tile-search parameters (builder).
    pub fn with_search(mut self, search: SearchTuning) -> Self {
        self.search = search;
        self
    }

    /// Check the values make sense together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [
            ("cost_matrix_validity", self.cost_matrix_validity),
            ("same_region_validity", self.same_region_validity),
            ("cross_region_validity", self.cross_region_validity),
        ] {
            if v == 0 {
                return Err(ConfigError::ZeroValidity(name));
            }
        }
        if !(self.search.heuristic_weight >= 1.0) {
            return Err(ConfigError::HeuristicWeight(self.search.heuristic_weight));
        }
        if self.search.max_ops == 0 || self.search.max_regions == 0 {
            return Err(ConfigError::EmptyBudget);
        }
        Ok(())
    }

    /// Search options for a search allowed to enter `max_regions` regions.
    pub fn search_options(&self, max_regions: u32) -> SearchOptions {
        SearchOptions {
            plain_cost: self.search.plain_cost,
            swamp_cost: self.search.swamp_cost,
            heuristic_weight: self.search.heuristic_weight,
            max_regions,
            max_ops: self.search.max_ops,
        }
    }
}

/// Errors reported by [`Config::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A validity window is zero ticks long.
    ZeroValidity(&'static str),
    /// The heuristic weight is below 1 (or not a number).
    HeuristicWeight(f32),
    /// The search has no operations or regions to spend.
    EmptyBudget,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroValidity(name) => write!(f, "{name} must be at least one tick"),
            Self::HeuristicWeight(w) => write!(f, "heuristic weight {w} must be >= 1"),
            Self::EmptyBudget => f.write_str("search budget must allow at least one operation and one region"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.cost_matrix_validity, 10_000);
        assert_eq!(cfg.same_region_validity, 5_000);
        assert_eq!(cfg.search.max_ops, 4_000);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = Config::default().with_validity(0, 1, 1);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroValidity("cost_matrix_validity")));

        let mut cfg = Config::default();
        cfg.search.heuristic_weight = 0.5;
        assert!(matches!(cfg.validate(), Err(ConfigError::HeuristicWeight(_))));
        cfg.search.heuristic_weight = f32::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::HeuristicWeight(_))));

        let cfg = Config::default().with_search(SearchTuning {
            max_ops: 0,
            ..SearchTuning::default()
        });
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyBudget));
    }

    #[test]
    fn search_options_carry_tuning() {
        let opts = Config::default().search_options(3);
        assert_eq!(opts.max_regions, 3);
        assert_eq!(opts.plain_cost, 2);
        assert_eq!(opts.swamp_cost, 10);
        assert_eq!(opts.max_ops, 4_000);
    }

    #[test]
    fn deserialize_partial() {
        let cfg: Config =
            serde_json::from_str(r#"{"same_region_validity": 12, "search": {"max_ops": 99}}"#)
                .unwrap();
        assert_eq!(cfg.same_region_validity, 12);
        assert_eq!(cfg.search.max_ops, 99);
        assert_eq!(cfg.search.plain_cost, 2);
        assert!(cfg.blocked_regions.is_empty());
    }

    #[test]
    fn malformed_blocked_region_fails() {
        assert!(serde_json::from_str::<Config>(r#"{"blocked_regions": ["nowhere"]}"#).is_err());
    }
}
