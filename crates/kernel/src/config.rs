use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tuning for one arena run.
///
/// Every field has a default, so a partial JSON document only overrides what
/// it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Simulation ticks per second.
    pub tick_rate: f64,
    /// Seconds that must strictly elapse between two target spawns.
    pub spawn_interval: f64,
    /// Concurrent target cap.
    pub max_targets: usize,
    /// A fireball closer than this to a target destroys it.
    pub hit_radius: f32,
    /// Fireballs whose scale falls below this are discarded.
    pub min_visible_scale: f32,
    pub fireball_start_distance: f32,
    pub fireball_distance_step: f32,
    pub fireball_spin_step: f32,
    pub target_spin_step: f32,
    pub spawn_radius_min: f32,
    pub spawn_radius_max: f32,
    /// Seed for target placement.
    pub seed: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            spawn_interval: 1.0,
            max_targets: 16,
            hit_radius: 0.3,
            min_visible_scale: 0.1,
            fireball_start_distance: 1.5,
            fireball_distance_step: 0.07,
            fireball_spin_step: 0.07,
            target_spin_step: 0.002,
            spawn_radius_min: 2.0,
            spawn_radius_max: 10.0,
            seed: 42,
        }
    }
}

impl ArenaConfig {
    /// Default tuning with a different placement seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Length of one tick in seconds.
    pub fn tick_seconds(&self) -> f64 {
        1.0 / self.tick_rate
    }

    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(ConfigError::TickRate(self.tick_rate));
        }
        if self.max_targets == 0 {
            return Err(ConfigError::ZeroTargetCap);
        }
        let non_negative = [
            ("spawn_interval", self.spawn_interval as f32),
            ("hit_radius", self.hit_radius),
            ("min_visible_scale", self.min_visible_scale),
            ("fireball_start_distance", self.fireball_start_distance),
            ("fireball_distance_step", self.fireball_distance_step),
            ("fireball_spin_step", self.fireball_spin_step),
            ("target_spin_step", self.target_spin_step),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }
        let (min, max) = (self.spawn_radius_min, self.spawn_radius_max);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ConfigError::SpawnRadius { min, max });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ArenaConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_targets, 16);
        assert_eq!(cfg.hit_radius, 0.3);
        assert_eq!(cfg.min_visible_scale, 0.1);
    }

    #[test]
    fn tick_seconds_inverts_rate() {
        let cfg = ArenaConfig {
            tick_rate: 50.0,
            ..ArenaConfig::default()
        };
        assert!((cfg.tick_seconds() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn rejects_zero_tick_rate() {
        let cfg = ArenaConfig {
            tick_rate: 0.0,
            ..ArenaConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::TickRate(0.0)));
    }

    #[test]
    fn rejects_zero_cap() {
        let cfg = ArenaConfig {
            max_targets: 0,
            ..ArenaConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTargetCap));
    }

    #[test]
    fn rejects_negative_radius() {
        let cfg = ArenaConfig {
            hit_radius: -1.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Negative {
                field: "hit_radius",
                ..
            })
        ));
    }

    #[test]
    fn rejects_inverted_spawn_shell() {
        let cfg = ArenaConfig {
            spawn_radius_min: 5.0,
            spawn_radius_max: 3.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::SpawnRadius { .. })));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ArenaConfig::from_json(r#"{ "max_targets": 4, "seed": 9 }"#).unwrap();
        assert_eq!(cfg.max_targets, 4);
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.tick_rate, 60.0);
    }

    #[test]
    fn json_is_validated() {
        let err = ArenaConfig::from_json(r#"{ "tick_rate": -5.0 }"#).unwrap_err();
        assert_eq!(err, ConfigError::TickRate(-5.0));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ArenaConfig::from_json("{ max_targets: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn json_round_trip_of_defaults() {
        let text = serde_json::to_string(&ArenaConfig::default()).unwrap();
        assert_eq!(ArenaConfig::from_json(&text).unwrap(), ArenaConfig::default());
    }
}
