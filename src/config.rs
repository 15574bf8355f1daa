//! Run configuration, read from a JSON document with one section per concern. Any field may be
//! left out, in which case it takes its `RIDE_` default from [crate::constants].

use crate::{
    bitmap::Rgba,
    constants::*,
    genome::Mutation,
    network::Activation,
    policy::Policy,
    vehicle::Handling,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub car: CarConfig,
    pub radar: RadarConfig,
    pub policy: Policy,
    pub track: TrackConfig,
    pub evolution: EvolutionConfig,
    pub record: RecordConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    pub max_speed: f64,
    pub thrust: f64,
    pub friction: f64,
    pub tilt_speed: f64,
    /// Spawn point as a fraction of the track size
    pub position: [f64; 2],
    pub size: [u32; 2],
    pub variants: usize,
    /// Sprite images, one per variant. When set, these replace `size` and `variants`
    pub sprites: Vec<PathBuf>,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            max_speed: RIDE_MAX_VELOCITY,
            thrust: RIDE_THRUST,
            friction: RIDE_FRICTION,
            tilt_speed: RIDE_TILT_SPEED,
            position: RIDE_SPAWN,
            size: RIDE_CAR_SIZE,
            variants: RIDE_CAR_VARIANTS,
            sprites: vec![],
        }
    }
}

impl CarConfig {
    pub fn handling(&self) -> Handling {
        Handling {
            max_velocity: self.max_speed,
            thrust: self.thrust,
            friction: self.friction,
            tilt_speed: self.tilt_speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub angles: Vec<f64>,
    pub max_len: u32,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            angles: RIDE_RADAR_ANGLES.to_vec(),
            max_len: RIDE_RADAR_MAX_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub size: [u32; 2],
    /// Border image. Without one, an oval ring of `thickness` is drawn to `size`
    pub image: Option<PathBuf>,
    pub position: [i64; 2],
    pub transparent_pixel: Rgba,
    pub thickness: u32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            size: RIDE_TRACK_SIZE,
            image: None,
            position: [0, 0],
            transparent_pixel: RIDE_TRANSPARENT_PIXEL.into(),
            thickness: RIDE_TRACK_THICKNESS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population: usize,
    pub generations: usize,
    /// Stop early once the best genome reaches this fitness
    pub fitness_threshold: Option<f64>,
    pub hidden_layers: Vec<usize>,
    pub activation: Activation,
    pub output_threshold: f64,
    pub mutation: Mutation,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population: RIDE_POPULATION,
            generations: RIDE_GENERATIONS,
            fitness_threshold: None,
            hidden_layers: RIDE_HIDDEN_LAYERS.to_vec(),
            activation: Activation::default(),
            output_threshold: RIDE_OUTPUT_THRESHOLD,
            mutation: Mutation::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    /// Run log to append to. No log is written without one
    pub path: Option<PathBuf>,
    /// Only runs whose max score beats this are logged
    pub min_score: Option<u64>,
}

impl Config {
    pub fn from_json(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(Error::Config(msg));

        if self.radar.angles.is_empty() {
            return bad("radar needs at least one probe angle".into());
        }
        if self.radar.max_len == 0 {
            return bad("radar max_len must be positive".into());
        }
        if self.car.max_speed.is_nan() || self.car.max_speed <= 0. {
            return bad(format!("max_speed must be positive, got {}", self.car.max_speed));
        }
        if self.car.thrust < 0. || self.car.friction < 0. {
            return bad("thrust and friction cannot be negative".into());
        }
        if self.car.sprites.is_empty() && self.car.size.contains(&0) {
            return bad(format!("car size {:?} has no area", self.car.size));
        }
        if self.track.image.is_none() && self.track.size.contains(&0) {
            return bad(format!("track size {:?} has no area", self.track.size));
        }
        if self.evolution.population == 0 {
            return bad("population must be at least 1".into());
        }
        if self.evolution.hidden_layers.contains(&0) {
            return bad(format!(
                "hidden layers {:?} contain an empty layer",
                self.evolution.hidden_layers
            ));
        }
        if self.policy.reward_divisor == 0. {
            return bad("reward_divisor cannot be zero".into());
        }
        let m = &self.evolution.mutation;
        if m.weight_min > m.weight_max {
            return bad(format!(
                "weight range [{}, {}] is empty",
                m.weight_min, m.weight_max
            ));
        }
        if m.perturb_power.is_nan() || m.perturb_power < 0. {
            return bad(format!("perturb_power must be non-negative, got {}", m.perturb_power));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_json(
            r#"{
                "car": {"max_speed": 8, "variants": 2},
                "radar": {"angles": [45, 0, -45]},
                "track": {"transparent_pixel": {"R": 0, "G": 0, "B": 0, "A": 0}},
                "evolution": {"population": 12, "seed": 3},
                "record": {"path": "results.txt", "min_score": 10000}
            }"#,
        )
        .unwrap();

        assert_eq!(config.car.max_speed, 8.);
        assert_eq!(config.car.thrust, RIDE_THRUST);
        assert_eq!(config.car.variants, 2);
        assert_eq!(config.radar.angles, vec![45., 0., -45.]);
        assert_eq!(config.radar.max_len, RIDE_RADAR_MAX_LEN);
        assert_eq!(config.track.transparent_pixel, Rgba::new(0, 0, 0, 0));
        assert_eq!(config.evolution.population, 12);
        assert_eq!(config.evolution.seed, Some(3));
        assert_eq!(config.record.min_score, Some(10000));
        assert_eq!(config.policy, Policy::default());
    }

    #[test]
    fn test_handling_from_car() {
        let config = CarConfig {
            max_speed: 4.,
            thrust: 0.5,
            ..Default::default()
        };
        let handling = config.handling();
        assert_eq!(handling.max_velocity, 4.);
        assert_eq!(handling.thrust, 0.5);
        assert_eq!(handling.friction, RIDE_FRICTION);
    }

    #[test]
    fn test_rejects_bad_values() {
        for doc in [
            r#"{"radar": {"angles": []}}"#,
            r#"{"radar": {"max_len": 0}}"#,
            r#"{"car": {"max_speed": 0}}"#,
            r#"{"car": {"friction": -1}}"#,
            r#"{"car": {"size": [0, 4]}}"#,
            r#"{"evolution": {"population": 0}}"#,
            r#"{"evolution": {"hidden_layers": [4, 0]}}"#,
            r#"{"evolution": {"mutation": {"weight_min": 2, "weight_max": 1}}}"#,
            r#"{"policy": {"reward_divisor": 0}}"#,
        ] {
            assert!(
                matches!(Config::from_json(doc), Err(Error::Config(_))),
                "accepted {doc}"
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Config::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = Config::default();
        config.evolution.fitness_threshold = Some(40.);
        config.record.path = Some("log.txt".into());
        assert_eq!(Config::from_json(&config.to_json().unwrap()).unwrap(), config);
    }
}
