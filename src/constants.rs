//! Centralized defaults for the driving simulation.
//!
//! Every value here is the default of some field in [crate::config::Config], all prefixed with
//! `RIDE_`. Prototype tracks disagreed on most of these, so none of them are load-bearing.

// ============================================================================
// Car Parameters
// ============================================================================

/// Upper bound on car velocity, in pixels per tick
pub const RIDE_MAX_VELOCITY: f64 = 5.0;

/// Velocity gained per tick while accelerating
pub const RIDE_THRUST: f64 = 0.15;

/// Velocity lost per tick to drag
pub const RIDE_FRICTION: f64 = 0.05;

/// Degrees of heading change per tick while turning
pub const RIDE_TILT_SPEED: f64 = 5.0;

/// Spawn point as a fraction of the track size
pub const RIDE_SPAWN: [f64; 2] = [0.5, 0.1];

/// Width and height of the car sprite, in pixels
pub const RIDE_CAR_SIZE: [u32; 2] = [22, 12];

/// Number of visual car variants to sample from
pub const RIDE_CAR_VARIANTS: usize = 5;

// ============================================================================
// Radar Parameters
// ============================================================================

/// Probe angles, relative to heading, in degrees
pub const RIDE_RADAR_ANGLES: [f64; 9] = [90., 67.5, 45., 22.5, 0., -22.5, -45., -67.5, -90.];

/// Longest distance a probe reports
pub const RIDE_RADAR_MAX_LEN: u32 = 200;

/// Size of the generated oval track, when no border image is configured
pub const RIDE_TRACK_SIZE: [u32; 2] = [800, 600];

/// Width of the generated oval track's driving lane
pub const RIDE_TRACK_THICKNESS: u32 = 110;

/// The pixel value of open track in the border bitmap
pub const RIDE_TRANSPARENT_PIXEL: [u8; 4] = [255, 255, 255, 0];

// ============================================================================
// Fitness Policy Parameters
// ============================================================================

/// Velocity above which a car is rewarded for moving
pub const RIDE_REWARD_MIN_VELOCITY: f64 = 0.5;

/// Fitness reward per tick is floor(velocity / divisor)
pub const RIDE_REWARD_DIVISOR: f64 = 5.0;

/// Fitness lost on collision or stall
pub const RIDE_PENALTY: f64 = 1.0;

/// Ticks before a slow car is considered stalled
pub const RIDE_STALL_GRACE: u64 = 150;

/// Velocity at or below which a car is stalled
pub const RIDE_STALL_VELOCITY: f64 = 1.0;

/// Score at which a car retires
pub const RIDE_SCORE_CAP: u64 = 50_000;

// ============================================================================
// Evolution Parameters
// ============================================================================

/// Genomes per generation
pub const RIDE_POPULATION: usize = 30;

/// Generations per run
pub const RIDE_GENERATIONS: usize = 100;

/// Hidden layer sizes of the built-in controller
pub const RIDE_HIDDEN_LAYERS: [usize; 1] = [6];

/// Probability of touching each weight during mutation
pub const RIDE_MUTATE_WEIGHT_PROB: f64 = 0.8;

/// Probability of replacing a touched weight instead of perturbing it
pub const RIDE_REPLACE_WEIGHT_PROB: f64 = 0.1;

/// Standard deviation of a weight perturbation
pub const RIDE_PERTURB_POWER: f64 = 0.5;

/// Lower bound of a fresh or replaced weight
pub const RIDE_WEIGHT_MIN: f64 = -3.0;

/// Upper bound of a fresh or replaced weight
pub const RIDE_WEIGHT_MAX: f64 = 3.0;

/// Probability of inheriting a gene from the less fit parent in crossover
pub const RIDE_CROSSOVER_PICK_LESS_FIT_PROB: f64 = 0.3;

/// Ratio of offspring from mutation without crossover (1/4 = 0.25)
pub const RIDE_REPRODUCTION_COPY_RATIO: usize = 4;

/// Controller output above which a control is engaged
pub const RIDE_OUTPUT_THRESHOLD: f64 = 0.5;
