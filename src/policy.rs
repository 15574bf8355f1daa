//! Per-tick fitness adjustment and the decision of whether a car leaves the track.

use crate::{
    border::Border,
    collision::collides,
    constants::{
        RIDE_PENALTY, RIDE_REWARD_DIVISOR, RIDE_REWARD_MIN_VELOCITY, RIDE_SCORE_CAP,
        RIDE_STALL_GRACE, RIDE_STALL_VELOCITY,
    },
    vehicle::Vehicle,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Cars moving faster than this are rewarded
    pub reward_min_velocity: f64,
    pub reward_divisor: f64,
    /// Fitness lost to a crash or a stall
    pub penalty: f64,
    /// Ticks a car is allowed to dawdle before stalling counts
    pub stall_grace: u64,
    pub stall_velocity: f64,
    pub score_cap: u64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            reward_min_velocity: RIDE_REWARD_MIN_VELOCITY,
            reward_divisor: RIDE_REWARD_DIVISOR,
            penalty: RIDE_PENALTY,
            stall_grace: RIDE_STALL_GRACE,
            stall_velocity: RIDE_STALL_VELOCITY,
            score_cap: RIDE_SCORE_CAP,
        }
    }
}

/// What becomes of a car after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Keep,
    Crashed,
    Stalled,
    /// Hit the score cap. Leaves without penalty
    Retired,
}

impl Verdict {
    #[inline]
    pub fn is_culled(&self) -> bool {
        !matches!(self, Verdict::Keep)
    }
}

impl Policy {
    /// Adjust `fitness` for one tick and decide the car's fate. A reward earned this tick is kept
    /// even when the car is removed by it, and a car is removed for at most one reason.
    pub fn judge(&self, vehicle: &Vehicle, collided: bool, tick: u64, fitness: &mut f64) -> Verdict {
        if vehicle.velocity > self.reward_min_velocity {
            *fitness += (vehicle.velocity / self.reward_divisor).floor();
        }

        if collided {
            *fitness -= self.penalty;
            Verdict::Crashed
        } else if tick > self.stall_grace && vehicle.velocity <= self.stall_velocity {
            *fitness -= self.penalty;
            Verdict::Stalled
        } else if vehicle.score >= self.score_cap {
            Verdict::Retired
        } else {
            Verdict::Keep
        }
    }

    /// [Policy::judge] against a real collision test with `border`
    pub fn assess(&self, vehicle: &Vehicle, border: &Border, tick: u64, fitness: &mut f64) -> Verdict {
        self.judge(vehicle, collides(vehicle, border), tick, fitness)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_f64_approx, sprite::Sprite, vehicle::Handling};
    use std::sync::Arc;

    fn car(velocity: f64, score: u64) -> Vehicle {
        let mut v = Vehicle::new(0., 0., Arc::new(Sprite::solid(0, 4, 2)), Handling::default(), 3);
        v.velocity = velocity;
        v.score = score;
        v
    }

    #[test]
    fn test_reward_floor() {
        let policy = Policy::default();
        let mut fitness = 0.;
        assert_eq!(policy.judge(&car(4.99, 0), false, 1, &mut fitness), Verdict::Keep);
        assert_f64_approx!(fitness, 0.);
        assert_eq!(policy.judge(&car(5., 0), false, 1, &mut fitness), Verdict::Keep);
        assert_f64_approx!(fitness, 1.);
    }

    #[test]
    fn test_no_reward_when_slow() {
        let policy = Policy {
            reward_divisor: 0.25,
            ..Default::default()
        };
        let mut fitness = 0.;
        policy.judge(&car(0.5, 0), false, 1, &mut fitness);
        assert_f64_approx!(fitness, 0.);
        policy.judge(&car(0.75, 0), false, 1, &mut fitness);
        assert_f64_approx!(fitness, 3.);
    }

    #[test]
    fn test_crash_keeps_reward() {
        let policy = Policy::default();
        let mut fitness = 2.;
        assert_eq!(policy.judge(&car(5., 0), true, 1, &mut fitness), Verdict::Crashed);
        // +1 reward, -1 penalty
        assert_f64_approx!(fitness, 2.);
    }

    #[test]
    fn test_stall_after_grace() {
        let policy = Policy::default();
        let mut fitness = 0.;
        assert_eq!(policy.judge(&car(1., 0), false, 150, &mut fitness), Verdict::Keep);
        assert_eq!(policy.judge(&car(1.5, 0), false, 151, &mut fitness), Verdict::Keep);
        assert_eq!(policy.judge(&car(1., 0), false, 151, &mut fitness), Verdict::Stalled);
        assert_f64_approx!(fitness, -1.);
    }

    #[test]
    fn test_one_removal_per_tick() {
        let policy = Policy::default();
        let mut fitness = 0.;
        // crashed, stalled and capped all at once, penalised once
        let verdict = policy.judge(&car(0., 60_000), true, 500, &mut fitness);
        assert_eq!(verdict, Verdict::Crashed);
        assert_f64_approx!(fitness, -1.);
    }

    #[test]
    fn test_score_cap_retires_without_penalty() {
        let policy = Policy::default();
        let mut fitness = 10.;
        let verdict = policy.judge(&car(3., 50_000), false, 20, &mut fitness);
        assert_eq!(verdict, Verdict::Retired);
        assert!(verdict.is_culled());
        assert_f64_approx!(fitness, 10.);
        assert!(!Verdict::Keep.is_culled());
    }
}
