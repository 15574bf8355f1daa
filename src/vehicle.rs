//! Car kinematics. Cars only know how to move; sensing, judging and removal live elsewhere.

use crate::{
    constants::{RIDE_FRICTION, RIDE_MAX_VELOCITY, RIDE_THRUST, RIDE_TILT_SPEED},
    geometry::{project, Point},
    sprite::Sprite,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-car movement constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handling {
    pub max_velocity: f64,
    pub thrust: f64,
    pub friction: f64,
    pub tilt_speed: f64,
}

impl Default for Handling {
    fn default() -> Self {
        Self {
            max_velocity: RIDE_MAX_VELOCITY,
            thrust: RIDE_THRUST,
            friction: RIDE_FRICTION,
            tilt_speed: RIDE_TILT_SPEED,
        }
    }
}

/// The three controls a driver may engage in a tick. Any combination is allowed, opposing turns
/// cancel out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    pub accelerate: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl Decision {
    pub const COAST: Decision = Decision {
        accelerate: false,
        turn_left: false,
        turn_right: false,
    };

    pub const fn new(accelerate: bool, turn_left: bool, turn_right: bool) -> Self {
        Self {
            accelerate,
            turn_left,
            turn_right,
        }
    }

    /// Engage every control whose output is strictly above `threshold`
    pub fn from_outputs(outputs: [f64; 3], threshold: f64) -> Self {
        Self {
            accelerate: outputs[0] > threshold,
            turn_left: outputs[1] > threshold,
            turn_right: outputs[2] > threshold,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    /// Top-left of the unrotated sprite
    pub x: f64,
    pub y: f64,
    /// Degrees, 0 facing +x, counter-clockwise positive
    pub heading: f64,
    pub velocity: f64,
    pub score: u64,
    /// Last radar reading, one per probe angle
    pub distances: Vec<u32>,
    sprite: Arc<Sprite>,
    handling: Handling,
}

impl Vehicle {
    pub fn new(x: f64, y: f64, sprite: Arc<Sprite>, handling: Handling, probes: usize) -> Self {
        Self {
            x,
            y,
            heading: 0.,
            velocity: 0.,
            score: 0,
            distances: vec![0; probes],
            sprite,
            handling,
        }
    }

    #[inline]
    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    #[inline]
    pub fn handling(&self) -> &Handling {
        &self.handling
    }

    /// Centre of the sprite on the pixel grid, where the radar is mounted
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            self.x as i64 + self.sprite.width() as i64 / 2,
            self.y.round() as i64 + self.sprite.height() as i64 / 2,
        )
    }

    /// Lose velocity to drag, never dropping below rest
    pub fn slow_down(&mut self) {
        if self.velocity > 0. {
            self.velocity = (self.velocity - self.handling.friction).max(0.);
        } else if self.velocity < 0. {
            self.velocity = 0.;
        }
    }

    pub fn speed_up(&mut self) {
        if self.velocity < self.handling.max_velocity {
            self.velocity = (self.velocity + self.handling.thrust).min(self.handling.max_velocity);
        }
    }

    /// Wheels need motion to turn the car, so turning at rest does nothing
    pub fn turn_left(&mut self) {
        if self.velocity > 0. {
            self.heading += self.handling.tilt_speed;
        }
    }

    pub fn turn_right(&mut self) {
        if self.velocity > 0. {
            self.heading -= self.handling.tilt_speed;
        }
    }

    /// Engage the controls of `decision`
    pub fn steer(&mut self, decision: Decision) {
        if decision.accelerate {
            self.speed_up();
        }
        if decision.turn_left {
            self.turn_left();
        }
        if decision.turn_right {
            self.turn_right();
        }
    }

    /// Score the current velocity and move along the heading, dropping sub-pixel remainders
    fn travel(&mut self) {
        self.score += self.velocity.floor() as u64;
        (self.x, self.y) = project(self.x, self.y, self.velocity, self.heading);
    }

    /// Drag, then travel at whatever velocity remains
    pub fn coast(&mut self) {
        self.slow_down();
        self.travel();
    }

    /// One full tick: drag, controls, then travel
    pub fn step(&mut self, decision: Decision) {
        self.slow_down();
        self.steer(decision);
        self.travel();
    }
}
