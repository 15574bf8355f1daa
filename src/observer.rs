//! The seam a renderer or any other onlooker plugs into. Observers get read-only views of the
//! simulation once per tick and once per generation, and can steer the run with a [Directive].

use crate::{scenario::RunState, vehicle::Vehicle, Result};

/// What the run should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Directive {
    #[default]
    Continue,
    /// End the generation now. Every live car is penalised and removed
    CullAll,
    /// Stop the whole run. The run is still recorded
    Quit,
}

/// Summary of the live car with the highest score. Ties go to the first in live order
#[derive(Debug, Clone, PartialEq)]
pub struct BestCar {
    pub score: u64,
    pub variant: usize,
    pub velocity: f64,
    pub distances: Vec<u32>,
}

impl BestCar {
    pub fn of(vehicle: &Vehicle) -> Self {
        Self {
            score: vehicle.score,
            variant: vehicle.sprite().variant(),
            velocity: vehicle.velocity,
            distances: vehicle.distances.clone(),
        }
    }
}

/// Everything there is to see after a tick's removals are committed
#[derive(Debug)]
pub struct Frame<'a> {
    pub tick: u64,
    pub generation: usize,
    pub alive: usize,
    pub max_score: u64,
    pub best: Option<BestCar>,
    pub vehicles: Vec<&'a Vehicle>,
}

pub trait Observer {
    fn frame(&mut self, _frame: &Frame) -> Result<Directive> {
        Ok(Directive::Continue)
    }

    fn generation_done(&mut self, _state: &RunState) {}
}

/// Headless: watch nothing, never interrupt
impl Observer for () {}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn frame(&mut self, frame: &Frame) -> Result<Directive> {
        (**self).frame(frame)
    }

    fn generation_done(&mut self, state: &RunState) {
        (**self).generation_done(state)
    }
}
