//! One generation of cars, driven tick by tick until none are left on the track.
//!
//! Each tick has two phases. First every live car moves, senses, decides and is judged on its
//! own, writing its verdict next to it; this is the part that may run in parallel. Then a
//! single-threaded commit moves culled cars out of the live set. A car, its network, its handle
//! and its fitness travel together as one [Entrant], so removal can never misalign them.

use crate::{
    network::Controller,
    observer::{BestCar, Directive, Frame, Observer},
    policy::Verdict,
    scenario::{RunState, Scenario},
    vehicle::{Decision, Vehicle},
    Result,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::trace;

#[derive(Debug)]
pub struct Entrant<N> {
    pub handle: usize,
    pub vehicle: Vehicle,
    pub network: N,
    pub fitness: f64,
    verdict: Verdict,
}

impl<N> Entrant<N> {
    pub fn new(handle: usize, vehicle: Vehicle, network: N) -> Self {
        Self {
            handle,
            vehicle,
            network,
            fitness: 0.,
            verdict: Verdict::Keep,
        }
    }
}

impl<N: Controller> Entrant<N> {
    /// Move, sense, decide and be judged, all against this car alone
    fn compute(&mut self, scenario: &Scenario, tick: u64) {
        let vehicle = &mut self.vehicle;
        vehicle.coast();
        scenario.radar().sense(vehicle, scenario.border());

        let inputs = vehicle.distances.iter().map(|&d| d as f64).collect::<Vec<_>>();
        let outputs = self.network.activate(&inputs);
        vehicle.steer(Decision::from_outputs(outputs, scenario.output_threshold()));

        self.verdict = scenario
            .policy()
            .assess(vehicle, scenario.border(), tick, &mut self.fitness);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Done,
}

/// How a generation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Every car left the track
    Done,
    /// The observer asked to stop the run
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub crashed: usize,
    pub stalled: usize,
    pub retired: usize,
    /// Removed by [Directive::CullAll]
    pub dismissed: usize,
}

impl Tally {
    fn count(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Keep => {}
            Verdict::Crashed => self.crashed += 1,
            Verdict::Stalled => self.stalled += 1,
            Verdict::Retired => self.retired += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub culled: usize,
    /// Highest score of any car this tick, counting cars culled in it
    pub top_score: u64,
}

#[derive(Debug)]
pub struct Generation<N> {
    live: Vec<Entrant<N>>,
    finished: Vec<(usize, f64)>,
    tick: u64,
    tally: Tally,
}

impl<N: Controller + Send> Generation<N> {
    pub fn new(entrants: Vec<Entrant<N>>) -> Self {
        Self {
            live: entrants,
            finished: vec![],
            tick: 0,
            tally: Tally::default(),
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        if self.live.is_empty() {
            Phase::Done
        } else {
            Phase::Running
        }
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn alive(&self) -> usize {
        self.live.len()
    }

    pub fn live(&self) -> &[Entrant<N>] {
        &self.live
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// Advance every live car by one tick, then commit the tick's removals
    pub fn tick(&mut self, scenario: &Scenario) -> TickReport {
        self.tick += 1;
        let tick = self.tick;

        #[cfg(feature = "parallel")]
        self.live
            .par_iter_mut()
            .for_each(|entrant| entrant.compute(scenario, tick));
        #[cfg(not(feature = "parallel"))]
        self.live
            .iter_mut()
            .for_each(|entrant| entrant.compute(scenario, tick));

        let top_score = self
            .live
            .iter()
            .map(|e| e.vehicle.score)
            .max()
            .unwrap_or(0);

        let before = self.live.len();
        let (live, culled): (Vec<_>, Vec<_>) = self
            .live
            .drain(..)
            .partition(|e| !e.verdict.is_culled());
        self.live = live;
        for entrant in culled {
            self.tally.count(entrant.verdict);
            self.finished.push((entrant.handle, entrant.fitness));
        }

        let culled = before - self.live.len();
        if culled > 0 {
            trace!(tick, culled, alive = self.live.len(), "cars removed");
        }
        TickReport { culled, top_score }
    }

    /// Penalise and remove every live car
    pub fn cull_all(&mut self, penalty: f64) {
        for entrant in self.live.drain(..) {
            self.tally.dismissed += 1;
            self.finished.push((entrant.handle, entrant.fitness - penalty));
        }
    }

    /// The live car with the highest score, first in live order on a tie
    pub fn best(&self) -> Option<BestCar> {
        let mut best: Option<&Vehicle> = None;
        for vehicle in self.live.iter().map(|e| &e.vehicle) {
            if best.map_or(true, |b| vehicle.score > b.score) {
                best = Some(vehicle);
            }
        }
        best.map(BestCar::of)
    }

    pub fn frame(&self, state: &RunState) -> Frame<'_> {
        Frame {
            tick: self.tick,
            generation: state.generation,
            alive: self.live.len(),
            max_score: state.max_score,
            best: self.best(),
            vehicles: self.live.iter().map(|e| &e.vehicle).collect(),
        }
    }

    /// Tick until every car is gone or the observer quits. The run's max score is kept current
    /// in `state` as cars score.
    pub fn run(
        &mut self,
        scenario: &Scenario,
        state: &mut RunState,
        observer: &mut impl Observer,
    ) -> Result<Flow> {
        while self.phase() == Phase::Running {
            let report = self.tick(scenario);
            state.max_score = state.max_score.max(report.top_score);

            match observer.frame(&self.frame(state))? {
                Directive::Continue => {}
                Directive::CullAll => self.cull_all(scenario.policy().penalty),
                Directive::Quit => return Ok(Flow::Quit),
            }
        }
        Ok(Flow::Done)
    }

    /// Final fitness of every handle, finished cars first in the order they left, then any
    /// still on the track
    pub fn into_fitness(self) -> Vec<(usize, f64)> {
        let mut fitness = self.finished;
        fitness.extend(self.live.into_iter().map(|e| (e.handle, e.fitness)));
        fitness
    }
}
