use crate::{
    bitmap::{Bitmap, Rgba},
    border::Border,
    config::{Config, EvolutionConfig, RecordConfig},
    evolve::Evolver,
    generation::{Entrant, Flow, Generation},
    genome::ACTIONS,
    geometry::Point,
    network::Controller,
    observer::Observer,
    policy::Policy,
    radar::Radar,
    random::seeded_rng,
    record::RunRecord,
    sprite::{car_set, Sprite},
    vehicle::{Handling, Vehicle},
    Error, Result,
};
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::{info, warn};

/// Statistics carried from generation to generation, and reported at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    /// Completed generations
    pub generation: usize,
    /// Highest score any car reached in the run
    pub max_score: u64,
    pub pop_size: usize,
}

/// How a run went
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub state: RunState,
    pub record: RunRecord,
    /// Best fitness the evolver has seen
    pub best_fitness: Option<f64>,
    /// The observer quit before the run finished
    pub interrupted: bool,
}

/// The fixed world a run takes place in: the track, the cars that may be put on it, and the
/// rules they are judged by. Shared read-only by every car of every generation.
#[derive(Debug, Clone)]
pub struct Scenario {
    border: Border,
    sprites: Vec<Arc<Sprite>>,
    spawn: (f64, f64),
    handling: Handling,
    radar: Radar,
    policy: Policy,
    output_threshold: f64,
}

impl Scenario {
    /// Fails without at least one sprite to put cars in
    pub fn new(
        border: Border,
        sprites: Vec<Arc<Sprite>>,
        spawn: (f64, f64),
        handling: Handling,
        radar: Radar,
        policy: Policy,
        output_threshold: f64,
    ) -> Result<Self> {
        if sprites.is_empty() {
            return Err(Error::Config("no car sprites".into()));
        }
        Ok(Self {
            border,
            sprites,
            spawn,
            handling,
            radar,
            policy,
            output_threshold,
        })
    }

    /// Build the world a config describes, loading the track and car images it names
    pub fn from_config(config: &Config) -> Result<Self> {
        let track = &config.track;
        let bitmap = match &track.image {
            Some(path) => Bitmap::open(path)?,
            None => Bitmap::oval_track(
                track.size[0],
                track.size[1],
                track.thickness,
                track.transparent_pixel,
                Rgba::new(0, 0, 0, 255),
            ),
        };

        let sprites = car_set(&config.car)?;

        let spawn = (
            config.car.position[0] * bitmap.width() as f64,
            config.car.position[1] * bitmap.height() as f64,
        );
        let origin = Point::new(track.position[0], track.position[1]);

        Self::new(
            Border::new(origin, bitmap, track.transparent_pixel),
            sprites,
            (spawn.0 + origin.x as f64, spawn.1 + origin.y as f64),
            config.car.handling(),
            Radar::from_config(&config.radar),
            config.policy,
            config.evolution.output_threshold,
        )
    }

    /// Controller input and output sizes
    pub fn io(&self) -> (usize, usize) {
        (self.radar.len(), ACTIONS)
    }

    #[inline]
    pub fn border(&self) -> &Border {
        &self.border
    }

    #[inline]
    pub fn radar(&self) -> &Radar {
        &self.radar
    }

    #[inline]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy;
    }

    #[inline]
    pub fn output_threshold(&self) -> f64 {
        self.output_threshold
    }

    pub fn sprites(&self) -> &[Arc<Sprite>] {
        &self.sprites
    }

    /// A fresh car at the spawn point, facing +x
    pub fn vehicle(&self, variant: usize) -> Vehicle {
        Vehicle::new(
            self.spawn.0,
            self.spawn.1,
            self.sprites[variant % self.sprites.len()].clone(),
            self.handling,
            self.radar.len(),
        )
    }

    /// Put one car on the track per network, each with a randomly picked look
    pub fn spawn<N>(&self, networks: Vec<(usize, N)>, rng: &mut impl RngCore) -> Vec<Entrant<N>> {
        networks
            .into_iter()
            .map(|(handle, network)| {
                let variant = rng.random_range(0..self.sprites.len());
                Entrant::new(handle, self.vehicle(variant), network)
            })
            .collect()
    }

    /// Drive one generation to its end. Returns how it ended and the final fitness per handle.
    /// The generation counter moves on once the generation is over, even if it had no cars, but
    /// not if the observer quit part way.
    pub fn run_generation<N: Controller + Send>(
        &self,
        networks: Vec<(usize, N)>,
        state: &mut RunState,
        observer: &mut impl Observer,
        rng: &mut impl RngCore,
    ) -> Result<(Flow, Vec<(usize, f64)>)> {
        let mut generation = Generation::new(self.spawn(networks, rng));
        let flow = generation.run(self, state, observer)?;
        if flow == Flow::Done {
            state.generation += 1;
        }
        Ok((flow, generation.into_fitness()))
    }

    /// Evolve `evolver` for up to `config.generations` generations, stopping early once the best
    /// fitness reaches the configured threshold or the observer quits.
    ///
    /// Whatever happens, the run is recorded to the run log before this returns, errors
    /// included, as long as `record` asks for it.
    pub fn evolve<E: Evolver>(
        &self,
        evolver: &mut E,
        config: &EvolutionConfig,
        record: &RecordConfig,
        observer: &mut impl Observer,
    ) -> Result<RunOutcome> {
        let mut state = RunState {
            pop_size: evolver.size(),
            ..Default::default()
        };

        let run = self.drive(evolver, config, &mut state, observer);
        let entry = RunRecord::new(&state);

        if let Some(path) = &record.path {
            if record.min_score.map_or(true, |min| state.max_score > min) {
                if let Err(e) = entry.append(path) {
                    return match run {
                        Err(run_err) => {
                            warn!(error = %e, path = %path.display(), "run log not written");
                            Err(run_err)
                        }
                        Ok(_) => Err(e),
                    };
                }
            }
        }

        let interrupted = run?;
        Ok(RunOutcome {
            state,
            record: entry,
            best_fitness: evolver.best_fitness(),
            interrupted,
        })
    }

    /// The generation loop of [Scenario::evolve]. True if the observer quit
    fn drive<E: Evolver>(
        &self,
        evolver: &mut E,
        config: &EvolutionConfig,
        state: &mut RunState,
        observer: &mut impl Observer,
    ) -> Result<bool> {
        let mut rng = seeded_rng(config.seed);

        for _ in 0..config.generations {
            let networks = evolver.spawn()?;
            let alive = networks.len();
            let (flow, fitness) = self.run_generation(networks, state, observer, &mut rng)?;
            if flow == Flow::Quit {
                info!(generation = state.generation, "run interrupted");
                return Ok(true);
            }

            evolver.advance(&fitness)?;
            let best = evolver.best_fitness();
            let generation_best = fitness.iter().map(|(_, f)| *f).reduce(f64::max);
            info!(
                generation = state.generation,
                alive,
                max_score = state.max_score,
                best = ?generation_best,
                champion = ?best,
                "generation done"
            );
            observer.generation_done(state);

            if let (Some(target), Some(best)) = (config.fitness_threshold, best) {
                if best >= target {
                    info!(best, target, "fitness threshold reached");
                    break;
                }
            }
        }
        Ok(false)
    }
}
