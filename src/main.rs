use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use ride::{
    config::{Config, RecordConfig},
    scenario::RunState,
    Directive, Evolver, Frame, Genome, Observer, Population, Scenario,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ride")]
#[command(about = "Evolve neural drivers around a top-down track")]
struct Cli {
    /// JSON config. Defaults are used for anything it leaves out
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve one population
    Run {
        #[arg(long)]
        generations: Option<usize>,
        #[arg(long)]
        population: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Border image, replacing the config's track
        #[arg(long)]
        track: Option<PathBuf>,
        /// Run log to append the run record to
        #[arg(long)]
        results: Option<PathBuf>,
        /// Write the best genome here when the run ends
        #[arg(long)]
        champion: Option<PathBuf>,
        /// Grow the population from a saved genome
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// Run batches of concurrent simulations over a range of population sizes
    Sweep {
        #[arg(long, default_value_t = 30)]
        from: usize,
        /// Smallest population, exclusive
        #[arg(long, default_value_t = 10)]
        to: usize,
        #[arg(long, default_value_t = 2)]
        step: usize,
        #[arg(long, default_value_t = 10)]
        repeats: usize,
        /// Simulations run at once per round
        #[arg(long, default_value_t = 5)]
        simulations: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "results.txt")]
        results: PathBuf,
    },
}

/// Logs the leading car now and then, and a line per generation
#[derive(Debug, Default)]
struct Reporter {
    every: u64,
}

impl Observer for Reporter {
    fn frame(&mut self, frame: &Frame) -> ride::Result<Directive> {
        if self.every > 0 && frame.tick % self.every == 0 {
            if let Some(best) = &frame.best {
                debug!(
                    tick = frame.tick,
                    alive = frame.alive,
                    score = best.score,
                    velocity = best.velocity,
                    distances = ?best.distances,
                    "leader"
                );
            }
        }
        Ok(Directive::Continue)
    }

    fn generation_done(&mut self, state: &RunState) {
        println!(
            "generation {}: max score {} (pop {})",
            state.generation, state.max_score, state.pop_size
        );
    }
}

fn load(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("cannot load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn run(
    mut config: Config,
    generations: Option<usize>,
    population: Option<usize>,
    seed: Option<u64>,
    track: Option<PathBuf>,
    results: Option<PathBuf>,
    champion: Option<PathBuf>,
    resume: Option<PathBuf>,
) -> Result<()> {
    if let Some(generations) = generations {
        config.evolution.generations = generations;
    }
    if let Some(population) = population {
        config.evolution.population = population;
    }
    if seed.is_some() {
        config.evolution.seed = seed;
    }
    if track.is_some() {
        config.track.image = track;
    }
    if results.is_some() {
        config.record.path = results;
    }
    config.validate()?;

    let scenario = Scenario::from_config(&config).context("cannot build the track")?;
    let (sensory, _) = scenario.io();

    let mut population = match &resume {
        Some(path) => {
            let genome = Genome::from_file(path)
                .with_context(|| format!("cannot load genome {}", path.display()))?;
            if genome.sensory() != sensory {
                bail!(
                    "{} expects {} inputs but the radar has {sensory} probes",
                    path.display(),
                    genome.sensory()
                );
            }
            Population::from_genome(genome, &config.evolution)
        }
        None => Population::new(sensory, &config.evolution),
    };

    info!(
        population = population.size(),
        generations = config.evolution.generations,
        probes = sensory,
        "starting run"
    );
    let outcome = scenario.evolve(
        &mut population,
        &config.evolution,
        &config.record,
        &mut Reporter { every: 100 },
    )?;

    if outcome.interrupted {
        warn!("run stopped early");
    }
    print!("{}", outcome.record);

    if let Some(path) = champion {
        match population.champion() {
            Some((genome, fitness)) => {
                genome
                    .to_file(&path)
                    .with_context(|| format!("cannot write champion {}", path.display()))?;
                info!(fitness, path = %path.display(), "champion saved");
            }
            None => warn!("no generation finished, nothing to save"),
        }
    }
    Ok(())
}

fn sweep(
    config: Config,
    (from, to, step): (usize, usize, usize),
    repeats: usize,
    simulations: usize,
    seed: Option<u64>,
    results: PathBuf,
) -> Result<()> {
    if step == 0 {
        bail!("--step must be positive");
    }
    config.validate()?;
    let scenario = Scenario::from_config(&config).context("cannot build the track")?;
    let (sensory, _) = scenario.io();
    let mut runs = 0u64;

    for pop_size in (to + 1..=from).rev().step_by(step) {
        for round in 0..repeats {
            info!(pop_size, round, simulations, "sweep round");
            let outcomes = (0..simulations)
                .into_par_iter()
                .map(|idx| {
                    let mut evolution = config.evolution.clone();
                    evolution.population = pop_size;
                    evolution.seed = seed.map(|s| s.wrapping_add(runs + idx as u64));
                    let mut population = Population::new(sensory, &evolution);
                    scenario.evolve(
                        &mut population,
                        &evolution,
                        &RecordConfig::default(),
                        &mut (),
                    )
                })
                .collect::<Vec<_>>();
            runs += simulations as u64;

            // one writer, after the round
            for outcome in outcomes {
                let outcome = outcome?;
                if config
                    .record
                    .min_score
                    .map_or(true, |min| outcome.state.max_score > min)
                {
                    outcome
                        .record
                        .append(&results)
                        .with_context(|| format!("cannot append to {}", results.display()))?;
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Cli { config, command } = Cli::parse();
    let config = load(config.as_ref())?;

    match command {
        Commands::Run {
            generations,
            population,
            seed,
            track,
            results,
            champion,
            resume,
        } => run(
            config,
            generations,
            population,
            seed,
            track,
            results,
            champion,
            resume,
        ),
        Commands::Sweep {
            from,
            to,
            step,
            repeats,
            simulations,
            seed,
            results,
        } => sweep(config, (from, to, step), repeats, simulations, seed, results),
    }
}
