//! The evolution seam, and the built-in fixed-topology evolver behind it.

use crate::{
    config::EvolutionConfig,
    constants::RIDE_REPRODUCTION_COPY_RATIO,
    genome::{Genome, Mutation},
    network::{Activation, Controller, Dense},
    random::seeded_rng,
    Error, Result,
};
use core::cmp::Ordering;
use rand::{rngs::StdRng, Rng, RngCore};
use tracing::debug;

/// Supplies a generation of networks, and learns from how they did.
///
/// Every network is tagged with a handle. After the generation, [Evolver::advance] receives the
/// final fitness of every handle from the latest [Evolver::spawn], each exactly once, and
/// prepares the next generation.
pub trait Evolver {
    type Network: Controller + Send;

    /// Genomes per generation
    fn size(&self) -> usize;

    fn spawn(&mut self) -> Result<Vec<(usize, Self::Network)>>;

    fn advance(&mut self, fitness: &[(usize, f64)]) -> Result<()>;

    /// Best fitness seen so far, if any generation has been scored
    fn best_fitness(&self) -> Option<f64>;
}

/// Select a random member with probability weighted by fitness. Fitness is shifted so the least
/// fit member still has a sliver of a chance, which also makes negative fitness usable.
fn weighted_random_select<'a, G>(
    members: &'a [(G, f64)],
    rng: &mut impl RngCore,
) -> Option<&'a (G, f64)> {
    let min_fitness = members.iter().map(|(_, f)| *f).reduce(f64::min)?;
    let shift = if min_fitness < 0. { -min_fitness } else { 0. };
    let epsilon = 1e-6;

    let weights = members
        .iter()
        .map(|(_, f)| f + shift + epsilon)
        .collect::<Vec<_>>();
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total < f64::EPSILON {
        return members.first();
    }

    let mut threshold = rng.random::<f64>() * total;
    for (member, weight) in members.iter().zip(weights) {
        threshold -= weight;
        if threshold <= 0. {
            return Some(member);
        }
    }
    members.last()
}

fn fitness_ordering(l: f64, r: f64) -> Ordering {
    l.partial_cmp(&r).unwrap_or(Ordering::Equal)
}

/// Breed `size` genomes from scored `members`: the fittest carries over untouched, a quarter of
/// the rest are mutated copies, and the remainder are mutated crossover children.
pub fn reproduce(
    members: &[(Genome, f64)],
    size: usize,
    copy_ratio: usize,
    mutation: &Mutation,
    rng: &mut impl RngCore,
) -> Result<Vec<Genome>> {
    if size == 0 {
        return Ok(vec![]);
    }

    let Some((champion, _)) = members
        .iter()
        .max_by(|(_, l), (_, r)| fitness_ordering(*l, *r))
    else {
        return Err(Error::Evolution(format!(
            "too few members to reproduce (wanted to produce {size} from 0)"
        )));
    };

    let mut pop = Vec::with_capacity(size);
    pop.push(champion.clone());

    let size = size - 1;
    let size_copy = match size / copy_ratio.max(1) {
        _ if members.len() == 1 => size,
        0 => size,
        n => n,
    };

    for _ in 0..size_copy {
        let Some((parent, _)) = weighted_random_select(members, rng) else {
            break;
        };
        let mut child = parent.clone();
        child.mutate(mutation, rng);
        pop.push(child);
    }

    for _ in 0..size - size_copy {
        let (Some((l, l_fit)), Some((r, r_fit))) = (
            weighted_random_select(members, rng),
            weighted_random_select(members, rng),
        ) else {
            break;
        };
        let mut child = l.crossover(r, fitness_ordering(*l_fit, *r_fit), mutation, rng)?;
        child.mutate(mutation, rng);
        pop.push(child);
    }

    Ok(pop)
}

/// A fixed-size population of [Genome]s, expressed as [Dense] networks
#[derive(Debug)]
pub struct Population {
    genomes: Vec<Genome>,
    champion: Option<(Genome, f64)>,
    mutation: Mutation,
    activation: Activation,
    copy_ratio: usize,
    rng: StdRng,
}

impl Population {
    /// A random population of `config.population` genomes with `sensory` inputs
    pub fn new(sensory: usize, config: &EvolutionConfig) -> Self {
        let mut rng = seeded_rng(config.seed);
        let genomes = (0..config.population)
            .map(|_| Genome::new(sensory, &config.hidden_layers, &config.mutation, &mut rng))
            .collect();
        Self::with_genomes(genomes, config, rng)
    }

    /// A population grown from one saved genome: the genome itself, plus mutated copies of it
    pub fn from_genome(genome: Genome, config: &EvolutionConfig) -> Self {
        let mut rng = seeded_rng(config.seed);
        let genomes = (0..config.population)
            .map(|idx| {
                let mut g = genome.clone();
                if idx != 0 {
                    g.mutate(&config.mutation, &mut rng);
                }
                g
            })
            .collect();
        Self::with_genomes(genomes, config, rng)
    }

    fn with_genomes(genomes: Vec<Genome>, config: &EvolutionConfig, rng: StdRng) -> Self {
        Self {
            genomes,
            champion: None,
            mutation: config.mutation,
            activation: config.activation,
            copy_ratio: RIDE_REPRODUCTION_COPY_RATIO,
            rng,
        }
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// The fittest genome seen in any generation, with its fitness
    pub fn champion(&self) -> Option<&(Genome, f64)> {
        self.champion.as_ref()
    }
}

impl Evolver for Population {
    type Network = Dense;

    fn size(&self) -> usize {
        self.genomes.len()
    }

    fn spawn(&mut self) -> Result<Vec<(usize, Dense)>> {
        Ok(self
            .genomes
            .iter()
            .enumerate()
            .map(|(handle, genome)| (handle, genome.network(self.activation)))
            .collect())
    }

    fn advance(&mut self, fitness: &[(usize, f64)]) -> Result<()> {
        let mut scores = vec![None; self.genomes.len()];
        for &(handle, f) in fitness {
            let Some(slot) = scores.get_mut(handle) else {
                return Err(Error::Evolution(format!("unknown handle {handle}")));
            };
            if slot.replace(f).is_some() {
                return Err(Error::Evolution(format!("handle {handle} scored twice")));
            }
        }

        if let Some(handle) = scores.iter().position(Option::is_none) {
            return Err(Error::Evolution(format!("handle {handle} was never scored")));
        }

        let scored = self
            .genomes
            .drain(..)
            .zip(scores.into_iter().flatten())
            .collect::<Vec<_>>();

        if let Some((best, f)) = scored
            .iter()
            .max_by(|(_, l), (_, r)| fitness_ordering(*l, *r))
        {
            if self.champion.as_ref().map_or(true, |(_, c)| f > c) {
                debug!(fitness = *f, "new champion");
                self.champion = Some((best.clone(), *f));
            }
        }

        let size = scored.len();
        self.genomes = reproduce(&scored, size, self.copy_ratio, &self.mutation, &mut self.rng)?;
        Ok(())
    }

    fn best_fitness(&self) -> Option<f64> {
        self.champion.as_ref().map(|(_, f)| *f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn config(population: usize) -> EvolutionConfig {
        EvolutionConfig {
            population,
            seed: Some(42),
            ..Default::default()
        }
    }

    fn flat(w: f64) -> Genome {
        Genome::from_weights(vec![1, 3], vec![w; 6]).unwrap()
    }

    #[test]
    fn test_weighted_select_bias() {
        let mut rng = StdRng::seed_from_u64(42);
        let members = vec![(0, 1.), (1, 2.), (2, 10.)];
        let mut hits = [0; 3];
        for _ in 0..10_000 {
            hits[weighted_random_select(&members, &mut rng).unwrap().0] += 1;
        }
        assert!(hits[2] > hits[1] && hits[1] > hits[0], "{hits:?}");
        assert!(weighted_random_select::<usize>(&[], &mut rng).is_none());
    }

    #[test]
    fn test_weighted_select_negative() {
        let mut rng = StdRng::seed_from_u64(7);
        let members = vec![(0, -5.), (1, -1.)];
        let mut hits = [0; 2];
        for _ in 0..1000 {
            hits[weighted_random_select(&members, &mut rng).unwrap().0] += 1;
        }
        // the least fit member is shifted to a near-zero weight
        assert!(hits[1] > 990, "{hits:?}");
    }

    #[test]
    fn test_reproduce_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let members = (0..10).map(|i| (flat(i as f64 / 10.), i as f64)).collect::<Vec<_>>();
        for size in [0, 1, 2, 10, 40] {
            let pop = reproduce(&members, size, 4, &Mutation::default(), &mut rng).unwrap();
            assert_eq!(pop.len(), size);
        }
        assert!(reproduce(&[], 3, 4, &Mutation::default(), &mut rng).is_err());
        assert!(reproduce(&[], 0, 4, &Mutation::default(), &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_reproduce_keeps_champion() {
        let mut rng = StdRng::seed_from_u64(2);
        let members = vec![(flat(0.1), 1.), (flat(0.9), 30.), (flat(0.5), -2.)];
        let pop = reproduce(&members, 5, 4, &Mutation::default(), &mut rng).unwrap();
        assert_eq!(pop[0], flat(0.9));
    }

    #[test]
    fn test_reproduce_single_member() {
        let mut rng = StdRng::seed_from_u64(3);
        let pop = reproduce(&[(flat(0.2), 0.)], 6, 4, &Mutation::default(), &mut rng).unwrap();
        assert_eq!(pop.len(), 6);
    }

    #[test]
    fn test_population_spawn() {
        let mut pop = Population::new(9, &config(12));
        assert_eq!(pop.size(), 12);
        let spawned = pop.spawn().unwrap();
        assert_eq!(
            spawned.iter().map(|(h, _)| *h).collect::<Vec<_>>(),
            (0..12).collect::<Vec<_>>()
        );
        assert!(spawned.iter().all(|(_, nn)| nn.sensory() == 9 && nn.action() == 3));
    }

    #[test]
    fn test_population_seeded() {
        let l = Population::new(5, &config(4));
        let r = Population::new(5, &config(4));
        assert_eq!(l.genomes(), r.genomes());
    }

    #[test]
    fn test_advance_tracks_champion() {
        let mut pop = Population::new(3, &config(5));
        let best = pop.genomes()[3].clone();
        pop.advance(&[(0, 1.), (1, 2.), (2, -1.), (3, 9.), (4, 0.)]).unwrap();
        assert_eq!(pop.size(), 5);
        assert_eq!(pop.champion(), Some(&(best.clone(), 9.)));
        assert_eq!(pop.genomes()[0], best);

        // a worse generation does not dethrone it
        pop.advance(&[(4, 1.), (3, 1.), (2, 1.), (1, 1.), (0, 1.)]).unwrap();
        assert_eq!(pop.best_fitness(), Some(9.));
    }

    #[test]
    fn test_advance_rejects_misaligned() {
        let mut pop = Population::new(3, &config(3));
        assert!(pop.advance(&[(0, 1.), (1, 1.)]).is_err());

        let mut pop = Population::new(3, &config(3));
        assert!(pop.advance(&[(0, 1.), (1, 1.), (1, 1.)]).is_err());

        let mut pop = Population::new(3, &config(3));
        assert!(pop.advance(&[(0, 1.), (1, 1.), (2, 1.), (3, 1.)]).is_err());
    }

    #[test]
    fn test_from_genome() {
        let seed = flat(0.3);
        let pop = Population::from_genome(seed.clone(), &config(6));
        assert_eq!(pop.size(), 6);
        assert_eq!(pop.genomes()[0], seed);
        assert!(pop.genomes().iter().all(|g| g.layout() == seed.layout()));
    }
}
