//! The genome bred by the built-in evolver: a fixed layer layout and a flat weight vector, which
//! expresses itself as a [Dense] network.

use crate::{
    constants::{
        RIDE_CROSSOVER_PICK_LESS_FIT_PROB, RIDE_MUTATE_WEIGHT_PROB, RIDE_PERTURB_POWER,
        RIDE_REPLACE_WEIGHT_PROB, RIDE_WEIGHT_MAX, RIDE_WEIGHT_MIN,
    },
    network::{Activation, Dense},
    random::{chance, Happens, MutationEvent, Probabilities},
    serialize::{deserialize_weights, serialize_weights},
    Error, Result,
};
use core::cmp::Ordering;
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;
use rulinalg::matrix::Matrix;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fs, path::Path};

/// Outputs of every controller: accelerate, turn left, turn right
pub const ACTIONS: usize = 3;

/// How genomes change between generations. Probabilities are fractions in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mutation {
    pub mutate_weight: f64,
    pub replace_weight: f64,
    pub perturb_power: f64,
    pub weight_min: f64,
    pub weight_max: f64,
    pub pick_less_fit: f64,
}

impl Default for Mutation {
    fn default() -> Self {
        Self {
            mutate_weight: RIDE_MUTATE_WEIGHT_PROB,
            replace_weight: RIDE_REPLACE_WEIGHT_PROB,
            perturb_power: RIDE_PERTURB_POWER,
            weight_min: RIDE_WEIGHT_MIN,
            weight_max: RIDE_WEIGHT_MAX,
            pick_less_fit: RIDE_CROSSOVER_PICK_LESS_FIT_PROB,
        }
    }
}

impl Probabilities for Mutation {
    fn probability(&self, evt: MutationEvent) -> u64 {
        chance(match evt {
            MutationEvent::MutateWeight => self.mutate_weight,
            MutationEvent::ReplaceWeight => self.replace_weight,
            MutationEvent::PickLessFit => self.pick_less_fit,
        })
    }
}

impl Mutation {
    fn fresh_weight(&self, rng: &mut impl RngCore) -> f64 {
        if self.weight_min >= self.weight_max {
            self.weight_min
        } else {
            rng.random_range(self.weight_min..=self.weight_max)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    /// Neurons per layer, sensory first and [ACTIONS] last
    layout: Vec<usize>,
    weights: Vec<f64>,
}

/// On-disk form of a [Genome], with weights kept bit for bit
#[derive(Serialize, Deserialize)]
struct Stored<W> {
    layout: W,
    #[serde(
        serialize_with = "serialize_weights",
        deserialize_with = "deserialize_weights"
    )]
    weights: Vec<f64>,
}

impl Serialize for Genome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Stored {
            layout: &self.layout,
            weights: self.weights.clone(),
        }
        .serialize(serializer)
    }
}

/// Every way of deserializing a genome goes through [Genome::from_weights]
impl<'de> Deserialize<'de> for Genome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Stored { layout, weights } = Stored::<Vec<usize>>::deserialize(deserializer)?;
        Self::from_weights(layout, weights).map_err(de::Error::custom)
    }
}

fn weight_count(layout: &[usize]) -> usize {
    layout.windows(2).map(|w| (w[0] + 1) * w[1]).sum()
}

impl Genome {
    /// A genome with `sensory` inputs, the given hidden layers, and uniformly random weights
    pub fn new(sensory: usize, hidden: &[usize], mutation: &Mutation, rng: &mut impl RngCore) -> Self {
        let layout = [sensory]
            .into_iter()
            .chain(hidden.iter().copied())
            .chain([ACTIONS])
            .collect::<Vec<_>>();
        let weights = (0..weight_count(&layout))
            .map(|_| mutation.fresh_weight(rng))
            .collect();
        Self { layout, weights }
    }

    pub fn from_weights(layout: Vec<usize>, weights: Vec<f64>) -> Result<Self> {
        let genome = Self { layout, weights };
        genome.validate()?;
        Ok(genome)
    }

    fn validate(&self) -> Result<()> {
        if self.layout.len() < 2 || self.layout.contains(&0) {
            return Err(Error::Evolution(format!(
                "unusable layer layout {:?}",
                self.layout
            )));
        }
        if self.action() != ACTIONS {
            return Err(Error::Evolution(format!(
                "genome has {} outputs, wanted {ACTIONS}",
                self.action()
            )));
        }
        let want = weight_count(&self.layout);
        if self.weights.len() != want {
            return Err(Error::Evolution(format!(
                "layout {:?} needs {want} weights, got {}",
                self.layout,
                self.weights.len()
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn sensory(&self) -> usize {
        self.layout[0]
    }

    #[inline]
    pub fn action(&self) -> usize {
        self.layout[self.layout.len() - 1]
    }

    pub fn layout(&self) -> &[usize] {
        &self.layout
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Touch each weight with some probability, either replacing it outright or nudging it by a
    /// gaussian step. Weights stay inside the configured range.
    pub fn mutate(&mut self, mutation: &Mutation, rng: &mut impl RngCore) {
        for w in self.weights.iter_mut() {
            if !rng.happens(mutation, MutationEvent::MutateWeight) {
                continue;
            }

            *w = if rng.happens(mutation, MutationEvent::ReplaceWeight) {
                mutation.fresh_weight(rng)
            } else {
                let step: f64 = rng.sample(StandardNormal);
                (*w + step * mutation.perturb_power).clamp(mutation.weight_min, mutation.weight_max)
            };
        }
    }

    /// Uniform crossover. `fitness_cmp` is how our fitness compares to `other`'s, and genes come
    /// from the fitter parent unless the less fit one is picked by chance. Equally fit parents
    /// contribute evenly.
    pub fn crossover(
        &self,
        other: &Self,
        fitness_cmp: Ordering,
        mutation: &Mutation,
        rng: &mut impl RngCore,
    ) -> Result<Self> {
        if self.layout != other.layout {
            return Err(Error::Evolution(format!(
                "cannot cross layouts {:?} and {:?}",
                self.layout, other.layout
            )));
        }

        let (fit, unfit) = match fitness_cmp {
            Ordering::Less => (other, self),
            _ => (self, other),
        };

        let weights = fit
            .weights
            .iter()
            .zip(&unfit.weights)
            .map(|(&f, &u)| {
                let pick_unfit = match fitness_cmp {
                    Ordering::Equal => rng.random_bool(0.5),
                    _ => rng.happens(mutation, MutationEvent::PickLessFit),
                };
                if pick_unfit {
                    u
                } else {
                    f
                }
            })
            .collect();

        Ok(Self {
            layout: self.layout.clone(),
            weights,
        })
    }

    /// Express this genome as a network
    pub fn network(&self, activation: Activation) -> Dense {
        let mut rest = self.weights.as_slice();
        let layers = self
            .layout
            .windows(2)
            .map(|w| {
                let (rows, cols) = (w[0] + 1, w[1]);
                let (head, tail) = rest.split_at(rows * cols);
                rest = tail;
                Matrix::new(rows, cols, head.to_vec())
            })
            .collect();
        Dense::new(layers, activation)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a saved genome. A well-formed document with an unusable shape is an
    /// [Error::Evolution], not a JSON error
    pub fn from_json(s: &str) -> Result<Self> {
        let Stored { layout, weights } = serde_json::from_str::<Stored<Vec<usize>>>(s)?;
        Self::from_weights(layout, weights)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
