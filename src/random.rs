use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Scale a probability in `[0, 1]` onto the full u64 range, so that it can be compared against a
/// raw `next_u64` roll
pub fn chance(p: f64) -> u64 {
    (p.clamp(0., 1.) * u64::MAX as f64) as u64
}

#[derive(Debug, Clone, Copy)]
pub enum MutationEvent {
    MutateWeight,
    ReplaceWeight,
    PickLessFit,
}

pub trait Probabilities {
    fn probability(&self, evt: MutationEvent) -> u64;
}

pub trait Happens: RngCore {
    fn happens(&mut self, p: &impl Probabilities, evt: MutationEvent) -> bool;
}

impl<T: RngCore> Happens for T {
    fn happens(&mut self, p: &impl Probabilities, evt: MutationEvent) -> bool {
        p.probability(evt) > self.next_u64()
    }
}

/// An rng seeded from `seed` when given, otherwise from the os
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
