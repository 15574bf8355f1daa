#![allow(mixed_script_confusables)]
#![allow(confusable_idents)]

pub mod bitmap;
pub mod border;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod evolve;
pub mod generation;
pub mod genome;
pub mod geometry;
pub mod network;
pub mod observer;
pub mod policy;
pub mod radar;
pub mod random;
pub mod record;
pub mod scenario;
pub mod serialize;
pub mod sprite;
pub mod vehicle;

#[macro_use]
mod macros;

pub use config::Config;
pub use error::{Error, Result};
pub use evolve::{Evolver, Population};
pub use generation::{Entrant, Flow, Generation};
pub use genome::{Genome, Mutation};
pub use network::{activate, Activation, Controller, Dense};
pub use observer::{BestCar, Directive, Frame, Observer};
pub use random::{Happens, Probabilities};
pub use scenario::{RunOutcome, RunState, Scenario};
pub use vehicle::{Decision, Vehicle};
