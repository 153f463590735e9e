//! Drives a remote tournament bracket to completion.
//!
//! The service is the only authority on bracket state. Every decision made here is derived from
//! a fresh match snapshot, so all operations are safe to re-run against a partially progressed
//! bracket.
pub mod backend;
pub mod classifier;
pub mod detector;
pub mod order;
pub mod outcome;
pub mod provision;
pub mod simulator;

#[cfg(test)]
mod mock;

pub use backend::Backend;
pub use classifier::Classifier;
pub use detector::{Completion, CompletionDetector, DetectorOptions, StabilityTracker, State};
pub use outcome::{HomeWins, OutcomeStrategy, RandomOutcome};
pub use provision::{
    ProvisionOptions, ProvisionedTournament, Provisioner, TournamentGenerator, TournamentPlan,
};
pub use simulator::{SimulationReport, Simulator, SimulatorOptions};

use std::time::Duration;

use bracket_driver_api::id::TournamentId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] bracket_driver_api::Error),
    /// The match count did not stabilize in time.
    #[error(
        "tournament {tournament} did not stabilize within {elapsed:?} (last total={last_count})"
    )]
    Timeout {
        tournament: TournamentId,
        last_count: usize,
        elapsed: Duration,
    },
    /// The simulator kept finding playable matches for more rounds than allowed. This usually
    /// points to a bracket that never advances or a classifier that never rejects a match.
    #[error("tournament {tournament} still had playable matches after {rounds} rounds")]
    SafetyLimitExceeded {
        tournament: TournamentId,
        rounds: u32,
    },
}
