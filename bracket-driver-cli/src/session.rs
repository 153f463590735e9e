use std::time::Duration;

use bracket_driver_api::id::TournamentId;
use bracket_driver_api::tournaments::matches::Match;
use bracket_driver_api::Client;
use bracket_driver_core::order;
use bracket_driver_core::{
    Completion, CompletionDetector, HomeWins, OutcomeStrategy, ProvisionedTournament, Provisioner,
    RandomOutcome, Result, SimulationReport, Simulator,
};
use tokio::time::Instant;

use crate::config::Config;

/// Highest score handed out by the random outcome strategy.
const RANDOM_MAX_SCORE: i64 = 5;

/// The report of a complete [`Session::run`].
#[derive(Clone, Debug)]
pub struct RunReport {
    pub provisioned: ProvisionedTournament,
    pub simulation: Option<SimulationReport>,
    pub completion: Completion,
    pub elapsed: Duration,
}

/// A single simulated user. Sessions share nothing but the connection pool of the client.
#[derive(Copy, Clone, Debug)]
pub struct Session<'a> {
    client: &'a Client,
    config: &'a Config,
}

impl<'a> Session<'a> {
    pub fn new(client: &'a Client, config: &'a Config) -> Self {
        Self { client, config }
    }

    pub async fn provision(&self) -> Result<ProvisionedTournament> {
        let plan = self.config.generator().generate();

        Provisioner::new(self.client, self.config.provision_options())
            .provision(&plan)
            .await
    }

    /// Runs the simulator. A `seed` selects random outcomes instead of home wins.
    pub async fn simulate(
        &self,
        tournament: &TournamentId,
        seed: Option<u64>,
    ) -> Result<SimulationReport> {
        let outcome: Box<dyn OutcomeStrategy + Send> = match seed {
            Some(seed) => Box::new(RandomOutcome::new(seed, RANDOM_MAX_SCORE)),
            None => Box::new(HomeWins),
        };

        Simulator::new(self.client, outcome, self.config.simulator_options())
            .run(tournament)
            .await
    }

    pub async fn wait(&self, tournament: &TournamentId) -> Result<Completion> {
        CompletionDetector::new(self.client, self.config.detector_options())
            .await_completion(tournament)
            .await
    }

    pub async fn matches(&self, tournament: &TournamentId) -> Result<Vec<Match>> {
        Ok(self.client.tournaments().matches(tournament).list().await?)
    }

    /// Provisions a new tournament, optionally simulates it, and waits for it to complete.
    pub async fn run(&self, simulate: bool, seed: Option<u64>) -> Result<RunReport> {
        let start = Instant::now();

        let provisioned = self.provision().await?;

        let simulation = if simulate {
            Some(self.simulate(&provisioned.tournament, seed).await?)
        } else {
            None
        };

        let completion = self.wait(&provisioned.tournament).await?;

        Ok(RunReport {
            provisioned,
            simulation,
            completion,
            elapsed: start.elapsed(),
        })
    }
}

/// Prints the final matches of a snapshot.
pub fn print_finals(matches: &[Match]) {
    let finals = order::finals(matches);
    if finals.is_empty() {
        println!("No final matches");
        return;
    }

    println!("Name | Home | Visitor | Score");
    for m in finals {
        println!(
            "{} | {} | {} | {}-{}",
            m.name,
            m.home_team().map(|id| id.as_str()).unwrap_or("-"),
            m.visitor_team().map(|id| id.as_str()).unwrap_or("-"),
            m.score.home_team_score,
            m.score.visitor_team_score
        );
    }
}
