use std::time::Duration;

use bracket_driver_api::id::TournamentId;
use bracket_driver_api::tournaments::matches::Match;
use tokio::time::sleep;

use crate::{order, Backend, Classifier, Error, OutcomeStrategy, Result};

/// Number of waiting matches included in the log when a simulation stops.
const WAITING_LOG_LIMIT: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SimulatorOptions {
    pub classifier: Classifier,
    /// The maximum number of rounds that score at least one match.
    pub max_rounds: u32,
    /// Delay after every score update.
    pub match_delay: Duration,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            classifier: Classifier::default(),
            max_rounds: 50,
            match_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationReport {
    /// Rounds that scored at least one match.
    pub rounds: u32,
    /// Total number of score updates submitted.
    pub scored: usize,
    /// Names of unscored matches still waiting for a team in the final snapshot, in bracket
    /// order. Empty for a finished bracket.
    pub waiting: Vec<String>,
}

/// Assigns outcomes to playable matches, round by round, until the bracket stops producing
/// playable matches.
#[derive(Debug)]
pub struct Simulator<'a, B, O> {
    backend: &'a B,
    outcome: O,
    options: SimulatorOptions,
}

impl<'a, B, O> Simulator<'a, B, O>
where
    B: Backend,
    O: OutcomeStrategy,
{
    pub fn new(backend: &'a B, outcome: O, options: SimulatorOptions) -> Self {
        Self {
            backend,
            outcome,
            options,
        }
    }

    /// Runs a single round: fetches a snapshot and scores every playable match in bracket
    /// order. Returns the number of matches scored; `0` means the bracket is either finished
    /// or blocked.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching the snapshot or any score update fails. Matches scored
    /// before the failure stay scored.
    pub async fn run_round(&mut self, tournament: &TournamentId) -> Result<usize> {
        let matches = self.backend.matches(tournament).await?;
        self.score_round(tournament, &matches).await
    }

    /// Runs rounds until no playable match is left.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SafetyLimitExceeded`] if the bracket still has playable matches after
    /// `max_rounds` rounds, or any error of [`run_round`].
    ///
    /// [`run_round`]: Self::run_round
    pub async fn run(&mut self, tournament: &TournamentId) -> Result<SimulationReport> {
        let mut report = SimulationReport::default();

        loop {
            let matches = self.backend.matches(tournament).await?;

            if !matches.iter().any(|m| self.options.classifier.is_playable(m)) {
                report.waiting = self.waiting(&matches);
                break;
            }

            if report.rounds >= self.options.max_rounds {
                log::warn!(
                    "Tournament {}: hit the round limit ({}) with playable matches left",
                    tournament,
                    self.options.max_rounds
                );

                return Err(Error::SafetyLimitExceeded {
                    tournament: tournament.clone(),
                    rounds: report.rounds,
                });
            }

            report.rounds += 1;
            log::info!("Tournament {}: round {}", tournament, report.rounds);

            report.scored += self.score_round(tournament, &matches).await?;
        }

        log::info!(
            "Tournament {}: no playable matches left after {} rounds ({} matches scored)",
            tournament,
            report.rounds,
            report.scored
        );

        if !report.waiting.is_empty() {
            log::warn!(
                "Tournament {}: {} matches waiting for teams: {}",
                tournament,
                report.waiting.len(),
                report
                    .waiting
                    .iter()
                    .take(WAITING_LOG_LIMIT)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(report)
    }

    async fn score_round(&mut self, tournament: &TournamentId, matches: &[Match]) -> Result<usize> {
        let mut playable = self.options.classifier.playable(matches);
        if playable.is_empty() {
            return Ok(0);
        }

        order::sort(&mut playable);
        log::debug!(
            "Tournament {}: {} playable matches",
            tournament,
            playable.len()
        );

        for m in &playable {
            let score = self.outcome.outcome(m);

            log::debug!(
                "Match {} ({}) [{} vs {}] {}-{} -> {}-{}",
                m.name,
                m.id,
                short(m.home_team()),
                short(m.visitor_team()),
                m.score.home_team_score,
                m.score.visitor_team_score,
                score.home_team_score,
                score.visitor_team_score,
            );

            if let Err(err) = self.backend.update_score(tournament, &m.id, score).await {
                log::warn!("Failed to score match {} ({}): {}", m.name, m.id, err);
                return Err(err.into());
            }

            if !self.options.match_delay.is_zero() {
                sleep(self.options.match_delay).await;
            }
        }

        Ok(playable.len())
    }

    fn waiting(&self, matches: &[Match]) -> Vec<String> {
        let mut waiting: Vec<&Match> = matches
            .iter()
            .filter(|m| self.options.classifier.is_waiting(m))
            .collect();

        order::sort(&mut waiting);
        waiting.into_iter().map(|m| m.name.clone()).collect()
    }
}

/// The first 8 characters of a team id, for log lines.
fn short<T>(id: Option<&T>) -> &str
where
    T: AsRef<str>,
{
    match id {
        Some(id) => {
            let id = id.as_ref();
            id.char_indices().nth(8).map_or(id, |(idx, _)| &id[..idx])
        }
        None => "?",
    }
}
