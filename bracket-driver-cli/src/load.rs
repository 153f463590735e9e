use std::time::Duration;

use bracket_driver_api::Client;
use futures::stream::{self, StreamExt};
use tokio::time::Instant;

use crate::config::Config;
use crate::session::Session;

#[derive(Copy, Clone, Debug)]
pub struct LoadOptions {
    pub users: usize,
    pub concurrency: usize,
    pub simulate: bool,
    /// Base seed for random outcomes. Every user gets `seed + index`.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    pub successful: usize,
    pub failed: usize,
    /// Durations of the successful runs.
    pub latencies: Vec<Duration>,
    pub elapsed: Duration,
}

impl LoadReport {
    pub fn summary(&self) -> Option<LatencySummary> {
        LatencySummary::new(&self.latencies)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LatencySummary {
    pub min: Duration,
    pub mean: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub max: Duration,
}

impl LatencySummary {
    /// Returns `None` if `latencies` is empty.
    pub fn new(latencies: &[Duration]) -> Option<Self> {
        let mut sorted = latencies.to_vec();
        sorted.sort_unstable();

        let len = sorted.len();
        let min = *sorted.first()?;
        let max = *sorted.last()?;
        let total: Duration = sorted.iter().sum();

        Some(Self {
            min,
            mean: total / len as u32,
            p50: sorted[len * 50 / 100],
            p95: sorted[(len * 95 / 100).min(len - 1)],
            max,
        })
    }
}

/// Runs `users` independent sessions with at most `concurrency` in flight.
pub async fn run(client: &Client, config: &Config, options: LoadOptions) -> LoadReport {
    let start = Instant::now();

    log::info!(
        "Starting {} runs ({} concurrent, {} teams each)",
        options.users,
        options.concurrency,
        config.teams
    );

    let results: Vec<_> = stream::iter(0..options.users)
        .map(|user| async move {
            let seed = options.seed.map(|seed| seed.wrapping_add(user as u64));
            let result = Session::new(client, config)
                .run(options.simulate, seed)
                .await;
            (user, result)
        })
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    let mut report = LoadReport::default();
    for (user, result) in results {
        match result {
            Ok(run) => {
                log::info!(
                    "User {}: tournament {} complete with {} matches in {:?}",
                    user,
                    run.provisioned.tournament,
                    run.completion.matches,
                    run.elapsed
                );

                report.successful += 1;
                report.latencies.push(run.elapsed);
            }
            Err(err) => {
                log::error!("User {}: {}", user, err);
                report.failed += 1;
            }
        }
    }

    report.elapsed = start.elapsed();
    report
}
