//! Completion detection by match count stability.
//!
//! The service does not report when a bracket is done generating matches. A bracket is
//! considered complete once the total number of matches stays the same, and non-zero, for a
//! number of consecutive polls.
use std::time::Duration;

use bracket_driver_api::id::TournamentId;
use tokio::time::{sleep, Instant};

use crate::{Backend, Error, Result};

/// The state of a [`StabilityTracker`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// No poll has observed a match yet.
    WaitingForFirstMatch,
    /// `streak` consecutive polls observed `count` matches.
    Counting { count: usize, streak: u32 },
    /// Terminal. The count stayed at `count` for the required number of polls.
    Stable { count: usize },
    /// Terminal. The timeout elapsed before the count stabilized.
    Expired { last_count: usize },
}

impl State {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stable { .. } | Self::Expired { .. })
    }
}

/// Tracks consecutive equal match counts.
#[derive(Clone, Debug)]
pub struct StabilityTracker {
    stable_checks: u32,
    timeout: Duration,
    state: State,
}

impl StabilityTracker {
    pub fn new(stable_checks: u32, timeout: Duration) -> Self {
        Self {
            stable_checks: stable_checks.max(1),
            timeout,
            state: State::WaitingForFirstMatch,
        }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Feeds the match count of a poll taken `elapsed` after the first one and returns the new
    /// state. Once a terminal state is reached further observations are ignored.
    pub fn observe(&mut self, count: usize, elapsed: Duration) -> State {
        let last_count = match self.state {
            State::Stable { .. } | State::Expired { .. } => return self.state,
            State::WaitingForFirstMatch => 0,
            State::Counting { count, .. } => count,
        };

        let state = match self.state {
            _ if count == 0 => State::WaitingForFirstMatch,
            State::Counting { streak, .. } if count == last_count => State::Counting {
                count,
                streak: streak + 1,
            },
            _ => State::Counting { count, streak: 1 },
        };

        self.state = match state {
            State::Counting { count, streak } if streak >= self.stable_checks => {
                State::Stable { count }
            }
            _ if elapsed >= self.timeout => State::Expired { last_count: count },
            state => state,
        };

        self.state
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DetectorOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub stable_checks: u32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
            stable_checks: 5,
        }
    }
}

/// The outcome of a successful [`CompletionDetector::await_completion`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    /// The stable match count.
    pub matches: usize,
    pub polls: u32,
    pub elapsed: Duration,
    /// `true` if the backend reported the completion itself.
    pub authoritative: bool,
}

#[derive(Debug)]
pub struct CompletionDetector<'a, B> {
    backend: &'a B,
    options: DetectorOptions,
}

impl<'a, B> CompletionDetector<'a, B>
where
    B: Backend,
{
    pub fn new(backend: &'a B, options: DetectorOptions) -> Self {
        Self { backend, options }
    }

    /// Polls the match count of `tournament` until it stabilizes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the count does not stabilize within the configured
    /// timeout. Any failed poll is returned immediately.
    pub async fn await_completion(&self, tournament: &TournamentId) -> Result<Completion> {
        let mut tracker = StabilityTracker::new(self.options.stable_checks, self.options.timeout);
        let start = Instant::now();
        let mut polls = 0;

        log::info!(
            "Tournament {}: waiting for {} stable checks (timeout {:?})",
            tournament,
            self.options.stable_checks,
            self.options.timeout
        );

        loop {
            if let Some(true) = self.backend.completion_signal(tournament).await? {
                let matches = self.backend.matches(tournament).await?.len();
                log::info!("Tournament {}: reported complete", tournament);

                return Ok(Completion {
                    matches,
                    polls: polls + 1,
                    elapsed: start.elapsed(),
                    authoritative: true,
                });
            }

            let count = self.backend.matches(tournament).await?.len();
            polls += 1;

            let elapsed = start.elapsed();
            match tracker.observe(count, elapsed) {
                State::Stable { count } => {
                    log::info!(
                        "Tournament {}: stable at {} matches after {:?} ({} polls)",
                        tournament,
                        count,
                        elapsed,
                        polls
                    );

                    return Ok(Completion {
                        matches: count,
                        polls,
                        elapsed,
                        authoritative: false,
                    });
                }
                State::Expired { last_count } => {
                    log::warn!(
                        "Tournament {}: not stable after {:?} (last total={})",
                        tournament,
                        elapsed,
                        last_count
                    );

                    return Err(Error::Timeout {
                        tournament: tournament.clone(),
                        last_count,
                        elapsed,
                    });
                }
                State::WaitingForFirstMatch => {
                    log::debug!("Tournament {}: poll {}: no matches yet", tournament, polls);
                }
                State::Counting { count, streak } => {
                    log::debug!(
                        "Tournament {}: poll {}: total={} stable={}/{}",
                        tournament,
                        polls,
                        count,
                        streak,
                        self.options.stable_checks
                    );
                }
            }

            sleep(self.options.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bracket_driver_api::id::TournamentId;

    use super::{CompletionDetector, DetectorOptions, StabilityTracker, State};
    use crate::mock::ScriptedCounts;
    use crate::Error;

    const SECOND: Duration = Duration::from_secs(1);

    fn observe_all(tracker: &mut StabilityTracker, counts: &[usize]) -> Vec<State> {
        counts
            .iter()
            .enumerate()
            .map(|(i, count)| tracker.observe(*count, SECOND * i as u32))
            .collect()
    }

    #[test]
    fn test_tracker_sequence() {
        let mut tracker = StabilityTracker::new(5, Duration::from_secs(120));
        let states = observe_all(&mut tracker, &[0, 0, 3, 5, 5, 5, 5, 5]);

        assert_eq!(
            states,
            [
                State::WaitingForFirstMatch,
                State::WaitingForFirstMatch,
                State::Counting {
                    count: 3,
                    streak: 1
                },
                State::Counting {
                    count: 5,
                    streak: 1
                },
                State::Counting {
                    count: 5,
                    streak: 2
                },
                State::Counting {
                    count: 5,
                    streak: 3
                },
                State::Counting {
                    count: 5,
                    streak: 4
                },
                State::Stable { count: 5 },
            ]
        );
    }

    #[test]
    fn test_tracker_change_resets_streak() {
        let mut tracker = StabilityTracker::new(3, Duration::from_secs(120));
        observe_all(&mut tracker, &[4, 4]);

        // A drop is not special, it just becomes the new baseline.
        assert_eq!(
            tracker.observe(2, SECOND * 2),
            State::Counting {
                count: 2,
                streak: 1
            }
        );
        assert_eq!(
            tracker.observe(0, SECOND * 3),
            State::WaitingForFirstMatch
        );
    }

    #[test]
    fn test_tracker_timeout() {
        let mut tracker = StabilityTracker::new(5, Duration::from_secs(3));

        assert!(!tracker.observe(1, SECOND * 0).is_terminal());
        assert!(!tracker.observe(2, SECOND * 1).is_terminal());
        assert!(!tracker.observe(3, SECOND * 2).is_terminal());
        assert_eq!(
            tracker.observe(4, SECOND * 3),
            State::Expired { last_count: 4 }
        );
    }

    #[test]
    fn test_tracker_timeout_without_matches() {
        let mut tracker = StabilityTracker::new(5, Duration::from_secs(2));
        let states = observe_all(&mut tracker, &[0, 0, 0]);

        assert_eq!(states[2], State::Expired { last_count: 0 });
    }

    #[test]
    fn test_tracker_terminal_is_sticky() {
        let mut tracker = StabilityTracker::new(1, Duration::from_secs(10));

        assert_eq!(tracker.observe(7, SECOND), State::Stable { count: 7 });
        assert_eq!(tracker.observe(9, SECOND * 20), State::Stable { count: 7 });
        assert_eq!(tracker.state(), State::Stable { count: 7 });
    }

    #[test]
    fn test_tracker_stability_wins_over_timeout() {
        let mut tracker = StabilityTracker::new(2, Duration::from_secs(1));

        tracker.observe(3, Duration::ZERO);
        assert_eq!(tracker.observe(3, SECOND * 5), State::Stable { count: 3 });
    }

    fn options() -> DetectorOptions {
        DetectorOptions {
            timeout: Duration::from_secs(120),
            poll_interval: SECOND,
            stable_checks: 5,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_completion() {
        let backend = ScriptedCounts::new(&[0, 0, 3, 5, 5, 5, 5, 5]);
        let detector = CompletionDetector::new(&backend, options());

        let completion = detector
            .await_completion(&TournamentId::from("t"))
            .await
            .unwrap();

        assert_eq!(completion.matches, 5);
        assert_eq!(completion.polls, 8);
        assert!(!completion.authoritative);
        assert_eq!(backend.polls(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_completion_growing() {
        let backend = ScriptedCounts::growing();
        let detector = CompletionDetector::new(
            &backend,
            DetectorOptions {
                timeout: Duration::from_secs(10),
                ..options()
            },
        );

        let err = detector
            .await_completion(&TournamentId::from("t"))
            .await
            .unwrap_err();

        match err {
            Error::Timeout {
                last_count,
                elapsed,
                ..
            } => {
                assert!(elapsed >= Duration::from_secs(10));
                assert_eq!(last_count, backend.polls() as usize);
            }
            err => panic!("unexpected error: {}", err),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_completion_no_matches() {
        let backend = ScriptedCounts::new(&[0]);
        let detector = CompletionDetector::new(
            &backend,
            DetectorOptions {
                timeout: Duration::from_secs(5),
                ..options()
            },
        );

        let err = detector
            .await_completion(&TournamentId::from("t"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { last_count: 0, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_completion_authoritative() {
        let backend = ScriptedCounts {
            signal: Some(true),
            ..ScriptedCounts::new(&[12])
        };
        let detector = CompletionDetector::new(&backend, options());

        let completion = detector
            .await_completion(&TournamentId::from("t"))
            .await
            .unwrap();

        assert!(completion.authoritative);
        assert_eq!(completion.matches, 12);
        assert_eq!(completion.polls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_completion_signal_not_done() {
        // `Some(false)` falls back to the stability heuristic.
        let backend = ScriptedCounts {
            signal: Some(false),
            ..ScriptedCounts::new(&[2])
        };
        let detector = CompletionDetector::new(
            &backend,
            DetectorOptions {
                stable_checks: 3,
                ..options()
            },
        );

        let completion = detector
            .await_completion(&TournamentId::from("t"))
            .await
            .unwrap();

        assert!(!completion.authoritative);
        assert_eq!(completion.polls, 3);
    }
}
