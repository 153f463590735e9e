use bracket_driver_api::tournaments::matches::{Match, Score};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides the score submitted for a playable match.
pub trait OutcomeStrategy {
    fn outcome(&mut self, m: &Match) -> Score;
}

/// The home team always wins 1-0.
#[derive(Copy, Clone, Debug, Default)]
pub struct HomeWins;

impl OutcomeStrategy for HomeWins {
    #[inline]
    fn outcome(&mut self, _m: &Match) -> Score {
        Score::new(1, 0)
    }
}

/// A random winner with a random, never tied, score.
#[derive(Clone, Debug)]
pub struct RandomOutcome {
    rng: StdRng,
    max_score: i64,
}

impl RandomOutcome {
    /// Creates a new `RandomOutcome` producing scores up to `max_score`. The same `seed` always
    /// produces the same sequence of outcomes.
    pub fn new(seed: u64, max_score: i64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_score: max_score.max(1),
        }
    }
}

impl OutcomeStrategy for RandomOutcome {
    fn outcome(&mut self, _m: &Match) -> Score {
        let winner = self.rng.gen_range(1..=self.max_score);
        let loser = self.rng.gen_range(0..winner);

        if self.rng.gen_bool(0.5) {
            Score::new(winner, loser)
        } else {
            Score::new(loser, winner)
        }
    }
}

impl<T> OutcomeStrategy for &mut T
where
    T: OutcomeStrategy + ?Sized,
{
    #[inline]
    fn outcome(&mut self, m: &Match) -> Score {
        (**self).outcome(m)
    }
}

impl<T> OutcomeStrategy for Box<T>
where
    T: OutcomeStrategy + ?Sized,
{
    #[inline]
    fn outcome(&mut self, m: &Match) -> Score {
        (**self).outcome(m)
    }
}
