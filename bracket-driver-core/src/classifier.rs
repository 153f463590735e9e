use bracket_driver_api::tournaments::matches::Match;

/// Decides which matches of a snapshot are eligible for an outcome.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Classifier {
    /// Reject matches that already carry a non-zero score. Scoring a match the service has
    /// already advanced from corrupts the bracket.
    pub skip_scored: bool,
}

impl Classifier {
    pub const fn new(skip_scored: bool) -> Self {
        Self { skip_scored }
    }

    /// Returns `true` if both team slots are populated and, unless `skip_scored` is disabled,
    /// the match is still 0-0.
    pub fn is_playable(&self, m: &Match) -> bool {
        m.has_teams() && (!self.skip_scored || m.score.is_zero())
    }

    /// Returns `true` if the match is unscored but still waiting for at least one team.
    pub fn is_waiting(&self, m: &Match) -> bool {
        !m.has_teams() && m.score.is_zero()
    }

    /// Returns all playable matches of `matches` in snapshot order.
    pub fn playable<'a>(&self, matches: &'a [Match]) -> Vec<&'a Match> {
        matches.iter().filter(|m| self.is_playable(m)).collect()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(true)
    }
}
