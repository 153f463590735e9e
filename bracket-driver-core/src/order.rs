//! Bracket precedence of matches.
//!
//! Matches are ordered by round prefix first (`W` winners, then `L` losers, then `F` final,
//! then anything else) and by the numeric index in their name second. `W10` sorts after `W2`.
use std::cmp::Ordering;

use bracket_driver_api::tournaments::matches::Match;

/// The round prefix of a match name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Round {
    Winners,
    Losers,
    Final,
    Other,
}

impl Round {
    pub fn from_name(name: &str) -> Self {
        match name.chars().next() {
            Some('W') => Self::Winners,
            Some('L') => Self::Losers,
            Some('F') => Self::Final,
            _ => Self::Other,
        }
    }

    #[inline]
    pub fn rank(self) -> u8 {
        match self {
            Self::Winners => 0,
            Self::Losers => 1,
            Self::Final => 2,
            Self::Other => 9,
        }
    }
}

/// The sort key of a match name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Precedence {
    pub round: Round,
    pub index: u64,
}

impl Precedence {
    /// Parses the precedence from a match name. The index is made of all ASCII digits of the
    /// name; a name without digits (or one that overflows) has index 0.
    pub fn from_name(name: &str) -> Self {
        let digits: String = name.chars().filter(char::is_ascii_digit).collect();

        Self {
            round: Round::from_name(name),
            index: digits.parse().unwrap_or(0),
        }
    }
}

impl PartialOrd for Precedence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Precedence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.round
            .rank()
            .cmp(&other.round.rank())
            .then(self.index.cmp(&other.index))
    }
}

/// Sorts `matches` by bracket precedence. The sort is stable.
pub fn sort<T>(matches: &mut [T])
where
    T: AsRef<Match>,
{
    matches.sort_by_cached_key(|m| Precedence::from_name(&m.as_ref().name));
}

/// Returns the final matches of a snapshot in precedence order.
pub fn finals(matches: &[Match]) -> Vec<&Match> {
    let mut finals: Vec<&Match> = matches
        .iter()
        .filter(|m| Round::from_name(&m.name) == Round::Final)
        .collect();

    sort(&mut finals);
    finals
}
