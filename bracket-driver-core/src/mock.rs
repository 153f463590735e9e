//! In-memory backends for tests.
use std::collections::VecDeque;

use bracket_driver_api::id::{GroupId, MatchId, TeamId, TournamentId};
use bracket_driver_api::tournaments::groups::AddTeamsRoute;
use bracket_driver_api::tournaments::matches::{Match, Score};
use bracket_driver_api::tournaments::Tournament;
use bracket_driver_api::{Error, Method, Result, StatusCode};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;

use crate::Backend;

fn bad_status(path: String) -> Error {
    Error::BadStatus {
        method: Method::PATCH,
        path,
        status: StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A bracket that advances winners and losers into their next matches on every score update,
/// the way the service does.
#[derive(Debug, Default)]
pub struct MockBracket {
    pub matches: Mutex<Vec<Match>>,
    pub updates: Mutex<Vec<(MatchId, Score)>>,
    pub fail_on: Option<MatchId>,
    pub created: Mutex<Vec<String>>,
    pub added: Mutex<Vec<Vec<TeamId>>>,
}

impl MockBracket {
    pub fn new(matches: Vec<Match>) -> Self {
        Self {
            matches: Mutex::new(matches),
            ..Default::default()
        }
    }

    /// A four team double elimination bracket:
    ///
    /// ```text
    /// W1 (a, b) --win--> W3 --win--> F1
    /// W2 (c, d) --win--> W3 --lose-> L2
    /// W1, W2    --lose-> L1 --win--> L2 --win--> F1
    /// ```
    pub fn double_elimination() -> Self {
        Self::new(vec![
            new_match("m-f1", "F1", None, None, None, None),
            new_match("m-l2", "L2", None, None, Some("m-f1"), None),
            new_match("m-w3", "W3", None, None, Some("m-f1"), Some("m-l2")),
            new_match("m-l1", "L1", None, None, Some("m-l2"), None),
            new_match("m-w2", "W2", Some("c"), Some("d"), Some("m-w3"), Some("m-l1")),
            new_match("m-w1", "W1", Some("a"), Some("b"), Some("m-w3"), Some("m-l1")),
        ])
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().len()
    }

    pub fn updated_names(&self) -> Vec<String> {
        let matches = self.matches.lock();

        self.updates
            .lock()
            .iter()
            .map(|(id, _)| {
                matches
                    .iter()
                    .find(|m| m.id == *id)
                    .map(|m| m.name.clone())
                    .unwrap_or_default()
            })
            .collect()
    }

    fn apply(&self, match_id: &MatchId, score: Score) -> Result<()> {
        if self.fail_on.as_ref() == Some(match_id) {
            return Err(bad_status(format!("/tournaments/t/matches/{}", match_id)));
        }

        let mut matches = self.matches.lock();

        let m = matches
            .iter_mut()
            .find(|m| m.id == *match_id)
            .ok_or_else(|| bad_status(format!("/tournaments/t/matches/{}", match_id)))?;
        m.score = score;

        let (home, visitor) = (m.home_team_id.clone(), m.visitor_team_id.clone());
        let (winner, loser) = if score.home_team_score > score.visitor_team_score {
            (home, visitor)
        } else {
            (visitor, home)
        };
        let (winner_next, loser_next) = (m.winner_next_match_id.clone(), m.loser_next_match_id.clone());

        for (team, next) in [(winner, winner_next), (loser, loser_next)] {
            if let (Some(team), Some(next)) = (team, next) {
                if let Some(next) = matches.iter_mut().find(|m| m.id == next) {
                    if next.home_team_id.is_none() {
                        next.home_team_id = Some(team);
                    } else {
                        next.visitor_team_id = Some(team);
                    }
                }
            }
        }

        self.updates.lock().push((match_id.clone(), score));
        Ok(())
    }
}

pub fn new_match(
    id: &str,
    name: &str,
    home: Option<&str>,
    visitor: Option<&str>,
    winner_next: Option<&str>,
    loser_next: Option<&str>,
) -> Match {
    Match {
        id: id.into(),
        name: name.into(),
        home_team_id: home.map(TeamId::from),
        visitor_team_id: visitor.map(TeamId::from),
        winner_next_match_id: winner_next.map(MatchId::from),
        loser_next_match_id: loser_next.map(MatchId::from),
        ..Default::default()
    }
}

impl Backend for MockBracket {
    fn create_team<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<TeamId>> {
        async move {
            let mut created = self.created.lock();
            created.push(name.to_owned());
            Ok(TeamId(format!("team-{}", created.len())))
        }
        .boxed()
    }

    fn create_tournament<'a>(
        &'a self,
        tournament: &'a Tournament,
    ) -> BoxFuture<'a, Result<TournamentId>> {
        async move {
            self.created.lock().push(tournament.name.clone());
            Ok(TournamentId::from("t"))
        }
        .boxed()
    }

    fn create_group<'a>(
        &'a self,
        _tournament: &'a TournamentId,
        name: &'a str,
    ) -> BoxFuture<'a, Result<GroupId>> {
        async move {
            self.created.lock().push(name.to_owned());
            Ok(GroupId::from("g"))
        }
        .boxed()
    }

    fn add_teams<'a>(
        &'a self,
        _tournament: &'a TournamentId,
        _group: &'a GroupId,
        teams: &'a [TeamId],
        _route: AddTeamsRoute,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            self.added.lock().push(teams.to_vec());
            Ok(())
        }
        .boxed()
    }

    fn matches<'a>(&'a self, _tournament: &'a TournamentId) -> BoxFuture<'a, Result<Vec<Match>>> {
        async move { Ok(self.matches.lock().clone()) }.boxed()
    }

    fn update_score<'a>(
        &'a self,
        _tournament: &'a TournamentId,
        match_id: &'a MatchId,
        score: Score,
    ) -> BoxFuture<'a, Result<()>> {
        async move { self.apply(match_id, score) }.boxed()
    }
}

/// Reports a scripted sequence of match counts, one per poll. The last count repeats once the
/// script is exhausted, unless `growing` is set, in which case every extra poll adds a match.
#[derive(Debug, Default)]
pub struct ScriptedCounts {
    pub counts: Mutex<VecDeque<usize>>,
    pub last: Mutex<usize>,
    pub polls: Mutex<u32>,
    pub growing: bool,
    pub signal: Option<bool>,
}

impl ScriptedCounts {
    pub fn new(counts: &[usize]) -> Self {
        Self {
            counts: Mutex::new(counts.iter().copied().collect()),
            ..Default::default()
        }
    }

    pub fn growing() -> Self {
        Self {
            growing: true,
            ..Default::default()
        }
    }

    pub fn polls(&self) -> u32 {
        *self.polls.lock()
    }

    fn next(&self) -> usize {
        *self.polls.lock() += 1;

        let mut last = self.last.lock();
        match self.counts.lock().pop_front() {
            Some(count) => *last = count,
            None if self.growing => *last += 1,
            None => (),
        }

        *last
    }
}

impl Backend for ScriptedCounts {
    fn create_team<'a>(&'a self, _name: &'a str) -> BoxFuture<'a, Result<TeamId>> {
        unimplemented!()
    }

    fn create_tournament<'a>(
        &'a self,
        _tournament: &'a Tournament,
    ) -> BoxFuture<'a, Result<TournamentId>> {
        unimplemented!()
    }

    fn create_group<'a>(
        &'a self,
        _tournament: &'a TournamentId,
        _name: &'a str,
    ) -> BoxFuture<'a, Result<GroupId>> {
        unimplemented!()
    }

    fn add_teams<'a>(
        &'a self,
        _tournament: &'a TournamentId,
        _group: &'a GroupId,
        _teams: &'a [TeamId],
        _route: AddTeamsRoute,
    ) -> BoxFuture<'a, Result<()>> {
        unimplemented!()
    }

    fn matches<'a>(&'a self, _tournament: &'a TournamentId) -> BoxFuture<'a, Result<Vec<Match>>> {
        let count = self.next();
        async move { Ok(vec![Match::default(); count]) }.boxed()
    }

    fn update_score<'a>(
        &'a self,
        _tournament: &'a TournamentId,
        _match_id: &'a MatchId,
        _score: Score,
    ) -> BoxFuture<'a, Result<()>> {
        unimplemented!()
    }

    fn completion_signal<'a>(
        &'a self,
        _tournament: &'a TournamentId,
    ) -> BoxFuture<'a, Result<Option<bool>>> {
        let signal = self.signal;
        async move { Ok(signal) }.boxed()
    }
}
