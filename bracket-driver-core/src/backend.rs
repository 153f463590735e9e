use bracket_driver_api::id::{GroupId, MatchId, TeamId, TournamentId};
use bracket_driver_api::tournaments::groups::AddTeamsRoute;
use bracket_driver_api::tournaments::matches::{Match, Score};
use bracket_driver_api::tournaments::Tournament;
use bracket_driver_api::{Client, Result};
use futures::future::BoxFuture;
use futures::FutureExt;

/// The remote operations the engine depends on.
///
/// [`Client`] is the production implementation. Every call is independent; implementations must
/// not cache state between calls.
pub trait Backend: Send + Sync {
    fn create_team<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<TeamId>>;

    fn create_tournament<'a>(
        &'a self,
        tournament: &'a Tournament,
    ) -> BoxFuture<'a, Result<TournamentId>>;

    fn create_group<'a>(
        &'a self,
        tournament: &'a TournamentId,
        name: &'a str,
    ) -> BoxFuture<'a, Result<GroupId>>;

    fn add_teams<'a>(
        &'a self,
        tournament: &'a TournamentId,
        group: &'a GroupId,
        teams: &'a [TeamId],
        route: AddTeamsRoute,
    ) -> BoxFuture<'a, Result<()>>;

    /// Returns the current match snapshot of the tournament.
    fn matches<'a>(&'a self, tournament: &'a TournamentId) -> BoxFuture<'a, Result<Vec<Match>>>;

    fn update_score<'a>(
        &'a self,
        tournament: &'a TournamentId,
        match_id: &'a MatchId,
        score: Score,
    ) -> BoxFuture<'a, Result<()>>;

    /// Returns an authoritative completion state if the service exposes one. `None` means the
    /// completion has to be inferred.
    fn completion_signal<'a>(
        &'a self,
        _tournament: &'a TournamentId,
    ) -> BoxFuture<'a, Result<Option<bool>>> {
        async { Ok(None) }.boxed()
    }
}

impl Backend for Client {
    fn create_team<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<TeamId>> {
        async move { self.teams().create(name).await }.boxed()
    }

    fn create_tournament<'a>(
        &'a self,
        tournament: &'a Tournament,
    ) -> BoxFuture<'a, Result<TournamentId>> {
        async move { self.tournaments().create(tournament).await }.boxed()
    }

    fn create_group<'a>(
        &'a self,
        tournament: &'a TournamentId,
        name: &'a str,
    ) -> BoxFuture<'a, Result<GroupId>> {
        async move { self.tournaments().groups(tournament).create(name).await }.boxed()
    }

    fn add_teams<'a>(
        &'a self,
        tournament: &'a TournamentId,
        group: &'a GroupId,
        teams: &'a [TeamId],
        route: AddTeamsRoute,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            self.tournaments()
                .groups(tournament)
                .add_teams(group, teams, route)
                .await
        }
        .boxed()
    }

    fn matches<'a>(&'a self, tournament: &'a TournamentId) -> BoxFuture<'a, Result<Vec<Match>>> {
        async move { self.tournaments().matches(tournament).list().await }.boxed()
    }

    fn update_score<'a>(
        &'a self,
        tournament: &'a TournamentId,
        match_id: &'a MatchId,
        score: Score,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            self.tournaments()
                .matches(tournament)
                .update_score(match_id, score)
                .await
        }
        .boxed()
    }
}
