use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::{GroupId, TeamId, TournamentId};
use crate::teams::TeamRef;
use crate::{Client, Resource, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<GroupId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<TournamentId>,
}

/// The endpoint used to associate teams with a group. Revisions of the service disagree on
/// which one exists.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddTeamsRoute {
    /// `POST /tournaments/{tid}/groups/{gid}`
    #[default]
    Group,
    /// `PATCH /tournaments/{tid}/groups/{gid}/teams`
    GroupTeams,
}

impl Display for AddTeamsRoute {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Group => "group",
            Self::GroupTeams => "group_teams",
        })
    }
}

impl FromStr for AddTeamsRoute {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "group" => Ok(Self::Group),
            "group_teams" | "teams" => Ok(Self::GroupTeams),
            _ => Err(UnknownRoute(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown add-teams route: {0} (expected 'group' or 'group_teams')")]
pub struct UnknownRoute(pub String);

#[derive(Copy, Clone, Debug)]
pub struct GroupsClient<'a> {
    client: &'a Client,
    tournament_id: &'a TournamentId,
}

impl<'a> GroupsClient<'a> {
    pub(crate) fn new(client: &'a Client, tournament_id: &'a TournamentId) -> Self {
        Self {
            client,
            tournament_id,
        }
    }

    /// Creates a new group in the tournament and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceCreation`] if the service rejects the group or no id could be
    /// extracted from the response.
    ///
    /// [`Error::ResourceCreation`]: crate::Error::ResourceCreation
    pub async fn create(&self, name: &str) -> Result<GroupId> {
        let uri = format!("/tournaments/{}/groups", self.tournament_id);

        let body = Group {
            id: None,
            name: name.to_owned(),
            tournament_id: None,
        };

        let req = self.client.request().post().uri(&uri).body(&body).build()?;

        self.client.create(Resource::Group, req).await.map(GroupId)
    }

    /// Associates `teams` with the group, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadStatus`] if the service responds with a non-2xx status.
    ///
    /// [`Error::BadStatus`]: crate::Error::BadStatus
    pub async fn add_teams(
        &self,
        group_id: &GroupId,
        teams: &[TeamId],
        route: AddTeamsRoute,
    ) -> Result<()> {
        let body: Vec<TeamRef> = teams
            .iter()
            .map(|id| TeamRef { id: id.clone() })
            .collect();

        let req = match route {
            AddTeamsRoute::Group => self.client.request().post().uri(&format!(
                "/tournaments/{}/groups/{}",
                self.tournament_id, group_id
            )),
            AddTeamsRoute::GroupTeams => self.client.request().patch().uri(&format!(
                "/tournaments/{}/groups/{}/teams",
                self.tournament_id, group_id
            )),
        };

        self.client.send_ok(req.body(&body).build()?).await?;
        Ok(())
    }
}
