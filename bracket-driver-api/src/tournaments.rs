pub mod groups;
pub mod matches;

use self::{groups::GroupsClient, matches::MatchesClient};

use crate::id::TournamentId;
use crate::{Client, Resource, Result};

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TournamentId>,
    pub name: String,
    pub format: Format,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    pub max_teams_per_group: u32,
    pub number_of_groups: u32,
    #[serde(rename = "type")]
    pub kind: BracketType,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            max_teams_per_group: 32,
            number_of_groups: 1,
            kind: BracketType::DoubleElimination,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BracketType {
    SingleElimination,
    #[default]
    DoubleElimination,
}

impl BracketType {
    /// A short tag used in generated tournament names.
    pub fn tag(self) -> &'static str {
        match self {
            Self::SingleElimination => "SE",
            Self::DoubleElimination => "DE",
        }
    }
}

impl Display for BracketType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::SingleElimination => "SINGLE_ELIMINATION",
            Self::DoubleElimination => "DOUBLE_ELIMINATION",
        })
    }
}

impl FromStr for BracketType {
    type Err = UnknownBracketType;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "SINGLE_ELIMINATION" | "SINGLE" => Ok(Self::SingleElimination),
            "DOUBLE_ELIMINATION" | "DOUBLE" => Ok(Self::DoubleElimination),
            _ => Err(UnknownBracketType(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown bracket type: {0}")]
pub struct UnknownBracketType(pub String);

#[derive(Copy, Clone, Debug)]
pub struct TournamentsClient<'a> {
    client: &'a Client,
}

impl<'a> TournamentsClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Creates a new [`Tournament`] and returns its id. The `id` field of `tournament` is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceCreation`] if the service rejects the tournament or no id could
    /// be extracted from the response.
    ///
    /// [`Error::ResourceCreation`]: crate::Error::ResourceCreation
    pub async fn create(&self, tournament: &Tournament) -> Result<TournamentId> {
        let body = Tournament {
            id: None,
            ..tournament.clone()
        };

        let req = self
            .client
            .request()
            .post()
            .uri("/tournaments")
            .body(&body)
            .build()?;

        self.client
            .create(Resource::Tournament, req)
            .await
            .map(TournamentId)
    }

    pub fn groups(&self, tournament_id: &'a TournamentId) -> GroupsClient<'a> {
        GroupsClient::new(self.client, tournament_id)
    }

    pub fn matches(&self, tournament_id: &'a TournamentId) -> MatchesClient<'a> {
        MatchesClient::new(self.client, tournament_id)
    }
}
