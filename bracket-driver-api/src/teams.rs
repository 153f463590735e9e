use serde::{Deserialize, Serialize};

use crate::id::TeamId;
use crate::{Client, Resource, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TeamId>,
    pub name: String,
}

/// A reference to an existing team, as accepted by the group endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: TeamId,
}

#[derive(Copy, Clone, Debug)]
pub struct TeamsClient<'a> {
    client: &'a Client,
}

impl<'a> TeamsClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Creates a new team with the given `name` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceCreation`] if the service rejects the team or no id could be
    /// extracted from the response.
    ///
    /// [`Error::ResourceCreation`]: crate::Error::ResourceCreation
    pub async fn create(&self, name: &str) -> Result<TeamId> {
        let body = Team {
            id: None,
            name: name.to_owned(),
        };

        let req = self.client.request().post().uri("/teams").body(&body).build()?;

        self.client.create(Resource::Team, req).await.map(TeamId)
    }
}
