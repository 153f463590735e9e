use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::id::{MatchId, TeamId, TournamentId};
use crate::{Client, Result};

/// A single match of a bracket as reported by the service.
///
/// Team slots stay empty until bracket progression fills them in. The `name` encodes the
/// bracket position: a round prefix (`W` winners, `L` losers, `F` final) followed by an index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(default)]
    pub id: MatchId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<TournamentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_team_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_team_id: Option<TeamId>,
    #[serde(default, deserialize_with = "nullable")]
    pub score: Score,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub winner_next_match_id: Option<MatchId>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub loser_next_match_id: Option<MatchId>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub round_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub bracket_type: Option<BracketSide>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub is_first_final: Option<bool>,
}

impl Match {
    /// Returns the home team if the slot is populated.
    pub fn home_team(&self) -> Option<&TeamId> {
        self.home_team_id.as_ref().filter(|id| !id.is_empty())
    }

    /// Returns the visitor team if the slot is populated.
    pub fn visitor_team(&self) -> Option<&TeamId> {
        self.visitor_team_id.as_ref().filter(|id| !id.is_empty())
    }

    /// Returns `true` if both team slots are populated.
    pub fn has_teams(&self) -> bool {
        self.home_team().is_some() && self.visitor_team().is_some()
    }
}

impl AsRef<Match> for Match {
    #[inline]
    fn as_ref(&self) -> &Match {
        self
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    #[serde(default)]
    pub home_team_score: i64,
    #[serde(default)]
    pub visitor_team_score: i64,
}

impl Score {
    pub const fn new(home_team_score: i64, visitor_team_score: i64) -> Self {
        Self {
            home_team_score,
            visitor_team_score,
        }
    }

    /// Returns `true` if neither side has scored.
    pub fn is_zero(&self) -> bool {
        self.home_team_score == 0 && self.visitor_team_score == 0
    }
}

/// The side of a double elimination bracket a match belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BracketSide {
    Winners,
    Losers,
    Final,
}

/// Decodes the body of `GET /tournaments/{tid}/matches`. `null` entries are skipped and an
/// empty body is an empty list.
///
/// # Errors
///
/// Returns an error if the body is neither a sequence of matches nor an object with an `items`
/// sequence.
pub fn decode_matches(body: &[u8]) -> Result<Vec<Match>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let items = match serde_json::from_slice(body)? {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Null) | None => return Ok(Vec::new()),
            Some(items) => items,
        },
        value => value,
    };

    let items: Vec<Option<Match>> = serde_json::from_value(items)?;
    Ok(items.into_iter().flatten().collect())
}

/// Decodes informational fields. A value of an unexpected type or outside a known set becomes
/// `None` instead of failing the whole snapshot.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize)]
struct ScoreUpdate {
    score: Score,
}

#[derive(Copy, Clone, Debug)]
pub struct MatchesClient<'a> {
    client: &'a Client,
    tournament_id: &'a TournamentId,
}

impl<'a> MatchesClient<'a> {
    pub(crate) fn new(client: &'a Client, tournament_id: &'a TournamentId) -> Self {
        Self {
            client,
            tournament_id,
        }
    }

    /// Returns a snapshot of all matches of the tournament in the order the service reports
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadStatus`] if the service responds with a non-2xx status, or an error
    /// if the response could not be decoded.
    ///
    /// [`Error::BadStatus`]: crate::Error::BadStatus
    pub async fn list(&self) -> Result<Vec<Match>> {
        let uri = format!("/tournaments/{}/matches", self.tournament_id);

        let req = self.client.request().get().uri(&uri).build()?;

        let body = self.client.send_ok(req).await?.bytes().await?;
        decode_matches(&body)
    }

    /// Overwrites the score of a match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadStatus`] if the service responds with a non-2xx status.
    ///
    /// [`Error::BadStatus`]: crate::Error::BadStatus
    pub async fn update_score(&self, match_id: &MatchId, score: Score) -> Result<()> {
        let uri = format!("/tournaments/{}/matches/{}", self.tournament_id, match_id);

        let req = self
            .client
            .request()
            .patch()
            .uri(&uri)
            .body(&ScoreUpdate { score })
            .build()?;

        self.client.send_ok(req).await?;
        Ok(())
    }
}
