//! Server-assigned identifiers and the logic to recover them from create responses.
//!
//! The service is not consistent about where a freshly created identifier ends up. Depending on
//! the endpoint (and the service revision) it is either in the `Location` header, in an `id`
//! field of a JSON body, or the whole body is the bare identifier. [`IdStrategy::extract`] tries
//! each source in order.
use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use ::http::Uri;
use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! id {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[inline]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Display for $name {
            #[inline]
            fn fmt(&self, f: &mut Formatter) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            #[inline]
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            #[inline]
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            #[inline]
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }
    };
}

id!(TournamentId);
id!(GroupId);
id!(TeamId);
id!(MatchId);

/// The parts of a create response that may carry the new identifier.
#[derive(Copy, Clone, Debug)]
pub struct Created<'a> {
    pub location: Option<&'a str>,
    pub body: &'a [u8],
}

/// A single source an identifier can be extracted from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IdStrategy {
    /// The last path segment of the `Location` header.
    LocationHeader,
    /// The `id` field of a JSON object body.
    JsonField,
    /// The whole body, trimmed. A JSON string literal is unquoted.
    RawBody,
}

impl IdStrategy {
    /// All strategies in the order they are tried.
    pub const ORDER: [Self; 3] = [Self::LocationHeader, Self::JsonField, Self::RawBody];

    /// Tries all strategies in [`ORDER`] and returns the first identifier found.
    ///
    /// [`ORDER`]: Self::ORDER
    pub fn extract(created: Created<'_>) -> Option<String> {
        Self::ORDER
            .iter()
            .find_map(|strategy| strategy.apply(created))
    }

    pub fn apply(self, created: Created<'_>) -> Option<String> {
        let id = match self {
            Self::LocationHeader => created.location.and_then(last_segment),
            Self::JsonField => match serde_json::from_slice(created.body).ok()? {
                Value::Object(map) => match map.get("id")? {
                    Value::String(id) => Some(id.trim().to_owned()),
                    Value::Number(id) => Some(id.to_string()),
                    _ => None,
                },
                _ => None,
            },
            Self::RawBody => {
                let body = std::str::from_utf8(created.body).ok()?.trim();

                match serde_json::from_str(body) {
                    Ok(Value::String(id)) => Some(id.trim().to_owned()),
                    // Any other JSON document is structured data without an `id`; it is not
                    // an identifier either.
                    Ok(Value::Object(_)) | Ok(Value::Array(_)) | Ok(Value::Null) => None,
                    _ => Some(body.to_owned()),
                }
            }
        };

        id.filter(|id| !id.is_empty())
    }
}

/// The last non-empty path segment of a `Location` value. Absolute URIs only contribute their
/// path, so `http://host/` has no identifier. A value without a scheme or leading `/` is taken
/// as a bare identifier.
fn last_segment(location: &str) -> Option<String> {
    let location = location.trim();

    let path = match location.parse::<Uri>() {
        Ok(uri) if uri.scheme().is_some() || uri.authority().is_none() => uri.path().to_owned(),
        _ => location.to_owned(),
    };

    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
}
