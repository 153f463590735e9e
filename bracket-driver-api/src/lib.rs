pub mod http;
pub mod id;
pub mod teams;
pub mod tournaments;

use std::fmt::{self, Display, Formatter};

pub use ::http::{Method, StatusCode};
use thiserror::Error;

use crate::http::{Request, RequestBuilder, Response};
use crate::id::{Created, IdStrategy};
use crate::teams::TeamsClient;
use crate::tournaments::TournamentsClient;

pub type Result<T> = std::result::Result<T, Error>;

/// A client for the tournament bracket service.
#[derive(Clone, Debug)]
pub struct Client {
    base_url: String,
    inner: http::Client,
}

impl Client {
    pub fn new<T>(base_url: T) -> Self
    where
        T: ToString,
    {
        Self {
            base_url: base_url.to_string(),
            inner: http::Client::new(),
        }
    }

    pub fn teams(&self) -> TeamsClient<'_> {
        TeamsClient::new(self)
    }

    pub fn tournaments(&self) -> TournamentsClient<'_> {
        TournamentsClient::new(self)
    }

    pub(crate) fn request(&self) -> RequestBuilder {
        RequestBuilder::new(&self.base_url)
    }

    pub(crate) async fn send(&self, request: Request) -> Result<Response> {
        self.inner.send(request).await
    }

    /// Sends a request and fails with [`Error::BadStatus`] unless the service responded with a
    /// 2xx status code.
    pub(crate) async fn send_ok(&self, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let path = request
            .uri()
            .strip_prefix(self.base_url.trim_end_matches('/'))
            .unwrap_or(request.uri())
            .to_owned();

        let resp = self.send(request).await?;

        if resp.is_success() {
            Ok(resp)
        } else {
            Err(Error::BadStatus {
                method,
                path,
                status: resp.status(),
            })
        }
    }

    /// Sends a create request and extracts the identifier of the new `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceCreation`] if the service responded with a non-2xx status or
    /// the response carried no identifier.
    pub(crate) async fn create(&self, resource: Resource, request: Request) -> Result<String> {
        let resp = self.send(request).await?;

        if !resp.is_success() {
            return Err(Error::ResourceCreation {
                resource,
                reason: CreationFailure::Status(resp.status()),
            });
        }

        let location = resp.location().map(ToOwned::to_owned);
        let body = resp.bytes().await?;

        match IdStrategy::extract(Created {
            location: location.as_deref(),
            body: &body,
        }) {
            Some(id) => {
                log::debug!("Created {} {}", resource, id);
                Ok(id)
            }
            None => Err(Error::ResourceCreation {
                resource,
                reason: CreationFailure::MissingId,
            }),
        }
    }
}

/// The kind of resource a create call was made for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    Team,
    Tournament,
    Group,
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Team => "team",
            Self::Tournament => "tournament",
            Self::Group => "group",
        })
    }
}

/// Why a create call did not produce an identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum CreationFailure {
    #[error("service responded with {0}")]
    Status(StatusCode),
    #[error("no identifier in the response")]
    MissingId,
}

#[derive(Debug, Error)]
pub enum Error {
    /// A create call returned a non-2xx status or no identifier could be extracted from its
    /// response.
    #[error("failed to create {resource}: {reason}")]
    ResourceCreation {
        resource: Resource,
        reason: CreationFailure,
    },
    /// A read or update call returned a non-2xx status.
    #[error("{method} {path} failed with status {status}")]
    BadStatus {
        method: Method,
        path: String,
        status: StatusCode,
    },
    #[error("http: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("invalid request: {0}")]
    Http(#[from] ::http::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
