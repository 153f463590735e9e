use crate::{Error, Result};

use http::header::{CONTENT_TYPE, LOCATION};
use http::{Method, StatusCode};
use hyper::body::{self, Bytes};
use hyper::client::HttpConnector;
use hyper::Body;
use hyper_tls::HttpsConnector;
use serde::Serialize;

/// A thin wrapper around a pooled hyper client. Cloning is cheap and all clones share the same
/// connection pool.
#[derive(Clone, Debug)]
pub struct Client {
    inner: hyper::Client<HttpsConnector<HttpConnector>>,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn send(&self, request: Request) -> Result<Response> {
        log::trace!("{} {}", request.method, request.uri);

        let req = hyper::Request::try_from(request)?;
        let resp = self.inner.request(req).await?;

        Ok(Response { inner: resp })
    }
}

impl Default for Client {
    fn default() -> Self {
        Self {
            inner: hyper::Client::builder().build(HttpsConnector::new()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Request {
    uri: String,
    method: Method,
    headers: Vec<(&'static str, String)>,
    body: Option<String>,
}

impl Request {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Default for Request {
    fn default() -> Self {
        Self {
            uri: String::new(),
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RequestBuilder {
    inner: Request,
    error: Option<serde_json::Error>,
}

impl RequestBuilder {
    /// Creates a new `RequestBuilder` with all uris relative to `base`.
    pub fn new(base: &str) -> Self {
        let inner = Request {
            uri: base.trim_end_matches('/').to_owned(),
            ..Default::default()
        };

        Self { inner, error: None }
    }

    /// Sets the request method to `GET`.
    pub fn get(mut self) -> Self {
        self.inner.method = Method::GET;
        self
    }

    /// Sets the request method to `POST`.
    pub fn post(mut self) -> Self {
        self.inner.method = Method::POST;
        self
    }

    /// Sets the request method to `PATCH`.
    pub fn patch(mut self) -> Self {
        self.inner.method = Method::PATCH;
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.inner.uri.push_str(uri);
        self
    }

    /// Adds an header to the request.
    pub fn header<T>(mut self, key: &'static str, value: T) -> Self
    where
        T: ToString,
    {
        self.inner.headers.push((key, value.to_string()));
        self
    }

    /// Uses `T` serialized as json as the request body.
    pub fn body<T>(mut self, body: &T) -> Self
    where
        T: Serialize,
    {
        match serde_json::to_string(body) {
            Ok(body) => self.inner.body = Some(body),
            Err(err) => self.error = Some(err),
        }

        self.header(CONTENT_TYPE.as_str(), "application/json")
    }

    /// Finishes the request.
    ///
    /// # Errors
    ///
    /// Returns an error if serializing the body failed.
    pub fn build(self) -> Result<Request> {
        match self.error {
            Some(err) => Err(err.into()),
            None => Ok(self.inner),
        }
    }
}

impl TryFrom<Request> for hyper::Request<Body> {
    type Error = Error;

    fn try_from(request: Request) -> Result<Self> {
        let body = match request.body {
            Some(body) => Body::from(body),
            None => Body::empty(),
        };

        let mut builder = hyper::Request::builder()
            .uri(request.uri)
            .method(request.method);

        for (key, value) in request.headers {
            builder = builder.header(key, value);
        }

        Ok(builder.body(body)?)
    }
}

#[derive(Debug)]
pub struct Response {
    inner: hyper::Response<Body>,
}

impl Response {
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Returns `true` if the response contains a 2xx status code.
    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Returns the value of the `Location` header, if present and valid UTF-8.
    pub fn location(&self) -> Option<&str> {
        self.inner
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    pub async fn bytes(self) -> Result<Bytes> {
        Ok(body::to_bytes(self.inner.into_body()).await?)
    }
}
