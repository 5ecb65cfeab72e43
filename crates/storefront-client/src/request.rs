//! Outbound request description
//!
//! A request is data until the transport executes it: method, path, optional
//! JSON body, extra headers, and the `retried` marker that caps recovery at
//! one resubmission per original call.

use reqwest::Method;

/// A described HTTP call against the backend.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Set by recovery before the single resubmission; a request that fails
    /// 401 with this already set is terminal.
    pub retried: bool,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            headers: Vec::new(),
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: impl serde::Serialize) -> Self {
        // Serialization of our own DTOs cannot fail; a caller-supplied type
        // that does fail surfaces as a null body the server rejects.
        self.body = serde_json::to_value(body).ok();
        self
    }

    /// Attach a query-string parameter; the transport percent-encodes it.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Attach an extra header (request ids and bearer tokens are handled by
    /// the transport, not here).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}
