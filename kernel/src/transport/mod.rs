// Transport Abstraction
//
// Defines the request/response contract between the client and the
// logging API. The kernel never opens connections itself; callers inject
// an implementation.

use serde_json::{Map, Value};
use std::fmt;

mod replay;

pub use replay::ReplayTransport;

/// HTTP verb of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single API call, relative to the service root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub data: Map<String, Value>,
}

impl ApiRequest {
    pub fn post(path: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            data,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("no response available for {method} {path}")]
    Exhausted { method: Method, path: String },

    #[error("request failed: {0}")]
    Failed(String),
}

/// Connection to the logging API.
///
/// Implementations own retries, timeouts and authentication. The kernel
/// treats every call as either one decoded JSON response or one error.
pub trait Transport: Send + Sync {
    fn api_request(&self, request: ApiRequest) -> Result<Value, TransportError>;
}
