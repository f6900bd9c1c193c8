//! Request-line parsing.
//!
//! # Responsibilities
//! - Tokenize the first line of a connection into (method, path)
//! - Reject anything that is not a GET or HEAD with a typed error
//!
//! # Design Decisions
//! - Explicit tokenizer instead of a regex embedded in the handler
//! - Headers beyond the request line are never parsed or used
//! - HEAD is accepted but carries no special semantics downstream

use std::str::FromStr;

/// Supported request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
}

impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Head => write!(f, "HEAD"),
        }
    }
}

/// A parsed request line. Ephemeral; derived once per connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub path: String,
}

/// Error type for request-line parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestParseError {
    #[error("empty request line")]
    Empty,

    #[error("unsupported method {0:?}")]
    UnsupportedMethod(String),

    #[error("request line has no path")]
    MissingPath,
}

impl RequestLine {
    /// Parse the first line of a request into method and path.
    ///
    /// The HTTP version token, if present, is ignored; so is anything after
    /// it. Trailing CRLF is tolerated.
    pub fn parse(line: &str) -> Result<Self, RequestParseError> {
        let mut tokens = line.trim_end_matches(['\r', '\n']).split_whitespace();

        let method_token = tokens.next().ok_or(RequestParseError::Empty)?;
        let method = method_token
            .parse::<Method>()
            .map_err(|_| RequestParseError::UnsupportedMethod(method_token.to_string()))?;

        let path = tokens.next().ok_or(RequestParseError::MissingPath)?;

        Ok(Self {
            method,
            path: path.to_string(),
        })
    }
}
