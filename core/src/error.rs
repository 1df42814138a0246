//! Error types for the knowledge-entries API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the entry does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `Status` with the raw
//! status code and body for debugging.
//!
//! The `Display` output is the message shown to users, so status errors
//! render as `API Error: <code> <reason>` and never include the body.

use thiserror::Error;

/// Errors produced anywhere between building a request and decoding its
/// response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("API Error: 404 Not Found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("{}", status_line(.status))]
    Status { status: u16, body: String },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn status_line(status: &u16) -> String {
    let reason = ureq::http::StatusCode::from_u16(*status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("");
    format!("API Error: {status} {reason}").trim_end().to_string()
}

pub type Result<T> = std::result::Result<T, ApiError>;
