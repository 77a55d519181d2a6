//! Error types for the ACL client.
//!
//! # Design
//! The gateway binding only treats 401/403 as failures; every other status is
//! decoded as a normal body. Auth failures and inconsistent creations carry
//! the raw response body so callers see the gateway's own message.

use thiserror::Error;

/// Errors returned by `AclClient` operations.
#[derive(Debug, Error)]
pub enum AclError {
    /// The request never produced a response (connect, DNS, TLS, timeout).
    #[error("transport error: {context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The gateway answered 401 or 403.
    #[error("not authorised, message from gateway: {0}")]
    Unauthorized(String),

    /// The response body could not be decoded into the expected shape.
    #[error("could not parse {context} response: {source}; body: {body}")]
    Decode {
        context: &'static str,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The gateway accepted the create call but returned no identifier.
    #[error("could not create acl, gateway returned: {0}")]
    CreationFailed(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The list filter could not be encoded as a query string.
    #[error("could not build query string: {0}")]
    QueryString(#[from] serde_urlencoded::ser::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AclError {
    pub fn transport<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        AclError::Transport {
            context: context.into(),
            source: source.into(),
        }
    }
}
