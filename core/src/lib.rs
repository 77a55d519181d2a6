//! Blocking client for the ACL resource of the gateway's admin API.
//!
//! # Overview
//! `AdminClient` holds the shared `Config` and `Transport`; `acls()` hands out
//! an `AclClient` whose methods each map to exactly one HTTP request. No
//! retries, no caching: every call reflects a fresh round-trip.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest` / `HttpResponse`),
//!   and every operation exposes its `build_*` / `parse_*` halves so the
//!   wire behaviour can be checked without a network.
//! - `UreqTransport` is the default `Transport`; tests inject their own.
//! - Only 401/403 are errors at the HTTP level. Other statuses are decoded.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{AclClient, AdminClient};
pub use config::Config;
pub use error::AclError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Acl, AclFilter, AclRequest, Acls, Consumer};
