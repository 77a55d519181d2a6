//! Client for the gateway's ACL resource.
//!
//! # Design
//! Every operation is split into a pure `build_*` method that produces an
//! `HttpRequest` and a pure `parse_*` method that consumes an `HttpResponse`.
//! The round-trip methods (`list`, `create`, ...) glue the two together
//! through the client's `Transport`. Handles hold only shared read-only state,
//! so they can be cloned freely and used from several threads at once.
//!
//! Only 401/403 are treated as failures. Any other status is decoded like a
//! success body, which is how the gateway binding has always behaved.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AclError;
use crate::http::{add_query_string, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Acl, AclFilter, AclRequest, Acls, Consumer};

pub const ACLS_PATH: &str = "/acls/";
pub const CONSUMERS_PATH: &str = "/consumers/";

/// Entry point holding the shared configuration and transport.
pub struct AdminClient<T: Transport = UreqTransport> {
    config: Arc<Config>,
    transport: Arc<T>,
}

impl AdminClient<UreqTransport> {
    pub fn new(config: Config) -> Self {
        let transport = UreqTransport::new(&config);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> AdminClient<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn acls(&self) -> AclClient<T> {
        AclClient {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }
}

/// Operations on ACL group memberships.
pub struct AclClient<T: Transport = UreqTransport> {
    config: Arc<Config>,
    transport: Arc<T>,
}

impl<T: Transport> Clone for AclClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> AclClient<T> {
    fn acls_url(&self) -> String {
        format!("{}{ACLS_PATH}", self.config.host_address)
    }

    fn consumer_acls_url(&self, consumer_id: &str) -> String {
        format!("{}{CONSUMERS_PATH}{consumer_id}/acls/", self.config.host_address)
    }

    pub fn build_get_consumer_by_acl_id(&self, acl_id: &str) -> HttpRequest {
        HttpRequest::get(&self.config, format!("{}{acl_id}/consumer", self.acls_url()))
    }

    pub fn build_get_by_id(&self, id: &str) -> HttpRequest {
        HttpRequest::get(&self.config, format!("{}{id}", self.acls_url()))
    }

    pub fn build_get_acls_for_consumer(&self, consumer_id: &str) -> HttpRequest {
        HttpRequest::get(&self.config, self.consumer_acls_url(consumer_id))
    }

    pub fn build_list_filtered(&self, filter: Option<&AclFilter>) -> Result<HttpRequest, AclError> {
        let url = add_query_string(&self.acls_url(), filter)?;
        Ok(HttpRequest::get(&self.config, url))
    }

    pub fn build_create(&self, consumer_id: &str, request: &AclRequest) -> Result<HttpRequest, AclError> {
        HttpRequest::post(&self.config, self.consumer_acls_url(consumer_id)).with_json_body(request)
    }

    pub fn build_delete_by_id(&self, id: &str) -> HttpRequest {
        HttpRequest::delete(&self.config, format!("{}{id}", self.acls_url()))
    }

    /// An empty consumer id in the body means "no consumer", not an error.
    pub fn parse_get_consumer_by_acl_id(&self, response: HttpResponse) -> Result<Option<Consumer>, AclError> {
        check_authorized(&response)?;
        let consumer: Consumer = decode("acl consumer", &response)?;
        if consumer.id.is_empty() {
            return Ok(None);
        }
        Ok(Some(consumer))
    }

    pub fn parse_get_by_id(&self, response: HttpResponse) -> Result<Option<Acl>, AclError> {
        check_authorized(&response)?;
        let acl: Acl = decode("acl get", &response)?;
        match acl.id.as_deref() {
            None | Some("") => Ok(None),
            Some(_) => Ok(Some(acl)),
        }
    }

    pub fn parse_get_acls_for_consumer(&self, response: HttpResponse) -> Result<Acls, AclError> {
        check_authorized(&response)?;
        decode("consumer acls", &response)
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Acls, AclError> {
        check_authorized(&response)?;
        decode("acls list", &response)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<Acl, AclError> {
        check_authorized(&response)?;
        let created: Acl = decode("acl creation", &response)?;
        if created.id.is_none() {
            warn!(status = response.status, "gateway returned no id for created acl");
            return Err(AclError::CreationFailed(response.body));
        }
        Ok(created)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), AclError> {
        check_authorized(&response)
    }

    /// Look up the consumer owning the ACL `acl_id`.
    pub fn get_consumer_by_acl_id(&self, acl_id: &str) -> Result<Option<Consumer>, AclError> {
        let response = self.round_trip(self.build_get_consumer_by_acl_id(acl_id))?;
        self.parse_get_consumer_by_acl_id(response)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Acl>, AclError> {
        let response = self.round_trip(self.build_get_by_id(id))?;
        self.parse_get_by_id(response)
    }

    pub fn get_acls_for_consumer(&self, consumer_id: &str) -> Result<Acls, AclError> {
        let response = self.round_trip(self.build_get_acls_for_consumer(consumer_id))?;
        self.parse_get_acls_for_consumer(response)
    }

    pub fn list(&self) -> Result<Acls, AclError> {
        self.list_filtered(None)
    }

    pub fn list_filtered(&self, filter: Option<&AclFilter>) -> Result<Acls, AclError> {
        let response = self.round_trip(self.build_list_filtered(filter)?)?;
        self.parse_list(response)
    }

    /// Add the consumer `consumer_id` to `request.group`.
    pub fn create(&self, consumer_id: &str, request: &AclRequest) -> Result<Acl, AclError> {
        let response = self.round_trip(self.build_create(consumer_id, request)?)?;
        self.parse_create(response)
    }

    pub fn delete_by_id(&self, id: &str) -> Result<(), AclError> {
        let response = self.round_trip(self.build_delete_by_id(id))?;
        self.parse_delete(response)
    }

    /// ACLs have no name of their own; the gateway resolves the path segment.
    pub fn delete_by_name(&self, name: &str) -> Result<(), AclError> {
        self.delete_by_id(name)
    }

    fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, AclError> {
        let method = request.method.as_str();
        let path = request.path.clone();
        let response = self.transport.execute(request)?;
        debug!(method, path = %path, status = response.status, "gateway request");
        Ok(response)
    }
}

fn check_authorized(response: &HttpResponse) -> Result<(), AclError> {
    if response.is_unauthorized() {
        warn!(status = response.status, "gateway rejected credentials");
        return Err(AclError::Unauthorized(response.body.clone()));
    }
    Ok(())
}

fn decode<D: DeserializeOwned>(context: &'static str, response: &HttpResponse) -> Result<D, AclError> {
    serde_json::from_str(&response.body).map_err(|source| AclError::Decode {
        context,
        body: response.body.clone(),
        source,
    })
}
