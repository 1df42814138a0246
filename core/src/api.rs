//! Async API surface: a `Transport` that performs the round-trip and an
//! `EntryApi` that the store talks to.
//!
//! # Design
//! `KnowledgeClient` stays free of I/O. `HttpEntryApi` pairs it with a
//! `Transport`, so each logical operation is build → execute → parse and
//! every failure along the way comes back as an `ApiError`.
//!
//! `UreqTransport` is blocking underneath; each request runs on tokio's
//! blocking pool so callers can simply `.await` it.

use async_trait::async_trait;
use chrono::Utc;

use crate::client::KnowledgeClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateEntry, EntryId, KnowledgeEntry, UpdateEntry};

/// Lists carry embedded images, so allow far more than ureq's 10 MB default.
const MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;

/// Executes a plain-data request against the network.
///
/// Non-2xx statuses are returned as data, not as `Err`; status
/// interpretation belongs to `KnowledgeClient`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// The operations the entry store needs from a backend.
#[async_trait]
pub trait EntryApi: Send + Sync {
    async fn list(&self) -> Result<Vec<KnowledgeEntry>, ApiError>;

    async fn get(&self, id: &EntryId) -> Result<KnowledgeEntry, ApiError>;

    async fn create(&self, input: &CreateEntry) -> Result<KnowledgeEntry, ApiError>;

    async fn update(&self, id: &EntryId, input: &UpdateEntry) -> Result<KnowledgeEntry, ApiError>;

    async fn delete(&self, id: &EntryId) -> Result<(), ApiError>;
}

/// `Transport` backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || send_blocking(&agent, request))
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
    }
}

fn send_blocking(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, ApiError> {
    let HttpRequest {
        method,
        path,
        headers,
        body,
    } = request;

    let result = match method {
        HttpMethod::Get => with_headers(agent.get(&path), &headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(&path), &headers).call(),
        HttpMethod::Post => send_body(with_headers(agent.post(&path), &headers), body),
        HttpMethod::Patch => send_body(with_headers(agent.patch(&path), &headers), body),
    };
    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .with_config()
        .limit(MAX_BODY_BYTES)
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

/// `EntryApi` over HTTP: `KnowledgeClient` for the wire format, `T` for I/O.
#[derive(Clone)]
pub struct HttpEntryApi<T = UreqTransport> {
    client: KnowledgeClient,
    transport: T,
}

impl HttpEntryApi<UreqTransport> {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(KnowledgeClient::new(&config.base_url), UreqTransport::new())
    }
}

impl<T: Transport> HttpEntryApi<T> {
    pub fn with_transport(client: KnowledgeClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &KnowledgeClient {
        &self.client
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method.as_str();
        let path = request.path.clone();
        tracing::debug!(method, path = %path, "sending request");
        match self.transport.execute(request).await {
            Ok(response) => {
                tracing::debug!(method, path = %path, status = response.status, "received response");
                Ok(response)
            }
            Err(error) => {
                tracing::warn!(method, path = %path, error = %error, "request failed");
                Err(error)
            }
        }
    }
}

#[async_trait]
impl<T: Transport> EntryApi for HttpEntryApi<T> {
    async fn list(&self) -> Result<Vec<KnowledgeEntry>, ApiError> {
        let response = self.round_trip(self.client.build_list_entries()).await?;
        self.client.parse_list_entries(response)
    }

    async fn get(&self, id: &EntryId) -> Result<KnowledgeEntry, ApiError> {
        let response = self.round_trip(self.client.build_get_entry(id)).await?;
        self.client.parse_get_entry(response)
    }

    async fn create(&self, input: &CreateEntry) -> Result<KnowledgeEntry, ApiError> {
        let request = self.client.build_create_entry(input, Utc::now())?;
        let response = self.round_trip(request).await?;
        self.client.parse_create_entry(response)
    }

    async fn update(&self, id: &EntryId, input: &UpdateEntry) -> Result<KnowledgeEntry, ApiError> {
        let request = self.client.build_update_entry(id, input, Utc::now())?;
        let response = self.round_trip(request).await?;
        self.client.parse_update_entry(response)
    }

    async fn delete(&self, id: &EntryId) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_delete_entry(id)).await?;
        self.client.parse_delete_entry(response)
    }
}
