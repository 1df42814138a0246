//! Client core for the knowledge-entries service.
//!
//! # Overview
//! `KnowledgeClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern).
//! `HttpEntryApi` runs those requests through a `Transport`, and
//! `EntryStore` keeps an in-memory, newest-first list of entries that is
//! refetched after every successful mutation.
//!
//! # Design
//! - `KnowledgeClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Every failure is an `ApiError` value; nothing past the client boundary
//!   panics on a bad response.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod store;
pub mod types;
pub mod validate;

pub use api::{EntryApi, HttpEntryApi, Transport, UreqTransport};
pub use client::{normalize_ids, KnowledgeClient};
pub use config::{ClientConfig, API_URL_ENV, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use store::{EntryStore, StoreState};
pub use types::{CreateEntry, EntryId, KnowledgeEntry, UpdateEntry};
pub use validate::{validate_create, validate_update, EntryErrors};
