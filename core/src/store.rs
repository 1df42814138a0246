//! In-memory entry list kept consistent with the backend by refetching after
//! every successful mutation.
//!
//! # Design
//! State lives in a `watch` channel: readers take a `snapshot()` or
//! `subscribe()` and see every replacement. Mutations are never applied
//! locally; the list only changes when a `list()` call comes back. Nothing
//! serializes overlapping calls, so the refresh that resolves last wins.

use std::cmp::Reverse;

use tokio::sync::watch;

use crate::api::EntryApi;
use crate::error::ApiError;
use crate::types::{CreateEntry, EntryId, KnowledgeEntry, UpdateEntry};

/// What presentation code renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreState {
    /// Newest `updatedAt` first.
    pub entries: Vec<KnowledgeEntry>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

/// What to do with the current entries when a refresh fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnListError {
    Clear,
    Keep,
}

pub struct EntryStore<A> {
    api: A,
    state: watch::Sender<StoreState>,
}

impl<A: EntryApi> EntryStore<A> {
    /// Build a store without loading anything. `loading` starts out `true`
    /// until the first refresh finishes.
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self { api, state }
    }

    /// Build a store and run its initial refresh.
    pub async fn activate(api: A) -> Self {
        let store = Self::new(api);
        store.refresh().await;
        store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Refetch the whole list. A failed fetch empties `entries` and records
    /// the message in `error`.
    pub async fn refresh(&self) {
        self.reload(OnListError::Clear).await;
    }

    pub async fn add(&self, input: &CreateEntry) -> Result<(), ApiError> {
        let created = self.api.create(input).await.inspect_err(|error| {
            tracing::warn!(error = %error, "create failed");
        })?;
        tracing::info!(id = %created.id, "entry created");
        self.reload(OnListError::Keep).await;
        Ok(())
    }

    pub async fn edit(&self, id: &EntryId, input: &UpdateEntry) -> Result<(), ApiError> {
        self.api.update(id, input).await.inspect_err(|error| {
            tracing::warn!(id = %id, error = %error, "update failed");
        })?;
        tracing::info!(id = %id, "entry updated");
        self.reload(OnListError::Keep).await;
        Ok(())
    }

    pub async fn remove(&self, id: &EntryId) -> Result<(), ApiError> {
        self.api.delete(id).await.inspect_err(|error| {
            tracing::warn!(id = %id, error = %error, "delete failed");
        })?;
        tracing::info!(id = %id, "entry deleted");
        self.reload(OnListError::Keep).await;
        Ok(())
    }

    async fn reload(&self, on_error: OnListError) {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = self.api.list().await;

        self.state.send_modify(|state| {
            match result {
                Ok(mut entries) => {
                    sort_newest_first(&mut entries);
                    tracing::debug!(count = entries.len(), "entries refreshed");
                    state.entries = entries;
                }
                Err(error) => {
                    tracing::warn!(error = %error, "refresh failed");
                    state.error = Some(error.to_string());
                    if on_error == OnListError::Clear {
                        state.entries.clear();
                    }
                }
            }
            state.loading = false;
        });
    }
}

/// Stable sort by `updatedAt`, newest first. Entries whose timestamp does not
/// parse go last.
pub fn sort_newest_first(entries: &mut [KnowledgeEntry]) {
    entries.sort_by_cached_key(|entry| Reverse(entry.updated_at_time()));
}
