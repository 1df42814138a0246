//! In-memory stand-in for the knowledge-entries backend.
//!
//! Behaves like a json-server collection: numeric ids handed out from 1,
//! client-sent timestamps are stored as given, and missing ones are stamped
//! with the current time.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEntry {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntry {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntry {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Default)]
pub struct Collection {
    next_id: u64,
    entries: BTreeMap<u64, KnowledgeEntry>,
}

pub type Db = Arc<RwLock<Collection>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Collection::default()));
    Router::new()
        .route("/knowledge-entries", get(list_entries).post(create_entry))
        .route(
            "/knowledge-entries/{id}",
            get(get_entry).patch(update_entry).delete(delete_entry),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn list_entries(State(db): State<Db>) -> Json<Vec<KnowledgeEntry>> {
    let db = db.read().await;
    Json(db.entries.values().cloned().collect())
}

async fn create_entry(
    State(db): State<Db>,
    Json(input): Json<CreateEntry>,
) -> (StatusCode, Json<KnowledgeEntry>) {
    let mut db = db.write().await;
    db.next_id += 1;
    let stamp = now();
    let entry = KnowledgeEntry {
        id: db.next_id,
        title: input.title,
        description: input.description,
        image: input.image,
        created_at: input.created_at.unwrap_or_else(|| stamp.clone()),
        updated_at: input.updated_at.unwrap_or(stamp),
    };
    db.entries.insert(entry.id, entry.clone());
    tracing::info!(id = entry.id, "entry created");
    (StatusCode::CREATED, Json(entry))
}

async fn get_entry(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<KnowledgeEntry>, StatusCode> {
    let db = db.read().await;
    db.entries.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_entry(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateEntry>,
) -> Result<Json<KnowledgeEntry>, StatusCode> {
    let mut db = db.write().await;
    let entry = db.entries.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        entry.title = title;
    }
    if let Some(description) = input.description {
        entry.description = description;
    }
    if let Some(image) = input.image {
        entry.image = Some(image);
    }
    entry.updated_at = input.updated_at.unwrap_or_else(now);
    tracing::info!(id, "entry updated");
    Ok(Json(entry.clone()))
}

async fn delete_entry(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut db = db.write().await;
    db.entries
        .remove(&id)
        .map(|_| {
            tracing::info!(id, "entry deleted");
            StatusCode::NO_CONTENT
        })
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_serializes_with_numeric_id() {
        let entry = KnowledgeEntry {
            id: 1,
            title: "Test".to_string(),
            description: "Body".to_string(),
            image: None,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00.000Z");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn create_entry_timestamps_optional() {
        let input: CreateEntry =
            serde_json::from_str(r#"{"title":"T","description":"D"}"#).unwrap();
        assert!(input.created_at.is_none());
        assert!(input.updated_at.is_none());
        assert!(input.image.is_none());
    }

    #[test]
    fn create_entry_rejects_missing_title() {
        let result: Result<CreateEntry, _> = serde_json::from_str(r#"{"description":"D"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_entry_partial_fields() {
        let input: UpdateEntry = serde_json::from_str(r#"{"description":"New"}"#).unwrap();
        assert_eq!(input.description.as_deref(), Some("New"));
        assert!(input.title.is_none());
        assert!(input.updated_at.is_none());
    }

    #[test]
    fn now_is_millisecond_utc() {
        let stamp = now();
        assert!(stamp.ends_with('Z'));
        assert_eq!(stamp.len(), "2024-01-01T00:00:00.000Z".len());
    }
}
