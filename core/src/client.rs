//! Stateless HTTP request builder and response parser for the
//! knowledge-entries API.
//!
//! # Design
//! `KnowledgeClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Create and update stamp timestamps into the request body;
//! the instant is passed in so building stays deterministic.
//!
//! Every response body goes through `normalize_ids` before typed decoding.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateEntry, EntryId, KnowledgeEntry, UpdateEntry};

const COLLECTION: &str = "knowledge-entries";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody<'a> {
    #[serde(flatten)]
    input: &'a CreateEntry,
    created_at: String,
    updated_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody<'a> {
    #[serde(flatten)]
    input: &'a UpdateEntry,
    updated_at: String,
}

/// Synchronous, stateless client for the knowledge-entries API.
#[derive(Debug, Clone)]
pub struct KnowledgeClient {
    base_url: String,
}

impl KnowledgeClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/{COLLECTION}", self.base_url)
    }

    fn entry_url(&self, id: &EntryId) -> String {
        format!("{}/{COLLECTION}/{id}", self.base_url)
    }

    pub fn build_list_entries(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_entry(&self, id: &EntryId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.entry_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_entry(
        &self,
        input: &CreateEntry,
        now: DateTime<Utc>,
    ) -> Result<HttpRequest, ApiError> {
        let stamp = timestamp(now);
        let body = CreateBody {
            input,
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_url(),
            headers: json_headers(),
            body: Some(to_json(&body)?),
        })
    }

    pub fn build_update_entry(
        &self,
        id: &EntryId,
        input: &UpdateEntry,
        now: DateTime<Utc>,
    ) -> Result<HttpRequest, ApiError> {
        let body = UpdateBody {
            input,
            updated_at: timestamp(now),
        };
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            path: self.entry_url(id),
            headers: json_headers(),
            body: Some(to_json(&body)?),
        })
    }

    pub fn build_delete_entry(&self, id: &EntryId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.entry_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_entries(&self, response: HttpResponse) -> Result<Vec<KnowledgeEntry>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_get_entry(&self, response: HttpResponse) -> Result<KnowledgeEntry, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_create_entry(&self, response: HttpResponse) -> Result<KnowledgeEntry, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_update_entry(&self, response: HttpResponse) -> Result<KnowledgeEntry, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_delete_entry(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

/// Coerce `id` fields to strings.
///
/// Arrays have each object element's `id` coerced; a lone object has its own
/// `id` coerced; every other value passes through untouched.
pub fn normalize_ids(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_id).collect()),
        other => coerce_id(other),
    }
}

fn coerce_id(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            if let Some(id) = map.remove("id") {
                let id = match id {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                map.insert("id".to_string(), Value::String(id));
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    serde_json::from_value(normalize_ids(value)).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn to_json<T: Serialize>(body: &T) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn client() -> KnowledgeClient {
        KnowledgeClient::new("http://localhost:3001")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_entries_produces_correct_request() {
        let req = client().build_list_entries();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3001/knowledge-entries");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_entry_produces_correct_request() {
        let req = client().build_get_entry(&EntryId::from("7"));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3001/knowledge-entries/7");
    }

    #[test]
    fn build_create_entry_stamps_both_timestamps() {
        let input = CreateEntry {
            title: "Rust".to_string(),
            description: "Ownership notes".to_string(),
            image: None,
        };
        let req = client().build_create_entry(&input, now()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3001/knowledge-entries");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "title": "Rust",
                "description": "Ownership notes",
                "createdAt": "2024-03-01T12:30:00.000Z",
                "updatedAt": "2024-03-01T12:30:00.000Z",
            })
        );
    }

    #[test]
    fn build_create_entry_keeps_image() {
        let input = CreateEntry {
            title: "Pic".to_string(),
            description: "With image".to_string(),
            image: Some("data:image/png;base64,AAAA".to_string()),
        };
        let req = client().build_create_entry(&input, now()).unwrap();
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["image"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn build_update_entry_sends_only_supplied_fields() {
        let input = UpdateEntry {
            title: Some("Updated".to_string()),
            ..UpdateEntry::default()
        };
        let req = client()
            .build_update_entry(&EntryId::from("3"), &input, now())
            .unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, "http://localhost:3001/knowledge-entries/3");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"title": "Updated", "updatedAt": "2024-03-01T12:30:00.000Z"})
        );
    }

    #[test]
    fn build_delete_entry_produces_correct_request() {
        let req = client().build_delete_entry(&EntryId::from("5"));
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3001/knowledge-entries/5");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_entries_coerces_numeric_ids() {
        let body = r#"[{"id":42,"title":"A","description":"a","createdAt":"x","updatedAt":"y"}]"#;
        let entries = client().parse_list_entries(response(200, body)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id.as_str(), "42");
    }

    #[test]
    fn parse_create_entry_accepts_any_2xx() {
        let body = r#"{"id":"abc","title":"New","description":"d","createdAt":"x","updatedAt":"y"}"#;
        let entry = client().parse_create_entry(response(201, body)).unwrap();
        assert_eq!(entry.id, EntryId::from("abc"));
        assert_eq!(entry.title, "New");
    }

    #[test]
    fn parse_update_entry_wrong_status() {
        let err = client()
            .parse_update_entry(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(err.to_string(), "API Error: 500 Internal Server Error");
    }

    #[test]
    fn parse_get_entry_not_found() {
        let err = client().parse_get_entry(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_delete_entry_ignores_body() {
        assert!(client().parse_delete_entry(response(204, "")).is_ok());
        assert!(client().parse_delete_entry(response(200, "{}")).is_ok());
    }

    #[test]
    fn parse_delete_entry_not_found_message() {
        let err = client().parse_delete_entry(response(404, "")).unwrap_err();
        assert_eq!(err.to_string(), "API Error: 404 Not Found");
    }

    #[test]
    fn parse_list_entries_bad_json() {
        let err = client()
            .parse_list_entries(response(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = KnowledgeClient::new("http://localhost:3001//");
        assert_eq!(
            client.build_list_entries().path,
            "http://localhost:3001/knowledge-entries"
        );
    }

    #[test]
    fn normalize_ids_handles_each_shape() {
        assert_eq!(
            normalize_ids(json!([{"id": 1}, {"id": "2"}, {"title": "no id"}, 3])),
            json!([{"id": "1"}, {"id": "2"}, {"title": "no id"}, 3])
        );
        assert_eq!(normalize_ids(json!({"id": 7.5})), json!({"id": "7.5"}));
        assert_eq!(normalize_ids(json!({"id": null})), json!({"id": "null"}));
        assert_eq!(normalize_ids(json!("plain")), json!("plain"));
        assert_eq!(normalize_ids(Value::Null), Value::Null);
    }
}
