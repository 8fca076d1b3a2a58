use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use shared::{
    domain::{Note, NoteId},
    error::ApiError,
};

/// Opaque tabular CRUD backend holding the notes table.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All rows, most recently updated first.
    async fn select_all(&self) -> Result<Vec<Note>, ApiError>;
    /// Insert a row carrying only title and content; the backend assigns
    /// id and timestamps and returns the created row.
    async fn insert(&self, title: &str, content: &str) -> Result<Note, ApiError>;
    /// Update the row matching `id` and return it as stored.
    async fn update(
        &self,
        id: NoteId,
        title: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Note, ApiError>;
    async fn delete(&self, id: NoteId) -> Result<(), ApiError>;
}

/// Null object installed when credentials are missing. Never touches the
/// network.
pub struct MissingNoteStore;

#[async_trait]
impl NoteStore for MissingNoteStore {
    async fn select_all(&self) -> Result<Vec<Note>, ApiError> {
        Err(ApiError::unavailable("notes backend is not configured"))
    }

    async fn insert(&self, _title: &str, _content: &str) -> Result<Note, ApiError> {
        Err(ApiError::unavailable("notes backend is not configured"))
    }

    async fn update(
        &self,
        _id: NoteId,
        _title: &str,
        _content: &str,
        _updated_at: DateTime<Utc>,
    ) -> Result<Note, ApiError> {
        Err(ApiError::unavailable("notes backend is not configured"))
    }

    async fn delete(&self, _id: NoteId) -> Result<(), ApiError> {
        Err(ApiError::unavailable("notes backend is not configured"))
    }
}

#[derive(Serialize)]
struct NewNoteRow<'a> {
    title: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct NoteChanges<'a> {
    title: &'a str,
    content: &'a str,
    updated_at: DateTime<Utc>,
}

/// REST client for a hosted notes table speaking the PostgREST dialect:
/// `apikey` and bearer headers on every request, filters as query
/// parameters, written rows echoed back under `Prefer: return=representation`.
pub struct RestNoteStore {
    http: Client,
    endpoint_url: String,
    access_key: String,
}

impl RestNoteStore {
    pub fn new(endpoint_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint_url: endpoint_url.into(),
            access_key: access_key.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/notes", self.endpoint_url.trim_end_matches('/'))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.access_key)
            .bearer_auth(&self.access_key)
    }

    fn single_row(mut rows: Vec<Note>, operation: &str) -> Result<Note, ApiError> {
        if rows.len() == 1 {
            Ok(rows.remove(0))
        } else {
            Err(ApiError::request(format!(
                "{operation} returned {} rows, expected exactly one",
                rows.len()
            )))
        }
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::request(err.to_string())
}

#[async_trait]
impl NoteStore for RestNoteStore {
    async fn select_all(&self) -> Result<Vec<Note>, ApiError> {
        self.authorized(self.http.get(self.table_url()))
            .query(&[("select", "*"), ("order", "updated_at.desc")])
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .json::<Vec<Note>>()
            .await
            .map_err(transport)
    }

    async fn insert(&self, title: &str, content: &str) -> Result<Note, ApiError> {
        let rows = self
            .authorized(self.http.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&[NewNoteRow { title, content }])
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .json::<Vec<Note>>()
            .await
            .map_err(transport)?;
        Self::single_row(rows, "insert")
    }

    async fn update(
        &self,
        id: NoteId,
        title: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Note, ApiError> {
        let rows = self
            .authorized(self.http.patch(self.table_url()))
            .query(&[("id", format!("eq.{}", id.0))])
            .header("Prefer", "return=representation")
            .json(&NoteChanges {
                title,
                content,
                updated_at,
            })
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .json::<Vec<Note>>()
            .await
            .map_err(transport)?;
        Self::single_row(rows, "update")
    }

    async fn delete(&self, id: NoteId) -> Result<(), ApiError> {
        self.authorized(self.http.delete(self.table_url()))
            .query(&[("id", format!("eq.{}", id.0))])
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?;
        Ok(())
    }
}
