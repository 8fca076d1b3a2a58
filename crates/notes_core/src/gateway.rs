use std::sync::Arc;

use chrono::Utc;
use shared::{
    domain::{Note, NoteId},
    error::ApiError,
};
use tokio::sync::watch;
use tracing::{debug, error};

use crate::{
    config::BackendConfig,
    store::{MissingNoteStore, NoteStore, RestNoteStore},
};

/// Sole point of contact with the remote notes table. Holds the shared
/// collection channel: every successful `fetch_all` replaces the published
/// value, and late subscribers observe the latest one immediately.
///
/// Mutations do not touch the published collection; callers issue a
/// follow-up `fetch_all` once the write lands.
pub struct NotesGateway {
    store: Arc<dyn NoteStore>,
    available: bool,
    notes: watch::Sender<Vec<Note>>,
}

impl NotesGateway {
    pub fn new(config: &BackendConfig) -> Self {
        match config.credentials() {
            Some((endpoint_url, access_key)) => {
                Self::with_store(Arc::new(RestNoteStore::new(endpoint_url, access_key)), true)
            }
            None => {
                debug!("notes backend credentials missing; gateway starts unavailable");
                Self::with_store(Arc::new(MissingNoteStore), false)
            }
        }
    }

    pub fn with_store(store: Arc<dyn NoteStore>, available: bool) -> Self {
        let (notes, _) = watch::channel(Vec::new());
        Self {
            store,
            available,
            notes,
        }
    }

    /// Whether backend credentials were present at construction.
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Note>> {
        self.notes.subscribe()
    }

    /// Refresh the published collection. Unavailable backends publish an
    /// empty collection; a failed read is logged and leaves the previously
    /// published value untouched.
    pub async fn fetch_all(&self) {
        if !self.available {
            self.notes.send_replace(Vec::new());
            return;
        }

        match self.store.select_all().await {
            Ok(rows) => {
                debug!(count = rows.len(), "fetched notes");
                self.notes.send_replace(rows);
            }
            Err(err) => error!("failed to fetch notes: {err}"),
        }
    }

    pub async fn create(&self, title: &str, content: &str) -> Result<Note, ApiError> {
        if !self.available {
            return Err(unavailable());
        }
        self.store.insert(title, content).await
    }

    /// Updates the row and stamps `updated_at` with the current time.
    pub async fn update(&self, id: NoteId, title: &str, content: &str) -> Result<Note, ApiError> {
        if !self.available {
            return Err(unavailable());
        }
        self.store.update(id, title, content, Utc::now()).await
    }

    pub async fn delete(&self, id: NoteId) -> Result<(), ApiError> {
        if !self.available {
            return Err(unavailable());
        }
        self.store.delete(id).await
    }
}

fn unavailable() -> ApiError {
    ApiError::unavailable("notes backend is not configured")
}
