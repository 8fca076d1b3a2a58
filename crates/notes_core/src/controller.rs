use std::sync::Arc;

use shared::domain::Note;
use tokio::sync::watch;
use tracing::debug;

use crate::gateway::NotesGateway;

pub const UNAVAILABLE_WARNING: &str = "Backend not available: check environment variables.";

const TITLE_REQUIRED: &str = "Title is required";
const CREATE_FAILED: &str = "Failed to add note";
const UPDATE_FAILED: &str = "Failed to update note";
const DELETE_FAILED: &str = "Failed to delete note";

/// Blocking yes/no prompt guarding note deletion.
pub trait ConfirmDelete: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Declines every deletion. Installed where no interactive surface exists.
pub struct MissingConfirmDelete;

impl ConfirmDelete for MissingConfirmDelete {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// View-side mediator between user intents and the gateway. Owns the
/// transient edit-lifecycle state: a detached copy of the selected note,
/// the edit flag, the editor drafts, the in-flight flag, and the last
/// user-facing error.
///
/// The rendered list is whatever the gateway last published; dropping the
/// controller drops its receiver, so publishes completing after teardown
/// go nowhere.
pub struct NotesController {
    gateway: Arc<NotesGateway>,
    confirm: Arc<dyn ConfirmDelete>,
    collection: watch::Receiver<Vec<Note>>,
    notes: Vec<Note>,
    selected: Option<Note>,
    edit_mode: bool,
    draft_title: String,
    draft_content: String,
    pending: bool,
    last_error: Option<String>,
}

impl NotesController {
    /// Controller with no interactive surface: every delete prompt is
    /// declined.
    pub fn new(gateway: Arc<NotesGateway>) -> Self {
        Self::with_confirm(gateway, Arc::new(MissingConfirmDelete))
    }

    pub fn with_confirm(gateway: Arc<NotesGateway>, confirm: Arc<dyn ConfirmDelete>) -> Self {
        let collection = gateway.subscribe();
        let notes = collection.borrow().clone();
        Self {
            gateway,
            confirm,
            collection,
            notes,
            selected: None,
            edit_mode: false,
            draft_title: String::new(),
            draft_content: String::new(),
            pending: false,
            last_error: None,
        }
    }

    /// Begin the session: issue the initial read, or leave a warning for
    /// display when the backend is unavailable.
    pub async fn activate(&mut self) {
        if self.gateway.is_available() {
            self.gateway.fetch_all().await;
            self.sync_collection();
        } else {
            self.last_error = Some(UNAVAILABLE_WARNING.to_string());
        }
    }

    /// Apply a collection published since the last application, if any.
    pub fn sync_collection(&mut self) {
        if self.collection.has_changed().unwrap_or(false) {
            let notes = self.collection.borrow_and_update().clone();
            self.apply_collection(notes);
        }
    }

    /// Await the next published collection and apply it. Returns false once
    /// the gateway side has gone away.
    pub async fn collection_changed(&mut self) -> bool {
        if self.collection.changed().await.is_err() {
            return false;
        }
        let notes = self.collection.borrow_and_update().clone();
        self.apply_collection(notes);
        true
    }

    fn apply_collection(&mut self, notes: Vec<Note>) {
        if let Some(selected) = &self.selected {
            let id = selected.id;
            // Re-resolve against the new snapshot; gone means deselected.
            self.selected = notes.iter().find(|n| n.id == id).cloned();
        }
        self.notes = notes;
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn selected(&self) -> Option<&Note> {
        self.selected.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.edit_mode
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn draft_title(&self) -> &str {
        &self.draft_title
    }

    pub fn draft_content(&self) -> &str {
        &self.draft_content
    }

    pub fn set_draft_title(&mut self, title: impl Into<String>) {
        self.draft_title = title.into();
    }

    pub fn set_draft_content(&mut self, content: impl Into<String>) {
        self.draft_content = content.into();
    }

    /// Detach a copy of the note into the selection and leave edit mode.
    pub fn select(&mut self, note: &Note) {
        self.selected = Some(note.clone());
        self.edit_mode = false;
        self.draft_title.clear();
        self.draft_content.clear();
        self.last_error = None;
    }

    /// Start composing a new note with a blank draft.
    pub fn start_new(&mut self) {
        self.selected = None;
        self.edit_mode = true;
        self.draft_title.clear();
        self.draft_content.clear();
        self.last_error = None;
    }

    /// Start editing the selected note; no-op without a selection.
    pub fn start_edit(&mut self) {
        if let Some(selected) = &self.selected {
            self.edit_mode = true;
            self.draft_title = selected.title.clone();
            self.draft_content = selected.content.clone();
        }
        self.last_error = None;
    }

    /// Leave edit mode, keeping any selection.
    pub fn cancel(&mut self) {
        self.edit_mode = false;
        self.draft_title.clear();
        self.draft_content.clear();
        self.last_error = None;
    }

    /// Persist the draft: update when a note is selected, create otherwise.
    /// Failure keeps the edit state and drafts so the user can retry or
    /// cancel; success leaves edit mode, drops the selection, and triggers
    /// a re-fetch so the written note becomes visible.
    pub async fn save(&mut self) {
        if !self.edit_mode {
            return;
        }

        self.pending = true;
        self.last_error = None;
        let title = self.draft_title.trim().to_string();
        let content = self.draft_content.trim().to_string();

        if title.is_empty() {
            self.last_error = Some(TITLE_REQUIRED.to_string());
            self.pending = false;
            return;
        }

        let outcome = match &self.selected {
            Some(note) => self
                .gateway
                .update(note.id, &title, &content)
                .await
                .map(|_| ())
                .map_err(|err| (UPDATE_FAILED, err)),
            None => self
                .gateway
                .create(&title, &content)
                .await
                .map(|_| ())
                .map_err(|err| (CREATE_FAILED, err)),
        };

        self.pending = false;
        match outcome {
            Ok(()) => {
                self.edit_mode = false;
                self.selected = None;
                self.gateway.fetch_all().await;
                self.sync_collection();
            }
            Err((message, err)) => {
                debug!("save failed: {err}");
                self.last_error = Some(message.to_string());
            }
        }
    }

    /// Delete after an explicit confirmation; declining aborts with no side
    /// effects. Deleting the selected note also clears the selection and
    /// edit mode.
    pub async fn remove(&mut self, note: &Note) {
        if !self.confirm.confirm(&format!("Delete \"{}\"?", note.title)) {
            return;
        }

        self.pending = true;
        self.last_error = None;
        match self.gateway.delete(note.id).await {
            Ok(()) => {
                self.pending = false;
                if self.selected.as_ref().is_some_and(|s| s.id == note.id) {
                    self.selected = None;
                    self.edit_mode = false;
                }
                self.gateway.fetch_all().await;
                self.sync_collection();
            }
            Err(err) => {
                debug!("delete failed: {err}");
                self.pending = false;
                self.last_error = Some(DELETE_FAILED.to_string());
            }
        }
    }
}
