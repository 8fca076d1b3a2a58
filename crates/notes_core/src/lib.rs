//! Client core for a hosted notes table: configuration loading, the
//! REST-backed gateway publishing the shared collection, and the view
//! controller driving the edit lifecycle.

pub mod config;
pub mod controller;
pub mod gateway;
pub mod store;

pub use config::{load_config, BackendConfig};
pub use controller::{ConfirmDelete, MissingConfirmDelete, NotesController, UNAVAILABLE_WARNING};
pub use gateway::NotesGateway;
pub use store::{MissingNoteStore, NoteStore, RestNoteStore};

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod gateway_tests;

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod controller_tests;
