//! Which screen is showing, and the unsaved-changes gate in front of it.

pub mod controller;

pub use controller::ViewController;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::EditorError;
use crate::services::ServiceError;

/// The screen the signed-in user is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ViewState {
    #[default]
    AllProjects,
    SingleProject {
        project_id: String,
    },
    EditingModel {
        project_id: String,
        model_id: String,
    },
}

impl ViewState {
    pub fn project_id(&self) -> Option<&str> {
        match self {
            ViewState::AllProjects => None,
            ViewState::SingleProject { project_id } => Some(project_id),
            ViewState::EditingModel { project_id, .. } => Some(project_id),
        }
    }

    pub fn model_id(&self) -> Option<&str> {
        match self {
            ViewState::EditingModel { model_id, .. } => Some(model_id),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ViewState::AllProjects => "AllProjects",
            ViewState::SingleProject { .. } => "SingleProject",
            ViewState::EditingModel { .. } => "EditingModel",
        }
    }
}

/// Where a navigation request wants to go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "to", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Navigation {
    View(ViewState),
    SignOut,
}

/// Answer to the save-or-discard prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptChoice {
    Save,
    Discard,
    Cancel,
}

/// Result of a navigation request or prompt answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Navigated(ViewState),
    SignedOut,
    /// Unsaved edits block the request; answer with
    /// [`ViewController::resolve_prompt`].
    PromptSaveOrDiscard,
    /// Persist `xml` to `model_id`, then report back with
    /// [`ViewController::complete_save`].
    SaveRequired { model_id: String, xml: String },
    /// The editor has edits it has not serialized yet. Flush it with
    /// [`ViewController::flush_editor`] and answer the prompt again.
    FlushRequired { model_id: String },
    Stayed,
}

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Cannot {action} from {from}")]
    InvalidTransition { from: &'static str, action: &'static str },

    #[error("No navigation is waiting on a prompt")]
    NoPendingNavigation,

    #[error("No model is open")]
    NoOpenModel,

    #[error("Model {0} has edits the editor has not flushed")]
    NotFlushed(String),

    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("Save failed: {0}")]
    Save(#[from] ServiceError),
}
