//! Editor embedding.
//!
//! The BPMN and DMN widgets are external; [`DiagramEditor`] is the slice of
//! their API the application drives. [`EditorAdapter`] owns one instance for
//! as long as a model is open and turns widget callbacks into
//! [`EditorEvent`]s for the view controller.

pub mod adapter;

pub use adapter::{EditorAdapter, MountRequest};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ModelType;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Failed to create {kind} editor: {reason}")]
    Create { kind: ModelType, reason: String },

    #[error("Failed to import XML: {0}")]
    Import(String),

    #[error("Failed to save XML: {0}")]
    Export(String),

    #[error("Editor has been destroyed")]
    Destroyed,

    #[error("Editor adapters must be mounted inside a Tokio runtime")]
    NoRuntime,
}

/// Pan and zoom of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Views a DMN editor can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DmnView {
    Drd,
    DecisionTable,
    LiteralExpression,
}

/// Notifications an adapter sends upward.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The document was mutated. Sent at once; the XML follows with
    /// `DocumentChanged` after the debounce period.
    Mutated { model_id: String },
    /// Serialized document after the latest mutations.
    DocumentChanged { model_id: String, xml: String },
    ViewportChanged { model_id: String, viewport: Viewport },
}

impl EditorEvent {
    pub fn model_id(&self) -> &str {
        match self {
            EditorEvent::Mutated { model_id } => model_id,
            EditorEvent::DocumentChanged { model_id, .. } => model_id,
            EditorEvent::ViewportChanged { model_id, .. } => model_id,
        }
    }
}

/// A live diagram editor widget.
pub trait DiagramEditor: Send + 'static {
    fn import_xml(&mut self, xml: &str) -> Result<(), EditorError>;

    fn save_xml(&self) -> Result<String, EditorError>;

    fn viewport(&self) -> Viewport;

    fn set_viewport(&mut self, viewport: Viewport);

    /// Release canvas bindings and listeners. Called exactly once.
    fn destroy(&mut self);
}

/// Creates editors bound to a container element.
pub trait EditorFactory {
    type Editor: DiagramEditor;

    fn create(&self, kind: ModelType, container: &str) -> Result<Self::Editor, EditorError>;
}
