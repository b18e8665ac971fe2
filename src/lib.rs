// API module for the project/model management backend
pub mod api;

// Re-export api modules at crate root so tests and the binary can use crate::services, crate::models
pub use api::config;
pub use api::middleware;
pub use api::models;
pub use api::routes;
pub use api::services;
pub use api::storage;

// Diagram module for BPMN/DMN document templating and inspection
pub mod diagram;

// Editor embedding adapters (BPMN and DMN widgets)
pub mod editor;

// View-state controller driving list/project/editor navigation
pub mod view;
