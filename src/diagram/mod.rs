//! BPMN and DMN document handling.
//!
//! Diagram semantics belong to the editor widgets; this module only seeds new
//! documents and reads the declared name back out for naming and export.

pub mod document;
pub mod template;

pub use document::{ExportedFile, export, export_file_name, extract_declared_name, kebab_case};
pub use template::{camelize, skeleton};
