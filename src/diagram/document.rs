//! Inspection of stored BPMN/DMN documents: declared names and export files.

use anyhow::{Result, anyhow};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::models::ModelType;

/// A model rendered as a downloadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub content: String,
}

/// Local name of the element that declares a document's name.
fn naming_element(model_type: ModelType) -> &'static [u8] {
    match model_type {
        ModelType::Bpmn => b"process",
        ModelType::Dmn => b"decision",
    }
}

/// Name declared by the first `<bpmn:process name=…>` (BPMN) or
/// `<decision name=…>` (DMN) element.
///
/// Returns `Ok(None)` when the element or its `name` attribute is missing, and an
/// error only when the text is not well-formed enough to scan.
pub fn extract_declared_name(xml: &str, model_type: ModelType) -> Result<Option<String>> {
    let target = naming_element(model_type);
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == target {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"name" {
                            let value = attr
                                .unescape_value()
                                .map_err(|e| anyhow!("Invalid name attribute: {}", e))?;
                            let value = value.trim();
                            return Ok(if value.is_empty() {
                                None
                            } else {
                                Some(value.to_string())
                            });
                        }
                    }
                    return Ok(None);
                }
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => {
                return Err(anyhow!(
                    "XML parsing error at position {}: {}",
                    reader.buffer_position(),
                    e
                ));
            }
            _ => {}
        }
        buf.clear();
    }
}

/// kebab-case a display name: "Order Handling v2" becomes "order-handling-v2",
/// "orderHandling" becomes "order-handling".
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            let boundary = c.is_uppercase()
                && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
            if !out.is_empty() && (pending_dash || boundary) {
                out.push('-');
            }
            out.extend(c.to_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
        prev = Some(c);
    }
    out
}

/// File name for exporting a model: the kebab-cased declared name with the
/// notation's extension. Falls back to the stored model name, then `diagram`.
pub fn export_file_name(xml: &str, model_type: ModelType, stored_name: Option<&str>) -> String {
    let declared = extract_declared_name(xml, model_type).ok().flatten();
    let base = declared
        .as_deref()
        .or(stored_name)
        .map(kebab_case)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "diagram".to_string());
    format!("{}.{}", base, model_type.extension())
}

/// Export a stored document verbatim.
pub fn export(xml: &str, model_type: ModelType, stored_name: Option<&str>) -> ExportedFile {
    ExportedFile {
        file_name: export_file_name(xml, model_type, stored_name),
        content_type: model_type.content_type(),
        content: xml.to_string(),
    }
}
