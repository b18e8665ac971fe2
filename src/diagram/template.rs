//! Skeleton documents used to seed new models.

use quick_xml::escape::escape;

use crate::models::ModelType;

/// Minimal valid document for a new model of `model_type` named `name`.
pub fn skeleton(model_type: ModelType, name: &str) -> String {
    match model_type {
        ModelType::Bpmn => bpmn_skeleton(name),
        ModelType::Dmn => dmn_skeleton(name),
    }
}

/// BPMN document with one executable process holding a single start event.
pub fn bpmn_skeleton(name: &str) -> String {
    let process_id = element_id(name, "Process_1");
    let name = escape(name);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI" xmlns:dc="http://www.omg.org/spec/DD/20100524/DC" xmlns:camunda="http://camunda.org/schema/1.0/bpmn" xmlns:modeler="http://camunda.org/schema/modeler/1.0" id="Definitions_1y9ob7p" targetNamespace="http://bpmn.io/schema/bpmn" exporter="Camunda Modeler" exporterVersion="5.19.0" modeler:executionPlatform="Camunda Platform" modeler:executionPlatformVersion="7.20.0">
  <bpmn:process id="{process_id}" name="{name}" isExecutable="true" camunda:historyTimeToLive="180">
    <bpmn:startEvent id="StartEvent_1" />
  </bpmn:process>
  <bpmndi:BPMNDiagram id="BPMNDiagram_1">
    <bpmndi:BPMNPlane id="BPMNPlane_1" bpmnElement="{process_id}">
      <bpmndi:BPMNShape id="_BPMNShape_StartEvent_2" bpmnElement="StartEvent_1">
        <dc:Bounds x="179" y="79" width="36" height="36" />
      </bpmndi:BPMNShape>
    </bpmndi:BPMNPlane>
  </bpmndi:BPMNDiagram>
</bpmn:definitions>"#
    )
}

/// DMN document with one decision holding an empty decision table.
pub fn dmn_skeleton(name: &str) -> String {
    let decision_id = element_id(name, "Decision_1");
    let name = escape(name);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/" xmlns:dmndi="https://www.omg.org/spec/DMN/20191111/DMNDI/" xmlns:dc="http://www.omg.org/spec/DMN/20180521/DC/" xmlns:modeler="http://camunda.org/schema/modeler/1.0" id="Definitions_{decision_id}" name="{name}" namespace="http://camunda.org/schema/1.0/dmn" exporter="Camunda Modeler" exporterVersion="5.19.0" modeler:executionPlatform="Camunda Platform" modeler:executionPlatformVersion="7.20.0">
  <decision id="{decision_id}" name="{name}">
    <decisionTable id="DecisionTable_1">
      <input id="Input_1">
        <inputExpression id="InputExpression_1" typeRef="string">
          <text></text>
        </inputExpression>
      </input>
      <output id="Output_1" typeRef="string" />
    </decisionTable>
  </decision>
  <dmndi:DMNDI>
    <dmndi:DMNDiagram>
      <dmndi:DMNShape dmnElementRef="{decision_id}">
        <dc:Bounds height="80" width="180" x="160" y="100" />
      </dmndi:DMNShape>
    </dmndi:DMNDiagram>
  </dmndi:DMNDI>
</definitions>"#
    )
}

/// camelCase a display name: the first word lowercased, later words capitalised,
/// whitespace removed. "Order Handling" becomes "orderHandling".
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_is_word = false;
    for c in name.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        let starts_word = is_word && (!prev_is_word || c.is_uppercase());
        if c.is_whitespace() {
            // dropped
        } else if starts_word && out.is_empty() {
            out.extend(c.to_lowercase());
        } else if starts_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}

/// XML id derived from a display name. Characters not allowed in an NCName are
/// dropped; names that leave nothing usable fall back to `fallback`.
fn element_id(name: &str, fallback: &str) -> String {
    let id: String = camelize(name)
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    match id.chars().next() {
        Some(first) if first.is_alphabetic() || first == '_' => id,
        Some(_) => format!("_{}", id),
        None => fallback.to_string(),
    }
}
