//! Editor adapter lifecycle and notification tests

use bpmn_modeler::config::EditorConfig;
use bpmn_modeler::editor::{
    DiagramEditor, DmnView, EditorAdapter, EditorError, EditorEvent, EditorFactory, MountRequest,
    Viewport,
};
use bpmn_modeler::models::ModelType;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
struct Widget {
    xml: String,
    viewport: Viewport,
    created: usize,
    destroyed: usize,
    fail_import: bool,
}

#[derive(Clone, Default)]
struct FakeFactory {
    widget: Arc<Mutex<Widget>>,
}

struct FakeEditor {
    widget: Arc<Mutex<Widget>>,
}

impl FakeFactory {
    fn edit(&self, xml: &str) {
        self.widget.lock().unwrap().xml = xml.to_string();
    }

    fn pan(&self, viewport: Viewport) {
        self.widget.lock().unwrap().viewport = viewport;
    }
}

impl EditorFactory for FakeFactory {
    type Editor = FakeEditor;

    fn create(&self, _kind: ModelType, _container: &str) -> Result<FakeEditor, EditorError> {
        self.widget.lock().unwrap().created += 1;
        Ok(FakeEditor {
            widget: self.widget.clone(),
        })
    }
}

impl DiagramEditor for FakeEditor {
    fn import_xml(&mut self, xml: &str) -> Result<(), EditorError> {
        let mut widget = self.widget.lock().unwrap();
        if widget.fail_import {
            return Err(EditorError::Import("unparsable".to_string()));
        }
        widget.xml = xml.to_string();
        Ok(())
    }

    fn save_xml(&self) -> Result<String, EditorError> {
        Ok(self.widget.lock().unwrap().xml.clone())
    }

    fn viewport(&self) -> Viewport {
        self.widget.lock().unwrap().viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.widget.lock().unwrap().viewport = viewport;
    }

    fn destroy(&mut self) {
        self.widget.lock().unwrap().destroyed += 1;
    }
}

fn config(debounce_ms: u64, emit_viewport: bool) -> EditorConfig {
    EditorConfig {
        debounce: Duration::from_millis(debounce_ms),
        emit_viewport,
    }
}

fn mutated() -> EditorEvent {
    EditorEvent::Mutated {
        model_id: "m1".to_string(),
    }
}

fn request<'a>(kind: ModelType, viewport: Option<Viewport>) -> MountRequest<'a> {
    MountRequest {
        container: "canvas",
        model_id: "m1",
        kind,
        xml: "<v1/>",
        viewport,
    }
}

#[tokio::test]
async fn test_mount_imports_and_restores_viewport() {
    let factory = FakeFactory::default();
    let (tx, _rx) = mpsc::unbounded_channel();
    let saved = Viewport {
        zoom: 1.5,
        x: 10.0,
        y: 20.0,
        width: 800.0,
        height: 600.0,
    };

    let adapter =
        EditorAdapter::mount(&factory, request(ModelType::Bpmn, Some(saved)), config(10, false), tx).unwrap();

    assert_eq!(factory.widget.lock().unwrap().xml, "<v1/>");
    assert_eq!(adapter.viewport(), Some(saved));
    assert_eq!(adapter.model_id(), "m1");
}

#[tokio::test]
async fn test_drop_destroys_editor_once() {
    let factory = FakeFactory::default();
    let (tx, _rx) = mpsc::unbounded_channel();

    let adapter = EditorAdapter::mount(&factory, request(ModelType::Bpmn, None), config(10, false), tx).unwrap();
    assert_eq!(factory.widget.lock().unwrap().destroyed, 0);

    adapter.unmount();
    let widget = factory.widget.lock().unwrap();
    assert_eq!(widget.created, 1);
    assert_eq!(widget.destroyed, 1);
}

#[tokio::test]
async fn test_failed_import_still_destroys_editor() {
    let factory = FakeFactory::default();
    factory.widget.lock().unwrap().fail_import = true;
    let (tx, _rx) = mpsc::unbounded_channel();

    let result = EditorAdapter::mount(&factory, request(ModelType::Bpmn, None), config(10, false), tx);

    assert!(matches!(result, Err(EditorError::Import(_))));
    assert_eq!(factory.widget.lock().unwrap().destroyed, 1);
}

#[tokio::test]
async fn test_burst_of_changes_sends_one_notification() {
    let factory = FakeFactory::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut adapter =
        EditorAdapter::mount(&factory, request(ModelType::Bpmn, None), config(40, false), tx).unwrap();

    for xml in ["<v2/>", "<v3/>", "<v4/>"] {
        factory.edit(xml);
        adapter.on_command_stack_changed();
    }
    assert!(adapter.has_pending_change());

    // Every edit is announced at once, the document only after the burst
    for _ in 0..3 {
        assert_eq!(rx.try_recv().unwrap(), mutated());
    }
    let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        event,
        EditorEvent::DocumentChanged {
            model_id: "m1".to_string(),
            xml: "<v4/>".to_string()
        }
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_unmount_cancels_pending_notification() {
    let factory = FakeFactory::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut adapter =
        EditorAdapter::mount(&factory, request(ModelType::Bpmn, None), config(50, false), tx).unwrap();

    factory.edit("<v2/>");
    adapter.on_command_stack_changed();
    drop(adapter);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(rx.try_recv().unwrap(), mutated());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_flush_sends_immediately() {
    let factory = FakeFactory::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut adapter =
        EditorAdapter::mount(&factory, request(ModelType::Bpmn, None), config(5_000, false), tx).unwrap();

    factory.edit("<v2/>");
    adapter.on_command_stack_changed();
    assert_eq!(adapter.flush().unwrap(), "<v2/>");

    assert_eq!(rx.try_recv().unwrap(), mutated());
    assert_eq!(
        rx.try_recv().unwrap(),
        EditorEvent::DocumentChanged {
            model_id: "m1".to_string(),
            xml: "<v2/>".to_string()
        }
    );
    assert!(!adapter.has_pending_change());
}

#[tokio::test]
async fn test_viewport_changes_only_forwarded_when_enabled() {
    let moved = Viewport {
        zoom: 0.5,
        ..Viewport::default()
    };

    let factory = FakeFactory::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let adapter = EditorAdapter::mount(&factory, request(ModelType::Bpmn, None), config(10, false), tx).unwrap();
    factory.pan(moved);
    adapter.on_viewbox_changed();
    assert!(rx.try_recv().is_err());

    let factory = FakeFactory::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let adapter = EditorAdapter::mount(&factory, request(ModelType::Bpmn, None), config(10, true), tx).unwrap();
    factory.pan(moved);
    adapter.on_viewbox_changed();
    assert_eq!(
        rx.try_recv().unwrap(),
        EditorEvent::ViewportChanged {
            model_id: "m1".to_string(),
            viewport: moved
        }
    );
}

#[tokio::test]
async fn test_dmn_view_switches_are_tracked() {
    let factory = FakeFactory::default();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut dmn = EditorAdapter::mount(&factory, request(ModelType::Dmn, None), config(10, false), tx.clone()).unwrap();
    assert_eq!(dmn.active_view(), None);

    dmn.on_views_changed(DmnView::DecisionTable);
    assert_eq!(dmn.active_view(), Some(DmnView::DecisionTable));

    let mut bpmn = EditorAdapter::mount(&factory, request(ModelType::Bpmn, None), config(10, false), tx).unwrap();
    bpmn.on_views_changed(DmnView::Drd);
    assert_eq!(bpmn.active_view(), None);
}

#[test]
fn test_mount_outside_runtime_is_rejected() {
    let factory = FakeFactory::default();
    let (tx, _rx) = mpsc::unbounded_channel();

    let result = EditorAdapter::mount(&factory, request(ModelType::Bpmn, None), config(10, false), tx);

    assert!(matches!(result, Err(EditorError::NoRuntime)));
    assert_eq!(factory.widget.lock().unwrap().created, 0);
}
