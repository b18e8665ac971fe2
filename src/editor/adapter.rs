use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::{DiagramEditor, DmnView, EditorError, EditorEvent, EditorFactory, Viewport};
use crate::config::EditorConfig;
use crate::models::ModelType;

/// What to mount and where.
#[derive(Debug, Clone)]
pub struct MountRequest<'a> {
    pub container: &'a str,
    pub model_id: &'a str,
    pub kind: ModelType,
    pub xml: &'a str,
    /// Restored once the document has been imported.
    pub viewport: Option<Viewport>,
}

/// Owns one editor widget from mount to drop.
///
/// Dropping the adapter cancels any pending change notification and destroys
/// the editor.
pub struct EditorAdapter<E: DiagramEditor> {
    model_id: String,
    kind: ModelType,
    editor: Arc<Mutex<Option<E>>>,
    events: UnboundedSender<EditorEvent>,
    config: EditorConfig,
    runtime: Handle,
    pending: Option<JoinHandle<()>>,
    active_view: Option<DmnView>,
}

impl<E: DiagramEditor> EditorAdapter<E> {
    /// Create the editor and import the document.
    ///
    /// Must be called from within a Tokio runtime; the debounced notifications
    /// run on it. If the import fails the editor is destroyed before the error
    /// is returned.
    pub fn mount<F>(
        factory: &F,
        request: MountRequest<'_>,
        config: EditorConfig,
        events: UnboundedSender<EditorEvent>,
    ) -> Result<Self, EditorError>
    where
        F: EditorFactory<Editor = E>,
    {
        let runtime = Handle::try_current().map_err(|e| {
            error!("Cannot mount editor for model {}: {}", request.model_id, e);
            EditorError::NoRuntime
        })?;
        let mut editor = factory.create(request.kind, request.container)?;
        if let Err(e) = editor.import_xml(request.xml) {
            error!("Error importing {} XML for model {}: {}", request.kind, request.model_id, e);
            editor.destroy();
            return Err(e);
        }
        if let Some(viewport) = request.viewport {
            debug!("Restoring viewport {:?}", viewport);
            editor.set_viewport(viewport);
        }
        info!("{} editor mounted for model {}", request.kind, request.model_id);

        Ok(Self {
            model_id: request.model_id.to_string(),
            kind: request.kind,
            editor: Arc::new(Mutex::new(Some(editor))),
            events,
            config,
            runtime,
            pending: None,
            active_view: None,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn kind(&self) -> ModelType {
        self.kind
    }

    /// Last DMN view reported by the widget.
    pub fn active_view(&self) -> Option<DmnView> {
        self.active_view
    }

    pub fn viewport(&self) -> Option<Viewport> {
        lock(&self.editor).as_ref().map(|editor| editor.viewport())
    }

    /// A change notification is scheduled but not yet sent.
    pub fn has_pending_change(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// The widget's command stack changed.
    ///
    /// Sends `Mutated` at once and schedules a `DocumentChanged` after the
    /// debounce period on the runtime captured at mount. Each call restarts the
    /// period, so a burst of edits sends one document carrying the final state.
    pub fn on_command_stack_changed(&mut self) {
        self.cancel_pending();
        send(
            &self.events,
            EditorEvent::Mutated {
                model_id: self.model_id.clone(),
            },
        );

        let editor = Arc::clone(&self.editor);
        let events = self.events.clone();
        let model_id = self.model_id.clone();
        let debounce = self.config.debounce;

        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            match save(&editor) {
                Some(Ok(xml)) => send(&events, EditorEvent::DocumentChanged { model_id, xml }),
                Some(Err(e)) => error!("Error saving XML for model {}: {}", model_id, e),
                None => trace!("Editor for model {} gone before change was sent", model_id),
            }
        }));
    }

    /// The widget's viewbox changed. Forwarded only when enabled in config.
    pub fn on_viewbox_changed(&self) {
        if !self.config.emit_viewport {
            trace!("Viewport change for model {} not forwarded", self.model_id);
            return;
        }
        if let Some(viewport) = self.viewport() {
            send(
                &self.events,
                EditorEvent::ViewportChanged {
                    model_id: self.model_id.clone(),
                    viewport,
                },
            );
        }
    }

    pub fn on_views_changed(&mut self, view: DmnView) {
        if self.kind != ModelType::Dmn {
            warn!("View change {:?} reported by a {} editor", view, self.kind);
            return;
        }
        info!("Current DMN view for model {}: {:?}", self.model_id, view);
        self.active_view = Some(view);
    }

    /// Send the current document immediately, dropping any scheduled notification.
    pub fn flush(&mut self) -> Result<String, EditorError> {
        self.cancel_pending();
        let xml = save(&self.editor).ok_or(EditorError::Destroyed)??;
        send(
            &self.events,
            EditorEvent::DocumentChanged {
                model_id: self.model_id.clone(),
                xml: xml.clone(),
            },
        );
        Ok(xml)
    }

    /// Destroy the editor now. Same as dropping the adapter.
    pub fn unmount(self) {
        drop(self);
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl<E: DiagramEditor> Drop for EditorAdapter<E> {
    fn drop(&mut self) {
        self.cancel_pending();
        if let Some(mut editor) = lock(&self.editor).take() {
            editor.destroy();
            info!("{} editor for model {} destroyed", self.kind, self.model_id);
        }
    }
}

fn lock<E>(editor: &Mutex<Option<E>>) -> MutexGuard<'_, Option<E>> {
    editor.lock().unwrap_or_else(PoisonError::into_inner)
}

fn save<E: DiagramEditor>(editor: &Mutex<Option<E>>) -> Option<Result<String, EditorError>> {
    lock(editor).as_ref().map(|editor| editor.save_xml())
}

fn send(events: &UnboundedSender<EditorEvent>, event: EditorEvent) {
    if events.send(event).is_err() {
        debug!("No listener for editor events");
    }
}
