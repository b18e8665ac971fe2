//! View-state controller.
//!
//! All state changes go through named transitions. When the open model has
//! unsaved edits, any request that would leave the editor is parked and the
//! caller is asked to save or discard first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

use super::{Navigation, Outcome, PromptChoice, ViewError, ViewState};
use crate::editor::{DiagramEditor, EditorAdapter, EditorEvent, Viewport};
use crate::services::{AuthUser, ModelService};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewController {
    authenticated: bool,
    state: ViewState,
    /// Set by an editor mutation, cleared only by a successful save or a discard.
    unsaved_changes: bool,
    /// Latest serialized document of the open model.
    current_xml: Option<String>,
    /// The editor reported a mutation whose document has not arrived yet.
    #[serde(default)]
    awaiting_document: bool,
    viewports: BTreeMap<String, Viewport>,
    pending: Option<Navigation>,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    pub fn current_xml(&self) -> Option<&str> {
        self.current_xml.as_deref()
    }

    /// A navigation is waiting for a save-or-discard answer.
    pub fn pending_navigation(&self) -> Option<&Navigation> {
        self.pending.as_ref()
    }

    /// Viewport to restore when `model_id` is mounted again.
    pub fn viewport_for(&self, model_id: &str) -> Option<Viewport> {
        self.viewports.get(model_id).copied()
    }

    /// A session started. Lands on the projects list.
    pub fn authenticated(&mut self) -> &ViewState {
        if !self.authenticated {
            *self = Self {
                authenticated: true,
                ..Self::default()
            };
            info!("Session started, showing all projects");
        }
        &self.state
    }

    /// The identity provider ended the session. Unsaved edits are lost.
    pub fn session_ended(&mut self) {
        if self.unsaved_changes {
            warn!("Session ended with unsaved changes");
        }
        *self = Self::default();
    }

    /// Open a project from the projects list.
    pub fn select_project(&mut self, project_id: &str) -> Result<Outcome, ViewError> {
        if let ViewState::EditingModel { .. } = self.state {
            return Err(ViewError::InvalidTransition {
                from: self.state.name(),
                action: "select a project",
            });
        }
        self.navigate(Navigation::View(ViewState::SingleProject {
            project_id: project_id.to_string(),
        }))
    }

    /// Open a model from either list view. A model of another project cannot
    /// be opened from a single project, and the editor must be left before
    /// another model is opened.
    pub fn open_model(&mut self, project_id: &str, model_id: &str) -> Result<Outcome, ViewError> {
        match &self.state {
            ViewState::AllProjects => {}
            ViewState::SingleProject { project_id: shown } if shown == project_id => {}
            ViewState::SingleProject { .. } => {
                return Err(ViewError::InvalidTransition {
                    from: self.state.name(),
                    action: "open a model of another project",
                });
            }
            ViewState::EditingModel { .. } => {
                return Err(ViewError::InvalidTransition {
                    from: self.state.name(),
                    action: "open another model",
                });
            }
        }
        self.navigate(Navigation::View(ViewState::EditingModel {
            project_id: project_id.to_string(),
            model_id: model_id.to_string(),
        }))
    }

    /// "My Projects".
    pub fn go_to_projects(&mut self) -> Result<Outcome, ViewError> {
        self.navigate(Navigation::View(ViewState::AllProjects))
    }

    /// Back from the editor to the model's project.
    pub fn leave_editor(&mut self) -> Result<Outcome, ViewError> {
        let ViewState::EditingModel { project_id, .. } = &self.state else {
            return Err(ViewError::InvalidTransition {
                from: self.state.name(),
                action: "leave the editor",
            });
        };
        let target = ViewState::SingleProject {
            project_id: project_id.clone(),
        };
        self.navigate(Navigation::View(target))
    }

    pub fn sign_out(&mut self) -> Result<Outcome, ViewError> {
        self.navigate(Navigation::SignOut)
    }

    /// A project was deleted. If it is on screen, fall back to the list.
    ///
    /// Not gated: edits to a model of a deleted project have nowhere to go.
    pub fn project_deleted(&mut self, project_id: &str) -> Option<&ViewState> {
        if self.state.project_id() != Some(project_id) {
            return None;
        }
        if let Some(model_id) = self.state.model_id() {
            self.viewports.remove(model_id);
        }
        self.clear_edits();
        self.pending = None;
        self.state = ViewState::AllProjects;
        info!("Project {} deleted, showing all projects", project_id);
        Some(&self.state)
    }

    /// Feed an editor notification in. Events for a model that is no longer
    /// open are ignored.
    pub fn apply_editor_event(&mut self, event: EditorEvent) {
        if self.state.model_id() != Some(event.model_id()) {
            debug!("Ignoring editor event for model {} that is not open", event.model_id());
            return;
        }
        match event {
            EditorEvent::Mutated { .. } => {
                self.unsaved_changes = true;
                self.awaiting_document = true;
            }
            EditorEvent::DocumentChanged { xml, .. } => {
                // A flush echoed back through the event channel
                if !self.awaiting_document && self.current_xml.as_deref() == Some(xml.as_str()) {
                    return;
                }
                self.current_xml = Some(xml);
                self.unsaved_changes = true;
                self.awaiting_document = false;
            }
            EditorEvent::ViewportChanged { model_id, viewport } => {
                self.viewports.insert(model_id, viewport);
            }
        }
    }

    pub fn document_changed(&mut self, model_id: &str, xml: String) {
        self.apply_editor_event(EditorEvent::DocumentChanged {
            model_id: model_id.to_string(),
            xml,
        });
    }

    pub fn viewport_changed(&mut self, model_id: &str, viewport: Viewport) {
        self.apply_editor_event(EditorEvent::ViewportChanged {
            model_id: model_id.to_string(),
            viewport,
        });
    }

    /// Serialize the open model's editor now and take its document, so a
    /// mutation still inside the debounce period can be saved.
    pub fn flush_editor<E: DiagramEditor>(&mut self, adapter: &mut EditorAdapter<E>) -> Result<(), ViewError> {
        let model_id = self.state.model_id().ok_or(ViewError::NoOpenModel)?;
        if adapter.model_id() != model_id {
            warn!("Editor for model {} is not the open model {}", adapter.model_id(), model_id);
            return Err(ViewError::NoOpenModel);
        }
        let xml = adapter.flush()?;
        let model_id = model_id.to_string();
        self.document_changed(&model_id, xml);
        Ok(())
    }

    /// What the save button would persist: the open model and its latest XML.
    pub fn save_request(&self) -> Result<(String, String), ViewError> {
        let model_id = self.state.model_id().ok_or(ViewError::NoOpenModel)?;
        if self.awaiting_document {
            return Err(ViewError::NotFlushed(model_id.to_string()));
        }
        let xml = self.current_xml.clone().ok_or(ViewError::NoOpenModel)?;
        Ok((model_id.to_string(), xml))
    }

    /// Clear the unsaved flag after `xml` was persisted.
    ///
    /// Ignored if the editor has been mutated or produced newer XML since.
    pub fn mark_saved(&mut self, model_id: &str, xml: &str) {
        if self.state.model_id() == Some(model_id)
            && !self.awaiting_document
            && self.current_xml.as_deref() == Some(xml)
        {
            self.unsaved_changes = false;
        }
    }

    /// Answer the save-or-discard prompt.
    pub fn resolve_prompt(&mut self, choice: PromptChoice) -> Result<Outcome, ViewError> {
        if self.pending.is_none() {
            return Err(ViewError::NoPendingNavigation);
        }
        match choice {
            PromptChoice::Cancel => {
                self.pending = None;
                Ok(Outcome::Stayed)
            }
            PromptChoice::Discard => {
                info!("Discarding unsaved changes");
                self.clear_edits();
                self.proceed()
            }
            PromptChoice::Save => match self.save_request() {
                Ok((model_id, xml)) => Ok(Outcome::SaveRequired { model_id, xml }),
                Err(ViewError::NotFlushed(model_id)) => {
                    debug!("Model {} must be flushed before saving", model_id);
                    Ok(Outcome::FlushRequired { model_id })
                }
                Err(e) => Err(e),
            },
        }
    }

    /// Report how the save asked for by [`Outcome::SaveRequired`] went.
    ///
    /// On success the parked navigation goes ahead. On failure it is dropped
    /// and the editor stays open with its edits.
    pub fn complete_save(
        &mut self,
        model_id: &str,
        xml: &str,
        result: Result<(), ViewError>,
    ) -> Result<Outcome, ViewError> {
        match result {
            Ok(()) => {
                self.mark_saved(model_id, xml);
                if self.pending.is_none() {
                    return Ok(Outcome::Stayed);
                }
                self.clear_edits();
                self.proceed()
            }
            Err(e) => {
                error!("Error saving model {}: {}", model_id, e);
                self.pending = None;
                Err(e)
            }
        }
    }

    /// Persist the open model's current XML.
    pub async fn save(&mut self, models: &ModelService, actor: &AuthUser) -> Result<Outcome, ViewError> {
        let (model_id, xml) = self.save_request()?;
        models.save_model(actor, &model_id, &xml).await?;
        self.mark_saved(&model_id, &xml);
        Ok(Outcome::Stayed)
    }

    /// Answer the prompt and, when the answer is save, persist before moving on.
    pub async fn resolve_prompt_with(
        &mut self,
        choice: PromptChoice,
        models: &ModelService,
        actor: &AuthUser,
    ) -> Result<Outcome, ViewError> {
        match self.resolve_prompt(choice)? {
            Outcome::SaveRequired { model_id, xml } => {
                let result = models
                    .save_model(actor, &model_id, &xml)
                    .await
                    .map(|_| ())
                    .map_err(ViewError::from);
                self.complete_save(&model_id, &xml, result)
            }
            outcome => Ok(outcome),
        }
    }

    /// Like [`Self::resolve_prompt_with`], flushing `adapter` first when it
    /// holds edits that have not been serialized yet.
    pub async fn resolve_prompt_with_editor<E: DiagramEditor>(
        &mut self,
        choice: PromptChoice,
        adapter: &mut EditorAdapter<E>,
        models: &ModelService,
        actor: &AuthUser,
    ) -> Result<Outcome, ViewError> {
        if choice == PromptChoice::Save && self.awaiting_document && self.pending.is_some() {
            self.flush_editor(adapter)?;
        }
        self.resolve_prompt_with(choice, models, actor).await
    }

    fn navigate(&mut self, target: Navigation) -> Result<Outcome, ViewError> {
        if !self.authenticated {
            return Err(ViewError::NotAuthenticated);
        }
        if self.unsaved_changes && self.state.model_id().is_some() && !self.stays_in_editor(&target) {
            debug!("Unsaved changes, asking before {:?}", target);
            self.pending = Some(target);
            return Ok(Outcome::PromptSaveOrDiscard);
        }
        self.pending = Some(target);
        self.proceed()
    }

    fn stays_in_editor(&self, target: &Navigation) -> bool {
        matches!(target, Navigation::View(view) if view == &self.state)
    }

    fn proceed(&mut self) -> Result<Outcome, ViewError> {
        let target = self.pending.take().ok_or(ViewError::NoPendingNavigation)?;
        match target {
            Navigation::SignOut => {
                *self = Self::default();
                info!("Signed out");
                Ok(Outcome::SignedOut)
            }
            Navigation::View(view) => {
                if view.model_id() != self.state.model_id() {
                    self.clear_edits();
                }
                debug!("View {} -> {}", self.state.name(), view.name());
                self.state = view;
                Ok(Outcome::Navigated(self.state.clone()))
            }
        }
    }

    fn clear_edits(&mut self) {
        self.unsaved_changes = false;
        self.awaiting_document = false;
        self.current_xml = None;
    }
}
