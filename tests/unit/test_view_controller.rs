//! View-state controller transition tests

use bpmn_modeler::editor::{EditorEvent, Viewport};
use bpmn_modeler::view::{Navigation, Outcome, PromptChoice, ViewController, ViewError, ViewState};
use serde_json::json;

fn editing() -> ViewState {
    ViewState::EditingModel {
        project_id: "p1".to_string(),
        model_id: "m1".to_string(),
    }
}

fn signed_in() -> ViewController {
    let mut view = ViewController::new();
    view.authenticated();
    view
}

fn dirty_editor() -> ViewController {
    let mut view = signed_in();
    view.open_model("p1", "m1").unwrap();
    view.document_changed("m1", "<edited/>".to_string());
    view
}

#[test]
fn test_starts_on_all_projects_once_authenticated() {
    let mut view = ViewController::new();
    assert!(!view.is_authenticated());
    assert!(matches!(view.select_project("p1"), Err(ViewError::NotAuthenticated)));

    assert_eq!(view.authenticated(), &ViewState::AllProjects);
}

#[test]
fn test_clean_navigation_is_not_gated() {
    let mut view = signed_in();

    assert_eq!(
        view.select_project("p1").unwrap(),
        Outcome::Navigated(ViewState::SingleProject {
            project_id: "p1".to_string()
        })
    );
    assert_eq!(view.open_model("p1", "m1").unwrap(), Outcome::Navigated(editing()));
    assert_eq!(
        view.leave_editor().unwrap(),
        Outcome::Navigated(ViewState::SingleProject {
            project_id: "p1".to_string()
        })
    );
    assert_eq!(view.go_to_projects().unwrap(), Outcome::Navigated(ViewState::AllProjects));
}

#[test]
fn test_open_model_from_all_projects() {
    let mut view = signed_in();
    assert_eq!(view.open_model("p1", "m1").unwrap(), Outcome::Navigated(editing()));
}

#[test]
fn test_select_project_from_editor_is_rejected() {
    let mut view = signed_in();
    view.open_model("p1", "m1").unwrap();

    assert!(matches!(
        view.select_project("p2"),
        Err(ViewError::InvalidTransition { from: "EditingModel", .. })
    ));
    assert_eq!(view.state(), &editing());
}

#[test]
fn test_open_model_from_editor_is_rejected() {
    let mut view = dirty_editor();

    assert!(matches!(
        view.open_model("p2", "m9"),
        Err(ViewError::InvalidTransition { from: "EditingModel", .. })
    ));
    assert_eq!(view.state(), &editing());
    assert!(view.has_unsaved_changes());
    assert_eq!(view.pending_navigation(), None);
}

#[test]
fn test_open_model_of_another_project_is_rejected() {
    let mut view = signed_in();
    view.select_project("p1").unwrap();

    assert!(matches!(
        view.open_model("p2", "m9"),
        Err(ViewError::InvalidTransition { from: "SingleProject", .. })
    ));

    // Switching projects from a project page is fine
    assert_eq!(
        view.select_project("p2").unwrap(),
        Outcome::Navigated(ViewState::SingleProject {
            project_id: "p2".to_string()
        })
    );
}

#[test]
fn test_mutation_gates_before_document_arrives() {
    let mut view = signed_in();
    view.open_model("p1", "m1").unwrap();
    view.apply_editor_event(EditorEvent::Mutated {
        model_id: "m1".to_string(),
    });
    assert!(view.has_unsaved_changes());
    assert_eq!(view.current_xml(), None);

    assert_eq!(view.go_to_projects().unwrap(), Outcome::PromptSaveOrDiscard);
    assert!(matches!(view.save_request(), Err(ViewError::NotFlushed(_))));
    assert_eq!(
        view.resolve_prompt(PromptChoice::Save).unwrap(),
        Outcome::FlushRequired {
            model_id: "m1".to_string()
        }
    );
    assert!(view.pending_navigation().is_some());

    view.document_changed("m1", "<drawn/>".to_string());
    assert_eq!(
        view.resolve_prompt(PromptChoice::Save).unwrap(),
        Outcome::SaveRequired {
            model_id: "m1".to_string(),
            xml: "<drawn/>".to_string()
        }
    );
}

#[test]
fn test_echoed_document_does_not_redirty() {
    let mut view = dirty_editor();
    view.mark_saved("m1", "<edited/>");
    assert!(!view.has_unsaved_changes());

    view.document_changed("m1", "<edited/>".to_string());
    assert!(!view.has_unsaved_changes());
}

#[test]
fn test_mark_saved_ignores_save_overtaken_by_mutation() {
    let mut view = dirty_editor();
    view.apply_editor_event(EditorEvent::Mutated {
        model_id: "m1".to_string(),
    });

    view.mark_saved("m1", "<edited/>");
    assert!(view.has_unsaved_changes());
}

#[test]
fn test_leave_editor_outside_editor_is_rejected() {
    let mut view = signed_in();
    assert!(matches!(
        view.leave_editor(),
        Err(ViewError::InvalidTransition { .. })
    ));
}

#[test]
fn test_dirty_editor_prompts_before_leaving() {
    let mut view = dirty_editor();
    assert!(view.has_unsaved_changes());

    assert_eq!(view.go_to_projects().unwrap(), Outcome::PromptSaveOrDiscard);
    assert_eq!(view.state(), &editing());
    assert_eq!(
        view.pending_navigation(),
        Some(&Navigation::View(ViewState::AllProjects))
    );
}

#[test]
fn test_discard_proceeds_and_clears_edits() {
    let mut view = dirty_editor();
    view.go_to_projects().unwrap();

    assert_eq!(
        view.resolve_prompt(PromptChoice::Discard).unwrap(),
        Outcome::Navigated(ViewState::AllProjects)
    );
    assert!(!view.has_unsaved_changes());
    assert_eq!(view.current_xml(), None);
}

#[test]
fn test_cancel_stays_with_edits() {
    let mut view = dirty_editor();
    view.leave_editor().unwrap();

    assert_eq!(view.resolve_prompt(PromptChoice::Cancel).unwrap(), Outcome::Stayed);
    assert_eq!(view.state(), &editing());
    assert!(view.has_unsaved_changes());
    assert!(view.pending_navigation().is_none());
}

#[test]
fn test_save_then_proceed() {
    let mut view = dirty_editor();
    view.sign_out().unwrap();

    let outcome = view.resolve_prompt(PromptChoice::Save).unwrap();
    assert_eq!(
        outcome,
        Outcome::SaveRequired {
            model_id: "m1".to_string(),
            xml: "<edited/>".to_string()
        }
    );

    assert_eq!(
        view.complete_save("m1", "<edited/>", Ok(())).unwrap(),
        Outcome::SignedOut
    );
    assert!(!view.is_authenticated());
}

#[test]
fn test_failed_save_keeps_editor_open() {
    let mut view = dirty_editor();
    view.go_to_projects().unwrap();
    view.resolve_prompt(PromptChoice::Save).unwrap();

    let result = view.complete_save("m1", "<edited/>", Err(ViewError::NoOpenModel));
    assert!(result.is_err());
    assert_eq!(view.state(), &editing());
    assert!(view.has_unsaved_changes());
    assert!(view.pending_navigation().is_none());
}

#[test]
fn test_prompt_without_pending_navigation() {
    let mut view = dirty_editor();
    assert!(matches!(
        view.resolve_prompt(PromptChoice::Discard),
        Err(ViewError::NoPendingNavigation)
    ));
}

#[test]
fn test_stale_editor_events_are_ignored() {
    let mut view = signed_in();
    view.open_model("p1", "m1").unwrap();
    view.leave_editor().unwrap();

    view.apply_editor_event(EditorEvent::DocumentChanged {
        model_id: "m1".to_string(),
        xml: "<late/>".to_string(),
    });
    assert!(!view.has_unsaved_changes());

    view.open_model("p1", "m2").unwrap();
    view.document_changed("m1", "<late/>".to_string());
    assert!(!view.has_unsaved_changes());
}

#[test]
fn test_mark_saved_ignores_older_xml() {
    let mut view = dirty_editor();
    view.document_changed("m1", "<newer/>".to_string());

    view.mark_saved("m1", "<edited/>");
    assert!(view.has_unsaved_changes());

    view.mark_saved("m1", "<newer/>");
    assert!(!view.has_unsaved_changes());
}

#[test]
fn test_deleting_open_project_returns_to_list() {
    let mut view = dirty_editor();

    assert_eq!(view.project_deleted("other"), None);
    assert_eq!(view.project_deleted("p1"), Some(&ViewState::AllProjects));
    assert!(!view.has_unsaved_changes());
}

#[test]
fn test_viewport_is_remembered_per_model() {
    let mut view = signed_in();
    view.open_model("p1", "m1").unwrap();
    let viewport = Viewport {
        zoom: 2.0,
        ..Viewport::default()
    };
    view.viewport_changed("m1", viewport);
    view.leave_editor().unwrap();

    assert_eq!(view.viewport_for("m1"), Some(viewport));
    assert_eq!(view.viewport_for("m2"), None);
}

#[test]
fn test_session_end_resets_everything() {
    let mut view = dirty_editor();
    view.session_ended();
    assert_eq!(view, ViewController::new());
}

#[test]
fn test_state_serializes_with_tag() {
    assert_eq!(
        serde_json::to_value(editing()).unwrap(),
        json!({"view": "editingModel", "projectId": "p1", "modelId": "m1"})
    );

    let view = dirty_editor();
    let restored: ViewController = serde_json::from_value(serde_json::to_value(&view).unwrap()).unwrap();
    assert_eq!(restored, view);
}
