// Models module - contains the stored entities (User, Project, Model, Invitation),
// their enums, and the hydrated view records built from them

pub mod diagram_model;
pub mod enums;
pub mod hydrated;
pub mod invitation;
pub mod project;
pub mod user;

use serde::{Deserialize, Serialize};

pub use diagram_model::ModelRecord;
pub use enums::{InvitationStatus, ModelType, Role};
pub use hydrated::{HydratedProject, InvitationDetails, MemberDetails};
pub use invitation::InvitationRecord;
pub use project::ProjectRecord;
pub use user::UserRecord;

/// A stored record together with the key it lives under.
///
/// Records never store their own id; the key is the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyed<T> {
    pub id: String,
    #[serde(flatten)]
    pub record: T,
}

pub type User = Keyed<UserRecord>;
pub type Project = Keyed<ProjectRecord>;
pub type Model = Keyed<ModelRecord>;
pub type Invitation = Keyed<InvitationRecord>;
