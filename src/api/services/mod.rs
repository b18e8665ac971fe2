// Services module - business logic over the document store

pub mod aggregation_service;
pub mod error;
pub mod identity_service;
pub mod invitation_service;
pub mod jwt_service;
pub mod model_service;
pub mod project_service;
pub mod user_service;

pub use aggregation_service::ProjectAggregation;
pub use error::ServiceError;
pub use identity_service::{AuthUser, IdentityGate, IdentityProvider, TokenIdentityProvider};
pub use invitation_service::InvitationService;
pub use jwt_service::{AuthError, JwtService};
pub use model_service::ModelService;
pub use project_service::{DeleteReport, ProjectService};
pub use user_service::UserService;
