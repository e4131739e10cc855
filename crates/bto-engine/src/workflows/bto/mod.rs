//! BTO application and officer-registration engine.
//!
//! Every mutating action funnels through [`service::BtoService`], which
//! validates eligibility and state-transition preconditions against the full
//! in-memory [`store::RecordStore`] before mutating and persisting. The CSV
//! repositories and the HTTP router are thin adapters around that core.

pub mod domain;
pub mod eligibility;
pub mod persistence;
pub mod projects;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationKind, ApplicationStatus, FlatType, InvalidNric, MaritalStatus, Nric,
    Project, Registration, RegistrationStatus, Role, UnitInventory, UnknownTag, User, ViewFilter,
};
pub use eligibility::eligible_flat_types;
pub use persistence::{
    CsvApplicationRepository, CsvProjectRepository, CsvRegistrationRepository, CsvUserRepository,
};
pub use repository::{
    ApplicationRepository, ProjectRepository, RegistrationRepository, RepositoryError,
    UserRepository,
};
pub use router::bto_router;
pub use service::{BtoService, Decision, EngineError, Rejection};
pub use store::RecordStore;
