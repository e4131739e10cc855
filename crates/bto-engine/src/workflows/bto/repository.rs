use super::domain::{Application, Project, Registration, User};

/// Storage abstractions so the service module can be exercised in isolation.
/// Each collection is loaded once at session start and saved whole after
/// every successful mutation; no incremental diffs.
pub trait UserRepository: Send + Sync {
    fn load_all(&self) -> Result<Vec<User>, RepositoryError>;
    fn save_all(&self, users: &[User]) -> Result<(), RepositoryError>;
}

pub trait ProjectRepository: Send + Sync {
    fn load_all(&self) -> Result<Vec<Project>, RepositoryError>;
    fn save_all(&self, projects: &[Project]) -> Result<(), RepositoryError>;
}

pub trait ApplicationRepository: Send + Sync {
    fn load_all(&self) -> Result<Vec<Application>, RepositoryError>;
    fn save_all(&self, applications: &[Application]) -> Result<(), RepositoryError>;
}

pub trait RegistrationRepository: Send + Sync {
    fn load_all(&self) -> Result<Vec<Registration>, RepositoryError>;
    fn save_all(&self, registrations: &[Registration]) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record file: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not decode row: {0}")]
    Decode(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
