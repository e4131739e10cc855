use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use bto_engine::error::AppError;
use bto_engine::workflows::bto::domain::{
    MaritalStatus, Nric, Project, Role, UnitInventory, User,
};
use bto_engine::workflows::bto::{
    ApplicationRepository, CsvApplicationRepository, CsvProjectRepository,
    CsvRegistrationRepository, CsvUserRepository, ProjectRepository, RegistrationRepository,
    RepositoryError, UserRepository,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) struct CsvRepositories {
    pub(crate) users: Arc<CsvUserRepository>,
    pub(crate) projects: Arc<CsvProjectRepository>,
    pub(crate) applications: Arc<CsvApplicationRepository>,
    pub(crate) registrations: Arc<CsvRegistrationRepository>,
}

pub(crate) fn csv_repositories(data_dir: &Path) -> CsvRepositories {
    CsvRepositories {
        users: Arc::new(CsvUserRepository::new(data_dir.join("users.csv"))),
        projects: Arc::new(CsvProjectRepository::new(data_dir.join("projects.csv"))),
        applications: Arc::new(CsvApplicationRepository::new(
            data_dir.join("applications.csv"),
        )),
        registrations: Arc::new(CsvRegistrationRepository::new(
            data_dir.join("registrations.csv"),
        )),
    }
}

fn seed_nric(raw: &str) -> Result<Nric, AppError> {
    Nric::parse(raw)
        .map_err(|err| AppError::Repository(RepositoryError::Decode(err.to_string())))
}

fn seed_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| AppError::Repository(RepositoryError::Decode(err.to_string())))
}

/// Write a small starter data set so the server can be exercised locally:
/// one manager, one officer, two applicants, and two projects.
pub(crate) fn write_seed_data(data_dir: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(data_dir)?;
    let repositories = csv_repositories(data_dir);

    let manager = seed_nric("S9876543D")?;
    let users = vec![
        User {
            nric: seed_nric("S1234567A")?,
            name: "Alice Tan".to_string(),
            password: "password".to_string(),
            age: 36,
            marital_status: MaritalStatus::Single,
            role: Role::Applicant,
            filter: None,
        },
        User {
            nric: seed_nric("T2345678B")?,
            name: "Bryan Lim".to_string(),
            password: "password".to_string(),
            age: 30,
            marital_status: MaritalStatus::Married,
            role: Role::Applicant,
            filter: None,
        },
        User {
            nric: seed_nric("T7654321C")?,
            name: "Carol Ng".to_string(),
            password: "password".to_string(),
            age: 40,
            marital_status: MaritalStatus::Married,
            role: Role::Officer,
            filter: None,
        },
        User {
            nric: manager.clone(),
            name: "Daniel Koh".to_string(),
            password: "password".to_string(),
            age: 45,
            marital_status: MaritalStatus::Married,
            role: Role::Manager,
            filter: None,
        },
    ];

    let projects = vec![
        Project {
            id: 1,
            name: "Punggol Grove".to_string(),
            neighborhood: "Punggol".to_string(),
            two_room: UnitInventory {
                units: 50,
                price: 120_000,
            },
            three_room: UnitInventory {
                units: 30,
                price: 180_000,
            },
            open_date: seed_date("2024-01-01")?,
            close_date: seed_date("2024-02-01")?,
            officer_slots: 3,
            pending_officers: Vec::new(),
            approved_officers: Vec::new(),
            visible: true,
            manager: manager.clone(),
        },
        Project {
            id: 2,
            name: "Yishun Glen".to_string(),
            neighborhood: "Yishun".to_string(),
            two_room: UnitInventory {
                units: 40,
                price: 110_000,
            },
            three_room: UnitInventory {
                units: 20,
                price: 210_000,
            },
            open_date: seed_date("2024-03-01")?,
            close_date: seed_date("2024-04-01")?,
            officer_slots: 2,
            pending_officers: Vec::new(),
            approved_officers: Vec::new(),
            visible: false,
            manager,
        },
    ];

    repositories.users.save_all(&users)?;
    repositories.projects.save_all(&projects)?;
    repositories.applications.save_all(&[])?;
    repositories.registrations.save_all(&[])?;

    info!(path = %data_dir.display(), "seed data written");
    Ok(())
}
