use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{
    Application, ApplicationKind, ApplicationStatus, FlatType, Nric, Project, Registration,
    RegistrationStatus, ViewFilter,
};
use super::eligibility::eligible_flat_types;
use super::projects;
use super::repository::{
    ApplicationRepository, ProjectRepository, RegistrationRepository, RepositoryError,
    UserRepository,
};
use super::store::RecordStore;

/// Manager verdict on a pending application or registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "APPROVE")]
    Approve,
    #[serde(rename = "REJECT")]
    Reject,
}

/// Precondition failures. Always reported as a typed outcome, never a
/// crash, and never after a partial mutation: the first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("applicant already holds an active application")]
    AlreadyApplied,
    #[error("applicant is not eligible for {} flats", .0.label())]
    IneligibleFlatType(FlatType),
    #[error("project is not open to applicants")]
    ProjectNotVisible,
    #[error("only the applicant who submitted the application may withdraw it")]
    NotApplicationOwner,
    #[error("application has already been withdrawn")]
    AlreadyWithdrawn,
    #[error("only the project's manager may decide this")]
    NotProjectManager,
    #[error("officer holds an application against this project")]
    AppliedToProject,
    #[error("officer already registered for this project")]
    AlreadyRegistered,
    #[error("overlapping period: officer is approved for a project with an overlapping window")]
    OverlappingPeriod,
    #[error("slot unavailable: project has no open officer slots")]
    SlotUnavailable,
    #[error("registration has already been decided")]
    RegistrationDecided,
}

/// Failure taxonomy for engine operations: a validation rejection, a
/// dangling id, or a persistence failure. A failed save does not roll back
/// the in-memory mutation; callers may retry the save via a later operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("could not persist {collection}: {source}")]
    Persistence {
        collection: &'static str,
        source: RepositoryError,
    },
}

impl EngineError {
    fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// The decision engine behind every mutating action: applications, officer
/// registrations, and the project views feeding the user-facing surface.
///
/// One `RecordStore` is loaded per session and every public operation runs
/// inside a single exclusive critical section over it, so check-then-act
/// sequences (id allocation, slot counting, list moves) are atomic at the
/// operation granularity.
pub struct BtoService<U, P, A, R> {
    users: Arc<U>,
    projects: Arc<P>,
    applications: Arc<A>,
    registrations: Arc<R>,
    store: Mutex<RecordStore>,
}

impl<U, P, A, R> BtoService<U, P, A, R>
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    A: ApplicationRepository + 'static,
    R: RegistrationRepository + 'static,
{
    /// Load all four collections once and take ownership for the session.
    pub fn load(
        users: Arc<U>,
        projects: Arc<P>,
        applications: Arc<A>,
        registrations: Arc<R>,
    ) -> Result<Self, EngineError> {
        let store = RecordStore {
            users: load_collection("users", || users.load_all())?,
            projects: load_collection("projects", || projects.load_all())?,
            applications: load_collection("applications", || applications.load_all())?,
            registrations: load_collection("registrations", || registrations.load_all())?,
        };

        Ok(Self {
            users,
            projects,
            applications,
            registrations,
            store: Mutex::new(store),
        })
    }

    fn store(&self) -> MutexGuard<'_, RecordStore> {
        self.store.lock().expect("record store mutex poisoned")
    }

    fn persist_users(&self, store: &RecordStore) -> Result<(), EngineError> {
        self.users
            .save_all(&store.users)
            .map_err(|source| EngineError::Persistence {
                collection: "users",
                source,
            })
    }

    fn persist_projects(&self, store: &RecordStore) -> Result<(), EngineError> {
        self.projects
            .save_all(&store.projects)
            .map_err(|source| EngineError::Persistence {
                collection: "projects",
                source,
            })
    }

    fn persist_applications(&self, store: &RecordStore) -> Result<(), EngineError> {
        self.applications
            .save_all(&store.applications)
            .map_err(|source| EngineError::Persistence {
                collection: "applications",
                source,
            })
    }

    fn persist_registrations(&self, store: &RecordStore) -> Result<(), EngineError> {
        self.registrations
            .save_all(&store.registrations)
            .map_err(|source| EngineError::Persistence {
                collection: "registrations",
                source,
            })
    }

    /// Submit a flat application. At most one active application may exist
    /// per applicant, and the requested flat type must be within the
    /// applicant's eligibility.
    pub fn apply(
        &self,
        applicant: &Nric,
        project_id: u32,
        flat_type: FlatType,
    ) -> Result<Application, EngineError> {
        let mut store = self.store();

        let eligible = {
            let user = store
                .user(applicant)
                .ok_or_else(|| EngineError::not_found("user", applicant))?;
            eligible_flat_types(user)
        };

        if store.active_application_for(applicant).is_some() {
            return Err(Rejection::AlreadyApplied.into());
        }

        let project = store
            .project(project_id)
            .ok_or_else(|| EngineError::not_found("project", project_id))?;
        if !project.visible {
            return Err(Rejection::ProjectNotVisible.into());
        }

        if !eligible.contains(&flat_type) {
            return Err(Rejection::IneligibleFlatType(flat_type).into());
        }

        let application = Application {
            id: store.next_application_id(),
            applicant: applicant.clone(),
            project_id,
            kind: ApplicationKind::Application,
            status: ApplicationStatus::Pending,
            flat_type,
        };
        store.applications.push(application.clone());
        self.persist_applications(&store)?;

        info!(
            application_id = application.id,
            applicant = %applicant,
            project_id,
            "application submitted"
        );
        Ok(application)
    }

    /// Withdraw an application. Only the owning applicant may withdraw, and
    /// withdrawal takes effect immediately without a manager approval stage.
    pub fn withdraw(
        &self,
        application_id: u32,
        requester: &Nric,
    ) -> Result<Application, EngineError> {
        let mut store = self.store();

        let application = store
            .application_mut(application_id)
            .ok_or_else(|| EngineError::not_found("application", application_id))?;
        if &application.applicant != requester {
            return Err(Rejection::NotApplicationOwner.into());
        }
        if application.kind == ApplicationKind::Withdrawal {
            return Err(Rejection::AlreadyWithdrawn.into());
        }

        application.kind = ApplicationKind::Withdrawal;
        application.status = ApplicationStatus::Unsuccessful;
        let withdrawn = application.clone();
        self.persist_applications(&store)?;

        info!(application_id, requester = %requester, "application withdrawn");
        Ok(withdrawn)
    }

    /// Record a manager's verdict on an application. Only the manager who
    /// owns the application's project may decide it.
    pub fn decide_application(
        &self,
        application_id: u32,
        manager: &Nric,
        decision: Decision,
    ) -> Result<Application, EngineError> {
        let mut store = self.store();

        let (project_id, kind) = {
            let application = store
                .application(application_id)
                .ok_or_else(|| EngineError::not_found("application", application_id))?;
            (application.project_id, application.kind)
        };
        if kind == ApplicationKind::Withdrawal {
            return Err(Rejection::AlreadyWithdrawn.into());
        }

        let project = store
            .project(project_id)
            .ok_or_else(|| EngineError::not_found("project", project_id))?;
        if &project.manager != manager {
            return Err(Rejection::NotProjectManager.into());
        }

        let application = store
            .application_mut(application_id)
            .ok_or_else(|| EngineError::not_found("application", application_id))?;
        application.status = match decision {
            Decision::Approve => ApplicationStatus::Successful,
            Decision::Reject => ApplicationStatus::Unsuccessful,
        };
        let decided = application.clone();
        self.persist_applications(&store)?;

        info!(
            application_id,
            manager = %manager,
            status = decided.status.label(),
            "application decided"
        );
        Ok(decided)
    }

    /// Register an officer for a project. Officers are a scarce, time-boxed
    /// resource: the checks run in order and the first failure wins.
    pub fn register(&self, officer: &Nric, project_id: u32) -> Result<Registration, EngineError> {
        let mut store = self.store();

        if store.user(officer).is_none() {
            return Err(EngineError::not_found("user", officer));
        }

        let project = store
            .project(project_id)
            .ok_or_else(|| EngineError::not_found("project", project_id))?;

        if store.application_against(officer, project_id).is_some() {
            return Err(Rejection::AppliedToProject.into());
        }
        if store.registration_against(officer, project_id).is_some() {
            return Err(Rejection::AlreadyRegistered.into());
        }

        let overlapping = store
            .approved_registrations_for(officer)
            .filter_map(|registration| store.project(registration.project_id))
            .any(|approved| approved.window_overlaps(project));
        if overlapping {
            return Err(Rejection::OverlappingPeriod.into());
        }

        if project.open_officer_slots() == 0 {
            return Err(Rejection::SlotUnavailable.into());
        }

        let registration = Registration {
            id: store.next_registration_id(),
            officer: officer.clone(),
            project_id,
            status: RegistrationStatus::Pending,
        };
        if let Some(project) = store.project_mut(project_id) {
            project.pending_officers.push(officer.clone());
        }
        store.registrations.push(registration.clone());
        self.persist_projects(&store)?;
        self.persist_registrations(&store)?;

        info!(
            registration_id = registration.id,
            officer = %officer,
            project_id,
            "officer registration submitted"
        );
        Ok(registration)
    }

    /// Decide a pending registration. Approval moves the officer from the
    /// project's pending list to its approved list; rejection drops the
    /// pending entry. Either way the registration is terminal afterwards.
    pub fn decide_registration(
        &self,
        registration_id: u32,
        manager: &Nric,
        decision: Decision,
    ) -> Result<Registration, EngineError> {
        let mut store = self.store();

        let (officer, project_id, status) = {
            let registration = store
                .registration(registration_id)
                .ok_or_else(|| EngineError::not_found("registration", registration_id))?;
            (
                registration.officer.clone(),
                registration.project_id,
                registration.status,
            )
        };
        if status != RegistrationStatus::Pending {
            return Err(Rejection::RegistrationDecided.into());
        }

        let project = store
            .project(project_id)
            .ok_or_else(|| EngineError::not_found("project", project_id))?;
        if &project.manager != manager {
            return Err(Rejection::NotProjectManager.into());
        }

        // Capacity may have been consumed since the registration was filed;
        // re-check so the approved list never exceeds the slot count.
        if decision == Decision::Approve && project.open_officer_slots() == 0 {
            return Err(Rejection::SlotUnavailable.into());
        }

        if let Some(project) = store.project_mut(project_id) {
            project.pending_officers.retain(|nric| nric != &officer);
            if decision == Decision::Approve {
                project.approved_officers.push(officer.clone());
            }
        }
        let decided = {
            let registration = store
                .registration_mut(registration_id)
                .ok_or_else(|| EngineError::not_found("registration", registration_id))?;
            registration.status = match decision {
                Decision::Approve => RegistrationStatus::Approved,
                Decision::Reject => RegistrationStatus::Rejected,
            };
            registration.clone()
        };
        self.persist_projects(&store)?;
        self.persist_registrations(&store)?;

        info!(
            registration_id,
            manager = %manager,
            status = decided.status.label(),
            "officer registration decided"
        );
        Ok(decided)
    }

    /// The single permitted user mutation.
    pub fn change_password(&self, nric: &Nric, new_password: &str) -> Result<(), EngineError> {
        let mut store = self.store();

        let user = store
            .user_mut(nric)
            .ok_or_else(|| EngineError::not_found("user", nric))?;
        user.password = new_password.to_string();
        self.persist_users(&store)?;

        info!(user = %nric, "password changed");
        Ok(())
    }

    pub fn application(&self, application_id: u32) -> Result<Application, EngineError> {
        self.store()
            .application(application_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("application", application_id))
    }

    pub fn registration(&self, registration_id: u32) -> Result<Registration, EngineError> {
        self.store()
            .registration(registration_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("registration", registration_id))
    }

    pub fn applications_for(&self, applicant: &Nric) -> Vec<Application> {
        self.store()
            .applications
            .iter()
            .filter(|application| &application.applicant == applicant)
            .cloned()
            .collect()
    }

    pub fn registrations_for(&self, officer: &Nric) -> Vec<Registration> {
        self.store()
            .registrations
            .iter()
            .filter(|registration| &registration.officer == officer)
            .cloned()
            .collect()
    }

    /// Pending registrations against any project the manager owns.
    pub fn pending_registrations_for_manager(&self, manager: &Nric) -> Vec<Registration> {
        let store = self.store();
        store
            .registrations
            .iter()
            .filter(|registration| registration.status == RegistrationStatus::Pending)
            .filter(|registration| {
                store
                    .project(registration.project_id)
                    .is_some_and(|project| &project.manager == manager)
            })
            .cloned()
            .collect()
    }

    pub fn visible_projects(&self) -> Vec<Project> {
        projects::visible_projects(&self.store().projects)
    }

    pub fn manager_projects(&self, manager: &Nric) -> Vec<Project> {
        projects::manager_projects(&self.store().projects, manager)
    }

    pub fn officer_projects(&self, officer: &Nric) -> Vec<Project> {
        projects::officer_projects(&self.store().projects, officer)
    }

    /// Visible projects narrowed by a display filter.
    pub fn filtered_visible_projects(&self, filter: &ViewFilter) -> Vec<Project> {
        projects::filtered(&projects::visible_projects(&self.store().projects), filter)
    }
}

fn load_collection<T>(
    collection: &'static str,
    load: impl FnOnce() -> Result<Vec<T>, RepositoryError>,
) -> Result<Vec<T>, EngineError> {
    load().map_err(|source| EngineError::Persistence { collection, source })
}
