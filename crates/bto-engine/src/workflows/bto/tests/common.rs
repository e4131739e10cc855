use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::bto::domain::{
    Application, MaritalStatus, Nric, Project, Registration, Role, UnitInventory, User,
};
use crate::workflows::bto::repository::{
    ApplicationRepository, ProjectRepository, RegistrationRepository, RepositoryError,
    UserRepository,
};
use crate::workflows::bto::service::BtoService;

pub(super) fn nric(raw: &str) -> Nric {
    Nric::parse(raw).expect("valid NRIC fixture")
}

pub(super) fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date fixture")
}

pub(super) fn user(raw: &str, age: u32, marital_status: MaritalStatus, role: Role) -> User {
    User {
        nric: nric(raw),
        name: format!("User {raw}"),
        password: "password".to_string(),
        age,
        marital_status,
        role,
        filter: None,
    }
}

/// Single applicant over the age floor, eligible for 2-Room only.
pub(super) fn applicant() -> User {
    user("S1234567A", 36, MaritalStatus::Single, Role::Applicant)
}

pub(super) fn married_applicant() -> User {
    user("T2345678B", 30, MaritalStatus::Married, Role::Applicant)
}

pub(super) fn officer() -> User {
    user("T7654321C", 40, MaritalStatus::Married, Role::Officer)
}

pub(super) fn manager() -> User {
    user("S9876543D", 45, MaritalStatus::Married, Role::Manager)
}

pub(super) fn project(
    id: u32,
    name: &str,
    open: &str,
    close: &str,
    officer_slots: u8,
    visible: bool,
    manager: &Nric,
) -> Project {
    Project {
        id,
        name: name.to_string(),
        neighborhood: "Punggol".to_string(),
        two_room: UnitInventory {
            units: 50,
            price: 120_000,
        },
        three_room: UnitInventory {
            units: 30,
            price: 180_000,
        },
        open_date: date(open),
        close_date: date(close),
        officer_slots,
        pending_officers: Vec::new(),
        approved_officers: Vec::new(),
        visible,
        manager: manager.clone(),
    }
}

/// In-memory repository shared by all four collections. Saves can be
/// switched to fail so persistence outcomes are observable.
pub(super) struct MemoryRepo<T> {
    rows: Mutex<Vec<T>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl<T> Default for MemoryRepo<T> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail_saves: AtomicBool::new(false),
            saves: AtomicUsize::new(0),
        }
    }
}

impl<T: Clone> MemoryRepo<T> {
    pub(super) fn seeded(rows: Vec<T>) -> Arc<Self> {
        let repo = Self::default();
        *repo.rows.lock().expect("lock") = rows;
        Arc::new(repo)
    }

    pub(super) fn rows(&self) -> Vec<T> {
        self.rows.lock().expect("lock").clone()
    }

    pub(super) fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Relaxed);
    }

    pub(super) fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    fn load(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.rows.lock().expect("lock").clone())
    }

    fn save(&self, rows: &[T]) -> Result<(), RepositoryError> {
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(RepositoryError::Unavailable("saves disabled".to_string()));
        }
        *self.rows.lock().expect("lock") = rows.to_vec();
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl UserRepository for MemoryRepo<User> {
    fn load_all(&self) -> Result<Vec<User>, RepositoryError> {
        self.load()
    }

    fn save_all(&self, users: &[User]) -> Result<(), RepositoryError> {
        self.save(users)
    }
}

impl ProjectRepository for MemoryRepo<Project> {
    fn load_all(&self) -> Result<Vec<Project>, RepositoryError> {
        self.load()
    }

    fn save_all(&self, projects: &[Project]) -> Result<(), RepositoryError> {
        self.save(projects)
    }
}

impl ApplicationRepository for MemoryRepo<Application> {
    fn load_all(&self) -> Result<Vec<Application>, RepositoryError> {
        self.load()
    }

    fn save_all(&self, applications: &[Application]) -> Result<(), RepositoryError> {
        self.save(applications)
    }
}

impl RegistrationRepository for MemoryRepo<Registration> {
    fn load_all(&self) -> Result<Vec<Registration>, RepositoryError> {
        self.load()
    }

    fn save_all(&self, registrations: &[Registration]) -> Result<(), RepositoryError> {
        self.save(registrations)
    }
}

pub(super) type Service =
    BtoService<MemoryRepo<User>, MemoryRepo<Project>, MemoryRepo<Application>, MemoryRepo<Registration>>;

pub(super) struct Harness {
    pub(super) service: Service,
    pub(super) users: Arc<MemoryRepo<User>>,
    pub(super) projects: Arc<MemoryRepo<Project>>,
    pub(super) applications: Arc<MemoryRepo<Application>>,
    pub(super) registrations: Arc<MemoryRepo<Registration>>,
}

pub(super) fn harness(
    users: Vec<User>,
    projects: Vec<Project>,
    applications: Vec<Application>,
    registrations: Vec<Registration>,
) -> Harness {
    let users = MemoryRepo::seeded(users);
    let projects = MemoryRepo::seeded(projects);
    let applications = MemoryRepo::seeded(applications);
    let registrations = MemoryRepo::seeded(registrations);
    let service = BtoService::load(
        users.clone(),
        projects.clone(),
        applications.clone(),
        registrations.clone(),
    )
    .expect("service loads from seeded repositories");

    Harness {
        service,
        users,
        projects,
        applications,
        registrations,
    }
}
