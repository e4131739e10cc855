use super::domain::{Application, Nric, Project, Registration, RegistrationStatus, User};

/// In-memory session state: the four record collections, loaded once from
/// the repositories and owned exclusively for the run. Relations are
/// resolved by id lookup; nothing holds a reference across collections.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub applications: Vec<Application>,
    pub registrations: Vec<Registration>,
}

/// Identifier allocation: one past the current maximum, scoped per
/// collection. Ids from different collections are never compared.
/// Saturates at the numeric ceiling rather than wrapping back to zero.
fn next_id(ids: impl Iterator<Item = u32>) -> u32 {
    ids.max().unwrap_or(0).saturating_add(1)
}

impl RecordStore {
    pub fn user(&self, nric: &Nric) -> Option<&User> {
        self.users.iter().find(|user| &user.nric == nric)
    }

    pub fn user_mut(&mut self, nric: &Nric) -> Option<&mut User> {
        self.users.iter_mut().find(|user| &user.nric == nric)
    }

    pub fn project(&self, id: u32) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn project_mut(&mut self, id: u32) -> Option<&mut Project> {
        self.projects.iter_mut().find(|project| project.id == id)
    }

    pub fn application(&self, id: u32) -> Option<&Application> {
        self.applications.iter().find(|app| app.id == id)
    }

    pub fn application_mut(&mut self, id: u32) -> Option<&mut Application> {
        self.applications.iter_mut().find(|app| app.id == id)
    }

    pub fn registration(&self, id: u32) -> Option<&Registration> {
        self.registrations.iter().find(|reg| reg.id == id)
    }

    pub fn registration_mut(&mut self, id: u32) -> Option<&mut Registration> {
        self.registrations.iter_mut().find(|reg| reg.id == id)
    }

    /// The applicant's live (non-withdrawn) application, if any.
    pub fn active_application_for(&self, nric: &Nric) -> Option<&Application> {
        self.applications
            .iter()
            .find(|app| &app.applicant == nric && app.is_active())
    }

    pub fn application_against(&self, nric: &Nric, project_id: u32) -> Option<&Application> {
        self.applications
            .iter()
            .find(|app| &app.applicant == nric && app.project_id == project_id)
    }

    pub fn registration_against(&self, nric: &Nric, project_id: u32) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|reg| &reg.officer == nric && reg.project_id == project_id)
    }

    pub fn approved_registrations_for<'a>(
        &'a self,
        nric: &'a Nric,
    ) -> impl Iterator<Item = &'a Registration> {
        self.registrations
            .iter()
            .filter(move |reg| &reg.officer == nric && reg.status == RegistrationStatus::Approved)
    }

    pub fn next_application_id(&self) -> u32 {
        next_id(self.applications.iter().map(|app| app.id))
    }

    pub fn next_registration_id(&self) -> u32 {
        next_id(self.registrations.iter().map(|reg| reg.id))
    }

    pub fn next_project_id(&self) -> u32 {
        next_id(self.projects.iter().map(|project| project.id))
    }
}
