//! CSV-backed repositories, one file per collection.
//!
//! Rows are plain delimited text with a fixed column order; embedded
//! delimiters are quoted by the `csv` crate. Row order carries no meaning.
//! Decoding is strict: any unrecognized tag or malformed field aborts the
//! whole load with a descriptive error instead of skipping the row.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    Application, ApplicationKind, ApplicationStatus, FlatType, MaritalStatus, Nric, Project,
    Registration, RegistrationStatus, Role, UnitInventory, UnknownTag, User, ViewFilter,
};
use super::repository::{
    ApplicationRepository, ProjectRepository, RegistrationRepository, RepositoryError,
    UserRepository,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const LIST_SEPARATOR: char = ';';

fn parse_tag<T>(raw: &str) -> Result<T, RepositoryError>
where
    T: FromStr<Err = UnknownTag>,
{
    raw.parse().map_err(|tag: UnknownTag| decode_error(tag))
}

fn decode_error(message: impl ToString) -> RepositoryError {
    RepositoryError::Decode(message.to_string())
}

fn parse_nric(raw: &str) -> Result<Nric, RepositoryError> {
    Nric::parse(raw).map_err(decode_error)
}

fn parse_date(raw: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| decode_error(format!("invalid date '{raw}': expected YYYY-MM-DD")))
}

fn parse_nric_list(raw: &str) -> Result<Vec<Nric>, RepositoryError> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_nric)
        .collect()
}

fn join_nric_list(nrics: &[Nric]) -> String {
    nrics
        .iter()
        .map(Nric::as_str)
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

fn read_rows<T>(path: &Path) -> Result<Vec<T>, RepositoryError>
where
    T: for<'de> Deserialize<'de>,
{
    // A missing file is an empty collection; the first save creates it.
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for row in reader.deserialize::<T>() {
        rows.push(row?);
    }
    Ok(rows)
}

fn write_rows<T>(path: &Path, rows: impl Iterator<Item = T>) -> Result<(), RepositoryError>
where
    T: Serialize,
{
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct UserRow {
    nric: String,
    name: String,
    password: String,
    age: u32,
    marital_status: String,
    role: String,
    #[serde(default)]
    filter_room_type: String,
    #[serde(default)]
    filter_min_price: String,
    #[serde(default)]
    filter_max_price: String,
}

fn optional_u32(raw: &str) -> Result<Option<u32>, RepositoryError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| decode_error(format!("invalid price '{raw}'")))
}

impl UserRow {
    fn from_user(user: &User) -> Self {
        let filter = user.filter.clone().unwrap_or_default();
        Self {
            nric: user.nric.to_string(),
            name: user.name.clone(),
            password: user.password.clone(),
            age: user.age,
            marital_status: user.marital_status.label().to_string(),
            role: user.role.label().to_string(),
            filter_room_type: filter
                .room_type
                .map(|room| room.label().to_string())
                .unwrap_or_default(),
            filter_min_price: filter
                .min_price
                .map(|price| price.to_string())
                .unwrap_or_default(),
            filter_max_price: filter
                .max_price
                .map(|price| price.to_string())
                .unwrap_or_default(),
        }
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let room_type = if self.filter_room_type.is_empty() {
            None
        } else {
            Some(parse_tag::<FlatType>(&self.filter_room_type)?)
        };
        let filter = ViewFilter {
            room_type,
            min_price: optional_u32(&self.filter_min_price)?,
            max_price: optional_u32(&self.filter_max_price)?,
        };

        Ok(User {
            nric: parse_nric(&self.nric)?,
            name: self.name,
            password: self.password,
            age: self.age,
            marital_status: parse_tag::<MaritalStatus>(&self.marital_status)?,
            role: parse_tag::<Role>(&self.role)?,
            filter: if filter.is_empty() { None } else { Some(filter) },
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ProjectRow {
    id: u32,
    name: String,
    neighborhood: String,
    two_room_units: u32,
    two_room_price: u32,
    three_room_units: u32,
    three_room_price: u32,
    open_date: String,
    close_date: String,
    officer_slots: u8,
    #[serde(default)]
    pending_officers: String,
    #[serde(default)]
    approved_officers: String,
    visible: bool,
    manager: String,
}

const MAX_OFFICER_SLOTS: u8 = 10;

impl ProjectRow {
    fn from_project(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            neighborhood: project.neighborhood.clone(),
            two_room_units: project.two_room.units,
            two_room_price: project.two_room.price,
            three_room_units: project.three_room.units,
            three_room_price: project.three_room.price,
            open_date: project.open_date.format(DATE_FORMAT).to_string(),
            close_date: project.close_date.format(DATE_FORMAT).to_string(),
            officer_slots: project.officer_slots,
            pending_officers: join_nric_list(&project.pending_officers),
            approved_officers: join_nric_list(&project.approved_officers),
            visible: project.visible,
            manager: project.manager.to_string(),
        }
    }

    fn into_project(self) -> Result<Project, RepositoryError> {
        let open_date = parse_date(&self.open_date)?;
        let close_date = parse_date(&self.close_date)?;
        if close_date < open_date {
            return Err(decode_error(format!(
                "project {}: close date {close_date} precedes open date {open_date}",
                self.id
            )));
        }
        if self.officer_slots > MAX_OFFICER_SLOTS {
            return Err(decode_error(format!(
                "project {}: officer slot capacity {} exceeds maximum {MAX_OFFICER_SLOTS}",
                self.id, self.officer_slots
            )));
        }

        let approved_officers = parse_nric_list(&self.approved_officers)?;
        if approved_officers.len() > usize::from(self.officer_slots) {
            return Err(decode_error(format!(
                "project {}: {} approved officers exceed {} slots",
                self.id,
                approved_officers.len(),
                self.officer_slots
            )));
        }

        Ok(Project {
            id: self.id,
            name: self.name,
            neighborhood: self.neighborhood,
            two_room: UnitInventory {
                units: self.two_room_units,
                price: self.two_room_price,
            },
            three_room: UnitInventory {
                units: self.three_room_units,
                price: self.three_room_price,
            },
            open_date,
            close_date,
            officer_slots: self.officer_slots,
            pending_officers: parse_nric_list(&self.pending_officers)?,
            approved_officers,
            visible: self.visible,
            manager: parse_nric(&self.manager)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApplicationRow {
    id: u32,
    applicant: String,
    project_id: u32,
    kind: String,
    status: String,
    flat_type: String,
}

impl ApplicationRow {
    fn from_application(application: &Application) -> Self {
        Self {
            id: application.id,
            applicant: application.applicant.to_string(),
            project_id: application.project_id,
            kind: application.kind.label().to_string(),
            status: application.status.label().to_string(),
            flat_type: application.flat_type.label().to_string(),
        }
    }

    fn into_application(self) -> Result<Application, RepositoryError> {
        Ok(Application {
            id: self.id,
            applicant: parse_nric(&self.applicant)?,
            project_id: self.project_id,
            kind: parse_tag::<ApplicationKind>(&self.kind)?,
            status: parse_tag::<ApplicationStatus>(&self.status)?,
            flat_type: parse_tag::<FlatType>(&self.flat_type)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistrationRow {
    id: u32,
    officer: String,
    project_id: u32,
    status: String,
}

impl RegistrationRow {
    fn from_registration(registration: &Registration) -> Self {
        Self {
            id: registration.id,
            officer: registration.officer.to_string(),
            project_id: registration.project_id,
            status: registration.status.label().to_string(),
        }
    }

    fn into_registration(self) -> Result<Registration, RepositoryError> {
        Ok(Registration {
            id: self.id,
            officer: parse_nric(&self.officer)?,
            project_id: self.project_id,
            status: parse_tag::<RegistrationStatus>(&self.status)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CsvUserRepository {
    path: PathBuf,
}

impl CsvUserRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UserRepository for CsvUserRepository {
    fn load_all(&self) -> Result<Vec<User>, RepositoryError> {
        read_rows::<UserRow>(&self.path)?
            .into_iter()
            .map(UserRow::into_user)
            .collect()
    }

    fn save_all(&self, users: &[User]) -> Result<(), RepositoryError> {
        write_rows(&self.path, users.iter().map(UserRow::from_user))
    }
}

#[derive(Debug, Clone)]
pub struct CsvProjectRepository {
    path: PathBuf,
}

impl CsvProjectRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProjectRepository for CsvProjectRepository {
    fn load_all(&self) -> Result<Vec<Project>, RepositoryError> {
        read_rows::<ProjectRow>(&self.path)?
            .into_iter()
            .map(ProjectRow::into_project)
            .collect()
    }

    fn save_all(&self, projects: &[Project]) -> Result<(), RepositoryError> {
        write_rows(&self.path, projects.iter().map(ProjectRow::from_project))
    }
}

#[derive(Debug, Clone)]
pub struct CsvApplicationRepository {
    path: PathBuf,
}

impl CsvApplicationRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ApplicationRepository for CsvApplicationRepository {
    fn load_all(&self) -> Result<Vec<Application>, RepositoryError> {
        read_rows::<ApplicationRow>(&self.path)?
            .into_iter()
            .map(ApplicationRow::into_application)
            .collect()
    }

    fn save_all(&self, applications: &[Application]) -> Result<(), RepositoryError> {
        write_rows(
            &self.path,
            applications.iter().map(ApplicationRow::from_application),
        )
    }
}

#[derive(Debug, Clone)]
pub struct CsvRegistrationRepository {
    path: PathBuf,
}

impl CsvRegistrationRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RegistrationRepository for CsvRegistrationRepository {
    fn load_all(&self) -> Result<Vec<Registration>, RepositoryError> {
        read_rows::<RegistrationRow>(&self.path)?
            .into_iter()
            .map(RegistrationRow::into_registration)
            .collect()
    }

    fn save_all(&self, registrations: &[Registration]) -> Result<(), RepositoryError> {
        write_rows(
            &self.path,
            registrations.iter().map(RegistrationRow::from_registration),
        )
    }
}
