use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Error raised when a textual tag does not match any known variant.
///
/// Persistence and request decoding both rely on this being descriptive: a
/// load aborts with the offending value rather than silently dropping rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind} tag '{value}'")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownTag {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// National identity number, the unique key for every user-linked record.
///
/// Format is `[ST]` followed by seven digits and an uppercase checksum letter,
/// e.g. `S1234567A`. Construction always validates, including during serde
/// decoding, so a malformed NRIC can never enter the record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nric(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid NRIC '{0}': expected [ST], seven digits, and an uppercase letter")]
pub struct InvalidNric(pub String);

impl Nric {
    pub fn parse(raw: &str) -> Result<Self, InvalidNric> {
        let bytes = raw.as_bytes();
        let well_formed = bytes.len() == 9
            && matches!(bytes[0], b'S' | b'T')
            && bytes[1..8].iter().all(u8::is_ascii_digit)
            && bytes[8].is_ascii_uppercase();

        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidNric(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Nric {
    type Err = InvalidNric;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl TryFrom<String> for Nric {
    type Error = InvalidNric;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Nric> for String {
    fn from(nric: Nric) -> Self {
        nric.0
    }
}

/// Unit category an applicant applies for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlatType {
    #[serde(rename = "TWOROOM")]
    TwoRoom,
    #[serde(rename = "THREEROOM")]
    ThreeRoom,
}

impl FlatType {
    pub const fn label(self) -> &'static str {
        match self {
            FlatType::TwoRoom => "TWOROOM",
            FlatType::ThreeRoom => "THREEROOM",
        }
    }
}

impl FromStr for FlatType {
    type Err = UnknownTag;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "TWOROOM" => Ok(FlatType::TwoRoom),
            "THREEROOM" => Ok(FlatType::ThreeRoom),
            other => Err(UnknownTag::new("flat type", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    #[serde(rename = "SINGLE")]
    Single,
    #[serde(rename = "MARRIED")]
    Married,
}

impl MaritalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            MaritalStatus::Single => "SINGLE",
            MaritalStatus::Married => "MARRIED",
        }
    }
}

impl FromStr for MaritalStatus {
    type Err = UnknownTag;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "SINGLE" => Ok(MaritalStatus::Single),
            "MARRIED" => Ok(MaritalStatus::Married),
            other => Err(UnknownTag::new("marital status", other)),
        }
    }
}

/// Capability tag carried on a user; operations are scoped by role rather
/// than by parallel user hierarchies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "APPLICANT")]
    Applicant,
    #[serde(rename = "OFFICER")]
    Officer,
    #[serde(rename = "MANAGER")]
    Manager,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Applicant => "APPLICANT",
            Role::Officer => "OFFICER",
            Role::Manager => "MANAGER",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownTag;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "APPLICANT" => Ok(Role::Applicant),
            "OFFICER" => Ok(Role::Officer),
            "MANAGER" => Ok(Role::Manager),
            other => Err(UnknownTag::new("role", other)),
        }
    }
}

/// Saved display preference narrowing project listings for a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub room_type: Option<FlatType>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
}

impl ViewFilter {
    pub fn is_empty(&self) -> bool {
        self.room_type.is_none() && self.min_price.is_none() && self.max_price.is_none()
    }
}

/// A registered user of the portal. Identity is the NRIC; the only field
/// mutated after load is the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub nric: Nric,
    pub name: String,
    pub password: String,
    pub age: u32,
    pub marital_status: MaritalStatus,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ViewFilter>,
}

/// Unit count and price for one room type within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitInventory {
    pub units: u32,
    pub price: u32,
}

/// A BTO launch open for applications between `open_date` and `close_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub name: String,
    pub neighborhood: String,
    pub two_room: UnitInventory,
    pub three_room: UnitInventory,
    pub open_date: NaiveDate,
    pub close_date: NaiveDate,
    pub officer_slots: u8,
    pub pending_officers: Vec<Nric>,
    pub approved_officers: Vec<Nric>,
    pub visible: bool,
    pub manager: Nric,
}

impl Project {
    pub fn inventory(&self, flat_type: FlatType) -> &UnitInventory {
        match flat_type {
            FlatType::TwoRoom => &self.two_room,
            FlatType::ThreeRoom => &self.three_room,
        }
    }

    /// Inclusive overlap test between two application windows. Adjacent
    /// windows (one closes the day before the other opens) do not overlap.
    pub fn window_overlaps(&self, other: &Project) -> bool {
        !(self.close_date < other.open_date || other.close_date < self.open_date)
    }

    pub fn open_officer_slots(&self) -> usize {
        usize::from(self.officer_slots).saturating_sub(self.approved_officers.len())
    }
}

/// Whether an application record is a live application or a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationKind {
    #[serde(rename = "APPLICATION")]
    Application,
    #[serde(rename = "WITHDRAWAL")]
    Withdrawal,
}

impl ApplicationKind {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationKind::Application => "APPLICATION",
            ApplicationKind::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl FromStr for ApplicationKind {
    type Err = UnknownTag;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "APPLICATION" => Ok(ApplicationKind::Application),
            "WITHDRAWAL" => Ok(ApplicationKind::Withdrawal),
            other => Err(UnknownTag::new("application kind", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "SUCCESSFUL")]
    Successful,
    #[serde(rename = "UNSUCCESSFUL")]
    Unsuccessful,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Successful => "SUCCESSFUL",
            ApplicationStatus::Unsuccessful => "UNSUCCESSFUL",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownTag;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "PENDING" => Ok(ApplicationStatus::Pending),
            "SUCCESSFUL" => Ok(ApplicationStatus::Successful),
            "UNSUCCESSFUL" => Ok(ApplicationStatus::Unsuccessful),
            other => Err(UnknownTag::new("application status", other)),
        }
    }
}

/// An applicant's request for a flat in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: u32,
    pub applicant: Nric,
    pub project_id: u32,
    pub kind: ApplicationKind,
    pub status: ApplicationStatus,
    pub flat_type: FlatType,
}

impl Application {
    /// A withdrawn application no longer counts against the
    /// one-application-per-applicant rule.
    pub fn is_active(&self) -> bool {
        self.kind == ApplicationKind::Application
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "APPROVED")]
    Approved,
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl RegistrationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "PENDING",
            RegistrationStatus::Approved => "APPROVED",
            RegistrationStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = UnknownTag;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "PENDING" => Ok(RegistrationStatus::Pending),
            "APPROVED" => Ok(RegistrationStatus::Approved),
            "REJECTED" => Ok(RegistrationStatus::Rejected),
            other => Err(UnknownTag::new("registration status", other)),
        }
    }
}

/// An officer's request to administer a project. Terminal once decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: u32,
    pub officer: Nric,
    pub project_id: u32,
    pub status: RegistrationStatus,
}
