use crate::permissions::Role;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend `{success, data, message, pagination}` wrapper.
#[derive(Debug, Deserialize, Clone)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub pagination: Option<Pagination>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Pagination {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// One page of a list endpoint.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

pub trait Identified {
    fn id(&self) -> i64;
}

macro_rules! identified {
    ($($ty:ty),*) => {
        $(impl Identified for $ty {
            fn id(&self) -> i64 {
                self.id
            }
        })*
    };
}

identified!(User, Camera, Incident, Person, Report, Interpellation, Alert);

// ---------------------------------------------------------------------------
// Users & auth
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub matricule: String,
    pub name: String,
    pub role: Role,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Clone)]
pub struct LoginRequest {
    pub matricule: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub matricule: String,
    pub name: String,
    pub role: Role,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub photo: Option<std::path::PathBuf>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UpdateUserRequest {
    pub matricule: String,
    pub name: String,
    pub role: Role,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ResetPasswordRequest {
    pub password: String,
}

// ---------------------------------------------------------------------------
// Cameras
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    Active,
    Faulty,
    Offline,
}

impl CameraStatus {
    pub const ALL: [CameraStatus; 3] = [Self::Active, Self::Faulty, Self::Offline];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Faulty => "faulty",
            Self::Offline => "offline",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Faulty => "En panne",
            Self::Offline => "Hors ligne",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Camera {
    pub id: i64,
    pub serial_number: String,
    pub ip_address: String,
    pub zone: String,
    pub location: String,
    pub status: CameraStatus,
    pub installed_at: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CameraRequest {
    pub serial_number: String,
    pub ip_address: String,
    pub zone: String,
    pub location: String,
    pub status: CameraStatus,
    pub installed_at: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Incidents
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Pending,
    Validated,
    Rejected,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Validated => "Validé",
            Self::Rejected => "Rejeté",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Incident {
    pub id: i64,
    pub occurred_at: Option<String>,
    pub incident_type: String,
    pub description: String,
    pub zone: String,
    #[serde(default)]
    pub photos: Vec<String>,
    pub camera_id: Option<i64>,
    pub user_id: Option<i64>,
    pub status: IncidentStatus,
    pub camera: Option<Camera>,
    pub user: Option<User>,
}

/// Multipart body for `POST incidents`; photos are local file paths.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncident {
    pub incident_type: String,
    pub description: String,
    pub zone: String,
    pub camera_id: Option<i64>,
    pub photos: Vec<std::path::PathBuf>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UpdateIncidentRequest {
    pub incident_type: String,
    pub description: String,
    pub zone: String,
    pub camera_id: Option<i64>,
}

/// Supervisor decision on a pending incident.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IncidentDecision {
    Validated,
    Rejected,
}

#[derive(Debug, Serialize, Clone)]
pub(crate) struct ValidateIncidentRequest {
    pub status: IncidentDecision,
}

// ---------------------------------------------------------------------------
// Persons
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PersonStatus {
    Internal,
    External,
}

impl PersonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Internal => "Interne",
            Self::External => "Externe",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "internal" | "interne" => Some(Self::Internal),
            "external" | "externe" => Some(Self::External),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Interpellation {
    pub id: i64,
    pub person_id: Option<i64>,
    pub fact: String,
    pub occurred_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub cin: String,
    pub status: PersonStatus,
    pub photo: Option<String>,
    #[serde(default)]
    pub interpellations: Vec<Interpellation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonForm {
    pub name: String,
    pub cin: String,
    pub status: PersonStatus,
    pub photo: Option<std::path::PathBuf>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewInterpellation {
    pub fact: String,
    pub occurred_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Report {
    pub id: i64,
    pub incident_id: i64,
    pub observations: Option<String>,
    pub created_at: Option<String>,
    pub incident: Option<Incident>,
}

#[derive(Debug, Serialize, Clone)]
pub struct GenerateReportRequest {
    pub observations: String,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DashboardStats {
    pub incidents_total: u64,
    pub incidents_pending: u64,
    pub cameras_total: u64,
    pub cameras_active: u64,
    pub cameras_faulty: u64,
    pub cameras_offline: u64,
    pub persons_total: u64,
    pub users_total: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Alert {
    pub id: i64,
    pub level: String,
    pub message: String,
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Trash
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrashKind {
    Camera,
    Incident,
    Personne,
    User,
}

impl TrashKind {
    pub fn as_path(&self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Incident => "incident",
            Self::Personne => "personne",
            Self::User => "user",
        }
    }
}

impl fmt::Display for TrashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Camera => "Caméra",
            Self::Incident => "Incident",
            Self::Personne => "Personne",
            Self::User => "Utilisateur",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrashItem {
    pub id: i64,
    pub kind: TrashKind,
    pub label: String,
    pub deleted_at: Option<String>,
}

/// Trash ids are only unique per kind, so the store key folds the kind in.
impl Identified for TrashItem {
    fn id(&self) -> i64 {
        let tag = match self.kind {
            TrashKind::Camera => 0,
            TrashKind::Incident => 1,
            TrashKind::Personne => 2,
            TrashKind::User => 3,
        };
        self.id * 4 + tag
    }
}
