//! Client-side form checks. Everything here runs before a request is built;
//! a form that fails never reaches the network.

use crate::api::types::{
    CameraRequest, CameraStatus, LoginRequest, NewIncident, NewInterpellation, NewUser,
    PersonForm, PersonStatus, UpdateIncidentRequest, UpdateUserRequest,
};
use crate::permissions::Role;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static MATRICULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{7}$").expect("valid regex"));

static IPV4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])$")
        .expect("valid regex")
});

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[0-9]{8,15}$").expect("valid regex"));

static CIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{1,2}[0-9]{3,8}$").expect("valid regex"));

pub const MSG_REQUIRED: &str = "Ce champ est obligatoire";
pub const MSG_MATRICULE: &str = "Le matricule doit contenir 7 chiffres";
pub const MSG_IP: &str = "Format d'adresse IP invalide";
pub const MSG_EMAIL: &str = "Adresse e-mail invalide";
pub const MSG_PHONE: &str = "Numéro de téléphone invalide";
pub const MSG_CIN: &str = "Format de CIN invalide";
pub const MSG_PASSWORD: &str = "Le mot de passe doit contenir au moins 8 caractères";
pub const MSG_DATE: &str = "Date invalide (AAAA-MM-JJ)";
pub const MSG_DATETIME: &str = "Date invalide (AAAA-MM-JJ HH:MM)";
pub const MSG_CAMERA_ID: &str = "Identifiant de caméra invalide";

/// Ordered `field → message` list, first error per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.0.push((field, message.into()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(|(_, m)| m.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }

    fn required(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, MSG_REQUIRED);
        }
    }
}

pub fn is_valid_matricule(raw: &str) -> bool {
    MATRICULE_RE.is_match(raw.trim())
}

pub fn is_valid_ipv4(raw: &str) -> bool {
    IPV4_RE.is_match(raw.trim())
}

pub fn is_valid_email(raw: &str) -> bool {
    EMAIL_RE.is_match(raw.trim())
}

pub fn is_valid_phone(raw: &str) -> bool {
    PHONE_RE.is_match(&raw.replace(' ', ""))
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn paths(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

pub fn validate_login(matricule: &str, password: &str) -> Result<LoginRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    if matricule.trim().is_empty() {
        errors.add("matricule", MSG_REQUIRED);
    } else if !is_valid_matricule(matricule) {
        errors.add("matricule", MSG_MATRICULE);
    }
    if password.is_empty() {
        errors.add("password", MSG_REQUIRED);
    }
    errors.finish(|| LoginRequest {
        matricule: matricule.trim().to_string(),
        password: password.to_string(),
    })
}

pub fn validate_password(password: &str) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::default();
    if password.chars().count() < 8 {
        errors.add("password", MSG_PASSWORD);
    }
    errors.finish(|| password.to_string())
}

#[derive(Debug, Default, Clone)]
pub struct CameraInput<'a> {
    pub serial_number: &'a str,
    pub ip_address: &'a str,
    pub zone: &'a str,
    pub location: &'a str,
    pub status: &'a str,
    pub installed_at: &'a str,
}

pub fn validate_camera(input: &CameraInput<'_>) -> Result<CameraRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.required("serial_number", input.serial_number);
    if input.ip_address.trim().is_empty() {
        errors.add("ip_address", MSG_REQUIRED);
    } else if !is_valid_ipv4(input.ip_address) {
        errors.add("ip_address", MSG_IP);
    }
    errors.required("zone", input.zone);
    errors.required("location", input.location);

    let status = if input.status.trim().is_empty() {
        Some(CameraStatus::Active)
    } else {
        CameraStatus::parse(input.status)
    };
    if status.is_none() {
        errors.add("status", "Statut attendu: active, faulty ou offline");
    }

    let installed_at = match optional(input.installed_at) {
        None => None,
        Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("installed_at", MSG_DATE);
                None
            }
        },
    };

    errors.finish(|| CameraRequest {
        serial_number: input.serial_number.trim().to_string(),
        ip_address: input.ip_address.trim().to_string(),
        zone: input.zone.trim().to_string(),
        location: input.location.trim().to_string(),
        status: status.unwrap_or(CameraStatus::Active),
        installed_at,
    })
}

#[derive(Debug, Default, Clone)]
pub struct IncidentInput<'a> {
    pub incident_type: &'a str,
    pub description: &'a str,
    pub zone: &'a str,
    pub camera_id: &'a str,
    /// Comma-separated local file paths.
    pub photos: &'a str,
}

fn check_incident(input: &IncidentInput<'_>, errors: &mut FieldErrors) -> Option<i64> {
    errors.required("incident_type", input.incident_type);
    errors.required("description", input.description);
    errors.required("zone", input.zone);
    match optional(input.camera_id) {
        None => None,
        Some(raw) => match raw.parse::<i64>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                errors.add("camera_id", MSG_CAMERA_ID);
                None
            }
        },
    }
}

pub fn validate_new_incident(input: &IncidentInput<'_>) -> Result<NewIncident, FieldErrors> {
    let mut errors = FieldErrors::default();
    let camera_id = check_incident(input, &mut errors);
    errors.finish(|| NewIncident {
        incident_type: input.incident_type.trim().to_string(),
        description: input.description.trim().to_string(),
        zone: input.zone.trim().to_string(),
        camera_id,
        photos: paths(input.photos),
    })
}

pub fn validate_incident_update(
    input: &IncidentInput<'_>,
) -> Result<UpdateIncidentRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    let camera_id = check_incident(input, &mut errors);
    errors.finish(|| UpdateIncidentRequest {
        incident_type: input.incident_type.trim().to_string(),
        description: input.description.trim().to_string(),
        zone: input.zone.trim().to_string(),
        camera_id,
    })
}

#[derive(Debug, Default, Clone)]
pub struct PersonInput<'a> {
    pub name: &'a str,
    pub cin: &'a str,
    pub status: &'a str,
    pub photo: &'a str,
}

pub fn validate_person(input: &PersonInput<'_>) -> Result<PersonForm, FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.required("name", input.name);
    if input.cin.trim().is_empty() {
        errors.add("cin", MSG_REQUIRED);
    } else if !CIN_RE.is_match(input.cin.trim()) {
        errors.add("cin", MSG_CIN);
    }
    let status = if input.status.trim().is_empty() {
        Some(PersonStatus::External)
    } else {
        PersonStatus::parse(input.status)
    };
    if status.is_none() {
        errors.add("status", "Statut attendu: interne ou externe");
    }
    errors.finish(|| PersonForm {
        name: input.name.trim().to_string(),
        cin: input.cin.trim().to_uppercase(),
        status: status.unwrap_or(PersonStatus::External),
        photo: optional(input.photo).map(PathBuf::from),
    })
}

pub fn validate_interpellation(
    fact: &str,
    occurred_at: &str,
) -> Result<NewInterpellation, FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.required("fact", fact);
    let occurred_at = match optional(occurred_at) {
        None => None,
        Some(raw) => match NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M") {
            Ok(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            Err(_) => {
                errors.add("occurred_at", MSG_DATETIME);
                None
            }
        },
    };
    errors.finish(|| NewInterpellation {
        fact: fact.trim().to_string(),
        occurred_at,
    })
}

pub fn validate_observations(observations: &str) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.required("observations", observations);
    errors.finish(|| observations.trim().to_string())
}

#[derive(Debug, Default, Clone)]
pub struct UserInput<'a> {
    pub matricule: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password: &'a str,
    pub photo: &'a str,
}

fn check_user(input: &UserInput<'_>, errors: &mut FieldErrors) -> Option<Role> {
    if input.matricule.trim().is_empty() {
        errors.add("matricule", MSG_REQUIRED);
    } else if !is_valid_matricule(input.matricule) {
        errors.add("matricule", MSG_MATRICULE);
    }
    errors.required("name", input.name);
    let role = Role::parse(input.role);
    if role.is_none() {
        errors.add("role", "Rôle attendu: admin, agent, technicien ou responsable");
    }
    if optional(input.email).is_some_and(|e| !is_valid_email(&e)) {
        errors.add("email", MSG_EMAIL);
    }
    if optional(input.phone).is_some_and(|p| !is_valid_phone(&p)) {
        errors.add("phone", MSG_PHONE);
    }
    role
}

pub fn validate_new_user(input: &UserInput<'_>) -> Result<NewUser, FieldErrors> {
    let mut errors = FieldErrors::default();
    let role = check_user(input, &mut errors);
    if input.password.chars().count() < 8 {
        errors.add("password", MSG_PASSWORD);
    }
    errors.finish(|| NewUser {
        matricule: input.matricule.trim().to_string(),
        name: input.name.trim().to_string(),
        role: role.unwrap_or(Role::Agent),
        email: optional(input.email),
        phone: optional(input.phone),
        password: input.password.to_string(),
        photo: optional(input.photo).map(PathBuf::from),
    })
}

pub fn validate_user_update(input: &UserInput<'_>) -> Result<UpdateUserRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    let role = check_user(input, &mut errors);
    errors.finish(|| UpdateUserRequest {
        matricule: input.matricule.trim().to_string(),
        name: input.name.trim().to_string(),
        role: role.unwrap_or(Role::Agent),
        email: optional(input.email),
        phone: optional(input.phone),
    })
}
