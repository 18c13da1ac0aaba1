//! Single role → permission table.
//!
//! Every view and key binding asks [`can`] instead of carrying its own role
//! list, so a role's reach is decided in exactly one place.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Agent,
    Technicien,
    Responsable,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Agent, Role::Technicien, Role::Responsable];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::Technicien => "technicien",
            Role::Responsable => "responsable",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrateur",
            Role::Agent => "Agent",
            Role::Technicien => "Technicien",
            Role::Responsable => "Responsable",
        }
    }

    pub fn parse(raw: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewDashboard,
    ViewIncidents,
    CreateIncident,
    ValidateIncident,
    DeleteIncident,
    ViewCameras,
    ManageCameras,
    DeleteCamera,
    ViewPersons,
    ManagePersons,
    DeletePerson,
    ViewReports,
    GenerateReport,
    DownloadReport,
    ViewStatistics,
    ManageUsers,
    ManageTrash,
}

const EVERYONE: &[Role] = &[Role::Admin, Role::Agent, Role::Technicien, Role::Responsable];
const SUPERVISORS: &[Role] = &[Role::Admin, Role::Responsable];
const FIELD_STAFF: &[Role] = &[Role::Admin, Role::Responsable, Role::Agent];
const CAMERA_STAFF: &[Role] = &[Role::Admin, Role::Responsable, Role::Technicien];
const ADMINS: &[Role] = &[Role::Admin];

pub fn allowed_roles(action: Action) -> &'static [Role] {
    use Action::*;
    match action {
        ViewDashboard | ViewIncidents | ViewCameras | ViewPersons => EVERYONE,
        CreateIncident | ManagePersons => FIELD_STAFF,
        ManageCameras => CAMERA_STAFF,
        ValidateIncident | DeleteIncident | DeleteCamera | DeletePerson | ViewReports
        | GenerateReport | DownloadReport | ViewStatistics | ManageTrash => SUPERVISORS,
        ManageUsers => ADMINS,
    }
}

/// Pure membership test.
pub fn has_role(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

pub fn can(role: Role, action: Action) -> bool {
    has_role(role, allowed_roles(action))
}
