use crate::api::types::{
    Camera, CameraRequest, Incident, NewIncident, NewInterpellation, NewUser, Person, PersonForm,
    UpdateIncidentRequest, UpdateUserRequest, User,
};
use crate::validation::{
    self, CameraInput, FieldErrors, IncidentInput, PersonInput, UserInput,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    CreateCamera,
    EditCamera(i64),
    CreateIncident,
    EditIncident(i64),
    CreatePerson,
    EditPerson(i64),
    SearchPersons,
    AddInterpellation(i64),
    GenerateReport(i64),
    CreateUser,
    EditUser(i64),
    ResetPassword(i64),
}

impl FormKind {
    pub fn title(&self) -> String {
        match self {
            Self::CreateCamera => "Nouvelle caméra".to_string(),
            Self::EditCamera(id) => format!("Modifier la caméra #{id}"),
            Self::CreateIncident => "Signaler un incident".to_string(),
            Self::EditIncident(id) => format!("Modifier l'incident #{id}"),
            Self::CreatePerson => "Nouvelle personne".to_string(),
            Self::EditPerson(id) => format!("Modifier la personne #{id}"),
            Self::SearchPersons => "Rechercher une personne".to_string(),
            Self::AddInterpellation(id) => format!("Interpellation pour la personne #{id}"),
            Self::GenerateReport(id) => format!("Rapport pour l'incident #{id}"),
            Self::CreateUser => "Nouvel utilisateur".to_string(),
            Self::EditUser(id) => format!("Modifier l'utilisateur #{id}"),
            Self::ResetPassword(id) => format!("Réinitialiser le mot de passe #{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub masked: bool,
}

impl FormField {
    fn new(key: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            label,
            value: value.into(),
            masked: false,
        }
    }

    fn masked(mut self) -> Self {
        self.masked = true;
        self
    }
}

/// A validated form, ready to be turned into a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    CreateCamera(CameraRequest),
    UpdateCamera(i64, CameraRequest),
    CreateIncident(NewIncident),
    UpdateIncident(i64, UpdateIncidentRequest),
    CreatePerson(PersonForm),
    UpdatePerson(i64, PersonForm),
    SearchPersons(String),
    AddInterpellation(i64, NewInterpellation),
    GenerateReport(i64, String),
    CreateUser(NewUser),
    UpdateUser(i64, UpdateUserRequest),
    ResetPassword(i64, String),
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub active: usize,
    pub errors: FieldErrors,
    pub submitting: bool,
}

impl FormState {
    fn new(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            fields,
            active: 0,
            errors: FieldErrors::default(),
            submitting: false,
        }
    }

    pub fn camera(existing: Option<&Camera>) -> Self {
        let kind = existing.map_or(FormKind::CreateCamera, |c| FormKind::EditCamera(c.id));
        let get = |f: fn(&Camera) -> String| existing.map(f).unwrap_or_default();
        Self::new(
            kind,
            vec![
                FormField::new("serial_number", "N° de série", get(|c| c.serial_number.clone())),
                FormField::new("ip_address", "Adresse IP", get(|c| c.ip_address.clone())),
                FormField::new("zone", "Zone", get(|c| c.zone.clone())),
                FormField::new("location", "Emplacement", get(|c| c.location.clone())),
                FormField::new(
                    "status",
                    "Statut (active/faulty/offline)",
                    get(|c| c.status.as_str().to_string()),
                ),
                FormField::new(
                    "installed_at",
                    "Date d'installation (AAAA-MM-JJ)",
                    get(|c| c.installed_at.map(|d| d.to_string()).unwrap_or_default()),
                ),
            ],
        )
    }

    pub fn incident(existing: Option<&Incident>) -> Self {
        let kind = existing.map_or(FormKind::CreateIncident, |i| FormKind::EditIncident(i.id));
        let get = |f: fn(&Incident) -> String| existing.map(f).unwrap_or_default();
        let mut fields = vec![
            FormField::new("incident_type", "Type", get(|i| i.incident_type.clone())),
            FormField::new("description", "Description", get(|i| i.description.clone())),
            FormField::new("zone", "Zone", get(|i| i.zone.clone())),
            FormField::new(
                "camera_id",
                "Caméra (id, optionnel)",
                get(|i| i.camera_id.map(|id| id.to_string()).unwrap_or_default()),
            ),
        ];
        // photos are only attached at creation
        if existing.is_none() {
            fields.push(FormField::new(
                "photos",
                "Photos (chemins séparés par des virgules)",
                "",
            ));
        }
        Self::new(kind, fields)
    }

    pub fn person(existing: Option<&Person>) -> Self {
        let kind = existing.map_or(FormKind::CreatePerson, |p| FormKind::EditPerson(p.id));
        let get = |f: fn(&Person) -> String| existing.map(f).unwrap_or_default();
        Self::new(
            kind,
            vec![
                FormField::new("name", "Nom complet", get(|p| p.name.clone())),
                FormField::new("cin", "CIN", get(|p| p.cin.clone())),
                FormField::new(
                    "status",
                    "Statut (interne/externe)",
                    get(|p| p.status.as_str().to_string()),
                ),
                FormField::new("photo", "Photo (chemin, optionnel)", ""),
            ],
        )
    }

    pub fn person_search(current: &str) -> Self {
        Self::new(
            FormKind::SearchPersons,
            vec![FormField::new("search", "Nom ou CIN", current)],
        )
    }

    pub fn interpellation(person_id: i64) -> Self {
        Self::new(
            FormKind::AddInterpellation(person_id),
            vec![
                FormField::new("fact", "Faits reprochés", ""),
                FormField::new("occurred_at", "Date (AAAA-MM-JJ HH:MM, optionnel)", ""),
            ],
        )
    }

    pub fn report(incident_id: i64) -> Self {
        Self::new(
            FormKind::GenerateReport(incident_id),
            vec![FormField::new("observations", "Observations", "")],
        )
    }

    pub fn user(existing: Option<&User>) -> Self {
        let kind = existing.map_or(FormKind::CreateUser, |u| FormKind::EditUser(u.id));
        let get = |f: fn(&User) -> String| existing.map(f).unwrap_or_default();
        let mut fields = vec![
            FormField::new("matricule", "Matricule", get(|u| u.matricule.clone())),
            FormField::new("name", "Nom", get(|u| u.name.clone())),
            FormField::new(
                "role",
                "Rôle (admin/agent/technicien/responsable)",
                get(|u| u.role.as_str().to_string()),
            ),
            FormField::new("email", "E-mail", get(|u| u.email.clone().unwrap_or_default())),
            FormField::new("phone", "Téléphone", get(|u| u.phone.clone().unwrap_or_default())),
        ];
        if existing.is_none() {
            fields.push(FormField::new("password", "Mot de passe", "").masked());
            fields.push(FormField::new("photo", "Photo (chemin, optionnel)", ""));
        }
        Self::new(kind, fields)
    }

    pub fn reset_password(user_id: i64) -> Self {
        Self::new(
            FormKind::ResetPassword(user_id),
            vec![FormField::new("password", "Nouveau mot de passe", "").masked()],
        )
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.value.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.value.pop();
        }
    }

    /// Validates the current values. On failure the errors are kept on the
    /// form for inline display.
    pub fn submit(&mut self) -> Option<Submission> {
        match self.build() {
            Ok(submission) => {
                self.errors = FieldErrors::default();
                Some(submission)
            }
            Err(errors) => {
                if let Some(idx) = self
                    .fields
                    .iter()
                    .position(|f| errors.get(f.key).is_some())
                {
                    self.active = idx;
                }
                self.errors = errors;
                None
            }
        }
    }

    fn build(&self) -> Result<Submission, FieldErrors> {
        let v = |key: &'static str| self.value(key);
        match self.kind {
            FormKind::CreateCamera | FormKind::EditCamera(_) => {
                let req = validation::validate_camera(&CameraInput {
                    serial_number: v("serial_number"),
                    ip_address: v("ip_address"),
                    zone: v("zone"),
                    location: v("location"),
                    status: v("status"),
                    installed_at: v("installed_at"),
                })?;
                Ok(match self.kind {
                    FormKind::EditCamera(id) => Submission::UpdateCamera(id, req),
                    _ => Submission::CreateCamera(req),
                })
            }
            FormKind::CreateIncident => {
                validation::validate_new_incident(&IncidentInput {
                    incident_type: v("incident_type"),
                    description: v("description"),
                    zone: v("zone"),
                    camera_id: v("camera_id"),
                    photos: v("photos"),
                })
                .map(Submission::CreateIncident)
            }
            FormKind::EditIncident(id) => validation::validate_incident_update(&IncidentInput {
                incident_type: v("incident_type"),
                description: v("description"),
                zone: v("zone"),
                camera_id: v("camera_id"),
                photos: "",
            })
            .map(|req| Submission::UpdateIncident(id, req)),
            FormKind::CreatePerson | FormKind::EditPerson(_) => {
                let form = validation::validate_person(&PersonInput {
                    name: v("name"),
                    cin: v("cin"),
                    status: v("status"),
                    photo: v("photo"),
                })?;
                Ok(match self.kind {
                    FormKind::EditPerson(id) => Submission::UpdatePerson(id, form),
                    _ => Submission::CreatePerson(form),
                })
            }
            FormKind::SearchPersons => Ok(Submission::SearchPersons(v("search").trim().to_string())),
            FormKind::AddInterpellation(person_id) => {
                validation::validate_interpellation(v("fact"), v("occurred_at"))
                    .map(|req| Submission::AddInterpellation(person_id, req))
            }
            FormKind::GenerateReport(incident_id) => {
                validation::validate_observations(v("observations"))
                    .map(|obs| Submission::GenerateReport(incident_id, obs))
            }
            FormKind::CreateUser => validation::validate_new_user(&UserInput {
                matricule: v("matricule"),
                name: v("name"),
                role: v("role"),
                email: v("email"),
                phone: v("phone"),
                password: v("password"),
                photo: v("photo"),
            })
            .map(Submission::CreateUser),
            FormKind::EditUser(id) => validation::validate_user_update(&UserInput {
                matricule: v("matricule"),
                name: v("name"),
                role: v("role"),
                email: v("email"),
                phone: v("phone"),
                ..Default::default()
            })
            .map(|req| Submission::UpdateUser(id, req)),
            FormKind::ResetPassword(id) => validation::validate_password(v("password"))
                .map(|pw| Submission::ResetPassword(id, pw)),
        }
    }
}
