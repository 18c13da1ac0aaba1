mod actions;
pub mod forms;
mod keys;

use crate::api::ApiClient;
use crate::api::types::{Camera, CameraStatus, Incident, IncidentStatus, Page, Person, TrashKind};
use crate::common::utils::format_timestamp;
use crate::error::ApiError;
use crate::event::{Event, EventHandler};
use crate::permissions::Action;
use crate::store::AppState;
use crate::tui::Tui;
use crate::ui;
use crate::validation::FieldErrors;
use anyhow::Result;
use forms::FormState;
use ratatui::widgets::TableState;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

pub type EventSender = UnboundedSender<Event>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Dashboard,
    Incidents,
    Cameras,
    Persons,
    Reports,
    Users,
    Trash,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Dashboard,
        Tab::Incidents,
        Tab::Cameras,
        Tab::Persons,
        Tab::Reports,
        Tab::Users,
        Tab::Trash,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Tableau de bord",
            Tab::Incidents => "Incidents",
            Tab::Cameras => "Caméras",
            Tab::Persons => "Personnes",
            Tab::Reports => "Rapports",
            Tab::Users => "Utilisateurs",
            Tab::Trash => "Corbeille",
        }
    }

    /// Permission needed for the tab to be shown at all.
    pub fn view_action(&self) -> Action {
        match self {
            Tab::Dashboard => Action::ViewDashboard,
            Tab::Incidents => Action::ViewIncidents,
            Tab::Cameras => Action::ViewCameras,
            Tab::Persons => Action::ViewPersons,
            Tab::Reports => Action::ViewReports,
            Tab::Users => Action::ManageUsers,
            Tab::Trash => Action::ManageTrash,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Matricule,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub matricule: String,
    pub password: String,
    pub focus: LoginField,
    pub errors: FieldErrors,
    pub submitting: bool,
    pub message: Option<String>,
}

/// Destructive operation waiting for a y/n answer.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Delete(Tab, i64),
    ToggleUser(i64),
    Restore(TrashKind, i64),
    Purge(TrashKind, i64),
    EmptyTrash,
}

#[derive(Debug, Clone)]
pub struct Confirm {
    pub message: String,
    pub action: PendingAction,
}

/// Read-only overlay (details, statistics, interpellations).
#[derive(Debug, Clone)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub client: ApiClient,
    pub download_dir: PathBuf,
    pub screen: Screen,
    pub tab: Tab,
    pub table_state: TableState,
    pub login: LoginForm,
    pub form: Option<FormState>,
    pub confirm: Option<Confirm>,
    pub popup: Option<Popup>,
    pub status: Option<StatusLine>,
    pub incident_filter: Option<IncidentStatus>,
    pub camera_filter: Option<CameraStatus>,
    pub person_search: String,
    /// Bumped whenever a session ends; completions from older sessions are ignored.
    pub generation: u64,
}

impl App {
    pub fn new(state: AppState, client: ApiClient, download_dir: PathBuf) -> Self {
        let screen = if state.session.is_authenticated() {
            Screen::Main
        } else {
            Screen::Login
        };
        Self {
            should_quit: false,
            state,
            client,
            download_dir,
            screen,
            tab: Tab::Dashboard,
            table_state: TableState::default(),
            login: LoginForm::default(),
            form: None,
            confirm: None,
            popup: None,
            status: None,
            incident_filter: None,
            camera_filter: None,
            person_search: String::new(),
            generation: 0,
        }
    }

    pub async fn run(&mut self, tui: &mut Tui, events: &mut EventHandler) -> Result<()> {
        if self.screen == Screen::Main {
            self.check_auth(&events.sender());
            self.fetch_tab(&events.sender());
        }

        while !self.should_quit {
            tui.draw(|f| {
                ui::render(self, f);
            })?;

            let event = events.next().await?;
            self.handle_event(event, &events.sender());
        }
        Ok(())
    }

    pub fn can(&self, action: Action) -> bool {
        self.state.session.can(action)
    }

    pub fn visible_tabs(&self) -> Vec<Tab> {
        Tab::ALL
            .into_iter()
            .filter(|t| self.can(t.view_action()))
            .collect()
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: false,
        });
    }

    pub(crate) fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: true,
        });
    }

    /// Shared failure path: a 401 anywhere ends the session.
    pub(crate) fn api_failed(&mut self, err: &ApiError) {
        if err.is_unauthorized() {
            self.end_session(Some(err.user_message()));
        } else {
            tracing::warn!(error = %err, "request failed");
            self.set_error(err.user_message());
        }
    }

    pub(crate) fn end_session(&mut self, message: Option<String>) {
        self.generation += 1;
        self.state.session.expire(&self.client);
        self.state.reset_data();
        self.screen = Screen::Login;
        self.tab = Tab::Dashboard;
        self.form = None;
        self.confirm = None;
        self.popup = None;
        self.status = None;
        self.login = LoginForm {
            message,
            ..LoginForm::default()
        };
    }

    pub(crate) fn current_len(&self) -> usize {
        match self.tab {
            Tab::Dashboard => self.state.alerts.len(),
            Tab::Incidents => self.state.incidents.items.len(),
            Tab::Cameras => self.state.cameras.items.len(),
            Tab::Persons => self.state.persons.items.len(),
            Tab::Reports => self.state.reports.items.len(),
            Tab::Users => self.state.users.items.len(),
            Tab::Trash => self.state.trash.items.len(),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.current_len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    fn loaded(&mut self, err: Option<ApiError>) {
        if let Some(e) = err {
            self.api_failed(&e);
        }
        self.clamp_selection();
    }

    pub fn handle_event(&mut self, event: Event, tx: &EventSender) {
        match event {
            Event::Tick | Event::Mouse(_) | Event::Resize(_, _) => {}
            Event::Key(key) => self.handle_key_event(key, tx),
            Event::Stamped(generation, inner) => {
                if generation == self.generation {
                    self.handle_event(*inner, tx);
                } else {
                    tracing::debug!(generation, current = self.generation, "dropping stale completion");
                }
            }
            Event::LoginFinished(result) => {
                self.login.submitting = false;
                match result {
                    Ok(payload) => {
                        if let Err(e) = self.state.session.establish(&self.client, payload) {
                            tracing::error!(error = %e, "could not persist session");
                            self.set_error("Session non enregistrée sur le disque");
                        }
                        self.login = LoginForm::default();
                        self.screen = Screen::Main;
                        self.tab = Tab::Dashboard;
                        self.fetch_tab(tx);
                    }
                    Err(e) => {
                        if let crate::session::LoginError::Form(errors) = &e {
                            self.login.errors = errors.clone();
                        }
                        self.login.message = Some(e.user_message());
                    }
                }
            }
            Event::AuthChecked(result) => match result {
                Ok(user) => {
                    if let Err(e) = self.state.session.refresh_user(user) {
                        tracing::error!(error = %e, "could not persist refreshed user");
                    }
                    if !self.can(self.tab.view_action()) {
                        self.tab = Tab::Dashboard;
                    }
                }
                Err(e) => self.api_failed(&e),
            },
            Event::DashboardFetched(result) => match result {
                Ok((stats, alerts)) => {
                    self.state.dashboard = Some(stats);
                    self.state.alerts = alerts;
                    self.state.dashboard_error = None;
                }
                Err(e) => {
                    self.state.dashboard_error = Some(e.user_message());
                    self.api_failed(&e);
                }
            },
            Event::CamerasFetched(result) => {
                let err = result.as_ref().err().cloned();
                self.state.cameras.finish(result);
                self.loaded(err);
            }
            Event::IncidentsFetched(result) => {
                let err = result.as_ref().err().cloned();
                self.state.incidents.finish(result);
                self.loaded(err);
            }
            Event::PersonsFetched(result) => {
                let err = result.as_ref().err().cloned();
                self.state.persons.finish(result);
                self.loaded(err);
            }
            Event::UsersFetched(result) => {
                let err = result.as_ref().err().cloned();
                self.state.users.finish(result);
                self.loaded(err);
            }
            Event::ReportsFetched(result) => {
                let err = result.as_ref().err().cloned();
                self.state.reports.finish(result);
                self.loaded(err);
            }
            Event::TrashFetched(result) => {
                let err = result.as_ref().err().cloned();
                self.state.trash.finish(result.map(|items| Page {
                    items,
                    pagination: None,
                }));
                self.loaded(err);
            }
            Event::CameraSaved(result) => {
                self.saved(result, tx, |app, camera| {
                    app.state.cameras.upsert(camera);
                    "Caméra enregistrée"
                });
            }
            Event::IncidentSaved(result) => {
                self.saved(result, tx, |app, incident| {
                    app.state.incidents.upsert(incident);
                    "Incident enregistré"
                });
            }
            Event::PersonSaved(result) => {
                self.saved(result, tx, |app, person| {
                    app.state.persons.upsert(person);
                    "Personne enregistrée"
                });
            }
            Event::UserSaved(result) => {
                self.saved(result, tx, |app, user| {
                    app.state.users.upsert(user);
                    "Utilisateur enregistré"
                });
            }
            Event::ReportGenerated(result) => {
                self.saved(result, tx, |app, report| {
                    app.state.reports.upsert(report);
                    "Rapport généré"
                });
            }
            Event::InterpellationAdded(person_id, result) => {
                self.saved(result, tx, |app, record| {
                    if let Some(person) = app
                        .state
                        .persons
                        .items
                        .iter_mut()
                        .find(|p| p.id == person_id)
                    {
                        person.interpellations.push(record);
                    }
                    "Interpellation enregistrée"
                });
            }
            Event::IncidentDetail(result) => match result {
                Ok(incident) => {
                    self.popup = Some(incident_popup(&incident));
                    self.state.incidents.upsert(incident);
                }
                Err(e) => self.api_failed(&e),
            },
            Event::CameraDetail(result) => match result {
                Ok(camera) => {
                    self.popup = Some(camera_popup(&camera));
                    self.state.cameras.upsert(camera);
                }
                Err(e) => self.api_failed(&e),
            },
            Event::PersonDetail(result) => match result {
                Ok((mut person, history)) => {
                    person.interpellations = history;
                    self.popup = Some(person_popup(&person));
                    self.state.persons.upsert(person);
                }
                Err(e) => self.api_failed(&e),
            },
            Event::Deleted(tab, id, result) => match result {
                Ok(()) => {
                    match tab {
                        Tab::Cameras => {
                            self.state.cameras.remove(id);
                        }
                        Tab::Incidents => {
                            self.state.incidents.remove(id);
                        }
                        Tab::Persons => {
                            self.state.persons.remove(id);
                        }
                        Tab::Users => {
                            self.state.users.remove(id);
                        }
                        _ => {}
                    }
                    self.clamp_selection();
                    self.set_status("Élément déplacé dans la corbeille");
                }
                Err(e) => self.api_failed(&e),
            },
            Event::TrashUpdated(result) => match result {
                Ok(message) => {
                    self.set_status(message);
                    self.fetch_trash(tx);
                }
                Err(e) => self.api_failed(&e),
            },
            Event::PasswordReset(result) => {
                self.saved(result, tx, |_, message| {
                    if message.is_some() {
                        tracing::debug!("password reset acknowledged");
                    }
                    "Mot de passe réinitialisé"
                });
            }
            Event::ReportDownloaded(result) => match result {
                Ok(path) => {
                    crate::common::utils::open_external(&path.to_string_lossy());
                    self.set_status(format!("Rapport enregistré: {}", path.display()));
                }
                Err(e) => self.api_failed(&e),
            },
            Event::StatisticsFetched(tab, result) => match result {
                Ok(value) => {
                    self.popup = Some(Popup {
                        title: format!("Statistiques: {}", tab.title()),
                        lines: crate::common::utils::flatten_json(&value),
                    });
                }
                Err(e) => self.api_failed(&e),
            },
        }
    }

    /// Completion of a form submission: close the form, patch the store,
    /// then re-fetch the list so the server's view wins.
    fn saved<T>(
        &mut self,
        result: Result<T, ApiError>,
        tx: &EventSender,
        apply: impl FnOnce(&mut Self, T) -> &'static str,
    ) {
        match result {
            Ok(value) => {
                self.form = None;
                let message = apply(self, value);
                self.set_status(message);
                self.fetch_tab(tx);
            }
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    form.submitting = false;
                }
                self.api_failed(&e);
            }
        }
    }
}

fn incident_popup(incident: &Incident) -> Popup {
    let mut lines = vec![
        ("Type".to_string(), incident.incident_type.clone()),
        ("Statut".to_string(), incident.status.label().to_string()),
        ("Zone".to_string(), incident.zone.clone()),
        ("Date".to_string(), format_timestamp(incident.occurred_at.as_deref())),
        ("Description".to_string(), incident.description.clone()),
    ];
    if let Some(camera) = &incident.camera {
        lines.push((
            "Caméra".to_string(),
            format!("{} ({})", camera.serial_number, camera.ip_address),
        ));
    } else if let Some(id) = incident.camera_id {
        lines.push(("Caméra".to_string(), format!("#{id}")));
    }
    if let Some(user) = &incident.user {
        lines.push(("Signalé par".to_string(), format!("{} ({})", user.name, user.matricule)));
    }
    for (i, photo) in incident.photos.iter().enumerate() {
        lines.push((format!("Photo {}", i + 1), photo.clone()));
    }
    Popup {
        title: format!("Incident #{}", incident.id),
        lines,
    }
}

fn camera_popup(camera: &Camera) -> Popup {
    let installed = camera
        .installed_at
        .map_or_else(|| "-".to_string(), |d| d.format("%d/%m/%Y").to_string());
    Popup {
        title: format!("Caméra {}", camera.serial_number),
        lines: vec![
            ("Adresse IP".to_string(), camera.ip_address.clone()),
            ("Zone".to_string(), camera.zone.clone()),
            ("Emplacement".to_string(), camera.location.clone()),
            ("Statut".to_string(), camera.status.label().to_string()),
            ("Installée le".to_string(), installed),
        ],
    }
}

fn person_popup(person: &Person) -> Popup {
    let mut lines = vec![
        ("CIN".to_string(), person.cin.clone()),
        ("Statut".to_string(), person.status.label().to_string()),
    ];
    if person.interpellations.is_empty() {
        lines.push(("Interpellations".to_string(), "Aucune".to_string()));
    }
    for record in &person.interpellations {
        lines.push((format_timestamp(record.occurred_at.as_deref()), record.fact.clone()));
    }
    Popup {
        title: person.name.clone(),
        lines,
    }
}

#[cfg(test)]
mod tests;
