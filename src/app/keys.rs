use super::forms::FormState;
use super::{App, Confirm, EventSender, LoginField, PendingAction, Screen, Tab};
use crate::api::types::{CameraStatus, IncidentDecision, IncidentStatus};
use crate::permissions::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const NOT_ALLOWED: &str = "Action non autorisée pour votre rôle";

impl App {
    pub(crate) fn handle_key_event(&mut self, key: KeyEvent, tx: &EventSender) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.screen == Screen::Login {
            self.handle_login_key(key, tx);
        } else if self.confirm.is_some() {
            self.handle_confirm_key(key, tx);
        } else if self.form.is_some() {
            self.handle_form_key(key, tx);
        } else if self.popup.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.popup = None;
            }
        } else {
            self.handle_main_key(key, tx);
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent, tx: &EventSender) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.login.focus = match self.login.focus {
                    LoginField::Matricule => LoginField::Password,
                    LoginField::Password => LoginField::Matricule,
                };
            }
            KeyCode::Enter => match self.login.focus {
                LoginField::Matricule => self.login.focus = LoginField::Password,
                LoginField::Password => self.start_login(tx),
            },
            KeyCode::Backspace => {
                self.login_field().pop();
            }
            KeyCode::Char(c) => self.login_field().push(c),
            _ => {}
        }
    }

    fn login_field(&mut self) -> &mut String {
        match self.login.focus {
            LoginField::Matricule => &mut self.login.matricule,
            LoginField::Password => &mut self.login.password,
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, tx: &EventSender) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('o') | KeyCode::Enter => {
                if let Some(confirm) = self.confirm.take() {
                    self.perform(confirm.action, tx);
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => self.confirm = None,
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent, tx: &EventSender) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Enter => {
                if form.submitting {
                    return;
                }
                if let Some(submission) = form.submit() {
                    form.submitting = true;
                    self.dispatch(submission, tx);
                }
            }
            KeyCode::Char(c) => form.push_char(c),
            _ => {}
        }
    }

    /// Returns false (and says so) when the role lacks `action`.
    fn require(&mut self, action: Action) -> bool {
        if self.can(action) {
            true
        } else {
            tracing::info!(?action, "action refused for role");
            self.set_error(NOT_ALLOWED);
            false
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent, tx: &EventSender) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('L') => {
                self.logout();
                return;
            }
            KeyCode::Tab => {
                self.cycle_tab(1, tx);
                return;
            }
            KeyCode::BackTab => {
                self.cycle_tab(-1, tx);
                return;
            }
            KeyCode::Char(c @ '1'..='7') => {
                let idx = c as usize - '1' as usize;
                if let Some(tab) = self.visible_tabs().get(idx).copied() {
                    self.switch_tab(tab, tx);
                }
                return;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.next_row();
                return;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.previous_row();
                return;
            }
            KeyCode::Char('n') | KeyCode::Right => {
                self.change_page(1, tx);
                return;
            }
            // `p` resets a password on the users tab
            KeyCode::Char('p') if self.tab != Tab::Users => {
                self.change_page(-1, tx);
                return;
            }
            KeyCode::Left => {
                self.change_page(-1, tx);
                return;
            }
            KeyCode::Char('r') => {
                self.fetch_tab(tx);
                return;
            }
            _ => {}
        }

        match self.tab {
            Tab::Dashboard => {}
            Tab::Incidents => self.incidents_key(key, tx),
            Tab::Cameras => self.cameras_key(key, tx),
            Tab::Persons => self.persons_key(key, tx),
            Tab::Reports => self.reports_key(key, tx),
            Tab::Users => self.users_key(key, tx),
            Tab::Trash => self.trash_key(key),
        }
    }

    pub(crate) fn switch_tab(&mut self, tab: Tab, tx: &EventSender) {
        if !self.can(tab.view_action()) {
            self.set_error(NOT_ALLOWED);
            return;
        }
        self.tab = tab;
        self.table_state.select(None);
        self.status = None;
        self.fetch_tab(tx);
    }

    fn cycle_tab(&mut self, step: isize, tx: &EventSender) {
        let tabs = self.visible_tabs();
        if tabs.is_empty() {
            return;
        }
        let current = tabs.iter().position(|t| *t == self.tab).unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = ((current + step) % len + len) % len;
        self.switch_tab(tabs[next as usize], tx);
    }

    fn next_row(&mut self) {
        let len = self.current_len();
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select((len > 0).then_some(i));
    }

    fn previous_row(&mut self) {
        let len = self.current_len();
        let i = match self.table_state.selected() {
            Some(0) | None => len.saturating_sub(1),
            Some(i) => i - 1,
        };
        self.table_state.select((len > 0).then_some(i));
    }

    fn change_page(&mut self, step: i64, tx: &EventSender) {
        let store_page = match self.tab {
            Tab::Incidents => (self.state.incidents.page, self.state.incidents.last_page()),
            Tab::Cameras => (self.state.cameras.page, self.state.cameras.last_page()),
            Tab::Persons => (self.state.persons.page, self.state.persons.last_page()),
            Tab::Reports => (self.state.reports.page, self.state.reports.last_page()),
            Tab::Users => (self.state.users.page, self.state.users.last_page()),
            Tab::Dashboard | Tab::Trash => return,
        };
        let (page, last) = store_page;
        let target = page as i64 + step;
        if target < 1 || target > last as i64 {
            return;
        }
        let target = target as u32;
        match self.tab {
            Tab::Incidents => self.state.incidents.page = target,
            Tab::Cameras => self.state.cameras.page = target,
            Tab::Persons => self.state.persons.page = target,
            Tab::Reports => self.state.reports.page = target,
            Tab::Users => self.state.users.page = target,
            Tab::Dashboard | Tab::Trash => {}
        }
        self.table_state.select(None);
        self.fetch_tab(tx);
    }

    fn selected_index(&self) -> Option<usize> {
        self.table_state.selected()
    }

    fn incidents_key(&mut self, key: KeyEvent, tx: &EventSender) {
        let selected = self
            .selected_index()
            .and_then(|i| self.state.incidents.items.get(i))
            .cloned();
        match key.code {
            KeyCode::Enter => {
                if let Some(incident) = selected {
                    self.fetch_incident_detail(incident.id, tx);
                }
            }
            KeyCode::Char('f') => {
                self.incident_filter = match self.incident_filter {
                    None => Some(IncidentStatus::Pending),
                    Some(IncidentStatus::Pending) => Some(IncidentStatus::Validated),
                    Some(IncidentStatus::Validated) => Some(IncidentStatus::Rejected),
                    Some(IncidentStatus::Rejected) => None,
                };
                self.state.incidents.page = 1;
                self.fetch_tab(tx);
            }
            KeyCode::Char('a') if self.require(Action::CreateIncident) => {
                self.form = Some(FormState::incident(None));
            }
            KeyCode::Char('e') if self.require(Action::CreateIncident) => {
                if let Some(incident) = selected {
                    self.form = Some(FormState::incident(Some(&incident)));
                }
            }
            KeyCode::Char(c @ ('v' | 'x')) if self.require(Action::ValidateIncident) => {
                let Some(incident) = selected else { return };
                if incident.status != IncidentStatus::Pending {
                    self.set_error("Seuls les incidents en attente peuvent être traités");
                    return;
                }
                let decision = if c == 'v' {
                    IncidentDecision::Validated
                } else {
                    IncidentDecision::Rejected
                };
                self.review_incident(incident.id, decision, tx);
            }
            KeyCode::Char('g') if self.require(Action::GenerateReport) => {
                let Some(incident) = selected else { return };
                if incident.status != IncidentStatus::Validated {
                    self.set_error("Un rapport exige un incident validé");
                    return;
                }
                self.form = Some(FormState::report(incident.id));
            }
            KeyCode::Char('d') if self.require(Action::DeleteIncident) => {
                if let Some(incident) = selected {
                    self.ask(
                        format!("Mettre l'incident #{} à la corbeille ?", incident.id),
                        PendingAction::Delete(Tab::Incidents, incident.id),
                    );
                }
            }
            KeyCode::Char('s') if self.require(Action::ViewStatistics) => self.fetch_statistics(tx),
            _ => {}
        }
    }

    fn cameras_key(&mut self, key: KeyEvent, tx: &EventSender) {
        let selected = self
            .selected_index()
            .and_then(|i| self.state.cameras.items.get(i))
            .cloned();
        match key.code {
            KeyCode::Enter => {
                if let Some(camera) = selected {
                    self.fetch_camera_detail(camera.id, tx);
                }
            }
            KeyCode::Char('f') => {
                self.camera_filter = match self.camera_filter {
                    None => Some(CameraStatus::Active),
                    Some(CameraStatus::Active) => Some(CameraStatus::Faulty),
                    Some(CameraStatus::Faulty) => Some(CameraStatus::Offline),
                    Some(CameraStatus::Offline) => None,
                };
                self.state.cameras.page = 1;
                self.fetch_tab(tx);
            }
            KeyCode::Char('a') if self.require(Action::ManageCameras) => {
                self.form = Some(FormState::camera(None));
            }
            KeyCode::Char('e') if self.require(Action::ManageCameras) => {
                if let Some(camera) = selected {
                    self.form = Some(FormState::camera(Some(&camera)));
                }
            }
            KeyCode::Char('d') if self.require(Action::DeleteCamera) => {
                if let Some(camera) = selected {
                    self.ask(
                        format!("Mettre la caméra {} à la corbeille ?", camera.serial_number),
                        PendingAction::Delete(Tab::Cameras, camera.id),
                    );
                }
            }
            KeyCode::Char('s') if self.require(Action::ViewStatistics) => self.fetch_statistics(tx),
            _ => {}
        }
    }

    fn persons_key(&mut self, key: KeyEvent, tx: &EventSender) {
        let selected = self
            .selected_index()
            .and_then(|i| self.state.persons.items.get(i))
            .cloned();
        match key.code {
            KeyCode::Enter => {
                if let Some(person) = selected {
                    self.fetch_person_detail(person.id, tx);
                }
            }
            KeyCode::Char('/') => {
                self.form = Some(FormState::person_search(&self.person_search));
            }
            KeyCode::Char('a') if self.require(Action::ManagePersons) => {
                self.form = Some(FormState::person(None));
            }
            KeyCode::Char('e') if self.require(Action::ManagePersons) => {
                if let Some(person) = selected {
                    self.form = Some(FormState::person(Some(&person)));
                }
            }
            KeyCode::Char('i') if self.require(Action::ManagePersons) => {
                if let Some(person) = selected {
                    self.form = Some(FormState::interpellation(person.id));
                }
            }
            KeyCode::Char('d') if self.require(Action::DeletePerson) => {
                if let Some(person) = selected {
                    self.ask(
                        format!("Mettre {} à la corbeille ?", person.name),
                        PendingAction::Delete(Tab::Persons, person.id),
                    );
                }
            }
            KeyCode::Char('s') if self.require(Action::ViewStatistics) => self.fetch_statistics(tx),
            _ => {}
        }
    }

    fn reports_key(&mut self, key: KeyEvent, tx: &EventSender) {
        let selected = self
            .selected_index()
            .and_then(|i| self.state.reports.items.get(i))
            .map(|r| r.id);
        if let KeyCode::Char('o') | KeyCode::Enter = key.code {
            if let Some(id) = selected {
                if self.require(Action::DownloadReport) {
                    self.download_report(id, tx);
                }
            }
        }
    }

    fn users_key(&mut self, key: KeyEvent, tx: &EventSender) {
        if !self.require(Action::ManageUsers) {
            return;
        }
        let selected = self
            .selected_index()
            .and_then(|i| self.state.users.items.get(i))
            .cloned();
        match key.code {
            KeyCode::Char('a') => self.form = Some(FormState::user(None)),
            KeyCode::Char('e') => {
                if let Some(user) = selected {
                    self.form = Some(FormState::user(Some(&user)));
                }
            }
            KeyCode::Char('p') => {
                if let Some(user) = selected {
                    self.form = Some(FormState::reset_password(user.id));
                }
            }
            KeyCode::Char('t') => {
                if let Some(user) = selected {
                    let verb = if user.is_active { "Désactiver" } else { "Activer" };
                    self.ask(
                        format!("{verb} le compte de {} ?", user.name),
                        PendingAction::ToggleUser(user.id),
                    );
                }
            }
            KeyCode::Char('d') => {
                if let Some(user) = selected {
                    self.ask(
                        format!("Mettre le compte de {} à la corbeille ?", user.name),
                        PendingAction::Delete(Tab::Users, user.id),
                    );
                }
            }
            KeyCode::Char('s') => self.fetch_statistics(tx),
            _ => {}
        }
    }

    fn trash_key(&mut self, key: KeyEvent) {
        if !self.require(Action::ManageTrash) {
            return;
        }
        let selected = self
            .selected_index()
            .and_then(|i| self.state.trash.items.get(i))
            .cloned();
        match key.code {
            KeyCode::Char('u') => {
                if let Some(item) = selected {
                    self.ask(
                        format!("Restaurer {} \"{}\" ?", item.kind, item.label),
                        PendingAction::Restore(item.kind, item.id),
                    );
                }
            }
            KeyCode::Char('D') => {
                if let Some(item) = selected {
                    self.ask(
                        format!("Supprimer définitivement {} \"{}\" ?", item.kind, item.label),
                        PendingAction::Purge(item.kind, item.id),
                    );
                }
            }
            KeyCode::Char('E') => {
                if !self.state.trash.items.is_empty() {
                    self.ask(
                        "Vider entièrement la corbeille ?".to_string(),
                        PendingAction::EmptyTrash,
                    );
                }
            }
            _ => {}
        }
    }

    fn ask(&mut self, message: String, action: PendingAction) {
        self.confirm = Some(Confirm { message, action });
    }

    /// Key hints for the footer; only actions the role may perform are listed.
    pub fn hints(&self) -> Vec<(&'static str, &'static str)> {
        let mut hints = vec![("Tab", "onglet"), ("j/k", "naviguer"), ("r", "actualiser")];
        let allowed = |action| self.can(action);
        match self.tab {
            Tab::Dashboard => {}
            Tab::Incidents => {
                hints.push(("Entrée", "détail"));
                hints.push(("f", "filtre"));
                if allowed(Action::CreateIncident) {
                    hints.push(("a/e", "signaler/modifier"));
                }
                if allowed(Action::ValidateIncident) {
                    hints.push(("v/x", "valider/rejeter"));
                }
                if allowed(Action::GenerateReport) {
                    hints.push(("g", "rapport"));
                }
                if allowed(Action::DeleteIncident) {
                    hints.push(("d", "corbeille"));
                }
            }
            Tab::Cameras => {
                hints.push(("Entrée", "détail"));
                hints.push(("f", "filtre"));
                if allowed(Action::ManageCameras) {
                    hints.push(("a/e", "ajouter/modifier"));
                }
                if allowed(Action::DeleteCamera) {
                    hints.push(("d", "corbeille"));
                }
            }
            Tab::Persons => {
                hints.push(("Entrée", "fiche"));
                hints.push(("/", "rechercher"));
                if allowed(Action::ManagePersons) {
                    hints.push(("a/e", "ajouter/modifier"));
                    hints.push(("i", "interpellation"));
                }
                if allowed(Action::DeletePerson) {
                    hints.push(("d", "corbeille"));
                }
            }
            Tab::Reports => {
                if allowed(Action::DownloadReport) {
                    hints.push(("o", "télécharger"));
                }
            }
            Tab::Users => {
                hints.push(("a/e", "ajouter/modifier"));
                hints.push(("p", "mot de passe"));
                hints.push(("t", "activer/désactiver"));
                hints.push(("d", "corbeille"));
            }
            Tab::Trash => {
                hints.push(("u", "restaurer"));
                hints.push(("D", "supprimer"));
                hints.push(("E", "vider"));
            }
        }
        match self.tab {
            Tab::Users => hints.push(("←/→", "page")),
            Tab::Incidents | Tab::Cameras | Tab::Persons | Tab::Reports => {
                hints.push(("n/p", "page"))
            }
            Tab::Dashboard | Tab::Trash => {}
        }
        if matches!(
            self.tab,
            Tab::Incidents | Tab::Cameras | Tab::Persons | Tab::Users
        ) && allowed(Action::ViewStatistics)
        {
            hints.push(("s", "statistiques"));
        }
        hints.push(("L", "déconnexion"));
        hints.push(("q", "quitter"));
        hints
    }
}
