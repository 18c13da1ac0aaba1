//! Background requests. Each helper flips the relevant loading flag, clones
//! the client into a tokio task and reports back through an [`Event`].

use super::forms::Submission;
use super::{App, EventSender, PendingAction, Tab};
use crate::api::cameras::CamerasApi;
use crate::api::dashboard::DashboardApi;
use crate::api::incidents::IncidentsApi;
use crate::api::persons::PersonsApi;
use crate::api::reports::{self, ReportsApi};
use crate::api::trash::TrashApi;
use crate::api::types::IncidentDecision;
use crate::api::users::UsersApi;
use crate::event::Event;
use crate::session;
use std::future::Future;

fn spawn<F>(tx: &EventSender, generation: u64, fut: F)
where
    F: Future<Output = Event> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = Event::Stamped(generation, Box::new(fut.await));
        // a closed channel only means the UI already exited
        let _ = tx.send(event);
    });
}

impl App {
    pub(crate) fn start_login(&mut self, tx: &EventSender) {
        if self.login.submitting {
            return;
        }
        // checked here as well so a bad matricule never spawns a request
        if let Err(errors) =
            crate::validation::validate_login(&self.login.matricule, &self.login.password)
        {
            self.login.message = errors.first().map(str::to_string);
            self.login.errors = errors;
            return;
        }
        self.login.errors = Default::default();
        self.login.message = None;
        self.login.submitting = true;

        let client = self.client.clone();
        let matricule = self.login.matricule.clone();
        let password = self.login.password.clone();
        spawn(tx, self.generation, async move {
            Event::LoginFinished(session::login(&client, &matricule, &password).await)
        });
    }

    pub(crate) fn logout(&mut self) {
        self.state.session.logout(&self.client);
        self.end_session(Some("Vous êtes déconnecté".to_string()));
    }

    pub(crate) fn check_auth(&mut self, tx: &EventSender) {
        let client = self.client.clone();
        spawn(tx, self.generation, async move {
            Event::AuthChecked(session::check_auth(&client).await)
        });
    }

    pub(crate) fn fetch_tab(&mut self, tx: &EventSender) {
        if !self.can(self.tab.view_action()) {
            return;
        }
        match self.tab {
            Tab::Dashboard => self.fetch_dashboard(tx),
            Tab::Incidents => self.fetch_incidents(tx),
            Tab::Cameras => self.fetch_cameras(tx),
            Tab::Persons => self.fetch_persons(tx),
            Tab::Reports => self.fetch_reports(tx),
            Tab::Users => self.fetch_users(tx),
            Tab::Trash => self.fetch_trash(tx),
        }
    }

    fn fetch_dashboard(&mut self, tx: &EventSender) {
        let client = self.client.clone();
        spawn(tx, self.generation, async move {
            let result = async {
                let stats = client.get_dashboard().await?;
                let alerts = client.get_alerts().await?;
                Ok::<_, crate::error::ApiError>((stats, alerts))
            }
            .await;
            Event::DashboardFetched(result)
        });
    }

    fn fetch_incidents(&mut self, tx: &EventSender) {
        self.state.incidents.begin_load();
        let client = self.client.clone();
        let page = self.state.incidents.page;
        let filter = self.incident_filter;
        spawn(tx, self.generation, async move {
            Event::IncidentsFetched(client.get_incidents(page, filter).await)
        });
    }

    fn fetch_cameras(&mut self, tx: &EventSender) {
        self.state.cameras.begin_load();
        let client = self.client.clone();
        let page = self.state.cameras.page;
        let filter = self.camera_filter;
        spawn(tx, self.generation, async move {
            Event::CamerasFetched(client.get_cameras(page, filter).await)
        });
    }

    fn fetch_persons(&mut self, tx: &EventSender) {
        self.state.persons.begin_load();
        let client = self.client.clone();
        let page = self.state.persons.page;
        let search = self.person_search.clone();
        spawn(tx, self.generation, async move {
            Event::PersonsFetched(client.get_persons(page, Some(&search)).await)
        });
    }

    fn fetch_reports(&mut self, tx: &EventSender) {
        self.state.reports.begin_load();
        let client = self.client.clone();
        let page = self.state.reports.page;
        spawn(tx, self.generation, async move {
            Event::ReportsFetched(client.get_reports(page).await)
        });
    }

    fn fetch_users(&mut self, tx: &EventSender) {
        self.state.users.begin_load();
        let client = self.client.clone();
        let page = self.state.users.page;
        spawn(tx, self.generation, async move { Event::UsersFetched(client.get_users(page).await) });
    }

    pub(crate) fn fetch_trash(&mut self, tx: &EventSender) {
        self.state.trash.begin_load();
        let client = self.client.clone();
        spawn(tx, self.generation, async move { Event::TrashFetched(client.get_trash().await) });
    }

    pub(crate) fn fetch_statistics(&mut self, tx: &EventSender) {
        let client = self.client.clone();
        let tab = self.tab;
        spawn(tx, self.generation, async move {
            let result = match tab {
                Tab::Cameras => client.get_camera_statistics().await,
                Tab::Persons => client.get_person_statistics().await,
                Tab::Users => client.get_user_statistics().await,
                _ => client.get_incident_statistics().await,
            };
            Event::StatisticsFetched(tab, result)
        });
    }

    pub(crate) fn fetch_incident_detail(&mut self, id: i64, tx: &EventSender) {
        let client = self.client.clone();
        spawn(tx, self.generation, async move {
            Event::IncidentDetail(client.get_incident(id).await)
        });
    }

    pub(crate) fn fetch_camera_detail(&mut self, id: i64, tx: &EventSender) {
        let client = self.client.clone();
        spawn(tx, self.generation, async move {
            Event::CameraDetail(client.get_camera(id).await)
        });
    }

    /// The record and its interpellation history, fetched together.
    pub(crate) fn fetch_person_detail(&mut self, id: i64, tx: &EventSender) {
        let client = self.client.clone();
        spawn(tx, self.generation, async move {
            let result = async {
                let person = client.get_person(id).await?;
                let history = client.get_interpellations(id).await?;
                Ok::<_, crate::error::ApiError>((person, history))
            }
            .await;
            Event::PersonDetail(result)
        });
    }

    pub(crate) fn review_incident(&mut self, id: i64, decision: IncidentDecision, tx: &EventSender) {
        let client = self.client.clone();
        spawn(tx, self.generation, async move {
            Event::IncidentSaved(client.validate_incident(id, decision).await)
        });
    }

    pub(crate) fn download_report(&mut self, id: i64, tx: &EventSender) {
        self.set_status(format!("Téléchargement du rapport #{id}..."));
        let client = self.client.clone();
        let dir = self.download_dir.clone();
        spawn(tx, self.generation, async move {
            Event::ReportDownloaded(reports::download_to(&client, id, &dir).await)
        });
    }

    /// Sends a validated form. The form stays open (submit disabled) until
    /// the matching completion event arrives.
    pub(crate) fn dispatch(&mut self, submission: Submission, tx: &EventSender) {
        let client = self.client.clone();
        let generation = self.generation;
        match submission {
            Submission::CreateCamera(req) => spawn(tx, generation, async move {
                Event::CameraSaved(client.create_camera(&req).await)
            }),
            Submission::UpdateCamera(id, req) => spawn(tx, generation, async move {
                Event::CameraSaved(client.update_camera(id, &req).await)
            }),
            Submission::CreateIncident(req) => spawn(tx, generation, async move {
                Event::IncidentSaved(client.create_incident(&req).await)
            }),
            Submission::UpdateIncident(id, req) => spawn(tx, generation, async move {
                Event::IncidentSaved(client.update_incident(id, &req).await)
            }),
            Submission::CreatePerson(req) => spawn(tx, generation, async move {
                Event::PersonSaved(client.create_person(&req).await)
            }),
            Submission::UpdatePerson(id, req) => spawn(tx, generation, async move {
                Event::PersonSaved(client.update_person(id, &req).await)
            }),
            Submission::SearchPersons(term) => {
                self.form = None;
                self.person_search = term;
                self.state.persons.page = 1;
                self.fetch_persons(tx);
            }
            Submission::AddInterpellation(person_id, req) => spawn(tx, generation, async move {
                Event::InterpellationAdded(person_id, client.add_interpellation(person_id, &req).await)
            }),
            Submission::GenerateReport(incident_id, observations) => spawn(tx, generation, async move {
                Event::ReportGenerated(client.generate_report(incident_id, &observations).await)
            }),
            Submission::CreateUser(req) => spawn(tx, generation, async move {
                Event::UserSaved(client.create_user(&req).await)
            }),
            Submission::UpdateUser(id, req) => spawn(tx, generation, async move {
                Event::UserSaved(client.update_user(id, &req).await)
            }),
            Submission::ResetPassword(id, password) => spawn(tx, generation, async move {
                Event::PasswordReset(client.reset_password(id, &password).await)
            }),
        }
    }

    pub(crate) fn perform(&mut self, action: PendingAction, tx: &EventSender) {
        let client = self.client.clone();
        let generation = self.generation;
        match action {
            PendingAction::Delete(tab, id) => spawn(tx, generation, async move {
                let result = match tab {
                    Tab::Cameras => client.delete_camera(id).await,
                    Tab::Incidents => client.delete_incident(id).await,
                    Tab::Persons => client.delete_person(id).await,
                    _ => client.delete_user(id).await,
                };
                Event::Deleted(tab, id, result)
            }),
            PendingAction::ToggleUser(id) => spawn(tx, generation, async move {
                Event::UserSaved(client.toggle_status(id).await)
            }),
            PendingAction::Restore(kind, id) => spawn(tx, generation, async move {
                let result = client
                    .restore(kind, id)
                    .await
                    .map(|()| format!("{kind} #{id} restauré(e)"));
                Event::TrashUpdated(result)
            }),
            PendingAction::Purge(kind, id) => spawn(tx, generation, async move {
                let result = client
                    .delete_permanently(kind, id)
                    .await
                    .map(|()| format!("{kind} #{id} supprimé(e) définitivement"));
                Event::TrashUpdated(result)
            }),
            PendingAction::EmptyTrash => spawn(tx, generation, async move {
                let result = client
                    .empty_trash()
                    .await
                    .map(|()| "Corbeille vidée".to_string());
                Event::TrashUpdated(result)
            }),
        }
    }
}
