use super::forms::{FormKind, FormState};
use super::*;
use crate::api::mock;
use crate::api::types::{AuthPayload, Camera, Incident, Pagination, User};
use crate::permissions::Role;
use crate::session::{Session, SessionStorage, TOKEN_KEY};
use crate::validation;
use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, Router};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

fn user(role: Role) -> User {
    User {
        id: 7,
        matricule: "1234567".into(),
        name: "Salma".into(),
        role,
        email: None,
        phone: None,
        is_active: true,
        created_at: None,
    }
}

fn camera(id: i64, status: CameraStatus) -> Camera {
    Camera {
        id,
        serial_number: format!("CAM-{id}"),
        ip_address: "10.0.0.4".into(),
        zone: "Quai 3".into(),
        location: "Portique".into(),
        status,
        installed_at: None,
    }
}

fn pending_incident(id: i64) -> Incident {
    serde_json::from_value(json!({
        "id": id,
        "incident_type": "intrusion",
        "description": "clôture coupée",
        "zone": "Quai 3",
        "status": "pending"
    }))
    .unwrap()
}

/// App signed in as `role` (or signed out), with session storage in a temp dir.
fn app_as(role: Option<Role>, client: ApiClient) -> (tempfile::TempDir, SessionStorage, App) {
    let dir = tempfile::tempdir().unwrap();
    let storage = SessionStorage::new(dir.path().join("session.json"));
    let mut session = Session::new(storage.clone());
    if let Some(role) = role {
        session
            .establish(
                &client,
                AuthPayload {
                    user: user(role),
                    token: "t-1".into(),
                },
            )
            .unwrap();
    }
    let app = App::new(AppState::new(session), client, dir.path().join("downloads"));
    (dir, storage, app)
}

fn press(app: &mut App, tx: &EventSender, code: KeyCode) {
    app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)), tx);
}

fn type_text(app: &mut App, tx: &EventSender, text: &str) {
    for c in text.chars() {
        press(app, tx, KeyCode::Char(c));
    }
}

#[tokio::test]
async fn unauthorized_response_returns_to_login() {
    let (_dir, storage, mut app) = app_as(Some(Role::Agent), mock::unreachable());
    let (tx, _rx) = mpsc::unbounded_channel();
    assert_eq!(app.screen, Screen::Main);
    app.state.cameras.items.push(camera(1, CameraStatus::Active));

    app.handle_event(Event::CamerasFetched(Err(ApiError::Unauthorized)), &tx);

    assert_eq!(app.screen, Screen::Login);
    assert!(!app.state.session.is_authenticated());
    assert!(app.state.cameras.items.is_empty());
    assert!(app.state.cameras.error.is_none());
    assert!(app.login.message.is_some());
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn restricted_tabs_follow_the_role() {
    for role in [Role::Agent, Role::Technicien] {
        let (_dir, _storage, app) = app_as(Some(role), mock::unreachable());
        let tabs = app.visible_tabs();
        assert!(!tabs.contains(&Tab::Trash), "{role}");
        assert!(!tabs.contains(&Tab::Users), "{role}");
        assert!(!tabs.contains(&Tab::Reports), "{role}");
    }

    let (_dir, _storage, admin) = app_as(Some(Role::Admin), mock::unreachable());
    assert_eq!(admin.visible_tabs(), Tab::ALL.to_vec());

    let (_dir, _storage, signed_out) = app_as(None, mock::unreachable());
    assert!(signed_out.visible_tabs().is_empty());
    assert_eq!(signed_out.screen, Screen::Login);
}

#[tokio::test]
async fn saved_camera_replaces_row_and_closes_form() {
    let (_dir, _storage, mut app) = app_as(Some(Role::Technicien), mock::unreachable());
    let (tx, _rx) = mpsc::unbounded_channel();
    app.tab = Tab::Cameras;
    app.state.cameras.items = vec![camera(1, CameraStatus::Active), camera(2, CameraStatus::Active)];
    let existing = app.state.cameras.items[1].clone();
    app.form = Some(FormState::camera(Some(&existing)));

    app.handle_event(Event::CameraSaved(Ok(camera(2, CameraStatus::Faulty))), &tx);

    assert!(app.form.is_none());
    assert_eq!(app.state.cameras.items[1].status, CameraStatus::Faulty);
    assert_eq!(app.state.cameras.items.len(), 2);
    assert_eq!(
        app.status,
        Some(StatusLine {
            text: "Caméra enregistrée".into(),
            is_error: false
        })
    );
}

#[tokio::test]
async fn failed_save_keeps_form_open_for_retry() {
    let (_dir, _storage, mut app) = app_as(Some(Role::Technicien), mock::unreachable());
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut form = FormState::camera(None);
    form.submitting = true;
    app.form = Some(form);

    app.handle_event(
        Event::CameraSaved(Err(ApiError::Validation("numéro déjà utilisé".into()))),
        &tx,
    );

    let form = app.form.as_ref().expect("form still open");
    assert!(!form.submitting);
    assert_matches::assert_matches!(&app.status, Some(StatusLine { is_error: true, .. }));
}

#[tokio::test]
async fn invalid_ip_is_rejected_before_any_request() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/api/cameras",
        post(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Json(json!({"success": true})) }
        }),
    );
    let client = mock::serve(router).await;
    let (_dir, _storage, mut app) = app_as(Some(Role::Technicien), client);
    let (tx, _rx) = mpsc::unbounded_channel();
    app.tab = Tab::Cameras;

    press(&mut app, &tx, KeyCode::Char('a'));
    assert!(app.form.is_some());
    type_text(&mut app, &tx, "CAM-77");
    press(&mut app, &tx, KeyCode::Tab);
    type_text(&mut app, &tx, "999.1.1.1");
    press(&mut app, &tx, KeyCode::Tab);
    type_text(&mut app, &tx, "Quai 1");
    press(&mut app, &tx, KeyCode::Tab);
    type_text(&mut app, &tx, "Entrée nord");
    press(&mut app, &tx, KeyCode::Enter);

    let form = app.form.as_ref().expect("form stays open");
    assert!(!form.submitting);
    assert_eq!(form.errors.get("ip_address"), Some(validation::MSG_IP));
    assert_eq!(form.fields[form.active].key, "ip_address");

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn short_matricule_is_rejected_on_the_login_screen() {
    let (_dir, _storage, mut app) = app_as(None, mock::unreachable());
    let (tx, _rx) = mpsc::unbounded_channel();

    type_text(&mut app, &tx, "12345");
    press(&mut app, &tx, KeyCode::Tab);
    type_text(&mut app, &tx, "secret-pass");
    press(&mut app, &tx, KeyCode::Enter);

    assert!(!app.login.submitting);
    assert_eq!(app.login.message.as_deref(), Some(validation::MSG_MATRICULE));
    assert_eq!(app.login.errors.get("matricule"), Some(validation::MSG_MATRICULE));
    assert_eq!(app.screen, Screen::Login);
}

#[tokio::test]
async fn successful_login_opens_the_console_and_persists() {
    let (_dir, storage, mut app) = app_as(None, mock::unreachable());
    let (tx, _rx) = mpsc::unbounded_channel();
    app.login.submitting = true;

    app.handle_event(
        Event::LoginFinished(Ok(AuthPayload {
            user: user(Role::Responsable),
            token: "t-42".into(),
        })),
        &tx,
    );

    assert_eq!(app.screen, Screen::Main);
    assert_eq!(app.tab, Tab::Dashboard);
    assert!(!app.login.submitting);
    assert_eq!(app.state.session.role(), Some(Role::Responsable));
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("t-42"));
    assert_eq!(app.client.token().as_deref(), Some("t-42"));
}

#[test]
fn agent_cannot_review_incidents() {
    let (_dir, _storage, mut app) = app_as(Some(Role::Agent), mock::unreachable());
    let (tx, _rx) = mpsc::unbounded_channel();
    app.tab = Tab::Incidents;
    app.state.incidents.items = vec![pending_incident(3)];
    app.table_state.select(Some(0));

    press(&mut app, &tx, KeyCode::Char('v'));

    assert_eq!(
        app.status,
        Some(StatusLine {
            text: "Action non autorisée pour votre rôle".into(),
            is_error: true
        })
    );
}

#[test]
fn deletion_waits_for_confirmation() {
    let (_dir, _storage, mut app) = app_as(Some(Role::Responsable), mock::unreachable());
    let (tx, _rx) = mpsc::unbounded_channel();
    app.tab = Tab::Cameras;
    app.state.cameras.items = vec![camera(5, CameraStatus::Offline)];
    app.table_state.select(Some(0));

    press(&mut app, &tx, KeyCode::Char('d'));
    let confirm = app.confirm.as_ref().expect("confirmation shown");
    assert_eq!(confirm.action, PendingAction::Delete(Tab::Cameras, 5));

    press(&mut app, &tx, KeyCode::Char('n'));
    assert!(app.confirm.is_none());
    assert_eq!(app.state.cameras.items.len(), 1);
}

#[test]
fn deleted_event_drops_the_row() {
    let (_dir, _storage, mut app) = app_as(Some(Role::Admin), mock::unreachable());
    let (tx, _rx) = mpsc::unbounded_channel();
    app.tab = Tab::Cameras;
    app.state.cameras.items = vec![camera(1, CameraStatus::Active), camera(2, CameraStatus::Active)];
    app.table_state.select(Some(1));

    app.handle_event(Event::Deleted(Tab::Cameras, 2, Ok(())), &tx);

    assert_eq!(app.state.cameras.items.len(), 1);
    assert_eq!(app.table_state.selected(), Some(0));
}

#[tokio::test]
async fn logout_key_clears_everything() {
    let (_dir, storage, mut app) = app_as(Some(Role::Admin), mock::unreachable());
    let (tx, _rx) = mpsc::unbounded_channel();
    app.state.cameras.items.push(camera(1, CameraStatus::Active));

    press(&mut app, &tx, KeyCode::Char('L'));

    assert_eq!(app.screen, Screen::Login);
    assert!(app.state.cameras.items.is_empty());
    assert_eq!(app.client.token(), None);
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn hints_only_list_permitted_actions() {
    let (_dir, _storage, mut agent) = app_as(Some(Role::Agent), mock::unreachable());
    agent.tab = Tab::Incidents;
    let keys: Vec<&str> = agent.hints().into_iter().map(|(k, _)| k).collect();
    assert!(keys.contains(&"a/e"));
    assert!(!keys.contains(&"v/x"));
    assert!(!keys.contains(&"d"));

    let (_dir, _storage, mut boss) = app_as(Some(Role::Responsable), mock::unreachable());
    boss.tab = Tab::Incidents;
    let keys: Vec<&str> = boss.hints().into_iter().map(|(k, _)| k).collect();
    assert!(keys.contains(&"v/x"));
    assert!(keys.contains(&"s"));
}

#[tokio::test]
async fn second_enter_while_saving_sends_nothing() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/api/cameras",
        post(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                Json(json!({"success": true, "data": {
                    "id": 31,
                    "serial_number": "CAM-77",
                    "ip_address": "10.0.0.9",
                    "zone": "Quai 1",
                    "location": "Entrée nord",
                    "status": "active",
                    "installed_at": null
                }}))
            }
        }),
    );
    let client = mock::serve(router).await;
    let (_dir, _storage, mut app) = app_as(Some(Role::Technicien), client);
    let (tx, mut rx) = mpsc::unbounded_channel();
    app.tab = Tab::Cameras;

    press(&mut app, &tx, KeyCode::Char('a'));
    type_text(&mut app, &tx, "CAM-77");
    press(&mut app, &tx, KeyCode::Tab);
    type_text(&mut app, &tx, "10.0.0.9");
    press(&mut app, &tx, KeyCode::Tab);
    type_text(&mut app, &tx, "Quai 1");
    press(&mut app, &tx, KeyCode::Tab);
    type_text(&mut app, &tx, "Entrée nord");
    press(&mut app, &tx, KeyCode::Enter);
    press(&mut app, &tx, KeyCode::Enter);

    assert!(app.form.as_ref().expect("form open while saving").submitting);

    let event = rx.recv().await.expect("save completion");
    app.handle_event(event, &tx);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(app.form.is_none());
    assert!(app.state.cameras.find(31).is_some());
}

#[tokio::test]
async fn enter_on_an_incident_fetches_its_detail() {
    let router = Router::new().route(
        "/api/incidents/{id}",
        get(|Path(id): Path<i64>| async move {
            Json(json!({"success": true, "data": {
                "id": id,
                "incident_type": "intrusion",
                "description": "clôture coupée",
                "zone": "Quai 3",
                "status": "pending",
                "camera_id": 4,
                "camera": {
                    "id": 4,
                    "serial_number": "CAM-0004",
                    "ip_address": "10.0.0.4",
                    "zone": "Quai 3",
                    "location": "Portique",
                    "status": "active"
                }
            }}))
        }),
    );
    let client = mock::serve(router).await;
    let (_dir, _storage, mut app) = app_as(Some(Role::Agent), client);
    let (tx, mut rx) = mpsc::unbounded_channel();
    app.tab = Tab::Incidents;
    app.state.incidents.items = vec![pending_incident(3)];
    app.table_state.select(Some(0));

    press(&mut app, &tx, KeyCode::Enter);
    assert!(app.popup.is_none());

    let event = rx.recv().await.expect("detail completion");
    app.handle_event(event, &tx);

    let popup = app.popup.as_ref().expect("detail popup");
    assert_eq!(popup.title, "Incident #3");
    assert!(
        popup
            .lines
            .iter()
            .any(|(label, value)| label == "Caméra" && value.starts_with("CAM-0004"))
    );
    let stored = app.state.incidents.find(3).expect("row kept");
    assert_eq!(stored.camera_id, Some(4));
}

#[tokio::test]
async fn enter_on_a_camera_opens_its_record() {
    let router = Router::new().route(
        "/api/cameras/{id}",
        get(|Path(id): Path<i64>| async move {
            Json(json!({"success": true, "data": {
                "id": id,
                "serial_number": format!("CAM-{id}"),
                "ip_address": "10.0.0.4",
                "zone": "Quai 3",
                "location": "Portique",
                "status": "faulty",
                "installed_at": "2025-03-01"
            }}))
        }),
    );
    let client = mock::serve(router).await;
    let (_dir, _storage, mut app) = app_as(Some(Role::Agent), client);
    let (tx, mut rx) = mpsc::unbounded_channel();
    app.tab = Tab::Cameras;
    app.state.cameras.items = vec![camera(9, CameraStatus::Active)];
    app.table_state.select(Some(0));

    press(&mut app, &tx, KeyCode::Enter);
    let event = rx.recv().await.expect("detail completion");
    app.handle_event(event, &tx);

    let popup = app.popup.as_ref().expect("detail popup");
    assert_eq!(popup.title, "Caméra CAM-9");
    assert!(popup.lines.contains(&("Installée le".to_string(), "01/03/2025".to_string())));
    assert_eq!(app.state.cameras.items[0].status, CameraStatus::Faulty);
}

#[tokio::test]
async fn enter_on_a_person_shows_record_and_history() {
    let router = Router::new()
        .route(
            "/api/personnes/{id}",
            get(|Path(id): Path<i64>| async move {
                Json(json!({"success": true, "data": {
                    "id": id,
                    "name": "Karim B.",
                    "cin": "AB123456",
                    "status": "external",
                    "photo": null
                }}))
            }),
        )
        .route(
            "/api/personnes/{id}/interpellations",
            get(|Path(id): Path<i64>| async move {
                Json(json!({"success": true, "data": [
                    {"id": 1, "person_id": id, "fact": "Accès sans badge", "occurred_at": null}
                ]}))
            }),
        );
    let client = mock::serve(router).await;
    let (_dir, _storage, mut app) = app_as(Some(Role::Agent), client);
    let (tx, mut rx) = mpsc::unbounded_channel();
    app.tab = Tab::Persons;
    app.state.persons.items = vec![
        serde_json::from_value(json!({
            "id": 5, "name": "Karim B.", "cin": "AB123456", "status": "external", "photo": null
        }))
        .unwrap(),
    ];
    app.table_state.select(Some(0));

    press(&mut app, &tx, KeyCode::Enter);
    let event = rx.recv().await.expect("detail completion");
    app.handle_event(event, &tx);

    let popup = app.popup.as_ref().expect("detail popup");
    assert_eq!(popup.title, "Karim B.");
    assert!(popup.lines.iter().any(|(_, value)| value == "Accès sans badge"));
    assert_eq!(app.state.persons.items[0].interpellations.len(), 1);
}

#[tokio::test]
async fn completions_from_an_ended_session_are_dropped() {
    let (_dir, storage, mut app) = app_as(Some(Role::Admin), mock::unreachable());
    let (tx, _rx) = mpsc::unbounded_channel();
    let old = app.generation;

    press(&mut app, &tx, KeyCode::Char('L'));
    app.handle_event(
        Event::LoginFinished(Ok(AuthPayload {
            user: user(Role::Technicien),
            token: "t-2".into(),
        })),
        &tx,
    );
    assert_ne!(app.generation, old);

    app.handle_event(
        Event::Stamped(old, Box::new(Event::CamerasFetched(Err(ApiError::Unauthorized)))),
        &tx,
    );
    assert_eq!(app.screen, Screen::Main);
    assert_eq!(app.client.token().as_deref(), Some("t-2"));
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("t-2"));

    let page = || Page {
        items: vec![camera(1, CameraStatus::Active)],
        pagination: None,
    };
    app.handle_event(
        Event::Stamped(old, Box::new(Event::CamerasFetched(Ok(page())))),
        &tx,
    );
    assert!(app.state.cameras.items.is_empty());

    app.handle_event(
        Event::Stamped(app.generation, Box::new(Event::CamerasFetched(Ok(page())))),
        &tx,
    );
    assert_eq!(app.state.cameras.items.len(), 1);
}

#[tokio::test]
async fn users_tab_pages_back_with_left_and_keeps_p_for_passwords() {
    let (_dir, _storage, mut app) = app_as(Some(Role::Admin), mock::unreachable());
    let (tx, _rx) = mpsc::unbounded_channel();
    app.tab = Tab::Users;
    app.state.users.items = vec![user(Role::Agent)];
    app.state.users.page = 2;
    app.state.users.pagination = Some(Pagination {
        current_page: 2,
        last_page: 2,
        per_page: 15,
        total: 16,
    });

    press(&mut app, &tx, KeyCode::Left);
    assert_eq!(app.state.users.page, 1);

    app.table_state.select(Some(0));
    press(&mut app, &tx, KeyCode::Char('p'));
    assert_eq!(app.state.users.page, 1);
    let form = app.form.as_ref().expect("password form");
    assert_eq!(form.kind, FormKind::ResetPassword(7));
}
