use crate::api::types::{
    Alert, AuthPayload, Camera, DashboardStats, Incident, Interpellation, Page, Person, Report,
    TrashItem, User,
};
use crate::app::Tab;
use crate::error::ApiError;
use crate::session::LoginError;
use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, MouseEvent};
use futures::{FutureExt, StreamExt};
use std::path::PathBuf;
use tokio::sync::mpsc;

pub type ApiOutcome<T> = std::result::Result<T, ApiError>;

#[derive(Clone, Debug)]
pub enum Event {
    Tick,
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    LoginFinished(std::result::Result<AuthPayload, LoginError>),
    AuthChecked(ApiOutcome<User>),
    DashboardFetched(ApiOutcome<(DashboardStats, Vec<Alert>)>),
    CamerasFetched(ApiOutcome<Page<Camera>>),
    IncidentsFetched(ApiOutcome<Page<Incident>>),
    PersonsFetched(ApiOutcome<Page<Person>>),
    UsersFetched(ApiOutcome<Page<User>>),
    ReportsFetched(ApiOutcome<Page<Report>>),
    TrashFetched(ApiOutcome<Vec<TrashItem>>),
    CameraSaved(ApiOutcome<Camera>),
    IncidentSaved(ApiOutcome<Incident>),
    PersonSaved(ApiOutcome<Person>),
    UserSaved(ApiOutcome<User>),
    ReportGenerated(ApiOutcome<Report>),
    IncidentDetail(ApiOutcome<Incident>),
    CameraDetail(ApiOutcome<Camera>),
    PersonDetail(ApiOutcome<(Person, Vec<Interpellation>)>),
    InterpellationAdded(i64, ApiOutcome<Interpellation>),
    Deleted(Tab, i64, ApiOutcome<()>),
    TrashUpdated(ApiOutcome<String>), // restore / purge / empty, with a status line
    PasswordReset(ApiOutcome<Option<String>>),
    ReportDownloaded(ApiOutcome<PathBuf>),
    StatisticsFetched(Tab, ApiOutcome<serde_json::Value>),
    /// A background completion tagged with the session generation that
    /// issued it; stale ones are dropped on arrival.
    Stamped(u64, Box<Event>),
}

#[derive(Debug)]
pub struct EventHandler {
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    _task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: std::time::Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task_tx = tx.clone();
        let _task = tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                let tick_delay = interval.tick();
                let crossterm_event = reader.next().fuse();
                let event = tokio::select! {
                    _ = tick_delay => Some(Event::Tick),
                    Some(Ok(evt)) = crossterm_event => match evt {
                        CrosstermEvent::Key(key)
                            if key.kind == crossterm::event::KeyEventKind::Press =>
                        {
                            Some(Event::Key(key))
                        }
                        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                        _ => None,
                    },
                };
                if let Some(event) = event {
                    if task_tx.send(event).is_err() {
                        // receiver dropped: the app is shutting down
                        break;
                    }
                }
            }
        });
        Self { tx, rx, _task }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Unable to get event"))
    }
}
