use crate::api::types::{
    Alert, Camera, DashboardStats, Identified, Incident, Page, Pagination, Person, Report,
    TrashItem, User,
};
use crate::error::ApiError;
use crate::session::Session;

/// Flat list cache for one resource: last network response wins.
#[derive(Debug, Clone)]
pub struct ListStore<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub pagination: Option<Pagination>,
    pub page: u32,
}

impl<T> Default for ListStore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            error: None,
            pagination: None,
            page: 1,
        }
    }
}

impl<T: Identified + Clone> ListStore<T> {
    pub fn begin_load(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub fn finish(&mut self, result: Result<Page<T>, ApiError>) {
        self.is_loading = false;
        match result {
            Ok(page) => {
                if let Some(p) = &page.pagination {
                    self.page = p.current_page.max(1);
                }
                self.items = page.items;
                self.pagination = page.pagination;
                self.error = None;
            }
            Err(e) => self.error = Some(e.user_message()),
        }
    }

    /// Replaces the record with the same id, or prepends it if unseen.
    pub fn upsert(&mut self, item: T) {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => *slot = item,
            None => self.items.insert(0, item),
        }
    }

    pub fn remove(&mut self, id: i64) -> Option<T> {
        let idx = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(idx))
    }

    pub fn find(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn filter<'a>(&'a self, pred: impl Fn(&T) -> bool + 'a) -> impl Iterator<Item = &'a T> {
        self.items.iter().filter(move |item| pred(item))
    }

    pub fn last_page(&self) -> u32 {
        self.pagination.as_ref().map_or(1, |p| p.last_page.max(1))
    }

    pub fn total(&self) -> u64 {
        self.pagination
            .as_ref()
            .map_or(self.items.len() as u64, |p| p.total)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Everything the console renders from, passed explicitly to whoever needs it.
#[derive(Debug)]
pub struct AppState {
    pub session: Session,
    pub cameras: ListStore<Camera>,
    pub incidents: ListStore<Incident>,
    pub persons: ListStore<Person>,
    pub users: ListStore<User>,
    pub reports: ListStore<Report>,
    pub trash: ListStore<TrashItem>,
    pub dashboard: Option<DashboardStats>,
    pub alerts: Vec<Alert>,
    pub dashboard_error: Option<String>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            cameras: ListStore::default(),
            incidents: ListStore::default(),
            persons: ListStore::default(),
            users: ListStore::default(),
            reports: ListStore::default(),
            trash: ListStore::default(),
            dashboard: None,
            alerts: Vec::new(),
            dashboard_error: None,
        }
    }

    /// Drops every cached list; used when the session ends.
    pub fn reset_data(&mut self) {
        self.cameras.clear();
        self.incidents.clear();
        self.persons.clear();
        self.users.clear();
        self.reports.clear();
        self.trash.clear();
        self.dashboard = None;
        self.alerts.clear();
        self.dashboard_error = None;
    }
}
