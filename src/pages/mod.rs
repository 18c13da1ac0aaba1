pub mod cameras;
pub mod dashboard;
pub mod incidents;
pub mod login;
pub mod persons;
pub mod popups;
pub mod reports;
pub mod trash;
pub mod users;

use crate::api::types::{CameraStatus, Identified, IncidentStatus};
use crate::store::ListStore;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Block for a paginated list, e.g. "Caméras | page 2/4 | 52 au total".
pub(crate) fn list_block<T: Identified + Clone>(
    name: &str,
    extra: Option<String>,
    store: &ListStore<T>,
) -> Block<'static> {
    let mut title = format!(
        " {name} | page {}/{} | {} au total ",
        store.page,
        store.last_page(),
        store.total()
    );
    if let Some(extra) = extra {
        title.push_str(&format!("| {extra} "));
    }
    Block::default().borders(Borders::ALL).title(title)
}

/// Draws the loading / error / empty placeholder when there is nothing to
/// tabulate. Returns true if it drew something.
pub(crate) fn placeholder<T: Identified + Clone>(
    frame: &mut Frame,
    area: Rect,
    block: &Block,
    store: &ListStore<T>,
) -> bool {
    if !store.items.is_empty() {
        return false;
    }
    let (text, style) = if store.is_loading {
        ("Chargement...".to_string(), Style::default().fg(Color::Yellow))
    } else if let Some(err) = &store.error {
        (format!("Erreur: {err}"), Style::default().fg(Color::Red))
    } else {
        ("Aucun élément".to_string(), Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(Paragraph::new(text).style(style).block(block.clone()), area);
    true
}

pub(crate) fn header_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn highlight_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

pub(crate) fn camera_status_style(status: CameraStatus) -> Style {
    match status {
        CameraStatus::Active => Style::default().fg(Color::Green),
        CameraStatus::Faulty => Style::default().fg(Color::Red),
        CameraStatus::Offline => Style::default().fg(Color::DarkGray),
    }
}

pub(crate) fn incident_status_style(status: IncidentStatus) -> Style {
    match status {
        IncidentStatus::Pending => Style::default().fg(Color::Yellow),
        IncidentStatus::Validated => Style::default().fg(Color::Green),
        IncidentStatus::Rejected => Style::default().fg(Color::Red),
    }
}
