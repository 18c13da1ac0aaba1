use super::{header_style, highlight_style, list_block, placeholder};
use crate::api::types::PersonStatus;
use crate::app::App;
use ratatui::{
    prelude::*,
    widgets::{Cell, Row, Table},
};

pub fn render_persons(app: &mut App, frame: &mut Frame, area: Rect) {
    let search = (!app.person_search.trim().is_empty())
        .then(|| format!("recherche: \"{}\"", app.person_search.trim()));
    let block = list_block("Personnes", search, &app.state.persons);
    if placeholder(frame, area, &block, &app.state.persons) {
        return;
    }

    let rows: Vec<Row> = app
        .state
        .persons
        .items
        .iter()
        .map(|person| {
            let status_style = match person.status {
                PersonStatus::Internal => Style::default().fg(Color::Cyan),
                PersonStatus::External => Style::default().fg(Color::Magenta),
            };
            Row::new(vec![
                Cell::from(person.name.clone()),
                Cell::from(person.cin.clone()),
                Cell::from(Span::styled(person.status.label(), status_style)),
                Cell::from(person.interpellations.len().to_string()),
                Cell::from(if person.photo.is_some() { "oui" } else { "-" }),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Percentage(20),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
        ],
    )
    .header(
        Row::new(vec!["Nom", "CIN", "Statut", "Interpellations", "Photo"]).style(header_style()),
    )
    .block(block)
    .row_highlight_style(highlight_style())
    .highlight_symbol(">> ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}
