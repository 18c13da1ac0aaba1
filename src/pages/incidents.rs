use super::{header_style, highlight_style, incident_status_style, list_block, placeholder};
use crate::app::App;
use crate::common::utils::format_timestamp;
use ratatui::{
    prelude::*,
    widgets::{Cell, Row, Table},
};

pub fn render_incidents(app: &mut App, frame: &mut Frame, area: Rect) {
    let filter = app
        .incident_filter
        .map(|s| format!("filtre: {}", s.label()));
    let block = list_block("Incidents", filter, &app.state.incidents);
    if placeholder(frame, area, &block, &app.state.incidents) {
        return;
    }

    let rows: Vec<Row> = app
        .state
        .incidents
        .items
        .iter()
        .map(|incident| {
            let camera = match (&incident.camera, incident.camera_id) {
                (Some(cam), _) => cam.serial_number.clone(),
                (None, Some(id)) => format!("#{id}"),
                (None, None) => "-".to_string(),
            };
            let reporter = incident
                .user
                .as_ref()
                .map_or_else(|| "-".to_string(), |u| u.name.clone());

            Row::new(vec![
                Cell::from(incident.id.to_string()),
                Cell::from(format_timestamp(incident.occurred_at.as_deref())),
                Cell::from(incident.incident_type.clone()),
                Cell::from(incident.zone.clone()),
                Cell::from(camera),
                Cell::from(reporter),
                Cell::from(Span::styled(
                    incident.status.label(),
                    incident_status_style(incident.status),
                )),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(17),
            Constraint::Percentage(20),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["#", "Date", "Type", "Zone", "Caméra", "Signalé par", "Statut"])
            .style(header_style()),
    )
    .block(block)
    .row_highlight_style(highlight_style())
    .highlight_symbol(">> ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}
