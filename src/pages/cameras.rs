use super::{camera_status_style, header_style, highlight_style, list_block, placeholder};
use crate::app::App;
use ratatui::{
    prelude::*,
    widgets::{Cell, Row, Table},
};

pub fn render_cameras(app: &mut App, frame: &mut Frame, area: Rect) {
    let filter = app.camera_filter.map(|s| format!("filtre: {}", s.label()));
    let block = list_block("Caméras", filter, &app.state.cameras);
    if placeholder(frame, area, &block, &app.state.cameras) {
        return;
    }

    let rows: Vec<Row> = app
        .state
        .cameras
        .items
        .iter()
        .map(|camera| {
            Row::new(vec![
                Cell::from(camera.serial_number.clone()),
                Cell::from(camera.ip_address.clone()),
                Cell::from(camera.zone.clone()),
                Cell::from(camera.location.clone()),
                Cell::from(Span::styled(
                    camera.status.label(),
                    camera_status_style(camera.status),
                )),
                Cell::from(
                    camera
                        .installed_at
                        .map_or_else(|| "-".to_string(), |d| d.format("%d/%m/%Y").to_string()),
                ),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(18),
            Constraint::Length(16),
            Constraint::Percentage(18),
            Constraint::Percentage(25),
            Constraint::Length(11),
            Constraint::Length(11),
        ],
    )
    .header(
        Row::new(vec!["N° de série", "Adresse IP", "Zone", "Emplacement", "Statut", "Installée"])
            .style(header_style()),
    )
    .block(block)
    .row_highlight_style(highlight_style())
    .highlight_symbol(">> ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}
