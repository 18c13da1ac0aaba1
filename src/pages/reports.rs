use super::{header_style, highlight_style, list_block, placeholder};
use crate::app::App;
use crate::common::utils::format_timestamp;
use ratatui::{
    prelude::*,
    widgets::{Cell, Row, Table},
};

pub fn render_reports(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = list_block("Rapports", None, &app.state.reports);
    if placeholder(frame, area, &block, &app.state.reports) {
        return;
    }

    let rows: Vec<Row> = app
        .state
        .reports
        .items
        .iter()
        .map(|report| {
            let incident = report.incident.as_ref().map_or_else(
                || format!("#{}", report.incident_id),
                |i| format!("#{} {}", i.id, i.incident_type),
            );
            Row::new(vec![
                Cell::from(report.id.to_string()),
                Cell::from(incident),
                Cell::from(report.observations.clone().unwrap_or_default()),
                Cell::from(format_timestamp(report.created_at.as_deref())),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Percentage(25),
            Constraint::Min(20),
            Constraint::Length(17),
        ],
    )
    .header(Row::new(vec!["#", "Incident", "Observations", "Généré le"]).style(header_style()))
    .block(block)
    .row_highlight_style(highlight_style())
    .highlight_symbol(">> ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}
