use super::{header_style, highlight_style, placeholder};
use crate::app::App;
use crate::common::utils::format_timestamp;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Row, Table},
};

pub fn render_trash(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Corbeille | {} élément(s) ", app.state.trash.items.len()));
    if placeholder(frame, area, &block, &app.state.trash) {
        return;
    }

    let rows: Vec<Row> = app
        .state
        .trash
        .items
        .iter()
        .map(|item| {
            Row::new(vec![
                Cell::from(item.kind.to_string()),
                Cell::from(item.id.to_string()),
                Cell::from(item.label.clone()),
                Cell::from(format_timestamp(item.deleted_at.as_deref())),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Min(20),
            Constraint::Length(17),
        ],
    )
    .header(Row::new(vec!["Type", "#", "Libellé", "Supprimé le"]).style(header_style()))
    .block(block)
    .row_highlight_style(highlight_style())
    .highlight_symbol(">> ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}
