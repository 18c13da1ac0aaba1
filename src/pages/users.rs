use super::{header_style, highlight_style, list_block, placeholder};
use crate::app::App;
use ratatui::{
    prelude::*,
    widgets::{Cell, Row, Table},
};

pub fn render_users(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = list_block("Utilisateurs", None, &app.state.users);
    if placeholder(frame, area, &block, &app.state.users) {
        return;
    }

    let rows: Vec<Row> = app
        .state
        .users
        .items
        .iter()
        .map(|user| {
            let (state, state_style) = if user.is_active {
                ("actif", Style::default().fg(Color::Green))
            } else {
                ("inactif", Style::default().fg(Color::DarkGray))
            };
            Row::new(vec![
                Cell::from(user.matricule.clone()),
                Cell::from(user.name.clone()),
                Cell::from(user.role.label()),
                Cell::from(user.email.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(user.phone.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(Span::styled(state, state_style)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Percentage(22),
            Constraint::Length(13),
            Constraint::Percentage(25),
            Constraint::Length(16),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(vec!["Matricule", "Nom", "Rôle", "E-mail", "Téléphone", "État"])
            .style(header_style()),
    )
    .block(block)
    .row_highlight_style(highlight_style())
    .highlight_symbol(">> ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}
