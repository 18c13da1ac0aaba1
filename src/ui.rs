use crate::app::{App, Screen, Tab};
use crate::pages::{cameras, dashboard, incidents, login, persons, popups, reports, trash, users};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Tabs},
};

pub fn render(app: &mut App, frame: &mut Frame) {
    if app.screen == Screen::Login {
        login::render_login(app, frame);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(app, frame, layout[0]);

    match app.tab {
        Tab::Dashboard => dashboard::render_dashboard(app, frame, layout[1]),
        Tab::Incidents => incidents::render_incidents(app, frame, layout[1]),
        Tab::Cameras => cameras::render_cameras(app, frame, layout[1]),
        Tab::Persons => persons::render_persons(app, frame, layout[1]),
        Tab::Reports => reports::render_reports(app, frame, layout[1]),
        Tab::Users => users::render_users(app, frame, layout[1]),
        Tab::Trash => trash::render_trash(app, frame, layout[1]),
    }

    render_footer(app, frame, layout[2]);

    // at most one overlay is interactive; a confirmation sits above everything
    if app.form.is_some() {
        popups::render_form(app, frame);
    }
    if app.popup.is_some() {
        popups::render_info(app, frame);
    }
    if app.confirm.is_some() {
        popups::render_confirm(app, frame);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let tabs = app.visible_tabs();
    let titles: Vec<String> = tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| format!("{} {}", i + 1, tab.title()))
        .collect();
    let selected = tabs.iter().position(|t| *t == app.tab).unwrap_or(0);

    let who = match app.state.session.user() {
        Some(user) => format!(" {} ({}) ", user.name, user.role.label()),
        None => " - ".to_string(),
    };

    let widget = Tabs::new(titles)
        .select(selected)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Sécurité portuaire ")
                .title_top(Line::from(who).right_aligned()),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Cyan),
        );
    frame.render_widget(widget, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let line = match &app.status {
        Some(status) if status.is_error => Line::from(Span::styled(
            status.text.clone(),
            Style::default().fg(Color::Red),
        )),
        Some(status) => Line::from(Span::styled(
            status.text.clone(),
            Style::default().fg(Color::Green),
        )),
        None => {
            let mut spans = Vec::new();
            for (key, label) in app.hints() {
                spans.push(Span::styled(key, Style::default().add_modifier(Modifier::BOLD)));
                spans.push(Span::raw(format!(": {label}  ")));
            }
            Line::from(spans)
        }
    };
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Statut")),
        area,
    );
}
