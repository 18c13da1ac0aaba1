use super::{header_style, highlight_style};
use crate::app::App;
use crate::common::utils::{draw_pie_chart, format_timestamp};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

pub fn render_dashboard(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(stats) = app.state.dashboard.clone() else {
        let (text, style) = match &app.state.dashboard_error {
            Some(err) => (format!("Erreur: {err}"), Style::default().fg(Color::Red)),
            None => (
                "Chargement du tableau de bord...".to_string(),
                Style::default().fg(Color::Yellow),
            ),
        };
        frame.render_widget(
            Paragraph::new(text)
                .style(style)
                .block(Block::default().borders(Borders::ALL).title("Tableau de bord")),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    // --- Left pane: figures and charts ---
    let chart_height = ((chunks[0].width / 2) / 2).clamp(10, 25);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Length(chart_height), Constraint::Min(0)])
        .split(chunks[0]);

    let figure = |label: &str, value: u64| {
        Line::from(vec![
            Span::styled(format!("{label}: "), header_style()),
            Span::raw(value.to_string()),
        ])
    };
    let text = vec![
        figure("Incidents", stats.incidents_total),
        figure("En attente de validation", stats.incidents_pending),
        figure("Caméras", stats.cameras_total),
        figure("Personnes suivies", stats.persons_total),
        figure("Utilisateurs", stats.users_total),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Vue d'ensemble"))
            .wrap(Wrap { trim: true }),
        left[0],
    );

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(left[1]);

    draw_pie_chart(
        frame,
        charts[0],
        "Caméras",
        stats.cameras_active + stats.cameras_faulty + stats.cameras_offline,
        &[
            (stats.cameras_active as f64, Color::Green, "Actives"),
            (stats.cameras_faulty as f64, Color::Red, "En panne"),
            (stats.cameras_offline as f64, Color::DarkGray, "Hors ligne"),
        ],
    );
    let treated = stats.incidents_total.saturating_sub(stats.incidents_pending);
    draw_pie_chart(
        frame,
        charts[1],
        "Incidents",
        stats.incidents_total,
        &[
            (stats.incidents_pending as f64, Color::Yellow, "En attente"),
            (treated as f64, Color::Cyan, "Traités"),
        ],
    );

    let legend = vec![
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(Color::Green)),
            Span::raw(format!("Actives {}  ", stats.cameras_active)),
            Span::styled("■ ", Style::default().fg(Color::Red)),
            Span::raw(format!("En panne {}  ", stats.cameras_faulty)),
            Span::styled("■ ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("Hors ligne {}", stats.cameras_offline)),
        ]),
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("En attente {}  ", stats.incidents_pending)),
            Span::styled("■ ", Style::default().fg(Color::Cyan)),
            Span::raw(format!("Traités {treated}")),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(legend).block(Block::default().borders(Borders::ALL).title("Légende")),
        left[2],
    );

    // --- Right pane: alerts ---
    render_alerts(app, frame, chunks[1]);
}

fn render_alerts(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Alertes ({})", app.state.alerts.len()));

    if app.state.alerts.is_empty() {
        frame.render_widget(
            Paragraph::new("Aucune alerte")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let rows: Vec<Row> = app
        .state
        .alerts
        .iter()
        .map(|alert| {
            let level_style = match alert.level.as_str() {
                "critical" | "danger" | "high" => Style::default().fg(Color::Red),
                "warning" | "medium" => Style::default().fg(Color::Yellow),
                _ => Style::default(),
            };
            Row::new(vec![
                Cell::from(Span::styled(alert.level.clone(), level_style)),
                Cell::from(alert.message.clone()),
                Cell::from(format_timestamp(alert.created_at.as_deref())),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(17),
        ],
    )
    .header(Row::new(vec!["Niveau", "Message", "Date"]).style(header_style()))
    .block(block)
    .row_highlight_style(highlight_style())
    .highlight_symbol(">> ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}
