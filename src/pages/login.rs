use crate::app::{App, LoginField};
use crate::common::utils::centered_rect;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render_login(app: &App, frame: &mut Frame) {
    let area = centered_rect(50, 50, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Sécurité portuaire | Connexion ");
    frame.render_widget(block.clone(), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // matricule
            Constraint::Length(1),
            Constraint::Length(3), // password
            Constraint::Length(1),
            Constraint::Min(2), // message
            Constraint::Length(1), // instructions
        ])
        .split(block.inner(area));

    let focused = |field: LoginField| {
        if app.login.focus == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };

    let matricule = Paragraph::new(app.login.matricule.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Matricule")
            .style(focused(LoginField::Matricule)),
    );
    frame.render_widget(matricule, layout[0]);
    render_field_error(app, frame, layout[1], "matricule");

    let masked = "*".repeat(app.login.password.chars().count());
    let password = Paragraph::new(masked).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Mot de passe")
            .style(focused(LoginField::Password)),
    );
    frame.render_widget(password, layout[2]);
    render_field_error(app, frame, layout[3], "password");

    let message = if app.login.submitting {
        Some(("Connexion en cours...".to_string(), Color::Yellow))
    } else {
        app.login.message.clone().map(|m| (m, Color::Red))
    };
    if let Some((text, color)) = message {
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(color))
                .wrap(Wrap { trim: true }),
            layout[4],
        );
    }

    let instructions = Paragraph::new("Tab: changer de champ | Entrée: valider | Esc: quitter")
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::ITALIC));
    frame.render_widget(instructions, layout[5]);
}

fn render_field_error(app: &App, frame: &mut Frame, area: Rect, field: &str) {
    if let Some(err) = app.login.errors.get(field) {
        frame.render_widget(
            Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red)),
            area,
        );
    }
}
