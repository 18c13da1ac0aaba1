use crate::app::App;
use crate::common::utils::centered_rect;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

/// Modal editor for the current [`crate::app::forms::FormState`]: one bordered
/// input per field, the field's validation message under it.
pub fn render_form(app: &mut App, frame: &mut Frame) {
    let Some(form) = app.form.as_ref() else {
        return;
    };

    let screen = frame.area();
    let height = (form.fields.len() as u16 * 4 + 3).min(screen.height);
    let width = screen.width * 3 / 5;
    let area = Rect {
        x: screen.x + (screen.width - width) / 2,
        y: screen.y + (screen.height - height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(form.kind.title())
        .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(block.clone(), area);

    let mut constraints = Vec::with_capacity(form.fields.len() * 2 + 1);
    for _ in &form.fields {
        constraints.push(Constraint::Length(3)); // input
        constraints.push(Constraint::Length(1)); // error
    }
    constraints.push(Constraint::Min(1)); // instructions

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(block.inner(area));

    for (i, field) in form.fields.iter().enumerate() {
        let style = if i == form.active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let shown = if field.masked {
            "*".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        let input = Paragraph::new(shown).block(
            Block::default()
                .borders(Borders::ALL)
                .title(field.label)
                .style(style),
        );
        frame.render_widget(input, layout[i * 2]);

        if let Some(err) = form.errors.get(field.key) {
            frame.render_widget(
                Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red)),
                layout[i * 2 + 1],
            );
        }
    }

    let instructions = if form.submitting {
        "Envoi en cours..."
    } else {
        "Tab: champ suivant | Entrée: valider | Esc: annuler"
    };
    frame.render_widget(
        Paragraph::new(instructions)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::ITALIC)),
        layout[form.fields.len() * 2],
    );
}

pub fn render_confirm(app: &mut App, frame: &mut Frame) {
    let Some(confirm) = app.confirm.as_ref() else {
        return;
    };
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Confirmation")
        .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(block.clone(), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(block.inner(area));

    frame.render_widget(
        Paragraph::new(confirm.message.as_str())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        layout[0],
    );
    frame.render_widget(
        Paragraph::new("y: confirmer | n/Esc: annuler")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::ITALIC)),
        layout[1],
    );
}

pub fn render_info(app: &mut App, frame: &mut Frame) {
    let Some(popup) = app.popup.as_ref() else {
        return;
    };
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} (Esc pour fermer)", popup.title))
        .style(Style::default().bg(Color::DarkGray));

    let rows: Vec<Row> = popup
        .lines
        .iter()
        .map(|(label, value)| {
            Row::new(vec![
                Cell::from(Span::styled(
                    label.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Cell::from(value.clone()),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Percentage(35), Constraint::Percentage(65)])
        .block(block);
    frame.render_widget(table, area);
}
