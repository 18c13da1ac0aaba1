use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ratatui::{
    prelude::*,
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders,
    },
};
use serde_json::Value;

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Formats a backend timestamp for display (`dd/mm/yyyy hh:mm`, local time).
///
/// Accepts RFC 3339 strings, the backend's `YYYY-MM-DD HH:MM:SS` form and
/// bare dates. Anything unparseable is shown as-is; a missing value as "N/A".
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "N/A".to_string();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt
            .with_timezone(&chrono::Local)
            .format(DISPLAY_FORMAT)
            .to_string();
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.format(DISPLAY_FORMAT).to_string();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.format("%d/%m/%Y").to_string();
    }
    s.to_string()
}

/// Calculates a centered rectangle of a given percentage size within another Rect.
/// Used for the form, confirmation and detail overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    let hor_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);

    hor_layout[1]
}

/// Draws a pie chart on a given frame area using the Ratatui Canvas widget.
///
/// # Arguments
/// * `frame` - The TUI Frame to render into.
/// * `area` - The Rect area dedicated to the chart.
/// * `title` - The title displayed on the chart's block border.
/// * `total` - The sum of all values in the data.
/// * `data` - A slice of tuples containing (value, color, label).
pub fn draw_pie_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    total: u64,
    data: &[(f64, Color, &str)],
) {
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_bounds([-100.0, 100.0])
        .y_bounds([-100.0, 100.0])
        .paint(move |ctx| {
            if total == 0 {
                ctx.print(
                    0.0,
                    0.0,
                    Span::styled("Aucune donnée", Style::default().fg(Color::DarkGray)),
                );
                return;
            }

            let mut current_angle = 0.0;
            // terminal cells are roughly twice as tall as they are wide
            let width = area.width.max(1) as f64;
            let height = area.height.max(1) as f64;
            let radius_x = 80.0;
            let radius_y = (radius_x * (width / (height * 2.0))).min(90.0);
            let radius_x = if radius_y == 90.0 {
                90.0 * (height * 2.0 / width)
            } else {
                radius_x
            };

            for (value, color, _label) in data {
                if *value <= 0.0 {
                    continue;
                }

                let sweep = (*value / total as f64) * 2.0 * std::f64::consts::PI;
                let steps = ((sweep * 100.0) as i32).max(1);
                for i in 0..=steps {
                    let angle = current_angle + (sweep * i as f64 / steps as f64);
                    ctx.draw(&CanvasLine {
                        x1: 0.0,
                        y1: 0.0,
                        x2: radius_x * angle.cos(),
                        y2: radius_y * angle.sin(),
                        color: *color,
                    });
                }
                current_angle += sweep;
            }

            ctx.print(
                0.0,
                0.0,
                Span::styled(
                    total.to_string(),
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .fg(Color::White)
                        .bg(Color::Black),
                ),
            );
        });

    frame.render_widget(canvas, area);
}

/// Hands a downloaded file to the desktop's default viewer.
pub fn open_external(target: &str) {
    let result = if cfg!(target_os = "windows") {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", target])
            .spawn()
    } else if cfg!(target_os = "macos") {
        std::process::Command::new("open").arg(target).spawn()
    } else {
        std::process::Command::new("xdg-open").arg(target).spawn()
    };

    if let Err(e) = result {
        tracing::warn!(target_path = target, error = %e, "failed to open file viewer");
    }
}

/// Flattens a statistics payload into `(label, value)` rows. Nested keys are
/// joined with `.`; arrays are indexed.
pub fn flatten_json(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into(String::new(), value, &mut rows);
    rows
}

fn flatten_into(prefix: String, value: &Value, rows: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                flatten_into(join(key), inner, rows);
            }
        }
        Value::Array(items) => {
            for (i, inner) in items.iter().enumerate() {
                flatten_into(join(&i.to_string()), inner, rows);
            }
        }
        Value::String(s) => rows.push((prefix, s.clone())),
        Value::Null => rows.push((prefix, "-".to_string())),
        other => rows.push((prefix, other.to_string())),
    }
}
