pub(crate) mod account_statements;
pub(crate) mod card_statements;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;

fn list_title(name: &str, shown: usize, total: i64, app: &App) -> String {
    let filters = app.filter_label();
    if filters.is_empty() {
        format!(" {name} ({shown} of {total}) ")
    } else {
        format!(" {name} ({shown} of {total}) {filters} ")
    }
}

fn bordered(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ))
}

fn render_empty(f: &mut Frame, area: Rect, app: &App, name: &str, total: i64) {
    let lines = if total > 0 {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("No {} match the current filters", name.to_lowercase()),
                theme::dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Esc or run :clear to reset them",
                theme::dim_style(),
            )),
        ]
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("No {} imported yet", name.to_lowercase()),
                theme::dim_style().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press i or run :import to pull them from the bank",
                theme::dim_style(),
            )),
        ]
    };
    let title = list_title(name, 0, total, app);
    f.render_widget(Paragraph::new(lines).centered().block(bordered(title)), area);
}

/// `label  value` line for detail views.
fn field(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<20}"), theme::label_style()),
        Span::styled(value.into(), theme::normal_style()),
    ])
}

fn render_detail(f: &mut Frame, area: Rect, title: String, lines: Vec<Line>) {
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(bordered(title));
    f.render_widget(body, area);
}
