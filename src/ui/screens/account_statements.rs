use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Row, Table},
    Frame,
};

use super::{bordered, field, list_title, render_detail, render_empty};
use crate::models::AccountStatement;
use crate::ui::app::{App, View};
use crate::ui::theme;
use crate::ui::util::{first_line, format_amount, truncate};

const NAME: &str = "Account statements";

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    match (app.view, app.selected_account()) {
        (View::Detail, Some(statement)) => render_statement(f, area, statement),
        _ => render_list(f, area, app),
    }
}

fn render_list(f: &mut Frame, area: Rect, app: &App) {
    if app.accounts.is_empty() {
        render_empty(f, area, app, NAME, app.account_count);
        return;
    }

    let header_cells = ["Date", "Kind", "Title", "Detail", "Account", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .accounts
        .iter()
        .enumerate()
        .skip(app.account_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, statement)| {
            let style = if i == app.account_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let kind = statement.kind.as_str().trim_end_matches("Event");

            Row::new(vec![
                Cell::from(statement.post_date.to_string()),
                Cell::from(kind.to_string()),
                Cell::from(truncate(&statement.title, 24)),
                Cell::from(truncate(first_line(&statement.detail), 30)),
                Cell::from(truncate(statement.account_name().unwrap_or(""), 24)),
                Cell::from(Span::styled(
                    format_amount(statement.amount),
                    theme::group_style(statement.kind.group()),
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(20),
        Constraint::Length(24),
        Constraint::Min(20),
        Constraint::Length(24),
        Constraint::Length(16),
    ];

    let title = list_title(NAME, app.accounts.len(), app.account_count, app);
    let table = Table::new(rows, widths).header(header).block(bordered(title));
    f.render_widget(table, area);
}

fn render_statement(f: &mut Frame, area: Rect, statement: &AccountStatement) {
    let or_dash = |value: Option<&String>| value.cloned().unwrap_or_else(|| "-".into());

    let mut lines = vec![
        field("External id", statement.external_id.to_string()),
        field("Kind", statement.kind.to_string()),
        field("Group", statement.kind.group().to_string()),
        field("Post date", statement.post_date.to_string()),
        field("Title", statement.title.clone()),
        field("Amount", format_amount(statement.amount)),
        field("Origin account", or_dash(statement.origin_account.as_ref())),
        field(
            "Destination account",
            or_dash(statement.destination_account.as_ref()),
        ),
        Line::from(""),
        Line::from(Span::styled("Detail", theme::label_style())),
    ];
    lines.extend(
        statement
            .detail
            .lines()
            .map(|l| Line::from(Span::styled(format!("  {l}"), theme::normal_style()))),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc back to list",
        theme::dim_style(),
    )));

    let title = format!(" ({}) {} ", statement.post_date, statement.title);
    render_detail(f, area, title, lines);
}
