use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Row, Table},
    Frame,
};

use super::{bordered, field, list_title, render_detail, render_empty};
use crate::models::CardStatement;
use crate::ui::app::{App, View};
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

const NAME: &str = "Card statements";

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    match (app.view, app.selected_card()) {
        (View::Detail, Some(statement)) => render_statement(f, area, statement),
        _ => render_list(f, area, app),
    }
}

fn render_list(f: &mut Frame, area: Rect, app: &App) {
    if app.cards.is_empty() {
        render_empty(f, area, app, NAME, app.card_count);
        return;
    }

    let header_cells = ["Time", "Description", "Title", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .cards
        .iter()
        .enumerate()
        .skip(app.card_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, statement)| {
            let style = if i == app.card_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            Row::new(vec![
                Cell::from(statement.time.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(truncate(&statement.description, 40)),
                Cell::from(truncate(&statement.title, 24)),
                Cell::from(Span::styled(
                    format_amount(statement.amount),
                    theme::debit_style(),
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(18),
        Constraint::Min(20),
        Constraint::Length(24),
        Constraint::Length(16),
    ];

    let title = list_title(NAME, app.cards.len(), app.card_count, app);
    let table = Table::new(rows, widths).header(header).block(bordered(title));
    f.render_widget(table, area);
}

fn render_statement(f: &mut Frame, area: Rect, statement: &CardStatement) {
    let optional = |value: Option<String>| value.unwrap_or_else(|| "-".into());

    let mut lines = vec![
        field("External id", statement.external_id.to_string()),
        field("Account", optional(statement.account.map(|a| a.to_string()))),
        field("Time", statement.time.to_rfc3339()),
        field("Description", statement.description.clone()),
        field("Title", statement.title.clone()),
        field("Category", statement.category.clone()),
        field("Amount", format_amount(statement.amount)),
        field(
            "Amount without tax",
            optional(statement.amount_without_tax.map(format_amount)),
        ),
        field("Source", optional(statement.source.clone())),
        field(
            "Tokenized",
            optional(statement.tokenized.map(|t| t.to_string())),
        ),
        Line::from(""),
        Line::from(Span::styled("Details", theme::label_style())),
    ];

    let details =
        serde_json::to_string_pretty(&statement.details).unwrap_or_else(|_| "{}".into());
    lines.extend(
        details
            .lines()
            .map(|l| Line::from(Span::styled(format!("  {l}"), theme::dim_style()))),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc back to list",
        theme::dim_style(),
    )));

    render_detail(f, area, format!(" {statement} "), lines);
}
