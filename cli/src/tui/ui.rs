use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};
use tasklist_core::KeyValueStorage;
use unicode_width::UnicodeWidthStr;

use crate::tui::app::{App, InputMode};

pub fn draw<S: KeyValueStorage>(f: &mut Frame, app: &mut App<'_, S>) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Search / filter / sort bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    let header = Paragraph::new("TASKLIST")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    draw_input_bar(f, app, main_chunks[1]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_chunks[2]);

    draw_task_list(f, app, content_chunks[0]);
    draw_detail_view(f, app, content_chunks[1]);

    let help = match app.input_mode {
        InputMode::Normal => "j/k: Navigate | space: Complete | d: Remove | a: Add | /: Search | f: Filter | s: Sort | q: Quit",
        InputMode::Adding => "Enter: Save | Esc: Cancel | text category:X date:Y",
        InputMode::Searching => "Enter: Keep search | Esc: Clear search",
    };
    let footer = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[3]);
}

fn draw_input_bar<S: KeyValueStorage>(f: &mut Frame, app: &App<'_, S>, area: Rect) {
    let (title, text) = match app.input_mode {
        InputMode::Adding => (" New task ", app.input.as_str()),
        InputMode::Searching => (" Search ", app.input.as_str()),
        InputMode::Normal => (" Search ", app.query.search.as_str()),
    };
    let status = format!(" Filter: {} | Sort: {} ", app.query.filter, app.query.sort);

    let mut block = Block::default()
        .title(title)
        .title(Line::from(status).alignment(Alignment::Right))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    if !matches!(app.input_mode, InputMode::Normal) {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }

    let body = match &app.message {
        Some(msg) if matches!(app.input_mode, InputMode::Normal) => {
            Line::from(Span::styled(msg.as_str(), Style::default().fg(Color::Red)))
        }
        _ => Line::from(text),
    };
    f.render_widget(Paragraph::new(body).block(block), area);

    if !matches!(app.input_mode, InputMode::Normal) {
        let prefix: String = app.input.chars().take(app.cursor_position).collect();
        let x = area.x + 1 + prefix.width() as u16;
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn draw_task_list<S: KeyValueStorage>(f: &mut Frame, app: &mut App<'_, S>, area: Rect) {
    let rows: Vec<Row> = app
        .view
        .iter()
        .map(|task| {
            let (status_icon, text_style) = if task.is_completed {
                ("✔", Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT))
            } else {
                ("☐", Style::default().add_modifier(Modifier::BOLD))
            };

            Row::new(vec![
                Span::raw(status_icon),
                Span::styled(task.text.clone(), text_style),
                Span::styled(task.category.clone(), Style::default().fg(Color::Magenta)),
                Span::raw(task.date.clone()),
            ])
        })
        .collect();

    let title = format!(" Tasks ({}/{}) ", app.view.len(), app.store.len());
    let table = Table::new(
        rows,
        [
            Constraint::Length(3),  // Status
            Constraint::Min(10),    // Text
            Constraint::Length(12), // Category
            Constraint::Length(12), // Date
        ],
    )
    .header(Row::new(vec!["St", "Task", "Category", "Date"]).style(Style::default().fg(Color::Yellow)))
    .block(Block::default().title(title).borders(Borders::ALL).border_type(BorderType::Rounded))
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_detail_view<S: KeyValueStorage>(f: &mut Frame, app: &App<'_, S>, area: Rect) {
    let block = Block::default().title(" Detail ").borders(Borders::ALL).border_type(BorderType::Rounded);

    let Some(task) = app.selected_task() else {
        f.render_widget(block, area);
        return;
    };

    let field = |label: &'static str, value: &str| {
        let value = if value.is_empty() { "-" } else { value };
        Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Blue)),
            Span::raw(value.to_string()),
        ])
    };

    let detail_text = vec![
        Line::from(vec![
            Span::styled("Task: ", Style::default().fg(Color::Blue)),
            Span::styled(task.text.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
            Span::raw(task.id.to_string()),
        ]),
        field("Status: ", if task.is_completed { "Completed" } else { "Active" }),
        field("Category: ", &task.category),
        field("Date: ", &task.date),
    ];

    let detail = Paragraph::new(detail_text).block(block).wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}
