use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};

use super::state::{Mode, State, StatusKind, UploadIntent};
use crate::services::inventory::{ActiveFilter, InventoryRecord};
use crate::tui::Theme;

pub fn render(frame: &mut Frame, state: &mut State, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], state, theme);
    render_search(frame, chunks[1], state, theme);
    render_table(frame, chunks[2], state, theme);
    render_footer(frame, chunks[3], state, theme);

    match state.mode {
        Mode::PathPrompt(intent) => render_path_prompt(frame, state, intent, theme),
        Mode::ConfirmDelete => render_confirm_delete(frame, state, theme),
        Mode::Browse | Mode::Search => {}
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &State, theme: &Theme) {
    let mut spans = vec![Span::styled(
        "Images Manager",
        Style::default()
            .fg(theme.accent_primary)
            .add_modifier(Modifier::BOLD),
    )];

    match state.view() {
        None => spans.push(Span::styled(
            "  loading...",
            Style::default().fg(theme.text_tertiary),
        )),
        Some(view) => {
            let summary = view.summary();
            spans.push(Span::styled(
                format!("  {} items", summary.total),
                Style::default().fg(theme.text_primary),
            ));
            spans.push(Span::styled(
                format!("  {} without image", summary.without_image),
                Style::default().fg(theme.accent_warning),
            ));
            let filter = match view.filter() {
                ActiveFilter::All => "all".to_string(),
                ActiveFilter::MissingImage => "missing image".to_string(),
                ActiveFilter::Search(text) => format!("name contains \"{}\"", text),
            };
            spans.push(Span::styled(
                format!("  showing {} ({})", view.visible_len(), filter),
                Style::default().fg(theme.text_secondary),
            ));
            if view.is_stale() {
                spans.push(Span::styled(
                    "  stale",
                    Style::default().fg(theme.accent_warning),
                ));
            }
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_primary));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_search(frame: &mut Frame, area: Rect, state: &State, theme: &Theme) {
    let active = state.mode == Mode::Search;
    let border = if active {
        theme.accent_primary
    } else {
        theme.border_primary
    };
    let text = if state.search.value().is_empty() && !active {
        Span::styled("press / to search by name", Style::default().fg(theme.text_tertiary))
    } else {
        Span::styled(state.search.value().to_string(), Style::default().fg(theme.text_primary))
    };
    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    frame.render_widget(Paragraph::new(Line::from(text)).block(block), area);

    if active {
        let x = area.x + 1 + state.search.state.cursor() as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn record_row<'a>(record: &'a InventoryRecord, theme: &Theme) -> Row<'a> {
    let image = match &record.image {
        Some(_) => Cell::from(Span::styled("yes", Style::default().fg(theme.accent_success))),
        None => Cell::from(Span::styled("missing", Style::default().fg(theme.accent_warning))),
    };
    Row::new(vec![
        Cell::from(record.position.to_string()),
        Cell::from(record.name.as_str()),
        Cell::from(record.category.as_str()),
        Cell::from(format!("{:.2}", record.price)),
        Cell::from(record.quantity.to_string()),
        image,
        Cell::from(Span::styled(
            record.image_filename(),
            Style::default().fg(theme.text_tertiary),
        )),
    ])
}

fn render_table(frame: &mut Frame, area: Rect, state: &mut State, theme: &Theme) {
    // Borders plus header row
    let body_height = area.height.saturating_sub(3) as usize;
    state.list_state.set_viewport_height(body_height.max(1));
    let len = state.visible_len();
    state.list_state.update_scroll(body_height.max(1), len);

    let block = Block::default()
        .title(" Inventory ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_primary));

    let Some(view) = state.view() else {
        frame.render_widget(
            Paragraph::new("Loading inventory...").block(block),
            area,
        );
        return;
    };
    if view.visible_len() == 0 {
        let message = if view.records().is_empty() {
            "The inventory is empty or could not be read"
        } else {
            "No items match the current filter"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(theme.text_secondary)))
                .block(block),
            area,
        );
        return;
    }

    let header = Row::new(vec!["#", "Name", "Category", "Price", "Qty", "Image", "Filename"])
        .style(
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        );
    let rows: Vec<Row> = view.visible().map(|r| record_row(r, theme)).collect();
    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(30),
        Constraint::Percentage(15),
        Constraint::Length(9),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(theme.bg_surface).fg(theme.accent_primary));

    let mut table_state = TableState::default()
        .with_offset(state.list_state.scroll_offset())
        .with_selected(state.list_state.selected());
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &State, theme: &Theme) {
    let help = match state.mode {
        Mode::Browse => "↑↓ move  / search  m missing  a all  u upload  e replace  d delete  r refresh  q quit",
        Mode::Search => "type to search (2+ chars)  enter keep  esc clear",
        Mode::PathPrompt(_) => "enter upload  esc cancel",
        Mode::ConfirmDelete => "y confirm  n cancel",
    };

    let status = match &state.status {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Info => theme.text_primary,
                StatusKind::Success => theme.accent_success,
                StatusKind::Warning => theme.accent_warning,
                StatusKind::Error => theme.accent_error,
            };
            Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
        }
        None => Line::from(""),
    };

    let lines = vec![
        status,
        Line::from(Span::styled(help, Style::default().fg(theme.text_tertiary))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_path_prompt(frame: &mut Frame, state: &State, intent: UploadIntent, theme: &Theme) {
    let area = centered(frame.area(), 70, 7);
    let (title, verb) = match intent {
        UploadIntent::Upload => (" Upload image ", "for"),
        UploadIntent::Replace => (" Replace image ", "of"),
    };
    let name = state.target.as_ref().map(|r| r.name.as_str()).unwrap_or("");

    let lines = vec![
        Line::from(Span::styled(
            format!("Image file {} {}:", verb, name),
            Style::default().fg(theme.text_secondary),
        )),
        Line::from(""),
        Line::from(Span::styled(
            state.path.value().to_string(),
            Style::default().fg(theme.text_primary),
        )),
    ];
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent_primary));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
    let x = area.x + 1 + state.path.state.cursor() as u16;
    frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 3));
}

fn render_confirm_delete(frame: &mut Frame, state: &State, theme: &Theme) {
    let area = centered(frame.area(), 60, 7);
    let Some(record) = state.target.as_ref() else {
        return;
    };
    let lines = vec![
        Line::from(Span::styled(
            format!("Delete the image of {}?", record.name),
            Style::default().fg(theme.text_primary),
        )),
        Line::from(""),
        Line::from(Span::styled(
            record.image.clone().unwrap_or_default(),
            Style::default().fg(theme.text_tertiary),
        )),
        Line::from(Span::styled(
            "The file is removed from storage and the cell cleared.",
            Style::default().fg(theme.accent_warning),
        )),
    ];
    let block = Block::default()
        .title(" Confirm delete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent_error));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

/// A `width` x `height` rectangle centred in `area`, shrunk to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
