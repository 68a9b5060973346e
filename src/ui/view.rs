use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::config::ListDensity;
use crate::engine::model::{Banner, EntryIntent, Model, Pane, Picker, View};
use crate::task::{self, Task};

const CONTEXT_PANE_HEIGHT: u16 = 10;
const HELP_KEY_WIDTH: usize = 14;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_CONTEXT: Color = Color::Rgb(180, 156, 92);

/// Per-prefix hues; a prefix hashes to the same color on every redraw.
const PREFIX_PALETTE: [Color; 6] = [
    Color::Rgb(122, 170, 255),
    Color::Rgb(126, 210, 146),
    Color::Rgb(244, 200, 98),
    Color::Rgb(214, 140, 230),
    Color::Rgb(116, 198, 219),
    Color::Rgb(255, 147, 112),
];

pub fn render(frame: &mut Frame, model: &Model) {
    let area = frame.size();
    let with_context = context_pane_visible(model);
    let constraints = if with_context {
        vec![
            Constraint::Min(0),
            Constraint::Length(CONTEXT_PANE_HEIGHT),
            Constraint::Length(1),
        ]
    } else {
        vec![Constraint::Min(0), Constraint::Length(1)]
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    let content = chunks[0];
    let footer = chunks[chunks.len() - 1];

    match model.view {
        View::ListActive => render_list(frame, model, Pane::Active, content),
        View::ListArchived => render_list(frame, model, Pane::Archived, content),
        View::EntryForm => render_entry(frame, model, content),
        View::DetailPane => render_detail(frame, model, content),
        View::BookmarkPicker => render_picker(frame, &model.bookmarks, "bookmarks", content),
        View::PrefixPicker => render_picker(frame, &model.prefixes, "filter by prefix", content),
        View::Help => render_help(frame, content),
    }

    if with_context {
        render_context_pane(frame, model, chunks[1]);
    }

    render_footer(frame, model, footer);
}

fn context_pane_visible(model: &Model) -> bool {
    model.show_context
        && matches!(model.view, View::ListActive | View::ListArchived)
        && !model.list(model.pane).is_empty()
}

fn render_list(frame: &mut Frame, model: &Model, pane: Pane, area: Rect) {
    let list = model.list(pane);
    let content_width = area.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line<'static>> = Vec::new();

    if list.is_empty() {
        let hint = match pane {
            Pane::Active => "No items. Press a/o to add one.",
            Pane::Archived => "No items. You archive items by pressing ctrl+d.",
        };
        lines.push(Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        let visible = model.visible(pane);
        if visible.is_empty() {
            lines.push(Line::from(Span::styled(
                "No tasks with this prefix.".to_string(),
                Style::default().fg(COLOR_MUTED),
            )));
        } else {
            let rows_per_task = match model.density {
                ListDensity::Compact => 1,
                ListDensity::Spacious => 3,
            };
            let window_height = (area.height.saturating_sub(2) as usize / rows_per_task).max(1);
            let cursor = model.cursor(pane).min(visible.len() - 1);
            let (start, end) = list_window(visible.len(), Some(cursor), window_height);
            for vis_pos in start..end {
                let Some(task) = list.get(visible[vis_pos]) else {
                    continue;
                };
                let selected = vis_pos == cursor;
                lines.push(render_task_row(task, selected, content_width));
                if model.density == ListDensity::Spacious {
                    lines.push(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(
                            format!("created {}", format_timestamp(task.created_at)),
                            Style::default().fg(COLOR_MUTED_DARK),
                        ),
                    ]));
                    lines.push(Line::from(""));
                }
            }
        }
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(list_title(model, pane))
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn list_title(model: &Model, pane: Pane) -> String {
    let base = match pane {
        Pane::Active => model.list_title.as_str(),
        Pane::Archived => "archived",
    };
    match model.filter(pane) {
        Some(prefix) => format!("{base} / {prefix}"),
        None => base.to_string(),
    }
}

fn render_task_row(task: &Task, selected: bool, width: usize) -> Line<'static> {
    let marker = if selected { "\u{2502} " } else { "  " };
    let context_marker = if task.has_context() { " (c)" } else { "" };
    let body_width = width.saturating_sub(2 + context_marker.len());

    let mut spans = vec![Span::styled(
        marker.to_string(),
        Style::default().fg(COLOR_ACCENT),
    )];
    match task::split_prefix(&task.summary) {
        Some((prefix, body)) => {
            let label = format!("{prefix}: ");
            let body_width = body_width.saturating_sub(label.chars().count());
            spans.push(Span::styled(
                label,
                Style::default()
                    .fg(prefix_color(prefix))
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                truncate_text(body, body_width),
                Style::default().fg(COLOR_TEXT),
            ));
        }
        None => {
            spans.push(Span::styled(
                truncate_text(&task.summary, body_width),
                Style::default().fg(COLOR_TEXT),
            ));
        }
    }
    if !context_marker.is_empty() {
        spans.push(Span::styled(
            context_marker.to_string(),
            Style::default().fg(COLOR_MUTED_DARK),
        ));
    }

    if selected {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }

    Line::from(spans)
}

fn render_context_pane(frame: &mut Frame, model: &Model, area: Rect) {
    let content = model
        .selected(model.pane)
        .and_then(|task| task.context.as_deref())
        .unwrap_or("");
    let lines: Vec<Line<'static>> = if content.is_empty() {
        vec![Line::from(Span::styled(
            "No context.".to_string(),
            Style::default().fg(COLOR_MUTED_DARK),
        ))]
    } else {
        content
            .lines()
            .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(COLOR_TEXT))))
            .collect()
    };

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("context")
                .border_style(Style::default().fg(COLOR_BORDER_CONTEXT)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_entry(frame: &mut Frame, model: &Model, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let (title, position_hint) = match model.entry.intent {
        EntryIntent::Create { index } => {
            let hint = if index == 0 {
                "task will be added at the top".to_string()
            } else if index >= model.active.len() {
                "task will be added at the end".to_string()
            } else {
                format!("task will be added at position {}", index + 1)
            };
            ("enter your task", Some(hint))
        }
        EntryIntent::Rename { .. } => ("update task", None),
    };

    let mut lines: Vec<Line<'static>> = Vec::new();
    lines.push(Line::from(""));
    if let Some(hint) = position_hint {
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(COLOR_MUTED),
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "a summary like 'prefix: do something' gets its prefix highlighted in the list".to_string(),
        Style::default().fg(COLOR_MUTED_DARK),
    )));
    lines.push(Line::from(""));

    let input = tail_window(&model.entry.text, content_width.saturating_sub(4));
    lines.push(Line::from(vec![
        Span::styled("> ".to_string(), Style::default().fg(COLOR_ACCENT)),
        Span::styled(input, Style::default().fg(COLOR_TEXT)),
        Span::styled(
            " ".to_string(),
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::REVERSED),
        ),
    ]));

    if let Banner::Error(message) = &model.banner {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(COLOR_ERROR).add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "press esc to go back, enter to submit".to_string(),
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_detail(frame: &mut Frame, model: &Model, area: Rect) {
    let pane = model.pane;
    let total = model.visible_len(pane);
    let title = if total == 0 {
        "task details".to_string()
    } else {
        format!("task details [{}/{total}]", model.cursor(pane).min(total - 1) + 1)
    };

    let mut lines: Vec<Line<'static>> = Vec::new();
    match model.selected(pane) {
        None => lines.push(Line::from(Span::styled(
            "No task selected.".to_string(),
            Style::default().fg(COLOR_MUTED),
        ))),
        Some(task) => {
            lines.push(summary_line(task));
            lines.push(Line::from(vec![
                Span::styled("created: ".to_string(), Style::default().fg(COLOR_MUTED_DARK)),
                Span::styled(
                    format_timestamp(task.created_at),
                    Style::default().fg(COLOR_WARNING),
                ),
                Span::raw("  "),
                Span::styled("updated: ".to_string(), Style::default().fg(COLOR_MUTED_DARK)),
                Span::styled(
                    format_timestamp(task.updated_at),
                    Style::default().fg(COLOR_WARNING),
                ),
            ]));
            if !task.active {
                lines.push(Line::from(Span::styled(
                    "archived".to_string(),
                    Style::default().fg(COLOR_WARNING),
                )));
            }
            lines.push(Line::from(""));
            match task.context.as_deref() {
                Some(context) if !context.is_empty() => {
                    for line in context.lines() {
                        lines.push(Line::from(Span::styled(
                            line.to_string(),
                            Style::default().fg(COLOR_TEXT),
                        )));
                    }
                }
                _ => lines.push(Line::from(Span::styled(
                    "No context.".to_string(),
                    Style::default().fg(COLOR_MUTED_DARK),
                ))),
            }
        }
    }

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(COLOR_BORDER_CONTEXT)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn summary_line(task: &Task) -> Line<'static> {
    let bold_text = Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD);
    match task::split_prefix(&task.summary) {
        Some((prefix, body)) => Line::from(vec![
            Span::styled(
                format!("{prefix}: "),
                Style::default()
                    .fg(prefix_color(prefix))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(body.to_string(), bold_text),
        ]),
        None => Line::from(Span::styled(task.summary.clone(), bold_text)),
    }
}

fn render_picker(frame: &mut Frame, picker: &Picker, title: &str, area: Rect) {
    let height = area.height.saturating_sub(2).max(1) as usize;
    let (start, end) = list_window(picker.items.len(), Some(picker.cursor), height);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for pos in start..end {
        let selected = pos == picker.cursor;
        let marker = if selected { "\u{2502} " } else { "  " };
        let mut spans = vec![
            Span::styled(marker.to_string(), Style::default().fg(COLOR_ACCENT)),
            Span::styled(
                picker.items[pos].clone(),
                Style::default().fg(COLOR_TEXT),
            ),
        ];
        if selected {
            for span in &mut spans {
                span.style = span.style.add_modifier(Modifier::REVERSED);
            }
        }
        lines.push(Line::from(spans));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;
    let lines = vec![
        help_header("moving around"),
        help_line("j/k or down/up", "move the cursor", width),
        help_line("tab", "switch between active and archived", width),
        help_line("d", "task details", width),
        help_line("h/l", "previous/next task in details", width),
        help_line("esc/q", "go back", width),
        help_line("Q", "quit from anywhere", width),
        Line::from(""),
        help_header("changing the list"),
        help_line("I", "add a task at the top", width),
        help_line("O", "add a task above the cursor", width),
        help_line("a/o", "add a task below the cursor", width),
        help_line("A", "add a task at the end", width),
        help_line("u", "update the task summary", width),
        help_line("J/K", "move the task down/up", width),
        help_line("enter", "move the task to the top", width),
        help_line("ctrl+d", "archive or unarchive the task", width),
        help_line("ctrl+x", "delete the task", width),
        help_line("ctrl+r", "reload both lists", width),
        Line::from(""),
        help_header("context and bookmarks"),
        help_line("c", "edit the task's context", width),
        help_line("y", "copy the context to the clipboard", width),
        help_line("b", "open a bookmark from the task", width),
        help_line("B", "open every bookmark", width),
        Line::from(""),
        help_header("display"),
        help_line("ctrl+p", "filter the list by prefix", width),
        help_line("v", "toggle list density", width),
        help_line("C", "toggle the context pane", width),
    ];

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("help")
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn render_footer(frame: &mut Frame, model: &Model, area: Rect) {
    let line = match &model.banner {
        // The entry form shows its validation error inline.
        Banner::Error(message) if model.view != View::EntryForm => Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(COLOR_ERROR).add_modifier(Modifier::BOLD),
        )),
        Banner::Info(message) => Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(COLOR_SUCCESS),
        )),
        _ => footer_hint(model),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn footer_hint(model: &Model) -> Line<'static> {
    let hint = match model.view {
        View::ListActive | View::ListArchived => {
            if model.is_filtered(model.pane) {
                " esc clears the prefix filter"
            } else {
                " Press ? for help"
            }
        }
        View::EntryForm => " press esc to go back, enter to submit",
        View::DetailPane => " h/l switch tasks, esc goes back",
        View::BookmarkPicker => " enter opens the bookmark, esc goes back",
        View::PrefixPicker => " enter applies the filter, esc goes back",
        View::Help => " esc goes back",
    };
    Line::from(Span::styled(
        hint.to_string(),
        Style::default().fg(COLOR_MUTED_DARK),
    ))
}

fn help_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
    ))
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_width = width.saturating_sub(HELP_KEY_WIDTH + 1);
    let desc_text = truncate_text(desc, desc_width);
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(desc_text, Style::default().fg(COLOR_MUTED)),
    ])
}

/// Stable per-prefix color.
fn prefix_color(prefix: &str) -> Color {
    let hash = prefix
        .bytes()
        .fold(0usize, |acc, byte| acc.wrapping_mul(31).wrapping_add(byte as usize));
    PREFIX_PALETTE[hash % PREFIX_PALETTE.len()]
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn pad_text(value: &str, width: usize) -> String {
    let mut text = value.to_string();
    if text.len() > width {
        text = truncate_text(&text, width);
    }
    format!("{text:width$}")
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

/// Keep the end of an overlong input visible; typing happens at the end.
fn tail_window(value: &str, max: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    chars[chars.len() - max..].iter().collect()
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}
