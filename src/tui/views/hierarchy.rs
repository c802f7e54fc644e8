//! Breadcrumb bar, entity panes, mobile tab bar and error banner.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
};

use crate::layout::{Pane, Placeholder};
use crate::models::{BreadcrumbItem, DisplayMode, Entity};
use crate::navigation::{ErrorView, RecoveryAction};

/// Breadcrumb trail, root first, each item numbered for its jump key.
pub fn render_breadcrumb(
    frame: &mut Frame,
    area: Rect,
    items: &[BreadcrumbItem],
    top_level: bool,
    loading: bool,
) {
    let mut spans = Vec::new();
    if top_level || items.is_empty() {
        spans.push(Span::styled(
            " Top level",
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
        } else {
            spans.push(Span::raw(" "));
        }
        if i < 9 {
            spans.push(Span::styled(
                format!("{}:", i + 1),
                Style::default().fg(Color::DarkGray),
            ));
        }
        let style = if i + 1 == items.len() {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::styled(item.name.clone(), style));
    }
    if loading {
        spans.push(Span::styled("  loading…", Style::default().fg(Color::Yellow)));
    }

    let bar = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}

/// Mobile tab bar.
pub fn render_tabs(frame: &mut Frame, area: Rect, tabs: &[Pane], active: Pane) {
    let titles: Vec<Line> = tabs.iter().map(|p| Line::from(p.label())).collect();
    let selected = tabs.iter().position(|&p| p == active).unwrap_or(0);
    let widget = Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    frame.render_widget(widget, area);
}

/// A pane showing one entity, or its placeholder text.
pub fn render_entity_pane(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    entity: Option<&Entity>,
    placeholder: Option<Placeholder>,
    mode: DisplayMode,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title));

    let lines: Vec<Line> = match (entity, placeholder) {
        (_, Some(placeholder)) => vec![Line::styled(
            placeholder.text(),
            Style::default().fg(Color::DarkGray),
        )],
        (Some(entity), None) => entity
            .detail_lines(mode)
            .into_iter()
            .map(|line| {
                Line::from(vec![
                    Span::styled(
                        format!("{}: ", line.label),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(line.value),
                ])
            })
            .collect(),
        (None, None) => vec![Line::styled("—", Style::default().fg(Color::DarkGray))],
    };

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, area);
}

fn action_hint(action: RecoveryAction) -> &'static str {
    match action {
        RecoveryAction::GoBack => "Backspace",
        RecoveryAction::Retry => "r",
        RecoveryAction::GoTopLevel => "t",
        RecoveryAction::Reauthenticate => "tw config set-token",
    }
}

/// Error banner with the recovery actions on offer.
pub fn render_error(frame: &mut Frame, area: Rect, error: &ErrorView) {
    let mut actions = Vec::new();
    for action in &error.actions {
        actions.push(Span::styled(
            format!("[{}] ", action_hint(*action)),
            Style::default().fg(Color::Yellow),
        ));
        actions.push(Span::raw(format!("{}  ", action.label())));
    }

    let text = vec![
        Line::from(vec![
            Span::styled(
                format!("{}: ", error.kind),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(error.message.clone()),
        ]),
        Line::from(actions),
    ];
    let banner = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(format!(" Could not open {} ", error.route)),
        );
    frame.render_widget(banner, area);
}
