//! Selectable list of entities, used for the children pane and the top level.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::models::Entity;

/// Selection state for a list of entities owned elsewhere.
#[derive(Debug, Default)]
pub struct EntityListView {
    /// Selected item index
    pub selected: usize,
    /// List widget state
    pub list_state: ListState,
}

impl EntityListView {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            selected: 0,
            list_state,
        }
    }

    /// Back to the first item, for a freshly loaded list.
    pub fn reset(&mut self) {
        self.selected = 0;
        self.list_state.select(Some(0));
    }

    /// Keep the selection inside a list of `len` items.
    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        self.list_state.select(Some(self.selected));
    }

    /// Move selection down
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
        self.list_state.select(Some(self.selected));
    }

    /// Move selection up
    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.list_state.select(Some(self.selected));
    }

    pub fn select_first(&mut self) {
        self.reset();
    }

    pub fn select_last(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = len - 1;
        self.list_state.select(Some(self.selected));
    }

    pub fn selected_in<'a>(&self, entities: &'a [Entity]) -> Option<&'a Entity> {
        entities.get(self.selected)
    }

    /// Render `entities`, or `empty_text` when there are none.
    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        entities: &[Entity],
        empty_text: &str,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ({}) ", title, entities.len()));

        if entities.is_empty() {
            let empty = Paragraph::new(empty_text)
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = entities
            .iter()
            .map(|entity| {
                let mut spans = vec![
                    Span::styled(
                        format!("{:<10} ", entity.id()),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(entity.display_name().to_string()),
                ];
                if let Some(status) = entity.status() {
                    spans.push(Span::styled(
                        format!("  [{}]", status),
                        Style::default().fg(Color::Cyan),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        self.clamp(entities.len());
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}
