use std::sync::Arc;

use crossterm::event::{KeyEvent, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph};
use tracing::debug;

use crate::Theme;
use crate::config::{DropdownAction, KeyResolver, NavAction};
use crate::service::{
    DispatchOutcome, ServiceAction, ServiceCollection, ServiceRecord, ServiceStore,
};
use crate::ui::{Component, EventResult, Result};

const CARET_DOWN: &str = "▼";
const CARET_UP: &str = "▲";
const CHECK: &str = "✓";
const HEADER_HEIGHT: u16 = 3;

/// Header text for the current selection.
///
/// Nothing selected shows `placeholder`, a single selection shows its
/// `serviceID`, anything more shows a count.
pub fn header_label(services: &ServiceCollection, placeholder: &str) -> String {
    let mut selected = services.selected();
    match (selected.next(), selected.next()) {
        (None, _) => placeholder.to_string(),
        (Some(only), None) => only.service_id.clone(),
        (Some(_), Some(_)) => format!("{} services selected", services.selected_count()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropdownState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Header,
    Item(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownEvent {
    Opened,
    Closed,
    Dispatched(DispatchOutcome),
}

/// Multi-select dropdown over the services held by a [`ServiceStore`].
///
/// The header shows [`header_label`] and a caret. While open, the list shows
/// every service with a check mark on the selected ones. Activating a row
/// (select key or mouse press) toggles that service without closing the list.
/// A mouse press anywhere outside the header and list closes it.
pub struct CircuitDropdown {
    store: ServiceStore,
    resolver: Arc<KeyResolver>,
    placeholder: String,
    label: String,
    state: DropdownState,
    focus: Focus,
    list_state: ListState,
    bounds: Rect,
    header_area: Rect,
    list_area: Rect,
}

impl CircuitDropdown {
    pub fn new(
        store: ServiceStore,
        resolver: Arc<KeyResolver>,
        placeholder: impl Into<String>,
    ) -> Self {
        let placeholder = placeholder.into();
        let label = header_label(&store.state(), &placeholder);
        Self {
            store,
            resolver,
            placeholder,
            label,
            state: DropdownState::Closed,
            focus: Focus::Header,
            list_state: ListState::default(),
            bounds: Rect::default(),
            header_area: Rect::default(),
            list_area: Rect::default(),
        }
    }

    pub const fn is_open(&self) -> bool {
        matches!(self.state, DropdownState::Open)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Flip between open and closed.
    pub fn toggle(&mut self) -> DropdownEvent {
        if self.is_open() {
            self.close_list();
            DropdownEvent::Closed
        } else {
            self.state = DropdownState::Open;
            self.layout(self.bounds);
            debug!("Dropdown opened");
            DropdownEvent::Opened
        }
    }

    /// Close the list. Returns false if it was already closed.
    pub fn close(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.close_list();
        true
    }

    fn close_list(&mut self) {
        self.state = DropdownState::Closed;
        self.set_focus(Focus::Header);
        self.layout(self.bounds);
        debug!("Dropdown closed");
    }

    const fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.list_state.select(match focus {
            Focus::Header => None,
            Focus::Item(index) => Some(index),
        });
    }

    fn refresh_label(&mut self) {
        self.label = header_label(&self.store.state(), &self.placeholder);
    }

    /// Dispatch a select for the service at `index` in display order.
    fn select_index(&mut self, index: usize) -> EventResult<DropdownEvent> {
        let Some(service_id) = self
            .store
            .state()
            .iter()
            .nth(index)
            .map(|r| r.service_id.clone())
        else {
            return EventResult::Consumed;
        };

        let outcome = self.store.dispatch(ServiceAction::select(service_id));
        self.refresh_label();
        DropdownEvent::Dispatched(outcome).into()
    }

    /// Place the header at the top of `area` and the list, when open, right below it.
    pub fn layout(&mut self, area: Rect) {
        self.bounds = area;
        let header_height = HEADER_HEIGHT.min(area.height);
        self.header_area = Rect {
            height: header_height,
            ..area
        };

        self.list_area = if self.is_open() {
            let rows = u16::try_from(self.store.state().len()).unwrap_or(u16::MAX);
            Rect {
                y: area.y + header_height,
                height: rows.saturating_add(2).min(area.height - header_height),
                ..area
            }
        } else {
            Rect::default()
        };
    }

    const fn contains(&self, position: Position) -> bool {
        self.header_area.contains(position) || (self.is_open() && self.list_area.contains(position))
    }

    /// Index of the service row under `position`, if any.
    fn row_at(&self, position: Position) -> Option<usize> {
        let inner = Block::bordered().inner(self.list_area);
        if !inner.contains(position) {
            return None;
        }
        let index = usize::from(position.y - inner.y) + self.list_state.offset();
        (index < self.store.state().len()).then_some(index)
    }

    fn handle_header_key(&mut self, key: &KeyEvent) -> EventResult<DropdownEvent> {
        if self.resolver.matches_nav(key, NavAction::Select) {
            return self.toggle().into();
        }
        if self.is_open() && self.resolver.matches_nav(key, NavAction::Down) {
            if !self.store.state().is_empty() {
                self.set_focus(Focus::Item(0));
            }
            return EventResult::Consumed;
        }
        EventResult::Ignored
    }

    fn handle_item_key(&mut self, key: &KeyEvent, index: usize) -> EventResult<DropdownEvent> {
        let last = self.store.state().len().saturating_sub(1);

        if self.resolver.matches_nav(key, NavAction::Select) {
            return self.select_index(index);
        }
        let focus = if self.resolver.matches_nav(key, NavAction::Up) {
            index.checked_sub(1).map_or(Focus::Header, Focus::Item)
        } else if self.resolver.matches_nav(key, NavAction::Down) {
            Focus::Item((index + 1).min(last))
        } else if self.resolver.matches_nav(key, NavAction::Home) {
            Focus::Item(0)
        } else if self.resolver.matches_nav(key, NavAction::End) {
            Focus::Item(last)
        } else {
            return EventResult::Ignored;
        };
        self.set_focus(focus);
        EventResult::Consumed
    }

    fn render_header(&self, frame: &mut Frame, theme: &Theme) {
        let border = if self.focus == Focus::Header {
            theme.border_focused()
        } else {
            theme.border()
        };
        let block = Block::bordered()
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border));
        let inner = block.inner(self.header_area);
        frame.render_widget(block, self.header_area);

        let [text_area, caret_area] =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(2)]).areas(inner);

        let text_style = if self.store.state().selected_count() == 0 {
            Style::default()
                .fg(theme.placeholder())
                .add_modifier(Modifier::ITALIC)
        } else {
            Style::default()
                .fg(theme.text())
                .add_modifier(Modifier::BOLD)
        };
        frame.render_widget(
            Paragraph::new(self.label.as_str()).style(text_style),
            text_area,
        );

        let caret = if self.is_open() { CARET_UP } else { CARET_DOWN };
        frame.render_widget(
            Paragraph::new(caret).style(Style::default().fg(theme.muted())),
            caret_area,
        );
    }

    fn render_list(&mut self, frame: &mut Frame, theme: &Theme) {
        let services = self.store.state();
        let items: Vec<ListItem> = services.iter().map(|r| service_row(r, theme)).collect();

        let list = List::new(items)
            .block(
                Block::bordered()
                    .border_type(theme.border_type)
                    .border_style(Style::default().fg(theme.border_focused())),
            )
            .style(Style::default().bg(theme.base()))
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_widget(Clear, self.list_area);
        frame.render_stateful_widget(list, self.list_area, &mut self.list_state);
    }
}

fn service_row(record: &ServiceRecord, theme: &Theme) -> ListItem<'static> {
    let mut spans = vec![Span::styled(
        record.service_id.clone(),
        Style::default().fg(theme.text()),
    )];
    if record.selected {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            CHECK,
            Style::default()
                .fg(theme.success())
                .add_modifier(Modifier::BOLD),
        ));
    }
    ListItem::new(Line::from(spans))
}

impl Component for CircuitDropdown {
    type Output = DropdownEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_dropdown(&key, DropdownAction::Toggle) {
            return Ok(self.toggle().into());
        }
        if self.is_open() && self.resolver.matches_dropdown(&key, DropdownAction::Close) {
            self.close_list();
            return Ok(DropdownEvent::Closed.into());
        }

        Ok(match self.focus {
            Focus::Header => self.handle_header_key(&key),
            Focus::Item(index) => self.handle_item_key(&key, index),
        })
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<EventResult<Self::Output>> {
        if !matches!(mouse.kind, MouseEventKind::Down(_)) {
            return Ok(EventResult::Ignored);
        }
        let position = Position::new(mouse.column, mouse.row);

        if self.header_area.contains(position) {
            return Ok(self.toggle().into());
        }
        if !self.contains(position) {
            return Ok(if self.close() {
                DropdownEvent::Closed.into()
            } else {
                EventResult::Ignored
            });
        }

        Ok(self.row_at(position).map_or(EventResult::Consumed, |index| {
            self.set_focus(Focus::Item(index));
            self.select_index(index)
        }))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.refresh_label();
        self.layout(area);
        self.render_header(frame, theme);
        if self.is_open() {
            self.render_list(frame, theme);
        }
    }
}
