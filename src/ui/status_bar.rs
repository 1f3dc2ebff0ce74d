use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Theme;
use crate::config::{DropdownAction, GlobalAction, KeyResolver, NavAction};
use crate::service::DispatchOutcome;

/// Bottom bar with key hints on the left and the last selection change on the right.
pub struct StatusBar {
    resolver: Arc<KeyResolver>,
    last_outcome: Option<DispatchOutcome>,
}

impl StatusBar {
    pub const fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            resolver,
            last_outcome: None,
        }
    }

    pub fn set_outcome(&mut self, outcome: DispatchOutcome) {
        self.last_outcome = Some(outcome);
    }

    fn keybindings(&self) -> Vec<(String, &'static str)> {
        vec![
            (self.resolver.display_nav(NavAction::Select), "toggle"),
            (
                self.resolver.display_dropdown(DropdownAction::Toggle),
                "open/close",
            ),
            (self.resolver.display_nav(NavAction::Down), "next"),
            (self.resolver.display_nav(NavAction::Up), "prev"),
            (
                self.resolver.display_dropdown(DropdownAction::Close),
                "close",
            ),
            (self.resolver.display_global(GlobalAction::Quit), "quit"),
        ]
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [hints_area, outcome_area] =
            Layout::horizontal([Constraint::Min(20), Constraint::Length(36)]).areas(inner);

        let key_style = Style::default()
            .fg(theme.key_hint())
            .add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(theme.muted());
        let mut spans = Vec::new();
        for (key, desc) in self.keybindings() {
            if !spans.is_empty() {
                spans.push(Span::styled("  ", desc_style));
            }
            spans.push(Span::styled(format!("<{key}>"), key_style));
            spans.push(Span::styled(format!(" {desc}"), desc_style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), hints_area);

        let outcome = match &self.last_outcome {
            Some(DispatchOutcome::Toggled {
                service_id,
                selected: true,
            }) => Span::styled(format!("+ {service_id}"), Style::default().fg(theme.success())),
            Some(DispatchOutcome::Toggled {
                service_id,
                selected: false,
            }) => Span::styled(format!("- {service_id}"), Style::default().fg(theme.disabled())),
            Some(DispatchOutcome::NotFound { service_id }) => Span::styled(
                format!("unknown service {service_id}"),
                Style::default().fg(theme.warning()),
            ),
            None => Span::raw(""),
        };
        frame.render_widget(
            Paragraph::new(Line::from(outcome)).right_aligned(),
            outcome_area,
        );
    }
}
