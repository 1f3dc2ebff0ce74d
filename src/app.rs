use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::{debug, info, warn};

use crate::Theme;
use crate::config::{AppConfig, GlobalAction, KeyResolver};
use crate::service::ServiceStore;
use crate::tui::{Event, Tui};
use crate::ui::{CircuitDropdown, Component, DropdownEvent, EventResult, StatusBar};

const FRAME_RATE: f64 = 30.0;
const DROPDOWN_WIDTH: u16 = 48;
const STATUS_BAR_HEIGHT: u16 = 2;

pub struct App {
    circuit: String,
    dropdown: CircuitDropdown,
    status_bar: StatusBar,
    resolver: Arc<KeyResolver>,
    theme: Theme,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(
        store: ServiceStore,
        config: &AppConfig,
        resolver: Arc<KeyResolver>,
        theme: Theme,
        circuit: impl Into<String>,
    ) -> Self {
        Self {
            circuit: circuit.into(),
            dropdown: CircuitDropdown::new(
                store,
                Arc::clone(&resolver),
                config.dropdown.placeholder.clone(),
            ),
            status_bar: StatusBar::new(Arc::clone(&resolver)),
            resolver,
            theme,
            should_quit: false,
            should_suspend: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE)?;
        tui.enter()?;

        while !self.should_quit {
            let Some(event) = tui.next_event().await else {
                break;
            };
            self.handle_event(&mut tui, event)?;

            if self.should_suspend {
                tui.suspend()?;
                tui.resume()?;
                self.should_suspend = false;
            }
        }

        tui.exit()?;
        info!("Exiting, {} selected", self.dropdown.label());
        Ok(())
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> Result<()> {
        match event {
            Event::Quit => self.should_quit = true,
            Event::Error(error) => warn!("Terminal event error: {error}"),
            Event::Render => {
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                tui.draw(|frame| self.render(frame))?;
            }
            Event::Key(key) => self.handle_key(key)?,
            Event::Mouse(mouse) => {
                let result = self.dropdown.handle_mouse(mouse)?;
                self.handle_dropdown_result(result);
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let result = self.dropdown.handle_key(key)?;
        if result.is_consumed() {
            self.handle_dropdown_result(result);
            return Ok(());
        }

        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
        } else if self.resolver.matches_global(&key, GlobalAction::Suspend) {
            self.should_suspend = true;
        }
        Ok(())
    }

    fn handle_dropdown_result(&mut self, result: EventResult<DropdownEvent>) {
        match result {
            EventResult::Event(DropdownEvent::Dispatched(outcome)) => {
                info!(
                    "Selection changed: {outcome:?}, header now {:?}",
                    self.dropdown.label()
                );
                self.status_bar.set_outcome(outcome);
            }
            EventResult::Event(event) => debug!("Dropdown event: {event:?}"),
            EventResult::Consumed | EventResult::Ignored => {}
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let [title_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .areas(frame.area());

        let title = Line::from(vec![
            Span::styled(" Services of ", Style::default().fg(self.theme.muted())),
            Span::styled(
                self.circuit.as_str(),
                Style::default()
                    .fg(self.theme.title())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(title), title_area);

        let [dropdown_area] = Layout::horizontal([Constraint::Length(DROPDOWN_WIDTH)])
            .flex(Flex::Center)
            .areas(body_area);
        self.dropdown.render(frame, dropdown_area, &self.theme);

        self.status_bar.render(frame, status_area, &self.theme);
    }
}
