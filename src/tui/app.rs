//! TUI application - main event loop and terminal management
//!
//! This module contains:
//! - Terminal setup and restoration
//! - The event loop multiplexing keyboard input, resizes and resolutions
//! - Key handling on top of the navigation session and layout selector

use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::mpsc;

use super::views::{self, EntityListView};
use crate::layout::{LayoutSelector, Pane, PaneSlot, Placeholder, ResizeDebouncer, ViewportClass};
use crate::models::DisplayMode;
use crate::navigation::{
    ApplyOutcome, NavigationController, NavigationSession, RecoveryAction, Resolution, Route,
    Ticket,
};
use crate::resolver::EntityContextResolver;
use crate::{Error, ErrorKind, Result};

/// How often the loop wakes to poll the terminal.
const TICK: Duration = Duration::from_millis(100);

/// Settings for an interactive session.
#[derive(Debug, Clone, Copy)]
pub struct BrowseOptions {
    /// Pixel width of one terminal column
    pub cell_width_px: u32,
    pub resize_debounce: Duration,
    pub display_mode: DisplayMode,
}

/// A resolution finished in the background.
type Completion = (Ticket, Result<Resolution>);

/// TUI application state
pub struct BrowseApp {
    session: NavigationSession,
    controller: NavigationController,
    layout: LayoutSelector,
    debouncer: ResizeDebouncer,
    children_view: EntityListView,
    options: BrowseOptions,
    /// Whether to quit the application
    should_quit: bool,
    /// Set when the session can only continue after signing in again
    auth_failure: Option<String>,
    /// Last key pressed (for gg detection)
    last_key: Option<KeyCode>,
}

impl BrowseApp {
    /// Create an app for a terminal `cols` columns wide.
    pub fn new(cols: u16, options: BrowseOptions) -> Self {
        Self {
            session: NavigationSession::new(),
            controller: NavigationController,
            layout: LayoutSelector::new(pixel_width(cols, options.cell_width_px)),
            debouncer: ResizeDebouncer::new(options.resize_debounce),
            children_view: EntityListView::new(),
            options,
            should_quit: false,
            auth_failure: None,
            last_key: None,
        }
    }

    pub fn session(&self) -> &NavigationSession {
        &self.session
    }

    pub fn layout(&self) -> &LayoutSelector {
        &self.layout
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.options.display_mode
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Start watching `route`.
    pub fn open(&mut self, route: Route) -> Option<Ticket> {
        self.session.navigate(route)
    }

    /// Handle a key press, returning a ticket when it requires a resolution.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<Ticket> {
        let previous = self.last_key.replace(key);
        let len = self.session.state().child_entities().len();
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.children_view.select_next(len);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.children_view.select_previous();
                None
            }
            KeyCode::Char('g') => {
                if previous == Some(KeyCode::Char('g')) {
                    self.children_view.select_first();
                    self.last_key = None;
                }
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.children_view.select_last(len);
                None
            }
            KeyCode::Home => {
                self.children_view.select_first();
                None
            }
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                let child = self
                    .children_view
                    .selected_in(self.session.state().child_entities())?
                    .clone();
                self.controller.on_child_click(&mut self.session, &child)
            }
            KeyCode::Char('p') | KeyCode::Char('h') | KeyCode::Left => {
                self.controller.on_parent_click(&mut self.session)
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c.to_digit(10)? as usize - 1;
                let item = self.session.state().breadcrumb().get(index)?.clone();
                self.controller.on_breadcrumb_click(&mut self.session, &item)
            }
            KeyCode::Tab => {
                self.layout.next_tab(self.session.state());
                None
            }
            KeyCode::Backspace => self.session.go_back(),
            KeyCode::Char('t') => self.session.go_top_level(),
            KeyCode::Char('r') => match self.session.error() {
                Some(error) if !error.offers(RecoveryAction::Retry) => None,
                _ => self.session.retry(),
            },
            KeyCode::Char('m') => {
                self.options.display_mode = self.options.display_mode.toggled();
                None
            }
            _ => None,
        }
    }

    /// Apply a finished resolution.
    pub fn handle_completion(
        &mut self,
        ticket: &Ticket,
        result: Result<Resolution>,
    ) -> ApplyOutcome {
        let shown_before = self.session.state().route().cloned();
        let outcome = self.session.apply(ticket, result);
        match outcome {
            ApplyOutcome::Applied => {
                let changed = shown_before.as_ref() != Some(ticket.route());
                self.layout.observe_route(self.session.state().route());
                if changed
                    || self.children_view.selected >= self.session.state().child_entities().len()
                {
                    self.children_view.reset();
                }
            }
            ApplyOutcome::Failed => {
                if let Some(error) = self.session.error() {
                    if error.kind == ErrorKind::Authentication {
                        self.auth_failure = Some(error.message.clone());
                        self.should_quit = true;
                    }
                }
            }
            ApplyOutcome::Stale => {}
        }
        outcome
    }

    /// Record a terminal resize; takes effect once the debounce window passes.
    pub fn handle_resize(&mut self, cols: u16, now: Instant) {
        self.debouncer
            .push(pixel_width(cols, self.options.cell_width_px), now);
    }

    /// Apply a settled resize, if any. Returns true if the viewport class changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(width) => self.layout.on_resize(width),
            None => false,
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let error = self.session.error().cloned();

        let mut constraints = vec![Constraint::Length(3)]; // Breadcrumb
        if error.is_some() {
            constraints.push(Constraint::Length(4)); // Error banner
        }
        constraints.push(Constraint::Min(5)); // Panes
        constraints.push(Constraint::Length(3)); // Status bar
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let state = self.session.state();
        views::render_breadcrumb(
            frame,
            chunks[0],
            state.breadcrumb(),
            state.route() == Some(&Route::TopLevel),
            self.session.is_loading(),
        );

        let mut next = 1;
        if let Some(error) = &error {
            views::render_error(frame, chunks[next], error);
            next += 1;
        }
        self.render_main(frame, chunks[next]);
        self.render_status_bar(frame, chunks[next + 1]);
    }

    fn render_main(&mut self, frame: &mut Frame, area: Rect) {
        if self.session.state().is_empty() {
            let text = if self.session.is_loading() {
                "Loading…"
            } else {
                "Nothing to show"
            };
            let placeholder = Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(placeholder, area);
            return;
        }

        let plan = self.layout.plan(self.session.state());
        let area = match plan.active_tab {
            Some(active) => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(1), Constraint::Min(3)])
                    .split(area);
                views::render_tabs(frame, rows[0], &plan.tabs, active);
                rows[1]
            }
            None => area,
        };

        let constraints: Vec<Constraint> = plan
            .panes
            .iter()
            .map(|slot| match slot.pane {
                Pane::Current => Constraint::Percentage(40),
                _ => Constraint::Percentage(30),
            })
            .collect();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);
        for (slot, column) in plan.panes.iter().zip(columns.iter()) {
            self.render_pane(frame, *column, *slot);
        }
    }

    fn render_pane(&mut self, frame: &mut Frame, area: Rect, slot: PaneSlot) {
        let mode = self.options.display_mode;
        let state = self.session.state();
        match slot.pane {
            Pane::Parent => {
                let title = state
                    .parent_type()
                    .map(|t| t.label())
                    .unwrap_or("Parent");
                views::render_entity_pane(
                    frame,
                    area,
                    title,
                    state.parent_entity(),
                    slot.placeholder,
                    DisplayMode::Compact,
                );
            }
            Pane::Current => {
                let title = state.current_type().map(|t| t.label()).unwrap_or("Top level");
                let placeholder = state
                    .current_entity()
                    .is_none()
                    .then_some(Placeholder::TopLevel);
                views::render_entity_pane(
                    frame,
                    area,
                    title,
                    state.current_entity(),
                    placeholder,
                    mode,
                );
            }
            Pane::Children => match (state.child_type(), slot.placeholder) {
                (Some(child_type), None) => {
                    let empty = format!("No {} yet", child_type.label());
                    let children = state.child_entities().to_vec();
                    self.children_view.render(
                        frame,
                        area,
                        child_type.label(),
                        &children,
                        &empty,
                    );
                }
                (_, placeholder) => {
                    views::render_entity_pane(frame, area, "Children", None, placeholder, mode)
                }
            },
        }
    }

    /// Render the status bar with keybindings
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut text = String::from(" j/k:Select  Enter:Open  p:Parent  1-9:Breadcrumb");
        if self.layout.class() == ViewportClass::Mobile {
            text.push_str("  Tab:Pane");
        }
        text.push_str(&format!(
            "  Bksp:Back  t:Top  r:Retry  m:{}  q:Quit  [{}]",
            self.options.display_mode.toggled(),
            self.layout.class()
        ));
        let status = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, area);
    }
}

fn pixel_width(cols: u16, cell_width_px: u32) -> u32 {
    u32::from(cols).saturating_mul(cell_width_px)
}

/// Resolve `ticket` in the background and report back on `tx`.
fn dispatch(
    resolver: &EntityContextResolver,
    tx: &mpsc::UnboundedSender<Completion>,
    ticket: Ticket,
) {
    let resolver = resolver.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = resolver.resolve_route(ticket.route()).await;
        // The receiver only goes away when the app is quitting.
        let _ = tx.send((ticket, result));
    });
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the interactive browser starting at `start`.
///
/// # Errors
/// Returns an authentication error when the session expires, so the caller
/// can tell the user to sign in again.
pub async fn run_tui(
    resolver: EntityContextResolver,
    start: Route,
    options: BrowseOptions,
) -> Result<()> {
    let (cols, _rows) = terminal::size()?;
    let mut app = BrowseApp::new(cols, options);
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();

    if let Some(ticket) = app.open(start) {
        dispatch(&resolver, &tx, ticket);
    }

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app, &resolver, &tx, &mut rx).await;
    restore_terminal()?;
    result?;

    match app.auth_failure {
        Some(message) => {
            tracing::warn!("leaving browser: {}", message);
            Err(Error::Authentication(
                "the entity service rejected the session; store a new token with `tw config set-token`"
                    .to_string(),
            ))
        }
        None => Ok(()),
    }
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut BrowseApp,
    resolver: &EntityContextResolver,
    tx: &mpsc::UnboundedSender<Completion>,
    rx: &mut mpsc::UnboundedReceiver<Completion>,
) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        tokio::select! {
            // Check for terminal events
            _ = tokio::time::sleep(TICK) => {
                while event::poll(Duration::from_millis(0))? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if let Some(ticket) = app.handle_key(key.code) {
                                dispatch(resolver, tx, ticket);
                            }
                        }
                        Event::Resize(cols, _) => app.handle_resize(cols, Instant::now()),
                        _ => {}
                    }
                }
                app.tick(Instant::now());
            }
            // Finished resolutions
            Some((ticket, result)) = rx.recv() => {
                app.handle_completion(&ticket, result);
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
