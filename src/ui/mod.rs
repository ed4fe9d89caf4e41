//! Terminal dashboard using ratatui
//!
//! Layout, top to bottom:
//! - Header with key help
//! - Four cascading selectors (gene, residue, source, destination)
//! - Gene and variant ΔΔG histograms side by side
//! - Interpretive summary
//! - Activity log

mod components;
pub mod state;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use components::{HeaderPanel, HistogramPanel, LogPanel, SelectorPanel, SummaryPanel};
pub use state::{Column, Dashboard, Selector};

use crate::store::DdgStore;

/// Shown for any page path that is not routed
pub const NOT_FOUND: &str = "404 Page Error! Please choose a link";

/// Routed dashboard pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    FoldingEnergies,
}

impl Page {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" | "/page1" => Some(Page::FoldingEnergies),
            _ => None,
        }
    }
}

/// What a key press asks the dashboard to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextColumn,
    PrevColumn,
    Up,
    Down,
    PageUp,
    PageDown,
    Choose,
    Clear,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => Some(Action::NextColumn),
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => Some(Action::PrevColumn),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Choose),
            KeyCode::Delete | KeyCode::Backspace => Some(Action::Clear),
            _ => None,
        }
    }
}

/// Apply an action; returns false when the dashboard should close
pub fn apply<S: DdgStore>(dashboard: &mut Dashboard<'_, S>, action: Action) -> bool {
    match action {
        Action::Quit => return false,
        Action::NextColumn => dashboard.focus_next(),
        Action::PrevColumn => dashboard.focus_prev(),
        Action::Up => dashboard.move_cursor(-1),
        Action::Down => dashboard.move_cursor(1),
        Action::PageUp => dashboard.move_cursor(-10),
        Action::PageDown => dashboard.move_cursor(10),
        Action::Choose => dashboard.choose(),
        Action::Clear => dashboard.clear(),
    }
    true
}

/// Terminal handle for the dashboard
pub struct DashboardApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl DashboardApp {
    /// Enter raw mode and the alternate screen
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal })
    }

    /// Event loop until the user quits
    pub fn run<S: DdgStore>(&mut self, dashboard: &mut Dashboard<'_, S>) -> Result<()> {
        loop {
            self.draw(dashboard)?;

            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            if let CrosstermEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = Action::from_key(key) {
                    if !apply(dashboard, action) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn draw<S: DdgStore>(&mut self, dashboard: &Dashboard<'_, S>) -> Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.area();
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),  // Header
                    Constraint::Length(12), // Selectors
                    Constraint::Min(8),     // Histograms
                    Constraint::Length(8),  // Summary
                    Constraint::Length(6),  // Activity
                ])
                .split(area);

            HeaderPanel::render(frame, rows[0]);

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 4); 4])
                .split(rows[1]);
            let focus = dashboard.focus();
            SelectorPanel::render(frame, columns[0], Column::Gene, &dashboard.gene, focus == Column::Gene);
            SelectorPanel::render(
                frame,
                columns[1],
                Column::Residue,
                &dashboard.residue,
                focus == Column::Residue,
            );
            SelectorPanel::render(
                frame,
                columns[2],
                Column::MutFrom,
                &dashboard.mut_from,
                focus == Column::MutFrom,
            );
            SelectorPanel::render(
                frame,
                columns[3],
                Column::MutTo,
                &dashboard.mut_to,
                focus == Column::MutTo,
            );

            let charts = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(rows[2]);
            let report = dashboard.report();
            HistogramPanel::render(frame, charts[0], &report.gene_histogram);
            HistogramPanel::render(frame, charts[1], &report.variant_histogram);

            SummaryPanel::render(frame, rows[3], report.text.as_deref());
            LogPanel::render(frame, rows[4], dashboard.activity());
        })?;

        Ok(())
    }

    /// Restore the terminal
    pub fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for DashboardApp {
    fn drop(&mut self) {
        // Best effort cleanup
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_routes() {
        assert_eq!(Page::from_path("/"), Some(Page::FoldingEnergies));
        assert_eq!(Page::from_path("/page1"), Some(Page::FoldingEnergies));
        assert_eq!(Page::from_path("/page2"), None);
        assert_eq!(Page::from_path(""), None);
    }

    #[test]
    fn test_key_bindings() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(Action::from_key(key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(Action::from_key(key(KeyCode::Enter)), Some(Action::Choose));
        assert_eq!(Action::from_key(key(KeyCode::Delete)), Some(Action::Clear));
        assert_eq!(Action::from_key(key(KeyCode::Tab)), Some(Action::NextColumn));
        assert_eq!(
            Action::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(Action::from_key(key(KeyCode::Char('z'))), None);
    }
}
