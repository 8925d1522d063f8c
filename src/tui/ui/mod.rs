//! Dashboard rendering.
//!
//! - `icons` - glyphs for statuses and header indicators
//! - `layout` - display-width text helpers
//! - `status` - per-status glyph/style, header and footer

pub mod icons;
pub mod layout;
mod status;

pub use status::{StatusConfig, StatusConfigurable};

use self::layout::{fit_left, NAME_WIDTH};
use self::status::{draw_footer, draw_header};
use crate::data::Status;
use crate::engine::View;
use anyhow::Result;
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

/// Renders snapshots. Called on every animation tick, so implementations
/// must not block.
pub trait Presenter {
    fn present(&mut self, view: &View<'_>) -> Result<()>;
}

/// Presenter that draws into a ratatui terminal.
pub struct TerminalPresenter<B: Backend> {
    terminal: Terminal<B>,
}

impl<B: Backend> TerminalPresenter<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self { terminal }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

impl<B: Backend> Presenter for TerminalPresenter<B> {
    fn present(&mut self, view: &View<'_>) -> Result<()> {
        self.terminal.draw(|f| draw(f, view))?;
        Ok(())
    }
}

/// Main draw function - renders the whole dashboard.
pub fn draw(f: &mut Frame, view: &View<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Sessions
            Constraint::Length(1), // Key help
        ])
        .split(f.area());

    draw_header(f, view, chunks[0]);
    draw_sessions(f, view, chunks[1]);
    draw_footer(f, chunks[2]);
}

fn draw_sessions(f: &mut Frame, view: &View<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    if view.entries.is_empty() {
        let text = if view.scanned {
            "no active sessions"
        } else {
            "scanning…"
        };
        let empty = Paragraph::new(Line::from(Span::styled(
            format!(" {}", text),
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let lines: Vec<Line> = view
        .entries
        .iter()
        .map(|entry| {
            let config = entry.status.status_config(view.phase);
            let mut spans = vec![
                Span::raw(" "),
                Span::styled(config.icon, config.style),
                Span::raw(" "),
                Span::styled(
                    fit_left(&entry.session.display_name, NAME_WIDTH),
                    name_style(entry.status),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("{:>7}", entry.format_elapsed()),
                    Style::default().fg(Color::Gray),
                ),
            ];
            if entry.status == Status::ReadyForInput {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(icons::READY_SUFFIX, config.style));
            }
            Line::from(spans)
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn name_style(status: Status) -> Style {
    match status {
        Status::ReadyForInput => Style::default().add_modifier(Modifier::BOLD),
        Status::Waiting => Style::default().fg(Color::DarkGray),
        _ => Style::default(),
    }
}
