//! Status glyphs/styles, header and footer rendering.

use super::icons;
use crate::data::Status;
use crate::engine::{AnimationPhase, View};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Glyph and style for one status at one animation phase.
pub struct StatusConfig {
    pub icon: String,
    pub style: Style,
}

pub trait StatusConfigurable {
    fn status_config(&self, phase: AnimationPhase) -> StatusConfig;
}

impl StatusConfigurable for Status {
    fn status_config(&self, phase: AnimationPhase) -> StatusConfig {
        match self {
            Status::Processing => StatusConfig {
                icon: phase.spinner_char().to_string(),
                style: Style::default().fg(Color::Cyan),
            },
            Status::ReadyForInput => StatusConfig {
                icon: if phase.pulse_on() {
                    icons::READY_ON
                } else {
                    icons::READY_OFF
                }
                .to_string(),
                style: Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            },
            Status::Waiting => StatusConfig {
                icon: icons::WAITING.to_string(),
                style: Style::default().fg(Color::DarkGray),
            },
            Status::Unknown => StatusConfig {
                icon: icons::UNKNOWN.to_string(),
                style: Style::default().fg(Color::Yellow),
            },
        }
    }
}

pub fn draw_header(f: &mut Frame, view: &View<'_>, area: Rect) {
    let count = view.entries.len();
    let mut spans = vec![
        Span::styled(
            " Claude Glasses ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} session{}", count, if count == 1 { "" } else { "s" }),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
    ];

    if view.notifications_enabled {
        spans.push(Span::styled(
            format!("{} notify", icons::NOTIFY_ON),
            Style::default().fg(Color::Green),
        ));
    } else {
        spans.push(Span::styled(
            format!("{} notify", icons::NOTIFY_OFF),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if view.notifier_failure.is_some() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} notifier failed", icons::NOTIFIER_FAILED),
            Style::default().fg(Color::Red),
        ));
    }

    if view.source_unavailable {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} source unavailable", icons::SOURCE_DOWN),
            Style::default().fg(Color::Yellow),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn draw_footer(f: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let label = Style::default().fg(Color::DarkGray);
    let line = Line::from(vec![
        Span::styled(" q", key),
        Span::styled(" quit  ", label),
        Span::styled("n", key),
        Span::styled(" notifications  ", label),
        Span::styled("r", key),
        Span::styled(" refresh  ", label),
        Span::styled("t", key),
        Span::styled(" test", label),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_pulses_with_phase() {
        let mut phase = AnimationPhase::default();
        assert_eq!(Status::ReadyForInput.status_config(phase).icon, icons::READY_ON);
        for _ in 0..5 {
            phase.advance();
        }
        assert_eq!(Status::ReadyForInput.status_config(phase).icon, icons::READY_OFF);
    }

    #[test]
    fn static_glyphs() {
        let phase = AnimationPhase::default();
        assert_eq!(Status::Waiting.status_config(phase).icon, icons::WAITING);
        assert_eq!(Status::Unknown.status_config(phase).icon, icons::UNKNOWN);
        assert_eq!(
            Status::Processing.status_config(phase).icon,
            phase.spinner_char().to_string()
        );
    }
}
