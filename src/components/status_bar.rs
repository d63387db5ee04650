use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::config::Theme;
use crate::tabs::Tab;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Bottom line: activity spinner, status message and key hints
#[derive(Debug, Default)]
pub struct StatusBar {
    frame: usize,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the spinner one frame
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.frame]
    }

    fn hints(tab: Tab) -> &'static str {
        match tab {
            Tab::Chat => "Tab focus · Ctrl+R fetch · Ctrl+Y copy · Ctrl+L clear · Ctrl+Q quit",
            Tab::Settings => "Tab field · Ctrl+S save · Ctrl+R fetch · Ctrl+U show key · F1 chat · Ctrl+Q quit",
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, status: &str, busy: bool, tab: Tab, theme: &Theme) {
        let mut spans = Vec::new();
        if busy {
            spans.push(Span::styled(
                format!("{} ", self.spinner()),
                Style::default().fg(theme.accent_color()),
            ));
        }

        let status_style = if status.starts_with("Error") || status == "Failed" {
            Style::default().fg(theme.colors.error.to_color())
        } else {
            Style::default().fg(theme.colors.foreground.to_color())
        };
        // Multi-line messages collapse onto the single status row
        let status = status.split_whitespace().collect::<Vec<_>>().join(" ");
        let hints = Self::hints(tab);

        let used = spans.iter().map(|s| s.content.chars().count()).sum::<usize>() + status.chars().count();
        spans.push(Span::styled(status, status_style));

        let hints_width = hints.chars().count();
        if used + hints_width + 2 <= area.width as usize {
            spans.push(Span::raw(" ".repeat(area.width as usize - used - hints_width)));
            spans.push(Span::styled(hints, theme.muted_style()));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
