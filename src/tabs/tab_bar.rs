//! Tab bar widget
//!
//! One row at the top of the screen listing the views with their function
//! key. The active tab is drawn in the accent colour.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use super::Tab;
use crate::config::Theme;

pub struct TabBar<'a> {
    active: Tab,
    theme: &'a Theme,
    /// Right-aligned hint, e.g. the current model
    right: Option<&'a str>,
}

impl<'a> TabBar<'a> {
    pub fn new(active: Tab, theme: &'a Theme) -> Self {
        Self {
            active,
            theme,
            right: None,
        }
    }

    pub fn right(mut self, text: &'a str) -> Self {
        self.right = Some(text);
        self
    }

    fn build_tab_spans(&self, tab: Tab) -> Vec<Span<'static>> {
        let style = if tab == self.active {
            self.theme.active_tab_style()
        } else {
            self.theme.muted_style()
        };

        vec![
            Span::styled(" ", style),
            Span::styled(format!("{}:", tab.shortcut()), style.add_modifier(Modifier::DIM)),
            Span::styled(tab.name(), style),
            Span::styled(" ", style),
        ]
    }
}

impl Widget for TabBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let separator = Style::default().fg(self.theme.colors.border.to_color());
        let mut spans: Vec<Span> = Vec::new();
        for (index, tab) in Tab::ALL.iter().enumerate() {
            if index > 0 {
                spans.push(Span::styled("│", separator));
            }
            spans.extend(self.build_tab_spans(*tab));
        }

        if let Some(right) = self.right {
            let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
            let width = right.chars().count() + 1;
            if used + width < area.width as usize {
                let padding = area.width as usize - used - width;
                spans.push(Span::raw(" ".repeat(padding)));
                spans.push(Span::styled(right.to_string(), self.theme.muted_style()));
            }
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
