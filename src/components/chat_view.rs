//! Conversation view
//!
//! Bubbles are laid out as aligned blocks of wrapped text: user messages on
//! the right, assistant replies on the left, system notes centred. The view
//! follows the newest message until the user scrolls back.

use crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::action::Action;
use crate::components::Component;
use crate::config::Theme;
use crate::llm::Role;
use crate::state::Bubble;

/// Share of the width a bubble may use
const BUBBLE_WIDTH_PERCENT: u16 = 70;

pub struct ChatView {
    bubbles: Vec<Bubble>,
    /// Lines scrolled back from the bottom
    scroll_back: u16,
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            bubbles: Vec::new(),
            scroll_back: 0,
        }
    }

    /// Replace the shown conversation; jumps to the newest message when it grew
    pub fn set_conversation(&mut self, bubbles: &[Bubble]) {
        if bubbles.len() != self.bubbles.len() {
            self.scroll_back = 0;
        }
        self.bubbles = bubbles.to_vec();
    }

    pub fn scroll_up(&mut self, n: u16) {
        self.scroll_back = self.scroll_back.saturating_add(n);
    }

    pub fn scroll_down(&mut self, n: u16) {
        self.scroll_back = self.scroll_back.saturating_sub(n);
    }

    fn bubble_lines(&self, bubble: &Bubble, width: usize, theme: &Theme) -> Vec<Line<'static>> {
        let (label, alignment, color) = match bubble.role {
            Role::User => ("You", Alignment::Right, theme.bubbles.user.to_color()),
            Role::Assistant => ("Assistant", Alignment::Left, theme.bubbles.assistant.to_color()),
            Role::System => ("System", Alignment::Center, theme.bubbles.system.to_color()),
        };

        let header = Line::from(vec![
            Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(" · {}", bubble.created_at.format("%H:%M")),
                theme.muted_style(),
            ),
        ])
        .alignment(alignment);

        let body_style = Style::default().fg(theme.colors.foreground.to_color());
        let mut lines = vec![header];
        lines.extend(
            wrap_text(&bubble.text, width)
                .into_iter()
                .map(|text| Line::styled(text, body_style).alignment(alignment)),
        );
        lines.push(Line::default());
        lines
    }
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ChatView {
    fn handle_event(&mut self, event: &Event) -> Option<Action> {
        let Event::Key(key) = event else {
            return None;
        };
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Up) => Some(Action::ScrollUp(1)),
            (KeyModifiers::NONE, KeyCode::Down) => Some(Action::ScrollDown(1)),
            (_, KeyCode::PageUp) => Some(Action::ScrollUp(10)),
            (_, KeyCode::PageDown) => Some(Action::ScrollDown(10)),
            (_, KeyCode::Home) => Some(Action::ScrollToTop),
            (_, KeyCode::End) => Some(Action::ScrollToBottom),
            _ => None,
        }
    }

    fn update(&mut self, action: &Action) {
        match action {
            Action::ScrollUp(n) => self.scroll_up(*n),
            Action::ScrollDown(n) => self.scroll_down(*n),
            Action::ScrollToTop => self.scroll_back = u16::MAX,
            Action::ScrollToBottom => self.scroll_back = 0,
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused))
            .title(" Conversation ");
        let inner = block.inner(area);

        let width = (inner.width as usize * BUBBLE_WIDTH_PERCENT as usize / 100).max(10);
        let lines: Vec<Line> = if self.bubbles.is_empty() {
            vec![Line::styled(
                "No messages yet. Pick a model and type a prompt below.",
                theme.muted_style(),
            )
            .alignment(Alignment::Center)]
        } else {
            self.bubbles
                .iter()
                .flat_map(|b| self.bubble_lines(b, width, theme))
                .collect()
        };

        let total = lines.len() as u16;
        let max_scroll = total.saturating_sub(inner.height);
        let top = max_scroll.saturating_sub(self.scroll_back.min(max_scroll));

        frame.render_widget(Paragraph::new(lines).block(block).scroll((top, 0)), area);
    }
}

/// Word-wrap `text` to at most `width` characters per line. Words longer than
/// `width` are split; explicit newlines are kept.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();

    for raw in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;

        for word in raw.split(' ') {
            let mut word: Vec<char> = word.chars().collect();

            // Split words that can never fit
            while word.len() > width {
                if line_len > 0 {
                    out.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                out.push(word.drain(..width).collect());
            }

            let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
            if needed > width && line_len > 0 {
                out.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word.iter());
            line_len += word.len();
        }
        out.push(line);
    }
    out
}
