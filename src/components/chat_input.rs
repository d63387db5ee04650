use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::action::Action;
use crate::components::Component;
use crate::config::Theme;

/// Multi-line text input for composing a prompt
pub struct ChatInput {
    lines: Vec<String>,
    /// (line_index, char_column)
    cursor: (usize, usize),
}

impl ChatInput {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: (0, 0),
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn clear(&mut self) {
        self.lines = vec![String::new()];
        self.cursor = (0, 0);
    }

    pub fn paste_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\n' => self.insert_newline(),
                '\r' => {}
                c => self.insert_char(c),
            }
        }
    }

    fn insert_char(&mut self, c: char) {
        let (line, col) = self.cursor;
        let current = &mut self.lines[line];
        current.insert(char_to_byte_pos(current, col), c);
        self.cursor.1 = col + 1;
    }

    fn insert_newline(&mut self) {
        let (line, col) = self.cursor;
        let byte_pos = char_to_byte_pos(&self.lines[line], col);
        let remainder = self.lines[line].split_off(byte_pos);
        self.lines.insert(line + 1, remainder);
        self.cursor = (line + 1, 0);
    }

    fn delete_char_before(&mut self) {
        let (line, col) = self.cursor;
        if col > 0 {
            let current = &mut self.lines[line];
            let start = char_to_byte_pos(current, col - 1);
            let end = char_to_byte_pos(current, col);
            current.replace_range(start..end, "");
            self.cursor.1 = col - 1;
        } else if line > 0 {
            let current = self.lines.remove(line);
            let prev_len = self.lines[line - 1].chars().count();
            self.lines[line - 1].push_str(&current);
            self.cursor = (line - 1, prev_len);
        }
    }

    fn delete_char_at(&mut self) {
        let (line, col) = self.cursor;
        let len = self.lines[line].chars().count();
        if col < len {
            let current = &mut self.lines[line];
            let start = char_to_byte_pos(current, col);
            let end = char_to_byte_pos(current, col + 1);
            current.replace_range(start..end, "");
        } else if line + 1 < self.lines.len() {
            let next = self.lines.remove(line + 1);
            self.lines[line].push_str(&next);
        }
    }

    fn move_left(&mut self) {
        let (line, col) = self.cursor;
        if col > 0 {
            self.cursor.1 = col - 1;
        } else if line > 0 {
            self.cursor = (line - 1, self.lines[line - 1].chars().count());
        }
    }

    fn move_right(&mut self) {
        let (line, col) = self.cursor;
        if col < self.lines[line].chars().count() {
            self.cursor.1 = col + 1;
        } else if line + 1 < self.lines.len() {
            self.cursor = (line + 1, 0);
        }
    }

    fn move_vertical(&mut self, down: bool) {
        let (line, col) = self.cursor;
        let target = if down {
            (line + 1 < self.lines.len()).then_some(line + 1)
        } else {
            line.checked_sub(1)
        };
        if let Some(target) = target {
            self.cursor = (target, col.min(self.lines[target].chars().count()));
        }
    }

    fn delete_line(&mut self) {
        let (line, _) = self.cursor;
        if self.lines.len() > 1 {
            self.lines.remove(line);
            let line = line.min(self.lines.len() - 1);
            self.cursor = (line, self.cursor.1.min(self.lines[line].chars().count()));
        } else {
            self.clear();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match (key.modifiers, key.code) {
            (mods, KeyCode::Char('j')) if mods.contains(KeyModifiers::CONTROL) => {
                self.insert_newline();
                Some(Action::None)
            }
            (mods, KeyCode::Enter) if mods.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) => {
                self.insert_newline();
                Some(Action::None)
            }
            // Cleared by the caller once the send is accepted
            (_, KeyCode::Enter) => Some(Action::SendMessage(self.text())),
            (_, KeyCode::Backspace) => {
                self.delete_char_before();
                Some(Action::None)
            }
            (_, KeyCode::Delete) => {
                self.delete_char_at();
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::Left) => {
                self.move_left();
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::Right) => {
                self.move_right();
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::Up) => {
                self.move_vertical(false);
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::Down) => {
                self.move_vertical(true);
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::Home) => {
                self.cursor.1 = 0;
                Some(Action::None)
            }
            (KeyModifiers::NONE, KeyCode::End) => {
                self.cursor.1 = self.lines[self.cursor.0].chars().count();
                Some(Action::None)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('k')) => {
                self.delete_line();
                Some(Action::None)
            }
            (mods, KeyCode::Char(c)) if !mods.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.insert_char(c);
                Some(Action::None)
            }
            _ => None,
        }
    }
}

impl Default for ChatInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ChatInput {
    fn handle_event(&mut self, event: &Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key(*key),
            Event::Paste(text) => {
                self.paste_text(text);
                Some(Action::None)
            }
            _ => None,
        }
    }

    fn update(&mut self, _action: &Action) {}

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused))
            .title(" Message (Enter send, Alt+Enter newline) ");

        let inner = block.inner(area);
        let text_style = Style::default().fg(theme.colors.foreground.to_color());
        let cursor_style = Style::default().add_modifier(Modifier::REVERSED);

        let lines: Vec<Line> = self
            .lines
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                if !(focused && idx == self.cursor.0) {
                    return Line::styled(line.clone(), text_style);
                }
                let chars: Vec<char> = line.chars().collect();
                let col = self.cursor.1.min(chars.len());
                let before: String = chars[..col].iter().collect();
                let at: String = chars.get(col).map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
                let after: String = chars.iter().skip(col + 1).collect();
                Line::from(vec![
                    Span::styled(before, text_style),
                    Span::styled(at, cursor_style),
                    Span::styled(after, text_style),
                ])
            })
            .collect();

        // Keep the cursor row in view
        let scroll = (self.cursor.0 as u16).saturating_sub(inner.height.saturating_sub(1));
        let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
        frame.render_widget(paragraph, area);
    }
}

fn char_to_byte_pos(s: &str, char_pos: usize) -> usize {
    s.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn type_text(input: &mut ChatInput, text: &str) {
        for c in text.chars() {
            input.handle_event(&key(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn test_typing_and_enter_emits_send() {
        let mut input = ChatInput::new();
        type_text(&mut input, "héllo");

        let action = input.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE));

        assert_eq!(action, Some(Action::SendMessage("héllo".to_string())));
        assert_eq!(input.text(), "héllo");
    }

    #[test]
    fn test_alt_enter_inserts_newline() {
        let mut input = ChatInput::new();
        type_text(&mut input, "ab");
        input.handle_event(&key(KeyCode::Left, KeyModifiers::NONE));
        input.handle_event(&key(KeyCode::Enter, KeyModifiers::ALT));

        assert_eq!(input.text(), "a\nb");
        assert_eq!(input.cursor, (1, 0));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut input = ChatInput::new();
        input.paste_text("one\r\ntwo");
        input.cursor = (1, 0);

        input.handle_event(&key(KeyCode::Backspace, KeyModifiers::NONE));

        assert_eq!(input.text(), "onetwo");
        assert_eq!(input.cursor, (0, 3));
    }

    #[test]
    fn test_control_chars_are_not_inserted() {
        let mut input = ChatInput::new();
        assert!(input
            .handle_event(&key(KeyCode::Char('y'), KeyModifiers::CONTROL))
            .is_none());
        assert!(input.is_empty());
    }

    #[test]
    fn test_delete_line_and_clear() {
        let mut input = ChatInput::new();
        input.paste_text("a\nb");
        input.handle_event(&key(KeyCode::Char('k'), KeyModifiers::CONTROL));
        assert_eq!(input.text(), "a");

        input.clear();
        assert!(input.is_empty());
    }
}
