//! Model picker widget
//!
//! Shows one projection of the catalog. The widget keeps only a highlight
//! cursor; the committed selection is owned by the synchronizer and pushed
//! in through [`ModelPicker::set_view`]. Enter reports the highlighted index
//! as a user selection.

use crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::action::Action;
use crate::components::Component;
use crate::config::Theme;
use crate::models::{PickerId, PickerView};

pub struct ModelPicker {
    id: PickerId,
    /// Chat picker carries a search box
    searchable: bool,
    query: String,
    items: Vec<String>,
    selected: Option<usize>,
    cursor: usize,
}

impl ModelPicker {
    pub fn new(id: PickerId) -> Self {
        Self {
            id,
            searchable: id == PickerId::Chat,
            query: String::new(),
            items: Vec::new(),
            selected: None,
            cursor: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Mirror the synchronizer's projection. The cursor follows the
    /// committed selection when there is one.
    pub fn set_view(&mut self, view: &PickerView) {
        self.items = view.items().to_vec();
        self.selected = view.selected();
        match self.selected {
            Some(idx) => self.cursor = idx,
            None => self.cursor = self.cursor.min(self.items.len().saturating_sub(1)),
        }
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.cursor = (self.cursor + 1) % self.items.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.items.is_empty() {
            self.cursor = self.cursor.checked_sub(1).unwrap_or(self.items.len() - 1);
        }
    }

    fn commit(&self) -> Option<Action> {
        if self.cursor < self.items.len() {
            Some(Action::SelectModel {
                picker: self.id,
                index: self.cursor,
            })
        } else {
            Some(Action::None)
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        match code {
            KeyCode::Up => {
                self.select_prev();
                Some(Action::None)
            }
            KeyCode::Down => {
                self.select_next();
                Some(Action::None)
            }
            KeyCode::Enter | KeyCode::Char(' ') if !self.searchable || code == KeyCode::Enter => {
                self.commit()
            }
            KeyCode::Backspace if self.searchable => {
                self.query.pop();
                Some(Action::SearchChanged(self.query.clone()))
            }
            KeyCode::Esc if self.searchable && !self.query.is_empty() => {
                self.query.clear();
                Some(Action::SearchChanged(String::new()))
            }
            KeyCode::Char(c)
                if self.searchable
                    && !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.query.push(c);
                Some(Action::SearchChanged(self.query.clone()))
            }
            _ => None,
        }
    }

    fn render_list(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, id)| {
                let marker = if Some(idx) == self.selected { "● " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(theme.accent_color())),
                    Span::raw(id.clone()),
                ]))
            })
            .collect();

        let list = List::new(items).highlight_style(
            Style::default()
                .fg(theme.on_accent_color())
                .bg(theme.accent_color())
                .add_modifier(Modifier::BOLD),
        );

        let mut state = ListState::default();
        if !self.items.is_empty() {
            state.select(Some(self.cursor));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }
}

impl Component for ModelPicker {
    fn handle_event(&mut self, event: &Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key(key.code, key.modifiers),
            _ => None,
        }
    }

    fn update(&mut self, _action: &Action) {}

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let title = match self.id {
            PickerId::Chat => " Model ",
            PickerId::Settings => " Default Model ",
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused))
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let list_area = if self.searchable {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)])
                .split(inner);

            let search = if self.query.is_empty() {
                Line::styled("type to search", theme.muted_style())
            } else {
                Line::from(vec![
                    Span::styled("/ ", theme.muted_style()),
                    Span::raw(self.query.clone()),
                ])
            };
            frame.render_widget(Paragraph::new(search), chunks[0]);
            chunks[1]
        } else {
            inner
        };

        if self.items.is_empty() {
            let hint = if self.query.is_empty() {
                "No models. Ctrl+R fetches."
            } else {
                "No match"
            };
            frame.render_widget(Paragraph::new(Line::styled(hint, theme.muted_style())), list_area);
        } else {
            self.render_list(frame, list_area, theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SelectionPolicy, SelectionSync};
    use crossterm::event::KeyEvent;

    fn press(picker: &mut ModelPicker, code: KeyCode) -> Option<Action> {
        picker.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn synced_view(picker: PickerId) -> PickerView {
        let mut sync = SelectionSync::new(SelectionPolicy::Clear);
        let items: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        sync.replace_catalog(items.clone(), items);
        sync.select(PickerId::Settings, 1, crate::models::Origin::User);
        sync.view(picker).clone()
    }

    #[test]
    fn test_cursor_follows_committed_selection() {
        let mut picker = ModelPicker::new(PickerId::Settings);
        picker.set_view(&synced_view(PickerId::Settings));

        assert_eq!(picker.cursor, 1);
        assert_eq!(
            press(&mut picker, KeyCode::Enter),
            Some(Action::SelectModel { picker: PickerId::Settings, index: 1 })
        );
    }

    #[test]
    fn test_navigation_wraps() {
        let mut picker = ModelPicker::new(PickerId::Settings);
        picker.set_view(&synced_view(PickerId::Settings));

        press(&mut picker, KeyCode::Down);
        press(&mut picker, KeyCode::Down);
        assert_eq!(picker.cursor, 0);
        press(&mut picker, KeyCode::Up);
        assert_eq!(picker.cursor, 2);
    }

    #[test]
    fn test_chat_picker_typing_updates_search() {
        let mut picker = ModelPicker::new(PickerId::Chat);

        assert_eq!(
            press(&mut picker, KeyCode::Char('g')),
            Some(Action::SearchChanged("g".to_string()))
        );
        assert_eq!(
            press(&mut picker, KeyCode::Backspace),
            Some(Action::SearchChanged(String::new()))
        );
        assert_eq!(picker.query(), "");
    }

    #[test]
    fn test_settings_picker_ignores_typing() {
        let mut picker = ModelPicker::new(PickerId::Settings);
        assert_eq!(press(&mut picker, KeyCode::Char('g')), None);
    }

    #[test]
    fn test_enter_on_empty_list_is_consumed() {
        let mut picker = ModelPicker::new(PickerId::Chat);
        assert_eq!(press(&mut picker, KeyCode::Enter), Some(Action::None));
    }
}
