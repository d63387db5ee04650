//! Settings view: API key, base URL, system prompt, accent colour and the
//! default model picker.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::action::Action;
use crate::components::model_picker::ModelPicker;
use crate::components::Component;
use crate::config::{AccentColor, Theme};
use crate::models::{PickerId, PickerView};
use crate::state::SettingsForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    ApiKey,
    BaseUrl,
    SystemPrompt,
    Accent,
    Model,
    FetchModels,
    Save,
}

impl SettingsField {
    const ORDER: &'static [SettingsField] = &[
        SettingsField::ApiKey,
        SettingsField::BaseUrl,
        SettingsField::SystemPrompt,
        SettingsField::Accent,
        SettingsField::Model,
        SettingsField::FetchModels,
        SettingsField::Save,
    ];

    fn next(&self) -> SettingsField {
        let idx = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    fn prev(&self) -> SettingsField {
        let idx = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    fn label(&self) -> &'static str {
        match self {
            SettingsField::ApiKey => "API Key",
            SettingsField::BaseUrl => "Base URL",
            SettingsField::SystemPrompt => "System Prompt",
            SettingsField::Accent => "Accent Color",
            SettingsField::Model => "Default Model",
            SettingsField::FetchModels => "Fetch Models",
            SettingsField::Save => "Save Settings",
        }
    }

    fn is_text(&self) -> bool {
        matches!(
            self,
            SettingsField::ApiKey | SettingsField::BaseUrl | SettingsField::SystemPrompt
        )
    }
}

pub struct SettingsView {
    field: SettingsField,
    api_key: String,
    base_url: String,
    system_prompt: String,
    /// Show the API key in plain text
    show_key: bool,
    accent: AccentColor,
    picker: ModelPicker,
    /// Model id typed on the picker field, used as-is on Enter
    model_entry: String,
}

impl SettingsView {
    pub fn new() -> Self {
        Self {
            field: SettingsField::ApiKey,
            api_key: String::new(),
            base_url: String::new(),
            system_prompt: String::new(),
            show_key: false,
            accent: AccentColor::default(),
            picker: ModelPicker::new(PickerId::Settings),
            model_entry: String::new(),
        }
    }

    /// Reset the form to the given values, discarding unsaved edits
    pub fn load(&mut self, form: SettingsForm, accent: AccentColor) {
        self.api_key = form.api_key;
        self.base_url = form.base_url;
        self.system_prompt = form.system_prompt;
        self.accent = accent;
        self.show_key = false;
        self.model_entry.clear();
        self.field = SettingsField::ApiKey;
    }

    pub fn set_picker_view(&mut self, view: &PickerView) {
        self.picker.set_view(view);
    }

    pub fn field(&self) -> SettingsField {
        self.field
    }

    pub fn form(&self) -> SettingsForm {
        SettingsForm {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            system_prompt: self.system_prompt.clone(),
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            SettingsField::ApiKey => Some(&mut self.api_key),
            SettingsField::BaseUrl => Some(&mut self.base_url),
            SettingsField::SystemPrompt => Some(&mut self.system_prompt),
            _ => None,
        }
    }

    fn cycle_accent(&mut self, forward: bool) -> Option<Action> {
        self.accent = if forward {
            self.accent.next()
        } else {
            self.accent.prev()
        };
        Some(Action::SetAccent(self.accent))
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('s') if ctrl => return Some(Action::SaveSettings(self.form())),
            KeyCode::Char('r') if ctrl => return Some(Action::FetchModelsFrom(self.form())),
            KeyCode::Char('u') if ctrl => {
                self.show_key = !self.show_key;
                return Some(Action::None);
            }
            KeyCode::Char('k') if ctrl => {
                match self.text_mut() {
                    Some(text) => text.clear(),
                    None => self.model_entry.clear(),
                }
                return Some(Action::None);
            }
            KeyCode::Tab => {
                self.field = self.field.next();
                return Some(Action::None);
            }
            KeyCode::BackTab => {
                self.field = self.field.prev();
                return Some(Action::None);
            }
            _ => {}
        }

        match self.field {
            SettingsField::Model => self.handle_model_key(key),
            SettingsField::Accent => match key.code {
                KeyCode::Left => self.cycle_accent(false),
                KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ') => self.cycle_accent(true),
                KeyCode::Up => self.move_field(false),
                KeyCode::Down => self.move_field(true),
                _ => None,
            },
            SettingsField::FetchModels | SettingsField::Save => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') if self.field == SettingsField::Save => {
                    Some(Action::SaveSettings(self.form()))
                }
                KeyCode::Enter | KeyCode::Char(' ') => Some(Action::FetchModelsFrom(self.form())),
                KeyCode::Up => self.move_field(false),
                KeyCode::Down => self.move_field(true),
                _ => None,
            },
            _ => match key.code {
                KeyCode::Enter | KeyCode::Down => self.move_field(true),
                KeyCode::Up => self.move_field(false),
                KeyCode::Backspace => {
                    if let Some(text) = self.text_mut() {
                        text.pop();
                    }
                    Some(Action::None)
                }
                KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                    if let Some(text) = self.text_mut() {
                        text.push(c);
                    }
                    Some(Action::None)
                }
                _ => None,
            },
        }
    }

    /// Arrows move the picker cursor; typing builds a free-text model id
    fn handle_model_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Down => self.picker.handle_event(&Event::Key(key)),
            KeyCode::Enter if !self.model_entry.trim().is_empty() => {
                Some(Action::EnterModel(std::mem::take(&mut self.model_entry)))
            }
            KeyCode::Enter => self.picker.handle_event(&Event::Key(key)),
            KeyCode::Backspace => {
                self.model_entry.pop();
                Some(Action::None)
            }
            KeyCode::Esc if !self.model_entry.is_empty() => {
                self.model_entry.clear();
                Some(Action::None)
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.model_entry.push(c);
                Some(Action::None)
            }
            _ => None,
        }
    }

    fn move_field(&mut self, forward: bool) -> Option<Action> {
        self.field = if forward {
            self.field.next()
        } else {
            self.field.prev()
        };
        Some(Action::None)
    }

    fn display_value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::ApiKey if !self.show_key => "•".repeat(self.api_key.chars().count()),
            SettingsField::ApiKey => self.api_key.clone(),
            SettingsField::BaseUrl => self.base_url.clone(),
            SettingsField::SystemPrompt => self.system_prompt.clone(),
            _ => String::new(),
        }
    }

    fn render_text_field(&self, frame: &mut Frame, area: Rect, field: SettingsField, theme: &Theme) {
        let focused = self.field == field;
        let mut title = format!(" {} ", field.label());
        if field == SettingsField::ApiKey {
            title.push_str(if self.show_key { "(Ctrl+U hide) " } else { "(Ctrl+U show) " });
        }

        let mut spans = vec![Span::styled(
            self.display_value(field),
            Style::default().fg(theme.colors.foreground.to_color()),
        )];
        if focused {
            spans.push(Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)));
        }

        let paragraph = Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_style(focused))
                    .title(title),
            );
        frame.render_widget(paragraph, area);
    }

    fn render_accent(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let focused = self.field == SettingsField::Accent;
        let spans: Vec<Span> = AccentColor::ALL
            .iter()
            .flat_map(|color| {
                let style = if *color == self.accent {
                    theme.active_tab_style()
                } else {
                    theme.muted_style()
                };
                [Span::styled(format!(" {} ", color), style), Span::raw(" ")]
            })
            .collect();

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(focused))
                .title(" Accent Color (←/→) "),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_model(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let focused = self.field == SettingsField::Model;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        self.picker.render(frame, chunks[0], focused, theme);

        let mut spans = vec![Span::styled(" Model id: ", theme.muted_style())];
        if self.model_entry.is_empty() && !focused {
            spans.push(Span::styled("type an id not in the list", theme.muted_style()));
        } else {
            spans.push(Span::styled(
                self.model_entry.clone(),
                Style::default().fg(theme.colors.foreground.to_color()),
            ));
        }
        if focused {
            spans.push(Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
    }

    fn render_buttons(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        for (field, chunk) in [SettingsField::FetchModels, SettingsField::Save]
            .into_iter()
            .zip(chunks.iter())
        {
            let focused = self.field == field;
            let style = if focused {
                theme.active_tab_style()
            } else {
                Style::default().fg(theme.colors.foreground.to_color())
            };
            let button = Paragraph::new(Line::styled(field.label(), style))
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(theme.border_style(focused)),
                );
            frame.render_widget(button, *chunk);
        }
    }
}

impl Default for SettingsView {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SettingsView {
    fn handle_event(&mut self, event: &Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key(*key),
            Event::Paste(text) => {
                let clean: String = text.chars().filter(|c| !c.is_control()).collect();
                match self.field {
                    SettingsField::Model => self.model_entry.push_str(clean.trim()),
                    _ => self.text_mut()?.push_str(&clean),
                }
                Some(Action::None)
            }
            _ => None,
        }
    }

    fn update(&mut self, action: &Action) {
        if let Action::SetAccent(color) = action {
            self.accent = *color;
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _focused: bool, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        for (field, chunk) in SettingsField::ORDER
            .iter()
            .filter(|f| f.is_text())
            .zip(chunks.iter())
        {
            self.render_text_field(frame, *chunk, *field, theme);
        }
        self.render_accent(frame, chunks[3], theme);
        self.render_model(frame, chunks[4], theme);
        self.render_buttons(frame, chunks[5], theme);
    }
}
