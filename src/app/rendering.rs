// Rendering - all UI drawing methods

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use super::App;
use crate::components::{ChatInput, ChatView, Component, ModelPicker};
use crate::config::Theme;
use crate::error::{AppError, Result};
use crate::input::{FocusArea, FocusManager};
use crate::tabs::{Tab, TabBar};

/// Height of the picker/input row on the chat tab
const COMPOSE_HEIGHT: u16 = 8;

impl App {
    pub(super) fn draw(&mut self) -> Result<()> {
        let Self {
            terminal,
            tab,
            focus,
            theme,
            state,
            chat_view,
            chat_input,
            chat_picker,
            settings_view,
            status_bar,
            ..
        } = self;

        let model = state.selection().unwrap_or_else(|| "no model".to_string());
        let busy = state.is_sending() || state.is_fetching();

        terminal
            .draw(|frame| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Min(3),
                        Constraint::Length(1),
                    ])
                    .split(frame.area());

                frame.render_widget(TabBar::new(*tab, theme).right(&model), chunks[0]);

                match tab {
                    Tab::Chat => render_chat(frame, chunks[1], chat_view, chat_picker, chat_input, focus, theme),
                    Tab::Settings => settings_view.render(frame, chunks[1], true, theme),
                }

                status_bar.render(frame, chunks[2], state.status(), busy, *tab, theme);
            })
            .map_err(|e| AppError::Terminal(e.to_string()))?;
        Ok(())
    }
}

fn render_chat(
    frame: &mut Frame,
    area: Rect,
    chat_view: &ChatView,
    picker: &ModelPicker,
    input: &ChatInput,
    focus: &FocusManager,
    theme: &Theme,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(COMPOSE_HEIGHT)])
        .split(area);

    chat_view.render(frame, rows[0], focus.is_focused(FocusArea::Conversation), theme);

    let compose = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[1]);

    picker.render(frame, compose[0], focus.is_focused(FocusArea::Models), theme);
    input.render(frame, compose[1], focus.is_focused(FocusArea::Input), theme);
}
