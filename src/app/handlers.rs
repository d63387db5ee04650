// Handlers - key routing and action dispatch

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::App;
use crate::action::Action;
use crate::components::Component;
use crate::config::Theme;
use crate::input::FocusArea;
use crate::tabs::Tab;

/// Keys that work regardless of which widget has focus
pub(super) fn global_action(key: &KeyEvent, tab: Tab, sending: bool) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => Some(Action::Quit),
        KeyCode::F(1) => Some(Action::SwitchTab(Tab::Chat)),
        KeyCode::F(2) => Some(Action::SwitchTab(Tab::Settings)),
        KeyCode::Char(',') if ctrl => Some(Action::SwitchTab(Tab::Settings)),
        KeyCode::Char('t') if ctrl => Some(Action::ToggleTab),
        KeyCode::Esc if sending => Some(Action::CancelRequest),
        // Settings handles its own keys, including Ctrl+R for its form values
        _ if tab != Tab::Chat => None,
        KeyCode::Char('r') if ctrl => Some(Action::FetchModels),
        KeyCode::Char('y') if ctrl => Some(Action::CopyLastReply),
        KeyCode::Char('l') if ctrl => Some(Action::ClearConversation),
        KeyCode::Tab => Some(Action::FocusNext),
        KeyCode::BackTab => Some(Action::FocusPrev),
        _ => None,
    }
}

impl App {
    pub(super) fn handle_event(&mut self, event: Event) -> Option<Action> {
        match &event {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    return None;
                }
                if let Some(action) = global_action(key, self.tab, self.state.is_sending()) {
                    return Some(action);
                }
            }
            Event::Resize(_, _) => return None,
            _ => {}
        }

        match self.tab {
            Tab::Settings => self.settings_view.handle_event(&event),
            Tab::Chat => match self.focus.current() {
                FocusArea::Input => self.chat_input.handle_event(&event),
                FocusArea::Models => self.chat_picker.handle_event(&event),
                FocusArea::Conversation => self.chat_view.handle_event(&event),
            },
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        if tab == Tab::Settings && self.tab != Tab::Settings {
            self.settings_view
                .load(self.state.settings_form(), self.state.settings().accent_color());
        }
        self.tab = tab;
    }

    fn copy_last_reply(&mut self) {
        let Some(reply) = self.state.last_reply().map(str::to_string) else {
            self.state.set_status("Nothing to copy");
            return;
        };
        match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(reply) {
                Ok(()) => self.state.set_status("Copied last reply"),
                Err(e) => {
                    tracing::warn!("Clipboard write failed: {}", e);
                    self.state.set_status(format!("Error copying reply: {}", e));
                }
            },
            None => self.state.set_status("Clipboard unavailable"),
        }
    }

    pub(super) fn dispatch(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => {
                self.llm.cancel();
                self.should_quit = true;
            }
            Action::Tick => {
                if self.is_busy() {
                    self.status_bar.tick();
                    self.mark_dirty();
                }
                return;
            }
            Action::SwitchTab(tab) => self.switch_tab(tab),
            Action::ToggleTab => self.switch_tab(self.tab.toggled()),
            Action::FocusNext => self.focus.next(),
            Action::FocusPrev => self.focus.prev(),
            Action::ScrollUp(_)
            | Action::ScrollDown(_)
            | Action::ScrollToTop
            | Action::ScrollToBottom => {
                self.chat_view.update(&action);
                return;
            }
            Action::SendMessage(text) => match self.state.send(&text) {
                Ok(command) => {
                    self.chat_input.clear();
                    self.run_command(command);
                }
                Err(e) => tracing::debug!("Send rejected: {}", e),
            },
            Action::CancelRequest => self.llm.cancel(),
            Action::CopyLastReply => self.copy_last_reply(),
            Action::ClearConversation => self.state.clear_conversation(),
            Action::FetchModels => {
                let command = self.state.fetch_models();
                self.run_command(command);
            }
            Action::FetchModelsFrom(ref form) => {
                let command = self.state.fetch_models_from(form);
                self.run_command(command);
            }
            Action::SearchChanged(ref term) => self.state.set_search_term(term),
            Action::EnterModel(ref model) => self.state.enter_model(model),
            Action::SelectModel { picker, index } => self.state.select_model(picker, index),
            Action::SetAccent(color) => {
                self.state.set_accent(color);
                self.theme = Theme::with_accent(color);
                self.settings_view.update(&action);
            }
            Action::SaveSettings(form) => {
                self.state.save_settings(form);
                self.switch_tab(Tab::Chat);
            }
        }
        self.sync_views();
    }
}
