pub mod chat_input;
pub mod chat_view;
pub mod model_picker;
pub mod settings_view;
pub mod status_bar;

use crossterm::event::Event;
use ratatui::{layout::Rect, Frame};

use crate::action::Action;
use crate::config::Theme;

pub use chat_input::ChatInput;
pub use chat_view::ChatView;
pub use model_picker::ModelPicker;
pub use settings_view::SettingsView;
pub use status_bar::StatusBar;

pub trait Component {
    fn handle_event(&mut self, event: &Event) -> Option<Action>;

    fn update(&mut self, action: &Action);

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme);
}
