use crate::config::AccentColor;
use crate::models::PickerId;
use crate::state::SettingsForm;
use crate::tabs::Tab;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Event consumed, nothing to dispatch
    None,
    Quit,
    Tick,

    SwitchTab(Tab),
    ToggleTab,
    FocusNext,
    FocusPrev,

    ScrollUp(u16),
    ScrollDown(u16),
    ScrollToTop,
    ScrollToBottom,

    // Chat
    SendMessage(String),
    CancelRequest,
    CopyLastReply,
    ClearConversation,

    // Models
    FetchModels,
    /// Fetch using the unsaved values of the settings form
    FetchModelsFrom(SettingsForm),
    SearchChanged(String),
    /// Free-text model id typed in the settings view
    EnterModel(String),
    SelectModel { picker: PickerId, index: usize },

    // Settings
    SetAccent(AccentColor),
    SaveSettings(SettingsForm),
}
