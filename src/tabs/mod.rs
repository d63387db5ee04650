pub mod tab_bar;

pub use tab_bar::TabBar;

/// Top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Chat,
    Settings,
}

impl Tab {
    pub const ALL: &'static [Tab] = &[Tab::Chat, Tab::Settings];

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Chat => "Chat",
            Tab::Settings => "Settings",
        }
    }

    /// Function key that opens the tab
    pub fn shortcut(&self) -> &'static str {
        match self {
            Tab::Chat => "F1",
            Tab::Settings => "F2",
        }
    }

    pub fn toggled(&self) -> Tab {
        match self {
            Tab::Chat => Tab::Settings,
            Tab::Settings => Tab::Chat,
        }
    }
}
