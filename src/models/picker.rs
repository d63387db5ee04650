//! Picker synchronizer
//!
//! One authoritative selection, published on a `watch` channel, with two
//! index projections: the chat picker (filtered by the search term) and the
//! settings picker (the whole catalog). Widgets never mutate each other; they
//! report user events here and read back their resolved index.
//!
//! Propagation runs as `Idle -> Propagating -> Idle`. Events that arrive
//! while propagating, or that were produced by the synchronizer itself, are
//! dropped so a mirrored update can never start another round.

use tokio::sync::watch;

use super::filter::SelectionPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickerId {
    Chat,
    Settings,
}

impl PickerId {
    pub fn other(&self) -> PickerId {
        match self {
            PickerId::Chat => PickerId::Settings,
            PickerId::Settings => PickerId::Chat,
        }
    }
}

/// Where a selection event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Sync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Propagating,
}

/// A committed change of the authoritative selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged {
    pub model: String,
    pub source: PickerId,
    pub origin: Origin,
}

/// Items shown by one picker and the index resolved from the selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickerView {
    items: Vec<String>,
    selected: Option<usize>,
}

impl PickerView {
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_value(&self) -> Option<&str> {
        self.selected
            .and_then(|idx| self.items.get(idx))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn resolve(&mut self, value: Option<&str>) {
        self.selected = value.and_then(|v| self.items.iter().position(|item| item == v));
    }
}

pub struct SelectionSync {
    state: SyncState,
    policy: SelectionPolicy,
    selection: watch::Sender<Option<String>>,
    chat: PickerView,
    settings: PickerView,
}

impl SelectionSync {
    pub fn new(policy: SelectionPolicy) -> Self {
        let (selection, _) = watch::channel(None);
        Self {
            state: SyncState::Idle,
            policy,
            selection,
            chat: PickerView::default(),
            settings: PickerView::default(),
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Receiver that observes every committed selection
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.selection.subscribe()
    }

    pub fn selection(&self) -> Option<String> {
        self.selection.borrow().clone()
    }

    pub fn view(&self, picker: PickerId) -> &PickerView {
        match picker {
            PickerId::Chat => &self.chat,
            PickerId::Settings => &self.settings,
        }
    }

    fn view_mut(&mut self, picker: PickerId) -> &mut PickerView {
        match picker {
            PickerId::Chat => &mut self.chat,
            PickerId::Settings => &mut self.settings,
        }
    }

    /// Set the selection without a user action (startup restore). Not
    /// reported as a change since nothing needs persisting.
    pub fn restore(&mut self, model: Option<&str>) {
        let value = model.filter(|m| !m.is_empty()).map(str::to_string);
        self.chat.resolve(value.as_deref());
        self.settings.resolve(value.as_deref());
        self.selection.send_replace(value);
    }

    /// Handle a selection event from a picker widget
    pub fn select(&mut self, picker: PickerId, index: usize, origin: Origin) -> Option<SelectionChanged> {
        if origin == Origin::Sync || self.state == SyncState::Propagating {
            tracing::trace!(?picker, index, ?origin, "Ignoring synchronizer echo");
            return None;
        }

        let value = self.view(picker).items.get(index)?.clone();
        Some(self.commit(picker, value, origin))
    }

    /// Replace one picker's items and re-resolve its index by value
    pub fn set_items(&mut self, picker: PickerId, items: Vec<String>) -> Option<SelectionChanged> {
        let current = self.selection();
        let view = self.view_mut(picker);
        view.items = items;
        view.resolve(current.as_deref());

        if view.selected.is_some() {
            return None;
        }
        self.apply_fallback(picker)
    }

    /// Replace both lists after a catalog refresh
    ///
    /// `chat_items` is the filtered projection of `catalog`. A selection that
    /// no longer exists in the catalog is cleared before the fallback policy
    /// runs. At most one fallback is committed, so the returned change is
    /// always the final selection.
    pub fn replace_catalog(&mut self, catalog: Vec<String>, chat_items: Vec<String>) -> Option<SelectionChanged> {
        if let Some(current) = self.selection() {
            if !catalog.contains(&current) {
                tracing::info!("Selected model '{}' is no longer offered", current);
                self.selection.send_replace(None);
            }
        }

        self.reload(catalog, chat_items);
        if self.chat.selected.is_some() {
            return None;
        }
        // The chat list is a subset of the catalog, so its fallback also
        // resolves the settings picker
        if let Some(change) = self.apply_fallback(PickerId::Chat) {
            return Some(change);
        }
        if self.settings.selected.is_some() {
            return None;
        }
        self.apply_fallback(PickerId::Settings)
    }

    /// Replace both lists and re-resolve by value without running the
    /// fallback policy
    pub fn reload(&mut self, catalog: Vec<String>, chat_items: Vec<String>) {
        let current = self.selection();
        self.settings.items = catalog;
        self.settings.resolve(current.as_deref());
        self.chat.items = chat_items;
        self.chat.resolve(current.as_deref());
    }

    fn apply_fallback(&mut self, picker: PickerId) -> Option<SelectionChanged> {
        let len = self.view(picker).items.len();
        let index = self.policy.fallback_index(len)?;
        let value = self.view(picker).items[index].clone();
        Some(self.commit(picker, value, Origin::Sync))
    }

    fn commit(&mut self, source: PickerId, value: String, origin: Origin) -> SelectionChanged {
        self.state = SyncState::Propagating;

        self.view_mut(source).resolve(Some(&value));
        self.view_mut(source.other()).resolve(Some(&value));
        self.selection.send_replace(Some(value.clone()));

        self.state = SyncState::Idle;
        tracing::debug!(model = %value, ?source, ?origin, "Model selection committed");

        SelectionChanged {
            model: value,
            source,
            origin,
        }
    }
}
