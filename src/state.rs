//! Client state owned by the UI loop
//!
//! Every mutation of settings, catalog, filter and selection happens here, on
//! the UI thread. Remote work is described by a [`Command`] that the caller
//! hands to the background dispatcher; its result comes back through
//! [`ClientState::apply_fetch`] or [`ClientState::apply_reply`].

use chrono::{DateTime, Local};

use crate::config::{
    AccentColor, CacheLoad, ModelCache, Settings, SettingsStore, SettingsUpdate,
};
use crate::llm::{ChatRequest, Endpoint, FetchError, Role};
use crate::models::{
    ModelCatalog, ModelFilter, Origin, PickerId, PickerView, SelectionChanged, SelectionPolicy,
    SelectionSync,
};
use crate::util::sanitize_reply;

/// Rejection of a send before any request is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select or enter a model")]
    NoModel,

    #[error("Please enter a message")]
    EmptyMessage,

    #[error("A request is already in progress")]
    RequestInFlight,
}

/// Remote work requested by the state
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchModels { generation: u64, endpoint: Endpoint },
    SendChat { endpoint: Endpoint, request: ChatRequest },
}

/// One entry of the conversation
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Local>,
}

impl Bubble {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Local::now(),
        }
    }
}

/// Values entered in the settings form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub api_key: String,
    pub base_url: String,
    pub system_prompt: String,
}

#[derive(Debug, Clone, Copy)]
pub struct StateOptions {
    pub selection_policy: SelectionPolicy,
    pub temperature: f32,
    pub auto_fetch_on_start: bool,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            selection_policy: SelectionPolicy::Clear,
            temperature: 0.7,
            auto_fetch_on_start: true,
        }
    }
}

pub struct ClientState {
    /// Persisted snapshot
    settings: Settings,
    /// In-memory overrides from the command line, written only on save
    overrides: SettingsUpdate,
    store: SettingsStore,
    cache: ModelCache,
    catalog: ModelCatalog,
    filter: ModelFilter,
    sync: SelectionSync,
    conversation: Vec<Bubble>,
    status: String,
    sending: bool,
    fetching: bool,
    options: StateOptions,
}

impl ClientState {
    /// Build the state from the files on disk. No network activity.
    pub fn new(store: SettingsStore, cache: ModelCache, options: StateOptions) -> Self {
        let settings = store.load();
        Self {
            settings,
            overrides: SettingsUpdate::default(),
            store,
            cache,
            catalog: ModelCatalog::new(),
            filter: ModelFilter::new(),
            sync: SelectionSync::new(options.selection_policy),
            conversation: Vec::new(),
            status: String::new(),
            sending: false,
            fetching: false,
            options,
        }
    }

    /// Apply overrides that affect requests but are not persisted until the
    /// user saves the settings form
    pub fn with_overrides(mut self, overrides: SettingsUpdate) -> Self {
        self.overrides = overrides;
        self
    }

    /// Populate the catalog from the cache and restore the saved model.
    /// Returns a fetch when the cache is missing and auto fetch is enabled.
    pub fn startup(&mut self) -> Option<Command> {
        let mut command = None;
        match self.cache.load() {
            CacheLoad::Hit(ids) => {
                tracing::info!("Loaded {} cached model(s)", ids.len());
                self.catalog.replace(ids);
            }
            CacheLoad::Missing => {
                if self.options.auto_fetch_on_start {
                    command = Some(self.fetch_models());
                }
            }
            CacheLoad::Unreadable => {
                self.set_status("Model cache unreadable; use Fetch Models to refresh");
            }
        }

        let saved = self.settings.model().to_string();
        if self.catalog.seed(&saved) {
            tracing::debug!(model = %saved, "Seeded saved model into catalog");
        }
        self.sync.restore(Some(&saved));
        self.show_startup_selection();
        command
    }

    // ---- accessors ----

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Persisted settings with command line overrides applied
    pub fn effective_settings(&self) -> Settings {
        self.settings.update(self.overrides.clone())
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::from_settings(&self.effective_settings())
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn filter(&self) -> &ModelFilter {
        &self.filter
    }

    pub fn picker(&self, picker: PickerId) -> &PickerView {
        self.sync.view(picker)
    }

    pub fn selection(&self) -> Option<String> {
        self.sync.selection()
    }

    pub fn conversation(&self) -> &[Bubble] {
        &self.conversation
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    // ---- model catalog ----

    pub fn fetch_models(&mut self) -> Command {
        let endpoint = self.endpoint();
        self.begin_fetch(endpoint)
    }

    /// Fetch from the values currently typed in the settings form, which may
    /// not be saved yet
    pub fn fetch_models_from(&mut self, form: &SettingsForm) -> Command {
        self.begin_fetch(Endpoint::new(&form.base_url, &form.api_key))
    }

    fn begin_fetch(&mut self, endpoint: Endpoint) -> Command {
        let generation = self.catalog.begin_refresh();
        self.fetching = true;
        self.set_status("Fetching models...");
        tracing::debug!(generation, url = %endpoint.models_url(), "Model fetch issued");
        Command::FetchModels { generation, endpoint }
    }

    pub fn apply_fetch(&mut self, generation: u64, result: Result<Vec<String>, FetchError>) {
        if !self.catalog.is_current(generation) {
            tracing::debug!(
                generation,
                latest = self.catalog.latest_generation(),
                "Ignoring superseded model fetch"
            );
            return;
        }
        self.fetching = false;

        match result {
            Ok(ids) => {
                self.catalog.apply_refresh(generation, ids);
                self.cache.store(self.catalog.ids());

                let catalog = self.catalog.ids().to_vec();
                let chat_items = self.filter.project(&catalog);
                let change = self.sync.replace_catalog(catalog, chat_items);
                self.persist_selection(change);

                self.set_status(format!("Fetched {} model(s)", self.catalog.len()));
            }
            Err(e) => {
                self.set_status(format!("Error fetching models: {}", e.detail()));
            }
        }
    }

    // ---- selection ----

    pub fn set_search_term(&mut self, text: &str) {
        if !self.filter.set_search_term(text) {
            return;
        }
        let items = self.filter.project(self.catalog.ids());
        let change = self.sync.set_items(PickerId::Chat, items);
        self.persist_selection(change);
    }

    /// User picked the item at `index` of `picker`
    pub fn select_model(&mut self, picker: PickerId, index: usize) {
        let change = self.sync.select(picker, index, Origin::User);
        self.persist_selection(change);
    }

    /// Fill both pickers from the catalog. A policy fallback chosen here is
    /// shown but not saved until the user selects or saves.
    fn show_startup_selection(&mut self) {
        let catalog = self.catalog.ids().to_vec();
        let chat_items = self.filter.project(&catalog);
        if let Some(change) = self.sync.replace_catalog(catalog, chat_items) {
            tracing::debug!(model = %change.model, "Startup fallback selection not persisted");
        }
    }

    /// Use a model id typed by the user, even one the server does not list
    pub fn enter_model(&mut self, text: &str) {
        let model = text.trim();
        if model.is_empty() {
            return;
        }
        if self.catalog.seed(model) {
            let catalog = self.catalog.ids().to_vec();
            let chat_items = self.filter.project(&catalog);
            self.sync.reload(catalog, chat_items);
        }
        let index = self
            .sync
            .view(PickerId::Settings)
            .items()
            .iter()
            .position(|id| id == model);
        if let Some(index) = index {
            self.select_model(PickerId::Settings, index);
        }
    }

    fn persist_selection(&mut self, change: Option<SelectionChanged>) {
        let Some(change) = change else {
            return;
        };
        tracing::info!(model = %change.model, source = ?change.source, "Default model changed");
        self.settings = self.settings.update(SettingsUpdate::model(change.model));
        self.store.save(&self.settings);
    }

    // ---- settings ----

    /// Change the accent colour and persist it right away
    pub fn set_accent(&mut self, color: AccentColor) {
        self.settings = self.settings.update(SettingsUpdate::accent(color));
        self.store.save(&self.settings);
    }

    /// Initial values for the settings form
    pub fn settings_form(&self) -> SettingsForm {
        let effective = self.effective_settings();
        SettingsForm {
            api_key: effective.api_key().to_string(),
            base_url: effective.base_url().to_string(),
            system_prompt: effective.system_prompt().to_string(),
        }
    }

    pub fn save_settings(&mut self, form: SettingsForm) {
        let update = SettingsUpdate {
            api_key: Some(form.api_key),
            base_url: Some(form.base_url),
            model: self.sync.selection(),
            accent_color: None,
            system_prompt: Some(form.system_prompt),
        };
        self.settings = self.settings.update(update);
        self.overrides = SettingsUpdate::default();
        self.store.save(&self.settings);
        tracing::info!(base_url = %self.settings.base_url(), "Settings saved");
        self.set_status("Settings saved");
    }

    // ---- chat ----

    pub fn send(&mut self, prompt: &str) -> Result<Command, ValidationError> {
        let result = self.validate_send(prompt);
        let (model, prompt) = match result {
            Ok(valid) => valid,
            Err(e) => {
                self.set_status(e.to_string());
                return Err(e);
            }
        };

        self.conversation.push(Bubble::new(Role::User, prompt.clone()));
        self.sending = true;
        self.set_status("Sending request...");

        let system_prompt = self.effective_settings().system_prompt().to_string();
        let request = ChatRequest {
            model,
            prompt,
            system_prompt: (!system_prompt.is_empty()).then_some(system_prompt),
            temperature: self.options.temperature,
        };
        Ok(Command::SendChat {
            endpoint: self.endpoint(),
            request,
        })
    }

    fn validate_send(&self, prompt: &str) -> Result<(String, String), ValidationError> {
        if self.sending {
            return Err(ValidationError::RequestInFlight);
        }
        let model = self.sync.selection().unwrap_or_default();
        if model.trim().is_empty() {
            return Err(ValidationError::NoModel);
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        Ok((model, prompt.to_string()))
    }

    pub fn apply_reply(&mut self, result: Result<String, FetchError>) {
        self.sending = false;
        match result {
            Ok(text) => {
                self.conversation
                    .push(Bubble::new(Role::Assistant, sanitize_reply(&text)));
                self.set_status("Done");
            }
            Err(e) => {
                self.conversation.push(Bubble::new(Role::System, e.user_message()));
                self.set_status("Failed");
            }
        }
    }

    pub fn cancel_reply(&mut self) {
        self.sending = false;
        self.set_status("Cancelled");
    }

    pub fn last_reply(&self) -> Option<&str> {
        self.conversation
            .iter()
            .rev()
            .find(|b| b.role == Role::Assistant)
            .map(|b| b.text.as_str())
    }

    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
        self.set_status("Conversation cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn paths(dir: &TempDir) -> (SettingsStore, ModelCache) {
        (
            SettingsStore::new(dir.path().join("settings.json")),
            ModelCache::new(dir.path().join("models.json")),
        )
    }

    fn state_with(dir: &TempDir, options: StateOptions) -> ClientState {
        let (store, cache) = paths(dir);
        ClientState::new(store, cache, options)
    }

    fn loaded(dir: &TempDir, models: &[&str]) -> ClientState {
        let mut state = state_with(dir, StateOptions::default());
        state.startup();
        let Command::FetchModels { generation, .. } = state.fetch_models() else {
            unreachable!()
        };
        state.apply_fetch(generation, Ok(ids(models)));
        state
    }

    fn stored(dir: &TempDir) -> Settings {
        paths(dir).0.load()
    }

    #[test]
    fn test_startup_without_cache_fetches() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, StateOptions::default());

        let command = state.startup();

        assert!(matches!(command, Some(Command::FetchModels { generation: 1, .. })));
        assert!(state.is_fetching());
        assert_eq!(state.status(), "Fetching models...");
    }

    #[test]
    fn test_startup_auto_fetch_disabled() {
        let dir = TempDir::new().unwrap();
        let options = StateOptions {
            auto_fetch_on_start: false,
            ..StateOptions::default()
        };
        let mut state = state_with(&dir, options);
        assert!(state.startup().is_none());
    }

    #[test]
    fn test_startup_uses_cache_and_restores_model() {
        let dir = TempDir::new().unwrap();
        let (store, cache) = paths(&dir);
        cache.try_store(&ids(&["a", "b", "c"])).unwrap();
        store
            .try_save(&Settings::default().update(SettingsUpdate::model("b")))
            .unwrap();

        let mut state = state_with(&dir, StateOptions::default());
        assert!(state.startup().is_none());

        assert_eq!(state.catalog().ids(), ids(&["a", "b", "c"]).as_slice());
        assert_eq!(state.picker(PickerId::Chat).selected(), Some(1));
        assert_eq!(state.picker(PickerId::Settings).selected(), Some(1));
    }

    #[test]
    fn test_startup_seeds_unknown_saved_model() {
        let dir = TempDir::new().unwrap();
        let (store, cache) = paths(&dir);
        cache.try_store(&ids(&["a"])).unwrap();
        store
            .try_save(&Settings::default().update(SettingsUpdate::model("custom")))
            .unwrap();

        let mut state = state_with(&dir, StateOptions::default());
        state.startup();

        assert_eq!(state.catalog().ids(), ids(&["a", "custom"]).as_slice());
        assert_eq!(state.selection().as_deref(), Some("custom"));
    }

    #[test]
    fn test_unreadable_cache_does_not_fetch() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("models.json"), "{not json").unwrap();

        let mut state = state_with(&dir, StateOptions::default());

        assert!(state.startup().is_none());
        assert!(state.status().contains("Fetch Models"));
    }

    #[test]
    fn test_fetch_replaces_catalog_and_writes_cache() {
        let dir = TempDir::new().unwrap();
        let state = loaded(&dir, &["x", "y", "x"]);

        assert_eq!(state.catalog().ids(), ids(&["x", "y"]).as_slice());
        assert_eq!(state.status(), "Fetched 2 model(s)");
        assert!(!state.is_fetching());
        match paths(&dir).1.load() {
            CacheLoad::Hit(cached) => assert_eq!(cached, ids(&["x", "y"])),
            other => panic!("unexpected cache state: {:?}", other),
        }
    }

    #[test]
    fn test_stale_fetch_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["a"]);

        let Command::FetchModels { generation: first, .. } = state.fetch_models() else {
            unreachable!()
        };
        let Command::FetchModels { generation: second, .. } = state.fetch_models() else {
            unreachable!()
        };

        state.apply_fetch(second, Ok(ids(&["new"])));
        state.apply_fetch(first, Ok(ids(&["old"])));

        assert_eq!(state.catalog().ids(), ids(&["new"]).as_slice());
    }

    #[test]
    fn test_fetch_error_keeps_catalog() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["a", "b"]);

        let Command::FetchModels { generation, .. } = state.fetch_models() else {
            unreachable!()
        };
        state.apply_fetch(
            generation,
            Err(FetchError::Network {
                message: "connection refused".to_string(),
            }),
        );

        assert_eq!(state.catalog().len(), 2);
        assert_eq!(
            state.status(),
            "Error fetching models: Network error: connection refused"
        );
    }

    #[test]
    fn test_fetch_http_error_shows_body() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["a"]);

        let Command::FetchModels { generation, .. } = state.fetch_models() else {
            unreachable!()
        };
        state.apply_fetch(
            generation,
            Err(FetchError::Http {
                status: 401,
                body: r#"{"error":"invalid key"}"#.to_string(),
            }),
        );

        assert!(state.status().starts_with("Error fetching models: HTTP error 401:"));
        assert!(state.status().contains(r#""error": "invalid key""#));
    }

    #[test]
    fn test_fetch_from_form_uses_unsaved_values() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["a"]);
        let form = SettingsForm {
            api_key: "sk-new".to_string(),
            base_url: "http://localhost:11434".to_string(),
            system_prompt: String::new(),
        };

        let Command::FetchModels { endpoint, .. } = state.fetch_models_from(&form) else {
            unreachable!()
        };

        assert_eq!(endpoint, Endpoint::new("http://localhost:11434/", "sk-new"));
        assert!(state.is_fetching());
        // Nothing is saved by fetching
        assert_eq!(stored(&dir).base_url(), "https://api.openai.com/");
    }

    #[test]
    fn test_entered_model_is_seeded_and_persisted() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["a", "b"]);

        state.enter_model("  my-local-model ");

        assert_eq!(state.catalog().ids(), ids(&["a", "b", "my-local-model"]).as_slice());
        assert_eq!(state.selection().as_deref(), Some("my-local-model"));
        assert_eq!(state.picker(PickerId::Settings).selected(), Some(2));
        assert_eq!(state.picker(PickerId::Chat).selected(), Some(2));
        assert_eq!(stored(&dir).model(), "my-local-model");
        assert!(state.send("hello").is_ok());
    }

    #[test]
    fn test_entering_listed_model_selects_it() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["a", "b"]);

        state.enter_model("b");
        state.enter_model("   ");

        assert_eq!(state.catalog().len(), 2);
        assert_eq!(state.selection().as_deref(), Some("b"));
        assert_eq!(stored(&dir).model(), "b");
    }

    #[test]
    fn test_fetch_under_search_persists_final_selection() {
        let dir = TempDir::new().unwrap();
        let options = StateOptions {
            selection_policy: SelectionPolicy::First,
            auto_fetch_on_start: false,
            ..StateOptions::default()
        };
        let mut state = state_with(&dir, options);
        state.startup();
        state.set_search_term("b");

        let Command::FetchModels { generation, .. } = state.fetch_models() else {
            unreachable!()
        };
        state.apply_fetch(generation, Ok(ids(&["a", "b", "c"])));

        assert_eq!(state.selection().as_deref(), Some("b"));
        assert_eq!(state.picker(PickerId::Settings).selected_value(), Some("b"));
        assert_eq!(stored(&dir).model(), "b");
    }

    #[test]
    fn test_startup_fallback_is_not_written() {
        let dir = TempDir::new().unwrap();
        paths(&dir).1.try_store(&ids(&["a", "b", "c"])).unwrap();
        let options = StateOptions {
            selection_policy: SelectionPolicy::First,
            ..StateOptions::default()
        };
        let mut state = state_with(&dir, options);

        assert!(state.startup().is_none());

        assert_eq!(state.selection().as_deref(), Some("a"));
        assert_eq!(state.picker(PickerId::Chat).selected(), Some(0));
        assert!(!dir.path().join("settings.json").exists());
    }

    #[test]
    fn test_selection_is_persisted_and_mirrored() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["gpt-4", "gpt-4-mini", "gpt-3.5"]);

        state.select_model(PickerId::Chat, 1);

        assert_eq!(state.picker(PickerId::Settings).selected_value(), Some("gpt-4-mini"));
        assert_eq!(state.settings().model(), "gpt-4-mini");
        assert_eq!(stored(&dir).model(), "gpt-4-mini");

        state.select_model(PickerId::Settings, 2);
        assert_eq!(state.picker(PickerId::Chat).selected_value(), Some("gpt-3.5"));
        assert_eq!(stored(&dir).model(), "gpt-3.5");
    }

    #[test]
    fn test_search_projects_chat_picker_only() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["gpt-4", "gpt-4-mini", "gpt-3.5"]);
        state.select_model(PickerId::Settings, 2);

        state.set_search_term("GPT-4");

        assert_eq!(state.picker(PickerId::Chat).items(), ids(&["gpt-4", "gpt-4-mini"]).as_slice());
        assert_eq!(state.picker(PickerId::Chat).selected(), None);
        assert_eq!(state.picker(PickerId::Settings).items().len(), 3);
        assert_eq!(state.selection().as_deref(), Some("gpt-3.5"));
        assert_eq!(stored(&dir).model(), "gpt-3.5");
    }

    #[test]
    fn test_refresh_dropping_model_with_first_policy_persists_first() {
        let dir = TempDir::new().unwrap();
        let options = StateOptions {
            selection_policy: SelectionPolicy::First,
            auto_fetch_on_start: false,
            ..StateOptions::default()
        };
        let mut state = state_with(&dir, options);
        state.startup();

        let Command::FetchModels { generation, .. } = state.fetch_models() else {
            unreachable!()
        };
        state.apply_fetch(generation, Ok(ids(&["a", "b"])));
        state.select_model(PickerId::Chat, 1);

        let Command::FetchModels { generation, .. } = state.fetch_models() else {
            unreachable!()
        };
        state.apply_fetch(generation, Ok(ids(&["c", "d"])));

        assert_eq!(state.selection().as_deref(), Some("c"));
        assert_eq!(state.picker(PickerId::Chat).selected(), Some(0));
        assert_eq!(stored(&dir).model(), "c");
    }

    #[test]
    fn test_send_validation() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["a"]);

        assert_eq!(state.send("hello"), Err(ValidationError::NoModel));
        assert_eq!(state.status(), "Please select or enter a model");

        state.select_model(PickerId::Chat, 0);
        assert_eq!(state.send("   "), Err(ValidationError::EmptyMessage));
        assert!(state.conversation().is_empty());

        assert!(state.send("hello").is_ok());
        assert_eq!(state.send("again"), Err(ValidationError::RequestInFlight));
        assert_eq!(state.conversation().len(), 1);
    }

    #[test]
    fn test_send_builds_request_from_saved_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["m"]);
        state.select_model(PickerId::Chat, 0);
        state.save_settings(SettingsForm {
            api_key: "sk-1".to_string(),
            base_url: "http://localhost:8080".to_string(),
            system_prompt: "Be brief.".to_string(),
        });

        let Ok(Command::SendChat { endpoint, request }) = state.send("  hi  ") else {
            panic!("expected a chat command");
        };

        assert_eq!(endpoint.base_url, "http://localhost:8080/");
        assert_eq!(endpoint.api_key, "sk-1");
        assert_eq!(request.model, "m");
        assert_eq!(request.user_content(), "Be brief.\n\nhi");
        assert_eq!(state.status(), "Sending request...");
        assert_eq!(state.conversation()[0].role, Role::User);
        assert_eq!(state.conversation()[0].text, "hi");
    }

    #[test]
    fn test_replies_become_bubbles() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["m"]);
        state.select_model(PickerId::Chat, 0);

        state.send("one").unwrap();
        state.apply_reply(Ok("\x1b[1mbold\x1b[0m".to_string()));
        assert_eq!(state.status(), "Done");
        assert_eq!(state.last_reply(), Some("bold"));

        state.send("two").unwrap();
        state.apply_reply(Err(FetchError::Http {
            status: 429,
            body: r#"{"error":"slow down"}"#.to_string(),
        }));
        assert_eq!(state.status(), "Failed");
        let last = state.conversation().last().unwrap();
        assert_eq!(last.role, Role::System);
        assert_eq!(last.text, "HTTP error 429:\n{\n  \"error\": \"slow down\"\n}");
        assert!(!state.is_sending());
    }

    #[test]
    fn test_save_settings_uses_selection_and_normalises_url() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["a", "b"]);
        state.select_model(PickerId::Settings, 1);

        state.save_settings(SettingsForm {
            api_key: " key ".to_string(),
            base_url: "https://example.com/api".to_string(),
            system_prompt: String::new(),
        });

        let saved = stored(&dir);
        assert_eq!(saved.api_key(), "key");
        assert_eq!(saved.base_url(), "https://example.com/api/");
        assert_eq!(saved.model(), "b");
        assert_eq!(state.status(), "Settings saved");
    }

    #[test]
    fn test_overrides_are_not_persisted_until_save() {
        let dir = TempDir::new().unwrap();
        let (store, cache) = paths(&dir);
        let overrides = SettingsUpdate {
            api_key: Some("sk-env".to_string()),
            ..SettingsUpdate::default()
        };
        let mut state = ClientState::new(store, cache, StateOptions::default()).with_overrides(overrides);
        state.startup();
        let Command::FetchModels { generation, endpoint } = state.fetch_models() else {
            unreachable!()
        };
        assert_eq!(endpoint.api_key, "sk-env");

        state.apply_fetch(generation, Ok(ids(&["a"])));
        state.select_model(PickerId::Chat, 0);
        assert_eq!(stored(&dir).api_key(), "");

        let form = state.settings_form();
        assert_eq!(form.api_key, "sk-env");
        state.save_settings(form);
        assert_eq!(stored(&dir).api_key(), "sk-env");
    }

    #[test]
    fn test_accent_is_saved_immediately() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, StateOptions::default());

        state.set_accent(AccentColor::Green);

        assert_eq!(stored(&dir).accent_color(), AccentColor::Green);
    }

    #[test]
    fn test_clear_conversation() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded(&dir, &["m"]);
        state.select_model(PickerId::Chat, 0);
        state.send("hi").unwrap();
        state.apply_reply(Ok("hello".to_string()));

        state.clear_conversation();

        assert!(state.conversation().is_empty());
        assert_eq!(state.last_reply(), None);
    }
}
