// App module
// - mod.rs: App struct, construction, terminal teardown
// - event_loop.rs: run() loop and background event polling
// - handlers.rs: key mapping and action dispatch
// - rendering.rs: all UI drawing

mod event_loop;
mod handlers;
mod rendering;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arboard::Clipboard;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::cli::Cli;
use crate::components::{ChatInput, ChatView, ModelPicker, SettingsView, StatusBar};
use crate::config::{ConfigManager, Theme};
use crate::error::{AppError, Result};
use crate::input::FocusManager;
use crate::llm::{LLMEvent, LLMManager, OpenAiCompatClient};
use crate::models::PickerId;
use crate::state::{ClientState, Command, StateOptions};
use crate::tabs::Tab;

/// Leaves raw mode and the alternate screen when dropped. Created right
/// after raw mode is enabled so a failed setup still restores the terminal.
struct TerminalGuard {
    restore: fn(),
}

impl TerminalGuard {
    fn new(restore: fn()) -> Self {
        Self { restore }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        (self.restore)();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
}

fn init_terminal() -> Result<(Terminal<CrosstermBackend<Stdout>>, TerminalGuard)> {
    enable_raw_mode().map_err(|e| AppError::Terminal(e.to_string()))?;
    let guard = TerminalGuard::new(restore_terminal);

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .map_err(|e| AppError::Terminal(e.to_string()))?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))
        .map_err(|e| AppError::Terminal(e.to_string()))?;
    Ok((terminal, guard))
}

pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    // Dropped after the App's own Drop has run
    _terminal_guard: TerminalGuard,
    should_quit: bool,
    needs_redraw: bool,
    tab: Tab,
    focus: FocusManager,
    theme: Theme,
    state: ClientState,
    llm: LLMManager,
    llm_rx: Option<mpsc::UnboundedReceiver<LLMEvent>>,
    chat_view: ChatView,
    chat_input: ChatInput,
    chat_picker: ModelPicker,
    settings_view: SettingsView,
    status_bar: StatusBar,
    clipboard: Option<Clipboard>,
    tick_interval: Duration,
    last_tick: Instant,
}

impl App {
    pub fn new(cli: &Cli, config: &ConfigManager) -> Result<Self> {
        let app_config = config.app_config();
        let options = StateOptions {
            selection_policy: app_config.models.selection_policy,
            temperature: app_config.http.temperature,
            auto_fetch_on_start: app_config.models.auto_fetch_on_start,
        };
        let state = ClientState::new(config.settings_store(), config.model_cache(), options)
            .with_overrides(cli.settings_overrides());

        let provider = Arc::new(OpenAiCompatClient::new(&app_config.http));
        let mut llm = LLMManager::new(provider);
        let llm_rx = llm.take_event_rx();

        let clipboard = match Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                tracing::warn!("Clipboard unavailable: {}", e);
                None
            }
        };

        let (terminal, terminal_guard) = init_terminal()?;

        let theme = Theme::with_accent(state.settings().accent_color());
        let mut app = Self {
            terminal,
            _terminal_guard: terminal_guard,
            should_quit: false,
            needs_redraw: true,
            tab: Tab::Chat,
            focus: FocusManager::new(),
            theme,
            state,
            llm,
            llm_rx,
            chat_view: ChatView::new(),
            chat_input: ChatInput::new(),
            chat_picker: ModelPicker::new(PickerId::Chat),
            settings_view: SettingsView::new(),
            status_bar: StatusBar::new(),
            clipboard,
            tick_interval: Duration::from_millis(app_config.general.tick_interval_ms.max(16)),
            last_tick: Instant::now(),
        };

        if let Some(command) = app.state.startup() {
            app.run_command(command);
        }
        app.sync_views();
        tracing::info!(config_dir = %config.config_dir().display(), "compat-chat started");
        Ok(app)
    }

    pub(super) fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// Hand a state command to the background dispatcher
    pub(super) fn run_command(&mut self, command: Command) {
        match command {
            Command::FetchModels { generation, endpoint } => {
                self.llm.fetch_models(generation, endpoint);
            }
            Command::SendChat { endpoint, request } => {
                self.llm.send_chat(endpoint, request);
            }
        }
    }

    /// Push state into the widgets after any change
    pub(super) fn sync_views(&mut self) {
        self.chat_view.set_conversation(self.state.conversation());
        self.chat_picker.set_view(self.state.picker(PickerId::Chat));
        self.settings_view
            .set_picker_view(self.state.picker(PickerId::Settings));
    }

    pub(super) fn is_busy(&self) -> bool {
        self.state.is_sending() || self.state.is_fetching()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.llm.cancel();
        let _ = self.terminal.show_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static RESTORES: AtomicUsize = AtomicUsize::new(0);

    fn count_restore() {
        RESTORES.fetch_add(1, Ordering::SeqCst);
    }

    fn setup(step: Result<()>) -> Result<TerminalGuard> {
        let guard = TerminalGuard::new(count_restore);
        step?;
        Ok(guard)
    }

    #[test]
    fn test_failed_setup_restores_terminal() {
        let before = RESTORES.load(Ordering::SeqCst);

        assert!(setup(Err(AppError::Terminal("no tty".to_string()))).is_err());

        assert_eq!(RESTORES.load(Ordering::SeqCst), before + 1);
    }
}
