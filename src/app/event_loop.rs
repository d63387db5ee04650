// Event loop - main run() method and background event polling

use std::time::{Duration, Instant};

use crossterm::event;

use super::App;
use crate::action::Action;
use crate::error::{AppError, Result};
use crate::llm::LLMEvent;

impl App {
    pub(super) fn handle_llm_event(&mut self, event: LLMEvent) {
        match event {
            LLMEvent::ModelsFetched { generation, result } => {
                self.state.apply_fetch(generation, result);
            }
            LLMEvent::ChatReply { result } => {
                self.state.apply_reply(result);
            }
            LLMEvent::ChatCancelled => {
                self.state.cancel_reply();
            }
        }
        self.sync_views();
    }

    pub fn run(&mut self) -> Result<()> {
        let mut llm_rx = self.llm_rx.take();

        loop {
            // ---- 1. Drain background results ----

            if let Some(ref mut rx) = llm_rx {
                let mut had_events = false;
                while let Ok(event) = rx.try_recv() {
                    had_events = true;
                    self.handle_llm_event(event);
                }
                if had_events {
                    self.mark_dirty();
                }
            }

            if self.last_tick.elapsed() >= self.tick_interval {
                self.dispatch(Action::Tick);
                self.last_tick = Instant::now();
            }

            if self.should_quit {
                break;
            }

            // ---- 2. Poll user input ----

            if event::poll(Duration::from_millis(16)).map_err(|e| AppError::Terminal(e.to_string()))? {
                let event = event::read().map_err(|e| AppError::Terminal(e.to_string()))?;
                self.mark_dirty();

                if let Some(action) = self.handle_event(event) {
                    self.dispatch(action);
                }
            }

            if self.should_quit {
                break;
            }

            // ---- 3. Draw once if anything changed ----

            if self.needs_redraw {
                self.draw()?;
                self.needs_redraw = false;
            }
        }

        tracing::info!("compat-chat exiting");
        Ok(())
    }
}
