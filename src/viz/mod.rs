//! Globe views
//!
//! Each view is its own module with a `run()` frame loop and a `print()`
//! one-shot render.

pub mod map;
pub mod scene;
pub mod travel;

use crate::colors::ColorState;
use crate::error::GlobeError;
use crate::help::render_help_overlay;
use crate::surface::assets::{LoadState, Pending};
use crate::terminal::Terminal;
use crossterm::event::{KeyCode, KeyModifiers};
use tracing::warn;

const GLOBAL_HELP: &str = "\
Space  Pause/resume
1-9    Speed (1 fast, 9 slow)
!-(    Color scheme
?      Toggle help
q/Esc  Quit";

/// Help text with a view title and optional view-specific keys
pub fn build_help(title: &str, extra: &str) -> String {
    if extra.is_empty() {
        format!("{title}\n─────────────────\n{GLOBAL_HELP}")
    } else {
        format!("{title}\n─────────────────\n{extra}\n{GLOBAL_HELP}")
    }
}

/// Runtime state for interactive controls (shared by all views)
pub struct VizState {
    pub speed: f32,
    pub paused: bool,
    pub show_help: bool,
    pub colors: ColorState,
    help_text: String,
}

impl VizState {
    pub fn new(initial_speed: f32, scheme: u8, help_text: String) -> Self {
        Self {
            speed: initial_speed,
            paused: false,
            show_help: false,
            colors: ColorState::new(scheme),
            help_text,
        }
    }

    pub fn color_scheme(&self) -> u8 {
        self.colors.scheme
    }

    /// Handle keypress, returns true if should quit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.colors.handle_key(code) {
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Char(c @ '1'..='9') => {
                self.speed = match c {
                    '1' => 0.01,
                    '2' => 0.02,
                    '3' => 0.03,
                    '4' => 0.05,
                    '5' => 0.07,
                    '6' => 0.1,
                    '7' => 0.15,
                    '8' => 0.2,
                    _ => 0.3,
                };
            }
            _ => {}
        }
        false
    }

    pub fn render_help(&self, term: &mut Terminal) {
        if self.show_help {
            let text = format!("{}\n\nColors: {}", self.help_text, self.colors.name());
            render_help_overlay(term, &text);
        }
    }
}

/// Reallocate buffers when the real terminal changed size. Returns true on resize.
pub(crate) fn sync_size(term: &mut Terminal) -> std::io::Result<bool> {
    let (w, h) = term.poll_size();
    if (w, h) != term.size() {
        term.resize(w, h);
        term.clear_screen()?;
        return Ok(true);
    }
    Ok(false)
}

pub(crate) fn skip_asset(label: &str, e: &GlobeError) {
    warn!(asset = label, error = %e, "optional overlay unavailable, leaving it out");
}

/// Take a finished load out of its slot.
pub(crate) fn poll_slot<T>(slot: &mut Option<Pending<T>>) -> Option<T> {
    let pending = slot.as_mut()?;
    match pending.poll() {
        LoadState::Waiting => None,
        LoadState::Ready(value) => {
            *slot = None;
            Some(value)
        }
        LoadState::Failed(e) => {
            skip_asset(pending.label(), &e);
            *slot = None;
            None
        }
        LoadState::Discarded => {
            *slot = None;
            None
        }
    }
}
