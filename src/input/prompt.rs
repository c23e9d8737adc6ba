use crossterm::event::{Event, KeyEvent};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use crate::command::Command;

use super::keymap::PromptKind;

/// One-line input for the jump-to-page form and the search box.
#[derive(Debug)]
pub struct Prompt {
    kind: PromptKind,
    input: Input,
}

impl Prompt {
    pub fn new(kind: PromptKind, seed: Option<&str>) -> Self {
        Self {
            kind,
            input: Input::new(seed.unwrap_or_default().to_string()),
        }
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn cursor(&self) -> usize {
        self.input.visual_cursor()
    }

    /// Feeds a key to the buffer. Returns true when the text or cursor moved.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.input.handle_event(&Event::Key(key)).is_some()
    }

    /// The command this prompt submits as.
    pub fn into_command(self) -> Command {
        let value = self.input.value().to_string();
        match self.kind {
            PromptKind::Page => Command::SubmitPageInput { input: value },
            PromptKind::Search => Command::Search { query: value },
        }
    }
}
