use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::command::Command;

/// Layout units moved by one `j`/`k` press.
pub const SCROLL_STEP: f32 = 60.0;
const PAGE_SCROLL_STEPS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Page,
    Search,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Search => "search",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Prompt(PromptKind),
}

/// Maps a key press to a command. In prompt mode only submit and cancel map;
/// every other key belongs to the prompt buffer.
pub fn map_key_to_command(key: KeyEvent, mode: Mode) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    match mode {
        Mode::Normal => map_normal_mode_key(key),
        Mode::Prompt(_) => match key.code {
            KeyCode::Enter => Some(Command::SubmitPrompt),
            KeyCode::Esc => Some(Command::Cancel),
            _ => None,
        },
    }
}

fn map_normal_mode_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }

    match key.code {
        KeyCode::Left => Some(Command::PrevPage),
        KeyCode::Right => Some(Command::NextPage),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Command::ZoomIn),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Command::ZoomOut),
        KeyCode::Char('0') => Some(Command::ResetZoom),
        KeyCode::Char('j') | KeyCode::Down => Some(Command::Scroll { delta: SCROLL_STEP }),
        KeyCode::Char('k') | KeyCode::Up => Some(Command::Scroll {
            delta: -SCROLL_STEP,
        }),
        KeyCode::PageDown => Some(Command::Scroll {
            delta: SCROLL_STEP * PAGE_SCROLL_STEPS,
        }),
        KeyCode::PageUp => Some(Command::Scroll {
            delta: -SCROLL_STEP * PAGE_SCROLL_STEPS,
        }),
        KeyCode::Char('g') => Some(Command::OpenPrompt {
            kind: PromptKind::Page,
        }),
        KeyCode::Char('/') => Some(Command::OpenPrompt {
            kind: PromptKind::Search,
        }),
        KeyCode::Char('w') => Some(Command::FitWidth),
        KeyCode::Char('p') => Some(Command::FitPage),
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Esc => Some(Command::Cancel),
        _ => None,
    }
}
