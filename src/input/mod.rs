mod keymap;
mod prompt;

pub use keymap::{Mode, PromptKind, SCROLL_STEP, map_key_to_command};
pub use prompt::Prompt;
