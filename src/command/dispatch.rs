use std::time::Instant;

use tracing::debug;

use crate::url::HistoryBackend;
use crate::viewer::{ScrollRequest, Viewer};

use super::types::{Command, CommandOutcome};

/// Applies `command` to the viewer. Host commands come back as `Deferred`.
pub fn dispatch<H: HistoryBackend>(
    viewer: &mut Viewer<H>,
    command: Command,
    now: Instant,
) -> CommandOutcome {
    debug!(command = command.id(), "dispatch");
    match command {
        Command::NextPage => navigated(viewer.next_page(now)),
        Command::PrevPage => navigated(viewer.previous_page(now)),
        Command::GotoPage { page } => navigated(viewer.go_to_page(page, now)),
        Command::SubmitPageInput { input } => navigated(viewer.submit_page_input(&input, now)),
        Command::ZoomIn => {
            viewer.zoom_in();
            CommandOutcome::Applied
        }
        Command::ZoomOut => {
            viewer.zoom_out();
            CommandOutcome::Applied
        }
        Command::ResetZoom => {
            viewer.reset_zoom();
            CommandOutcome::Applied
        }
        Command::FitWidth => {
            viewer.fit_to_width();
            CommandOutcome::Applied
        }
        Command::FitPage => {
            viewer.fit_to_page();
            CommandOutcome::Applied
        }
        Command::Scroll { delta } => {
            let before = viewer.scroll_top();
            viewer.scroll_by(delta, now);
            if viewer.scroll_top() == before {
                CommandOutcome::Noop
            } else {
                CommandOutcome::Applied
            }
        }
        Command::Search { .. }
        | Command::OpenPrompt { .. }
        | Command::SubmitPrompt
        | Command::Cancel => CommandOutcome::Deferred,
        Command::Quit => CommandOutcome::QuitRequested,
    }
}

fn navigated(request: Option<ScrollRequest>) -> CommandOutcome {
    request.map_or(CommandOutcome::Noop, CommandOutcome::Navigated)
}
