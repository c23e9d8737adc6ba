use crossterm::event::Event;

use crate::render::RenderWorkerResult;

/// Everything the event loop wakes up for.
#[derive(Debug)]
pub(crate) enum DomainEvent {
    Input(Event),
    InputError(String),
    DocumentLoaded { total_pages: usize },
    DocumentFailed(String),
    RenderComplete(RenderWorkerResult),
    Tick,
}
