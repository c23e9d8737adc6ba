use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::EventStream;
use futures_util::StreamExt;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

use crate::backend::DocumentLoader;
use crate::event::DomainEvent;

pub(crate) struct EventBusRuntime {
    tasks: Vec<JoinHandle<()>>,
}

impl EventBusRuntime {
    pub(crate) fn spawn() -> (
        UnboundedSender<DomainEvent>,
        UnboundedReceiver<DomainEvent>,
        Self,
    ) {
        let (tx, rx) = unbounded_channel();
        let tasks = vec![spawn_input_task(tx.clone())];
        (tx, rx, Self { tasks })
    }

    /// Opens the document off the loop and reports the page count once.
    pub(crate) fn spawn_document_load(
        &mut self,
        loader: Arc<dyn DocumentLoader>,
        location: PathBuf,
        tx: UnboundedSender<DomainEvent>,
    ) {
        self.tasks.push(spawn_document_load_task(loader, location, tx));
    }

    pub(crate) fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

fn spawn_input_task(tx: UnboundedSender<DomainEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut input_stream = EventStream::new();
        while let Some(event) = input_stream.next().await {
            let loop_event = match event {
                Ok(event) => DomainEvent::Input(event),
                Err(err) => DomainEvent::InputError(err.to_string()),
            };
            if tx.send(loop_event).is_err() {
                return;
            }
        }
    })
}

fn spawn_document_load_task(
    loader: Arc<dyn DocumentLoader>,
    location: PathBuf,
    tx: UnboundedSender<DomainEvent>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let event = match loader.open(&location) {
            Ok(document) => DomainEvent::DocumentLoaded {
                total_pages: document.page_count(),
            },
            Err(err) => DomainEvent::DocumentFailed(err.to_string()),
        };
        let _ = tx.send(event);
    })
}
