use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::mpsc::{
    UnboundedReceiver, UnboundedSender, error::TryRecvError, unbounded_channel,
};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::backend::{DocumentLoader, HayroLoader};
use crate::error::{AppError, AppResult};

use super::matcher::count_matches;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Progress {
        generation: u64,
        scanned_pages: usize,
        total_pages: usize,
        match_count: usize,
    },
    Completed {
        generation: u64,
        match_count: usize,
    },
    Failed {
        generation: u64,
        message: String,
    },
}

impl SearchEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Progress { generation, .. }
            | Self::Completed { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone)]
struct SearchJob {
    generation: u64,
    location: PathBuf,
    query: String,
    case_sensitive: bool,
}

enum WorkerRequest {
    Query(SearchJob),
    Cancel,
    Shutdown,
}

enum WorkerControl {
    Continue,
    Preempted,
    Shutdown,
}

/// Counts query matches on a background worker, one page after another.
///
/// Every submit bumps the generation; a newer request preempts the running scan
/// between two pages.
pub struct SearchEngine {
    request_tx: UnboundedSender<WorkerRequest>,
    event_rx: UnboundedReceiver<SearchEvent>,
    next_generation: u64,
    _runtime: SearchWorkerRuntime,
    worker: Option<JoinHandle<()>>,
}

struct SearchWorkerRuntime {
    _owned: Option<Runtime>,
    handle: Handle,
}

impl SearchWorkerRuntime {
    fn new() -> AppResult<Self> {
        if let Ok(handle) = Handle::try_current() {
            return Ok(Self {
                _owned: None,
                handle,
            });
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .thread_name("pagelink-search")
            .build()
            .map_err(|err| AppError::io_with_context(err, "failed to start search runtime"))?;
        let handle = runtime.handle().clone();
        Ok(Self {
            _owned: Some(runtime),
            handle,
        })
    }

    fn spawn_blocking<F>(&self, task: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.spawn_blocking(task)
    }
}

impl SearchEngine {
    pub fn new() -> AppResult<Self> {
        Self::with_loader(Arc::new(HayroLoader))
    }

    pub fn with_loader(loader: Arc<dyn DocumentLoader>) -> AppResult<Self> {
        let (request_tx, request_rx) = unbounded_channel();
        let (event_tx, event_rx) = unbounded_channel();
        let runtime = SearchWorkerRuntime::new()?;
        let worker = runtime.spawn_blocking(move || worker_main(request_rx, event_tx, loader));

        Ok(Self {
            request_tx,
            event_rx,
            next_generation: 0,
            _runtime: runtime,
            worker: Some(worker),
        })
    }

    pub fn submit(
        &mut self,
        location: &Path,
        query: impl Into<String>,
        case_sensitive: bool,
    ) -> AppResult<u64> {
        let generation = self.bump_generation();
        let job = SearchJob {
            generation,
            location: location.to_path_buf(),
            query: query.into(),
            case_sensitive,
        };
        self.send(WorkerRequest::Query(job))?;
        Ok(generation)
    }

    /// Stops the running scan. Events from older generations may still be queued.
    pub fn cancel(&mut self) -> AppResult<u64> {
        let generation = self.bump_generation();
        self.send(WorkerRequest::Cancel)?;
        Ok(generation)
    }

    pub fn latest_generation(&self) -> u64 {
        self.next_generation
    }

    pub fn drain_events(&mut self) -> Vec<SearchEvent> {
        let mut drained = Vec::new();
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => drained.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        drained
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation = self.next_generation.saturating_add(1);
        self.next_generation
    }

    fn send(&self, request: WorkerRequest) -> AppResult<()> {
        self.request_tx
            .send(request)
            .map_err(|_| AppError::unsupported("search worker is not available"))
    }
}

impl Drop for SearchEngine {
    fn drop(&mut self) {
        let _ = self.request_tx.send(WorkerRequest::Shutdown);
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

fn worker_main(
    mut request_rx: UnboundedReceiver<WorkerRequest>,
    event_tx: UnboundedSender<SearchEvent>,
    loader: Arc<dyn DocumentLoader>,
) {
    let mut pending: Option<SearchJob> = None;

    loop {
        let job = match pending.take() {
            Some(job) => job,
            None => match wait_for_job(&mut request_rx) {
                Some(job) => job,
                None => break,
            },
        };

        match run_job(job, &mut request_rx, &event_tx, &mut pending, loader.as_ref()) {
            WorkerControl::Continue | WorkerControl::Preempted => {}
            WorkerControl::Shutdown => break,
        }
    }
}

fn wait_for_job(request_rx: &mut UnboundedReceiver<WorkerRequest>) -> Option<SearchJob> {
    loop {
        match request_rx.blocking_recv() {
            Some(WorkerRequest::Query(job)) => return Some(job),
            Some(WorkerRequest::Cancel) => continue,
            Some(WorkerRequest::Shutdown) | None => return None,
        }
    }
}

fn run_job(
    job: SearchJob,
    request_rx: &mut UnboundedReceiver<WorkerRequest>,
    event_tx: &UnboundedSender<SearchEvent>,
    pending: &mut Option<SearchJob>,
    loader: &dyn DocumentLoader,
) -> WorkerControl {
    let generation = job.generation;
    if job.query.is_empty() {
        let _ = event_tx.send(SearchEvent::Completed {
            generation,
            match_count: 0,
        });
        return WorkerControl::Continue;
    }

    let document = match loader.open(&job.location) {
        Ok(document) => document,
        Err(err) => {
            let _ = event_tx.send(SearchEvent::Failed {
                generation,
                message: err.to_string(),
            });
            return WorkerControl::Continue;
        }
    };

    let total_pages = document.page_count();
    let mut match_count = 0;
    for page in 1..=total_pages {
        match flush_requests(request_rx, pending) {
            WorkerControl::Continue => {}
            WorkerControl::Preempted => {
                debug!(generation, page, "search preempted");
                return WorkerControl::Preempted;
            }
            WorkerControl::Shutdown => return WorkerControl::Shutdown,
        }

        let text = match document.extract_text(page) {
            Ok(text) => text,
            Err(err) => {
                let _ = event_tx.send(SearchEvent::Failed {
                    generation,
                    message: err.to_string(),
                });
                return WorkerControl::Continue;
            }
        };

        match_count += count_matches(&text, &job.query, job.case_sensitive);
        let _ = event_tx.send(SearchEvent::Progress {
            generation,
            scanned_pages: page,
            total_pages,
            match_count,
        });
    }

    let _ = event_tx.send(SearchEvent::Completed {
        generation,
        match_count,
    });
    WorkerControl::Continue
}

fn flush_requests(
    request_rx: &mut UnboundedReceiver<WorkerRequest>,
    pending: &mut Option<SearchJob>,
) -> WorkerControl {
    let mut control = WorkerControl::Continue;
    loop {
        match request_rx.try_recv() {
            Ok(WorkerRequest::Query(job)) => {
                *pending = Some(job);
                control = WorkerControl::Preempted;
            }
            Ok(WorkerRequest::Cancel) => {
                *pending = None;
                control = WorkerControl::Preempted;
            }
            Ok(WorkerRequest::Shutdown) | Err(TryRecvError::Disconnected) => {
                return WorkerControl::Shutdown;
            }
            Err(TryRecvError::Empty) => break,
        }
    }
    control
}
