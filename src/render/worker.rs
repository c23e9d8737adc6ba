use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::backend::{DocumentBackend, DocumentLoader, RenderedPage};
use crate::error::{AppError, AppResult};

/// One rasterization: `page` at `width` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub page: usize,
    pub width: u32,
}

enum RenderWorkerRequest {
    Task { task_id: u64, key: RenderKey },
    Shutdown,
}

#[derive(Debug)]
pub struct RenderWorkerResult {
    pub key: RenderKey,
    pub result: AppResult<RenderedPage>,
    pub elapsed: Duration,
}

#[derive(Debug)]
struct RenderResultEvent {
    task_id: u64,
    key: RenderKey,
    result: AppResult<RenderedPage>,
    elapsed: Duration,
}

/// Pool of blocking threads that rasterize pages of one document.
pub struct RenderWorker {
    request_tx: UnboundedSender<RenderWorkerRequest>,
    result_rx: UnboundedReceiver<RenderResultEvent>,
    in_flight: HashMap<RenderKey, u64>,
    _runtime: RenderWorkerRuntime,
    workers: Vec<JoinHandle<()>>,
    worker_threads: usize,
    next_task_id: u64,
}

struct RenderWorkerRuntime {
    _owned: Option<Runtime>,
    handle: Handle,
}

impl RenderWorkerRuntime {
    fn new() -> AppResult<Self> {
        if let Ok(handle) = Handle::try_current() {
            return Ok(Self {
                _owned: None,
                handle,
            });
        }

        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("pagelink-render")
            .build()
            .map_err(|err| AppError::io_with_context(err, "failed to start render runtime"))?;
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

impl RenderWorker {
    pub fn spawn(
        location: PathBuf,
        worker_threads: usize,
        loader: Arc<dyn DocumentLoader>,
    ) -> AppResult<Self> {
        let (request_tx, request_rx) = unbounded_channel();
        let (result_tx, result_rx) = unbounded_channel();
        let runtime = RenderWorkerRuntime::new()?;
        let worker_threads = worker_threads.max(1);
        let request_rx = Arc::new(Mutex::new(request_rx));

        let mut workers = Vec::with_capacity(worker_threads);
        for _ in 0..worker_threads {
            let location = location.clone();
            let request_rx = Arc::clone(&request_rx);
            let loader = Arc::clone(&loader);
            let result_tx = result_tx.clone();
            workers.push(runtime.spawn_blocking(move || {
                render_worker_main(location, request_rx, loader, result_tx)
            }));
        }

        Ok(Self {
            request_tx,
            result_rx,
            in_flight: HashMap::new(),
            _runtime: runtime,
            workers,
            worker_threads,
            next_task_id: 1,
        })
    }

    /// Queues a render. Returns false when it is already running or every thread is busy.
    pub fn enqueue(&mut self, key: RenderKey) -> bool {
        if self.in_flight.contains_key(&key) || self.in_flight.len() >= self.worker_threads {
            return false;
        }
        let task_id = self.next_task_id;
        self.next_task_id = self.next_task_id.saturating_add(1);

        if self
            .request_tx
            .send(RenderWorkerRequest::Task { task_id, key })
            .is_err()
        {
            return false;
        }
        self.in_flight.insert(key, task_id);
        true
    }

    pub fn is_in_flight(&self, key: &RenderKey) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn available_slots(&self) -> usize {
        self.worker_threads.saturating_sub(self.in_flight.len())
    }

    pub async fn recv_result(&mut self) -> Option<RenderWorkerResult> {
        while let Some(event) = self.result_rx.recv().await {
            if let Some(result) = self.accept(event) {
                return Some(result);
            }
        }
        None
    }

    fn accept(&mut self, event: RenderResultEvent) -> Option<RenderWorkerResult> {
        let task_id = self.in_flight.remove(&event.key)?;
        if task_id != event.task_id {
            return None;
        }
        Some(RenderWorkerResult {
            key: event.key,
            result: event.result,
            elapsed: event.elapsed,
        })
    }

    fn shutdown(&mut self) {
        for _ in 0..self.worker_threads {
            let _ = self.request_tx.send(RenderWorkerRequest::Shutdown);
        }
        while let Some(worker) = self.workers.pop() {
            worker.abort();
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn render_worker_main(
    location: PathBuf,
    request_rx: Arc<Mutex<UnboundedReceiver<RenderWorkerRequest>>>,
    loader: Arc<dyn DocumentLoader>,
    result_tx: UnboundedSender<RenderResultEvent>,
) {
    let document: AppResult<Box<dyn DocumentBackend>> = loader.open(&location);
    if let Err(err) = &document {
        warn!(error = %err, "render worker could not open document");
    }

    loop {
        let request = match request_rx.lock() {
            Ok(mut request_rx) => request_rx.blocking_recv(),
            Err(_) => None,
        };
        let Some(RenderWorkerRequest::Task { task_id, key }) = request else {
            break;
        };

        let started = Instant::now();
        let result = match &document {
            Ok(document) => document.render_page(key.page, key.width),
            Err(err) => Err(AppError::unsupported(format!(
                "render worker failed to open document: {err}"
            ))),
        };
        let event = RenderResultEvent {
            task_id,
            key,
            result,
            elapsed: started.elapsed(),
        };
        if result_tx.send(event).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::test_support::{StubDocument, StubLoader};

    use super::{RenderKey, RenderWorker};

    fn worker(threads: usize) -> RenderWorker {
        let loader = StubLoader::default().with(StubDocument::new("/docs/a.pdf", &["a", "b", "c"]));
        RenderWorker::spawn(PathBuf::from("/docs/a.pdf"), threads, Arc::new(loader))
            .expect("render worker should start")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn renders_and_reports_aspect_ratio() {
        let mut worker = worker(1);
        let key = RenderKey { page: 2, width: 40 };
        assert!(worker.enqueue(key));
        assert!(worker.is_in_flight(&key));

        let result = tokio::time::timeout(Duration::from_secs(3), worker.recv_result())
            .await
            .expect("render should finish")
            .expect("worker should stay alive");
        let page = result.result.expect("stub render succeeds");
        assert_eq!(result.key, key);
        assert_eq!(page.page, 2);
        assert_eq!(page.frame.width, 40);
        assert!((page.aspect_ratio - 1.5).abs() < 1e-4);
        assert_eq!(worker.in_flight_len(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn enqueue_respects_thread_budget_and_duplicates() {
        let mut worker = worker(1);
        let key = RenderKey { page: 1, width: 40 };
        assert!(worker.enqueue(key));
        assert!(!worker.enqueue(key));
        assert!(!worker.enqueue(RenderKey { page: 3, width: 40 }));
        assert_eq!(worker.available_slots(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn out_of_range_page_reports_an_error() {
        let mut worker = worker(2);
        assert!(worker.enqueue(RenderKey { page: 9, width: 40 }));
        let result = tokio::time::timeout(Duration::from_secs(3), worker.recv_result())
            .await
            .expect("render should finish")
            .expect("worker should stay alive");
        assert!(result.result.is_err());
    }
}
