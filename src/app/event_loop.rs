use std::time::Instant;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::event::DomainEvent;
use crate::render::RenderWorker;
use crate::ui;

use super::constants::RENDER_THREADS;
use super::core::App;
use super::event_bus::EventBusRuntime;
use super::terminal_session::{TerminalSession, TerminalSurface};

struct LoopRuntime {
    session: TerminalSession,
    render_worker: RenderWorker,
    tick: time::Interval,
    loop_event_rx: UnboundedReceiver<DomainEvent>,
    loop_event_runtime: EventBusRuntime,
    // Held so the channel stays open while only background tasks send.
    _loop_event_tx: UnboundedSender<DomainEvent>,
}

enum WaitEvent {
    Event(DomainEvent),
    Closed,
}

enum LoopControl {
    Continue,
    Break,
}

impl App {
    pub async fn run(&mut self) -> AppResult<()> {
        let mut runtime = self.initialize_loop_runtime()?;
        let mut needs_redraw = true;

        let result = loop {
            self.schedule_renders(&mut runtime.render_worker);
            if needs_redraw {
                if let Err(err) = self.draw(&mut runtime.session) {
                    break Err(err);
                }
                needs_redraw = false;
            }

            let waited = wait_next_event(
                &mut runtime.loop_event_rx,
                &mut runtime.render_worker,
                &mut runtime.tick,
            )
            .await;
            match self.handle_waited_event(waited, &mut runtime, &mut needs_redraw) {
                LoopControl::Continue => {}
                LoopControl::Break => break Ok(()),
            }
        };

        runtime.loop_event_runtime.shutdown();
        runtime.session.restore()?;
        result
    }

    fn initialize_loop_runtime(&mut self) -> AppResult<LoopRuntime> {
        let session = TerminalSession::enter()?;
        self.resize(session.size()?);

        let (loop_event_tx, loop_event_rx, mut loop_event_runtime) = EventBusRuntime::spawn();
        loop_event_runtime.spawn_document_load(
            self.loader.clone(),
            self.entry.location.clone(),
            loop_event_tx.clone(),
        );
        let render_worker = RenderWorker::spawn(
            self.entry.location.clone(),
            RENDER_THREADS,
            self.loader.clone(),
        )?;
        let mut tick = time::interval(self.config.viewer.tick_interval());
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Ok(LoopRuntime {
            session,
            render_worker,
            tick,
            loop_event_rx,
            loop_event_runtime,
            _loop_event_tx: loop_event_tx,
        })
    }

    pub(crate) fn draw(&self, surface: &mut impl TerminalSurface) -> AppResult<()> {
        let layout = self.layout();
        let view = self.view_model();
        surface.draw(|frame| ui::draw(frame, layout, &view))?;
        Ok(())
    }

    fn schedule_renders(&self, render_worker: &mut RenderWorker) {
        for key in self.pending_renders() {
            if render_worker.available_slots() == 0 {
                break;
            }
            if render_worker.is_in_flight(&key) {
                continue;
            }
            if render_worker.enqueue(key) {
                debug!(page = key.page, width = key.width, "render queued");
            }
        }
    }

    fn handle_waited_event(
        &mut self,
        waited: WaitEvent,
        runtime: &mut LoopRuntime,
        needs_redraw: &mut bool,
    ) -> LoopControl {
        let now = Instant::now();
        match waited {
            WaitEvent::Event(DomainEvent::Input(event)) => {
                if self.handle_input(event, now) {
                    return LoopControl::Break;
                }
                *needs_redraw = true;
            }
            WaitEvent::Event(DomainEvent::InputError(message)) => {
                warn!(%message, "terminal input error");
                *needs_redraw = true;
            }
            WaitEvent::Event(DomainEvent::DocumentLoaded { total_pages }) => {
                self.on_document_loaded(total_pages, now);
                *needs_redraw = true;
            }
            WaitEvent::Event(DomainEvent::DocumentFailed(message)) => {
                self.on_document_failed(message);
                *needs_redraw = true;
            }
            WaitEvent::Event(DomainEvent::RenderComplete(completed)) => {
                debug!(
                    page = completed.key.page,
                    elapsed_ms = completed.elapsed.as_millis() as u64,
                    "render finished"
                );
                if self.on_render_result(completed) {
                    *needs_redraw = true;
                }
            }
            WaitEvent::Event(DomainEvent::Tick) => {
                if self.on_tick(now, runtime.render_worker.in_flight_len()) {
                    *needs_redraw = true;
                }
            }
            WaitEvent::Closed => return LoopControl::Break,
        }
        LoopControl::Continue
    }
}

async fn wait_next_event(
    loop_event_rx: &mut UnboundedReceiver<DomainEvent>,
    render_worker: &mut RenderWorker,
    tick: &mut time::Interval,
) -> WaitEvent {
    tokio::select! {
        biased;
        maybe_loop = loop_event_rx.recv() => {
            match maybe_loop {
                Some(event) => WaitEvent::Event(event),
                None => WaitEvent::Closed,
            }
        },
        maybe_render = render_worker.recv_result() => {
            match maybe_render {
                Some(result) => WaitEvent::Event(DomainEvent::RenderComplete(result)),
                None => WaitEvent::Closed,
            }
        },
        _ = tick.tick() => WaitEvent::Event(DomainEvent::Tick),
    }
}
