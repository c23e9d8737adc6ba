use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Size;

use super::super::core::App;
use super::super::terminal_session::TerminalSurface;
use crate::config::Config;
use crate::registry::DocumentEntry;
use crate::test_support::{StubDocument, StubLoader};
use crate::url::{Location, MemoryHistory};

struct TestTerminalSurface {
    terminal: Terminal<TestBackend>,
}

impl TestTerminalSurface {
    fn new(width: u16, height: u16) -> io::Result<Self> {
        let terminal = infallible_to_io(Terminal::new(TestBackend::new(width, height)))?;
        Ok(Self { terminal })
    }
}

impl TerminalSurface for TestTerminalSurface {
    fn size(&self) -> io::Result<Size> {
        infallible_to_io(self.terminal.size())
    }

    fn draw<F>(&mut self, render: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame<'_>),
    {
        infallible_to_io(self.terminal.draw(render)).map(|_| ())
    }
}

fn infallible_to_io<T>(result: Result<T, Infallible>) -> io::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => match err {},
    }
}

impl TestTerminalSurface {
    fn row(&self, y: u16) -> String {
        let buffer = self.terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }
}

fn app_at(url: &str) -> App {
    let loader = StubLoader::default().with(StubDocument::new(
        "/docs/manual.pdf",
        &["one", "two", "three"],
    ));
    let entry = DocumentEntry::new("manual", "/docs/manual.pdf", "User Manual");
    let history = MemoryHistory::new(Location::parse(url).expect("valid url"));
    App::new(Config::default(), entry, history, Arc::new(loader)).expect("app should build")
}

#[test]
fn status_line_shows_page_and_url() {
    let mut surface = TestTerminalSurface::new(80, 24).expect("test terminal should initialize");
    let mut app = app_at("/manual/2");
    app.resize(surface.size().expect("size should resolve"));
    app.on_document_loaded(3, Instant::now());

    app.draw(&mut surface).expect("draw should succeed");
    let status = surface.row(23);
    assert!(status.starts_with("User Manual | page 2/3"), "{status}");
    assert!(status.contains("/manual/2"), "{status}");
}

#[test]
fn loading_screen_names_the_document() {
    let mut surface = TestTerminalSurface::new(60, 10).expect("test terminal should initialize");
    let mut app = app_at("/manual");
    app.resize(surface.size().expect("size should resolve"));

    app.draw(&mut surface).expect("draw should succeed");
    let rows: Vec<String> = (0..9).map(|y| surface.row(y)).collect();
    assert!(rows.iter().any(|row| row.contains("Loading User Manual...")));
    assert!(surface.row(9).contains("page -/-"));
}

#[test]
fn load_failure_draws_the_banner() {
    let mut surface = TestTerminalSurface::new(60, 10).expect("test terminal should initialize");
    let mut app = app_at("/manual");
    app.resize(surface.size().expect("size should resolve"));
    app.on_document_failed("broken xref".to_string());

    app.draw(&mut surface).expect("draw should succeed");
    assert!(surface.row(1).contains("Failed to load document: broken xref"));
}
