use std::io::{self, Stdout};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Size;
use tracing::warn;

use crate::error::AppResult;

/// Where the viewer draws; tests swap in a `TestBackend` surface.
pub(crate) trait TerminalSurface {
    fn size(&self) -> io::Result<Size>;

    fn draw<F>(&mut self, render: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame<'_>);
}

/// Terminal modes switched on for the viewer, undone in reverse order.
#[derive(Debug, Default, Clone, Copy)]
struct ScreenModes {
    raw: bool,
    alternate_screen: bool,
    mouse_capture: bool,
}

impl ScreenModes {
    fn enable(&mut self, stdout: &mut Stdout) -> io::Result<()> {
        enable_raw_mode()?;
        self.raw = true;
        execute!(stdout, EnterAlternateScreen)?;
        self.alternate_screen = true;
        // The wheel scrolls the page column.
        execute!(stdout, EnableMouseCapture)?;
        self.mouse_capture = true;
        Ok(())
    }

    fn disable(&mut self, stdout: &mut impl io::Write) -> io::Result<()> {
        if self.mouse_capture {
            execute!(stdout, DisableMouseCapture)?;
            self.mouse_capture = false;
        }
        if self.alternate_screen {
            execute!(stdout, LeaveAlternateScreen)?;
            self.alternate_screen = false;
        }
        if self.raw {
            disable_raw_mode()?;
            self.raw = false;
        }
        Ok(())
    }
}

/// The real terminal for the lifetime of one viewer run.
pub(crate) struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    modes: ScreenModes,
}

impl TerminalSession {
    pub(crate) fn enter() -> AppResult<Self> {
        let mut stdout = io::stdout();
        let mut modes = ScreenModes::default();
        if let Err(err) = modes.enable(&mut stdout) {
            let _ = modes.disable(&mut stdout);
            return Err(err.into());
        }

        let terminal = Terminal::new(CrosstermBackend::new(stdout)).and_then(|mut terminal| {
            terminal.clear()?;
            Ok(terminal)
        });
        match terminal {
            Ok(terminal) => Ok(Self { terminal, modes }),
            Err(err) => {
                let _ = modes.disable(&mut io::stdout());
                Err(err.into())
            }
        }
    }

    pub(crate) fn restore(&mut self) -> io::Result<()> {
        self.modes.disable(self.terminal.backend_mut())?;
        self.terminal.show_cursor()
    }
}

impl TerminalSurface for TerminalSession {
    fn size(&self) -> io::Result<Size> {
        self.terminal.size()
    }

    fn draw<F>(&mut self, render: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame<'_>),
    {
        self.terminal.draw(render).map(|_| ())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!(error = %err, "terminal restore failed");
        }
    }
}
