use crate::input::PromptKind;
use crate::viewer::ScrollRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    NextPage,
    PrevPage,
    GotoPage { page: usize },
    /// Raw text from the jump-to-page form.
    SubmitPageInput { input: String },
    ZoomIn,
    ZoomOut,
    ResetZoom,
    FitWidth,
    FitPage,
    /// Vertical scroll in layout units; negative moves up.
    Scroll { delta: f32 },
    Search { query: String },
    OpenPrompt { kind: PromptKind },
    SubmitPrompt,
    Cancel,
    Quit,
}

impl Command {
    pub fn id(&self) -> &'static str {
        match self {
            Self::NextPage => "next-page",
            Self::PrevPage => "prev-page",
            Self::GotoPage { .. } => "goto-page",
            Self::SubmitPageInput { .. } => "submit-page-input",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
            Self::ResetZoom => "reset-zoom",
            Self::FitWidth => "fit-width",
            Self::FitPage => "fit-page",
            Self::Scroll { .. } => "scroll",
            Self::Search { .. } => "search",
            Self::OpenPrompt { .. } => "open-prompt",
            Self::SubmitPrompt => "submit-prompt",
            Self::Cancel => "cancel",
            Self::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandOutcome {
    Applied,
    /// A programmatic navigation the host has to scroll to.
    Navigated(ScrollRequest),
    Noop,
    /// Left for the host to handle.
    Deferred,
    QuitRequested,
}
