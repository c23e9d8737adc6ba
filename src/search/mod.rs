mod engine;
mod matcher;
mod state;

pub use engine::{SearchEngine, SearchEvent};
pub use matcher::{count_matches, count_matches_in_pages};
pub use state::SearchState;
