mod constants;
mod core;
mod event_bus;
mod event_loop;
pub(crate) mod terminal_session;
mod view;

#[cfg(test)]
mod tests;

pub use core::App;
