pub mod app;
pub mod backend;
pub mod command;
pub mod config;
pub mod error;
pub(crate) mod event;
pub mod input;
pub mod logging;
pub mod registry;
pub mod render;
pub mod search;
pub mod ui;
pub mod url;
pub mod viewer;

#[cfg(test)]
mod test_support;
