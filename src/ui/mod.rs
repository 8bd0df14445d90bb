//! Ratatui front-end: screen states, the central [`App`] container, and the
//! terminal event loop.

mod app;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
