//! Terminal presentation: the event loop and per-state screens.

pub mod runtime;
pub mod view;

pub use runtime::{map_key, run, Ui};
