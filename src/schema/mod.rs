//! Schema module - Event, pattern and configuration types for the discovery engine.

mod catalog;
mod config;
mod event;
mod library;
mod pattern;

pub use catalog::*;
pub use config::*;
pub use event::*;
pub use library::*;
pub use pattern::*;
