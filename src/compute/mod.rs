//! Compute module - event buffering, pattern matching and discovery.

mod buffer;
mod combination;
mod gesture;
mod matcher;
mod rhythm;
mod sequence;

pub mod discovery;
#[cfg(not(target_arch = "wasm32"))]
pub mod synth;

pub use buffer::*;
pub use combination::*;
pub use gesture::*;
pub use matcher::*;
pub use rhythm::*;
pub use sequence::*;
