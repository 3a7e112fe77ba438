//! Repository layer: journal entry persistence.

mod entries;

pub use entries::*;
