//! Overlay handles bound to elements.
//!
//! Handles never live inside an element: each canvas keeps a map from
//! element id to its [`HandleSet`], and the positioner recomputes their
//! geometry from element state whenever it changes.

mod handles;
mod positioner;

pub use handles::{Handle, HandleRole, HandleSet};
pub use positioner::{handle_center, position_handles};
