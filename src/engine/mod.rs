//! Bayes recompute engine - the one place the Bayes identity is enforced.
//!
//! Everything here is pure, synchronous arithmetic:
//! - `bayes`: marginal, posterior, and `recompute` after a single edit
//! - `quadrants`: joint-probability areas and the draggable panel layout
//! - `derivation`: step-by-step equation values for the "Maths" view
//! - `explorer`: edit session with snapshot/reset
//!
//! ```text
//! drag panel → PanelLayout::drag → recompute(field, value) → Quadrants / Derivation
//!                                        ↑
//!                            Explorer::reset restores snapshot
//! ```

pub mod bayes;
mod derivation;
mod explorer;
mod quadrants;

pub use bayes::recompute;
pub use derivation::{Derivation, Notation};
pub use explorer::Explorer;
pub use quadrants::{PanelGroup, PanelLayout, Quadrants};
pub use crate::types::ProbabilityField;
