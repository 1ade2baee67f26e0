//! State module for tracking traversal progress
//!
//! # Components
//!
//! - `TraversalState`: position, bounds and phase of one walk over the listing
//! - `ProgressReporter`: shared progress cell read by external observers

mod progress;
mod traversal_state;

// Re-export main types
pub use progress::{ProgressReporter, ProgressState, COMPLETED_MESSAGE, NOT_STARTED_MESSAGE};
pub use traversal_state::{Direction, Phase, TraversalState};
