//! Panning animations across a master image.

/// Pan geometry and lazy frame sequences.
pub mod sequencer;
