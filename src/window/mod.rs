//! Sliding-window crop enumeration.

/// Row-major window sequences and cropping.
pub mod enumerate;
