//! Where source rasters come from: files on disk or a master-image backend.

/// Source file discovery.
pub mod discover;
/// Decoded source rasters.
pub mod input;
/// Master-image synthesis boundary.
pub mod master;
