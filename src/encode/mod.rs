//! Artifact sinks: the output side of a catalog run.

pub mod dir;
pub mod ffmpeg;
pub mod sink;
