//! Orchestration: configuration, identifiers, planning and execution of a generation run.

pub mod config;
pub mod id;
pub mod plan;
pub mod run;
