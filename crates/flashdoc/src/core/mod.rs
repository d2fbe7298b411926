//! Core orchestration: configuration, format dispatch, job state and the pipeline.

pub mod config;
pub mod job;
pub mod mime;
pub mod pipeline;
pub mod progress;
