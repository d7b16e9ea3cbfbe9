//! LLM agents for the analysis pipeline.
//!
//! The catalog defines the eight specialists; the runner drives the
//! tool-calling loops and the two pipeline modes.

pub mod catalog;
pub mod runner;

pub use catalog::{specialists, AgentSpec};
pub use runner::{Pipeline, PipelineOptions};
