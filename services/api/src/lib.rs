//! services/api/src/lib.rs
//!
//! The HTTP service around `quiz_core`: configuration, LLM adapters and the web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
