//! Common configuration and shared helpers for the graft workspace.
//!
//! This crate provides the search and rewrite configuration consumed by
//! `graft_subgraph` and `graft_rewrite`, plus the logging setup shared by tests.

mod config;
pub mod logging;

pub use crate::config::*;
