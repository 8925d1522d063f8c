//! Claude Glasses - terminal dashboard for Claude Code sessions
//!
//! This library crate exposes internal modules for integration testing.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod integrations;
pub mod tui;
pub mod util;
