// ABOUTME: Library root for stagepush - exposes the deploy pipeline and its parts for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod dist;
pub mod error;
pub mod output;
pub mod runner;
pub mod service;
pub mod stage_index;
pub mod types;
pub mod upload;
