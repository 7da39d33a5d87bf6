// ABOUTME: Library root for tugboat - exposes the deploy engine and its collaborators.
// ABOUTME: The main binary is in main.rs.

pub mod client;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod hooks;
pub mod output;
pub mod plan;
pub mod types;
