//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Confirmation prompts (terminal and scripted)
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All user-facing text and prompts go through this module so quiet and
//! non-interactive modes are handled in one place. Diagnostic logging uses
//! `tracing` instead.

pub mod output;
pub mod prompts;
