//! core
//!
//! Core domain types and configuration.
//!
//! # Modules
//!
//! - [`changes`] - Short status entries and the change set handed to tools
//! - [`tools`] - Static registry of quality tools
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for a repository
//!
//! # Design Principles
//!
//! - Core types never touch the filesystem beyond existence checks
//! - Tool definitions are data, not control flow

pub mod changes;
pub mod config;
pub mod paths;
pub mod tools;
