//! kibsync - git-friendly sync for Kibana-style saved objects
//!
//! This crate provides the core functionality for the `kibsync` CLI tool:
//! a version-controlled local mirror of a remote saved-object store,
//! reconciled through the store's batch NDJSON export/import API.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Credentials and environment resolution
//! - [`manifest`] - Tracked-object manifest and merge engine
//! - [`normalize`] - Volatile-field normalizer
//! - [`codec`] - Bundle ⇄ per-object file reconciliation
//! - [`remote`] - Remote saved-object store client
//! - [`sync`] - Export/import pipelines and atomic file operations
//! - [`summarize`] - Diff chunking and summarization
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod manifest;
pub mod normalize;
pub mod remote;
pub mod summarize;
pub mod sync;

pub use error::{Error, Result};
