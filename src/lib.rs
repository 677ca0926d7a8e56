// Strata - Calendar-slice export and reconciliation pipeline
// Copyright (c) 2026 Strata Contributors
// Licensed under the MIT License

//! # Strata - stage-aware export and reconciliation pipeline
//!
//! Strata extracts calendar-month slices from a remote analytical source,
//! exports each slice to a set of file formats, and cross-checks every
//! export against the source's own authoritative aggregate. Failures are
//! classified, retried with per-category strategies, and persisted so an
//! interrupted run picks up where it left off.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline engine (orchestration, retry, state, validation)
//! - [`adapters`] - External integrations (source sessions, export sinks)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use strata::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("strata.toml")?;
//! println!("Exporting to {}", config.export.output_dir);
//! # Ok(())
//! # }
//! ```
//!
//! ## Stage-aware retries
//!
//! A failed period remembers how far it got. A period that exported fine
//! but failed reconciliation is retried by reloading the exported artifact
//! and re-running only the validation query; a period that failed during
//! extraction is re-processed from scratch with timeouts tuned to the
//! error category that felled it.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
