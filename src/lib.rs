//! # tutorgen
//!
//! Glue around an external codebase tutorial generator.
//!
//! Two independent pieces live here:
//!
//! - a JSON HTTP dispatcher that validates a generation request, turns it
//!   into a command line for the generator script, runs it and reports where
//!   the HTML output is expected
//! - a batch converter that renders a folder of Markdown documents into
//!   styled HTML pages
//!
//! ## Architecture
//!
//! ```text
//! POST /generate ─▶ validate ─▶ name ─▶ build_command ─▶ child process
//!                                                        (generator script)
//!
//! tutorgen convert ─▶ walk *.md ─▶ rewrite links ─▶ render ─▶ write *.html
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! tutorgen serve                        # start the HTTP dispatcher
//! tutorgen convert ./output/proj        # render Markdown to ./output/proj/html
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Request validation and response types |
//! | [`naming`] | Project name derivation and output path convention |
//! | [`command`] | Generator command-line construction |
//! | [`runner`] | Child process execution |
//! | [`generate`] | The end-to-end generation operation |
//! | [`server`] | HTTP server |
//! | [`convert`] | Markdown to HTML batch conversion |
//! | [`highlight`] | Syntax highlighting for fenced code |
//! | [`error`] | Dispatcher error type |
//! | [`telemetry`] | Logging setup |

pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod generate;
pub mod highlight;
pub mod models;
pub mod naming;
pub mod runner;
pub mod server;
pub mod telemetry;
