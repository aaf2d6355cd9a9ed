//! Launcher for the bundled CS demo analyzer
//!
//! This crate locates the pre-built `csda` executable for the running
//! platform, turns typed [`AnalyzeOptions`] into its command line, and runs it
//! as a child process whose output is streamed back as it is produced.
//!
//! # Example
//!
//! ```no_run
//! use csda_launcher::{analyze_demo, AnalyzeOptions, DemoSource, ExportFormat};
//!
//! # fn main() -> csda_launcher::Result<()> {
//! smol::block_on(async {
//!     let options = AnalyzeOptions::new("match.dem", "out", ExportFormat::Json)
//!         .source(DemoSource::Faceit)
//!         .analyze_positions(true)
//!         .on_stdout(|data| print!("{data}"))
//!         .on_end(|code| println!("analyzer exited with {code}"));
//!
//!     analyze_demo(options).await
//! })
//! # }
//! ```
//!
//! The library is runtime-agnostic: it only relies on `async-process`,
//! `async-io` and `futures`, and never spawns threads of its own.

#![warn(missing_docs)]

pub mod analyzer;
pub mod backends;
pub mod command;
pub mod error;
pub mod event;
pub mod launcher;
pub mod options;
pub mod passthrough;
pub mod platform;
pub mod process;

pub use analyzer::{Analyzer, analyze_demo};
pub use backends::LocalLauncher;
pub use command::Invocation;
pub use error::{Error, Result};
pub use event::{OutputEvent, OutputSource};
pub use launcher::Launcher;
pub use options::{AnalyzeOptions, DemoSource, ExportFormat, Observers, SUPPORTED_DEMO_SOURCES};
pub use passthrough::{passthrough, passthrough_from, passthrough_with};
pub use platform::{BinaryLocator, ExecutableDescriptor, PlatformKey, SUPPORTED_PLATFORMS, locate, resolve};
pub use process::{ExitResult, ExitStatus, ProcessHandle};
