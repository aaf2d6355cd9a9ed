//! Backend implementations for launching the analyzer
//!
//! Only local execution is built in. Other execution contexts can be added by
//! implementing the [`Launcher`](crate::launcher::Launcher) trait.

pub mod local;
pub use local::{LocalLauncher, LocalProcessHandle, OutputStream};
