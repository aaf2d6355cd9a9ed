//! Command line construction for the analyzer

use async_process::Command as AsyncCommand;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::options::{AnalyzeOptions, ExportFormat};

/// A fully materialised analyzer command line
///
/// Holds two views of the same command: the quoted tokens, as a shell would
/// read them, and the unquoted argument vector handed to the OS. The child is
/// always spawned directly, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The program to execute
    program: PathBuf,
    /// The arguments passed to the program
    args: Vec<OsString>,
    /// Shell-quoted rendering, program first
    tokens: Vec<String>,
}

impl Invocation {
    /// Build the analyzer command line for `options`
    ///
    /// Token order is fixed: binary, `-demo-path`, `-output`, `-format`, then
    /// `-source`, `-positions` and `-minify` when set.
    pub fn build(options: &AnalyzeOptions, binary_path: impl Into<PathBuf>) -> Self {
        let mut invocation = Self::new(binary_path);

        invocation.flag("demo-path", options.demo_path.as_os_str());
        invocation.flag("output", options.output_folder_path.as_os_str());
        invocation.flag("format", options.format.as_str());

        if let Some(source) = options.source {
            invocation.flag("source", source.as_str());
        }
        if options.analyze_positions {
            invocation.flag("positions", options.analyze_positions.to_string());
        }
        if options.minify {
            if options.format != ExportFormat::Json {
                tracing::warn!(format = %options.format, "-minify only affects JSON exports");
            }
            invocation.switch("minify");
        }

        invocation
    }

    /// Forward `args` verbatim to `binary_path`
    pub fn passthrough<I, S>(binary_path: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut invocation = Self::new(binary_path);
        for arg in args {
            let arg = arg.as_ref();
            invocation.tokens.push(arg.to_string_lossy().into_owned());
            invocation.args.push(arg.to_owned());
        }
        invocation
    }

    fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        Self {
            tokens: vec![format!("\"{}\"", program.display())],
            program,
            args: Vec::new(),
        }
    }

    /// Append `-name="value"`
    fn flag(&mut self, name: &str, value: impl AsRef<OsStr>) {
        let value = value.as_ref();
        self.tokens
            .push(format!("-{}=\"{}\"", name, value.to_string_lossy()));

        let mut arg = OsString::from(format!("-{name}="));
        arg.push(value);
        self.args.push(arg);
    }

    /// Append a valueless `-name`
    fn switch(&mut self, name: &str) {
        self.tokens.push(format!("-{name}"));
        self.args.push(OsString::from(format!("-{name}")));
    }

    /// Get the program path
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Get the unquoted arguments
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Get the quoted tokens, program first
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The tokens joined by single spaces
    pub fn command_line(&self) -> String {
        self.tokens.join(" ")
    }

    /// Prepare this invocation for execution by converting to an `async_process::Command`
    pub fn prepare(&self) -> AsyncCommand {
        let mut cmd = AsyncCommand::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}
