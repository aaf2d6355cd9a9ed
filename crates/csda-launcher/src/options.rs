//! Options for a single demo analysis

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Result;

/// Output format produced by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One CSV file per exported table
    Csv,
    /// A single JSON document
    Json,
    /// CSV variant consumed by CS Demo Manager
    Csdm,
}

impl ExportFormat {
    /// The value passed to `-format`
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Csdm => "csdm",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "csdm" => Ok(ExportFormat::Csdm),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Platform or league a demo was recorded on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum DemoSource {
    Unknown,
    Valve,
    Ebot,
    Popflash,
    Faceit,
    Cevo,
    Challengermode,
    Esl,
    Esea,
    Esportal,
    Fastcup,
    Gamersclub,
    Perfectworld,
}

/// Sources the analyzer is declared to support
pub const SUPPORTED_DEMO_SOURCES: [DemoSource; 8] = [
    DemoSource::Valve,
    DemoSource::Esea,
    DemoSource::Faceit,
    DemoSource::Ebot,
    DemoSource::Esl,
    DemoSource::Popflash,
    DemoSource::Challengermode,
    DemoSource::Perfectworld,
];

impl DemoSource {
    const ALL: [DemoSource; 13] = [
        DemoSource::Unknown,
        DemoSource::Valve,
        DemoSource::Ebot,
        DemoSource::Popflash,
        DemoSource::Faceit,
        DemoSource::Cevo,
        DemoSource::Challengermode,
        DemoSource::Esl,
        DemoSource::Esea,
        DemoSource::Esportal,
        DemoSource::Fastcup,
        DemoSource::Gamersclub,
        DemoSource::Perfectworld,
    ];

    /// The value passed to `-source`
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoSource::Unknown => "unknown",
            DemoSource::Valve => "valve",
            DemoSource::Ebot => "ebot",
            DemoSource::Popflash => "popflash",
            DemoSource::Faceit => "faceit",
            DemoSource::Cevo => "cevo",
            DemoSource::Challengermode => "challengermode",
            DemoSource::Esl => "esl",
            DemoSource::Esea => "esea",
            DemoSource::Esportal => "esportal",
            DemoSource::Fastcup => "fastcup",
            DemoSource::Gamersclub => "gamersclub",
            DemoSource::Perfectworld => "perfectworld",
        }
    }

    /// Whether analysis of demos from this source is supported
    pub fn is_supported(&self) -> bool {
        SUPPORTED_DEMO_SOURCES.contains(self)
    }
}

impl fmt::Display for DemoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemoSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("unknown demo source: {s}"))
    }
}

type TextCallback = Arc<dyn Fn(&str) + Send + Sync>;
type ExitCallback = Arc<dyn Fn(i32) + Send + Sync>;

/// Callbacks notified of the lifecycle of one analysis
///
/// Every observer defaults to a no-op. Observers are called inline from the
/// future driving the analysis, in event order, and must return promptly.
#[derive(Clone, Default)]
pub struct Observers {
    on_start: Option<TextCallback>,
    on_stdout: Option<TextCallback>,
    on_stderr: Option<TextCallback>,
    on_end: Option<ExitCallback>,
}

impl Observers {
    pub(crate) fn start(&self, command: &str) {
        if let Some(f) = &self.on_start {
            f(command);
        }
    }

    pub(crate) fn stdout(&self, data: &str) {
        if let Some(f) = &self.on_stdout {
            f(data);
        }
    }

    pub(crate) fn stderr(&self, data: &str) {
        if let Some(f) = &self.on_stderr {
            f(data);
        }
    }

    pub(crate) fn end(&self, code: i32) {
        if let Some(f) = &self.on_end {
            f(code);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("on_start", &self.on_start.is_some())
            .field("on_stdout", &self.on_stdout.is_some())
            .field("on_stderr", &self.on_stderr.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Everything needed to run the analyzer once
///
/// Field names deserialize in camelCase (`demoPath`, `outputFolderPath`,
/// `analyzePositions`, `executablePath`). Observers are never
/// (de)serialized and default to no-ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOptions {
    /// Demo file to analyze
    pub demo_path: PathBuf,
    /// Directory the analyzer writes its export into, created if missing
    pub output_folder_path: PathBuf,
    /// Export format
    pub format: ExportFormat,
    /// Source hint, omitted from the command line when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DemoSource>,
    /// Export player positions, defaults to `false`
    #[serde(default)]
    pub analyze_positions: bool,
    /// Minify JSON output, defaults to `false`
    #[serde(default)]
    pub minify: bool,
    /// Use this executable instead of the bundled one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_path: Option<PathBuf>,
    /// Lifecycle callbacks
    #[serde(skip)]
    pub observers: Observers,
}

impl AnalyzeOptions {
    /// Create options with every optional field at its default
    pub fn new(
        demo_path: impl Into<PathBuf>,
        output_folder_path: impl Into<PathBuf>,
        format: ExportFormat,
    ) -> Self {
        Self {
            demo_path: demo_path.into(),
            output_folder_path: output_folder_path.into(),
            format,
            source: None,
            analyze_positions: false,
            minify: false,
            executable_path: None,
            observers: Observers::default(),
        }
    }

    /// Parse options from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the demo source hint
    pub fn source(mut self, source: DemoSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Enable or disable position analysis
    pub fn analyze_positions(mut self, enabled: bool) -> Self {
        self.analyze_positions = enabled;
        self
    }

    /// Enable or disable JSON minification
    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify = enabled;
        self
    }

    /// Run a specific executable instead of the bundled one
    pub fn executable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Called once with the full command line before the process is spawned
    pub fn on_start(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.observers.on_start = Some(Arc::new(f));
        self
    }

    /// Called with each chunk of standard output, in order
    pub fn on_stdout(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.observers.on_stdout = Some(Arc::new(f));
        self
    }

    /// Called with each chunk of standard error, in order
    pub fn on_stderr(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.observers.on_stderr = Some(Arc::new(f));
        self
    }

    /// Called exactly once with the exit code when the process terminates
    pub fn on_end(mut self, f: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.observers.on_end = Some(Arc::new(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_format_round_trips_through_str() {
        for format in [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Csdm] {
            assert_eq!(format.to_string().parse::<ExportFormat>(), Ok(format));
        }
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_supported_sources() {
        assert!(DemoSource::Faceit.is_supported());
        assert!(DemoSource::Perfectworld.is_supported());
        assert!(!DemoSource::Esportal.is_supported());
        assert!(!DemoSource::Unknown.is_supported());
        assert_eq!(
            DemoSource::ALL.iter().filter(|s| s.is_supported()).count(),
            SUPPORTED_DEMO_SOURCES.len()
        );
    }

    #[test]
    fn test_source_parses_wire_names() {
        assert_eq!("challengermode".parse::<DemoSource>(), Ok(DemoSource::Challengermode));
        assert_eq!("gamersclub".parse::<DemoSource>(), Ok(DemoSource::Gamersclub));
        assert!("FACEIT".parse::<DemoSource>().is_err());
    }

    #[test]
    fn test_defaults() {
        let options = AnalyzeOptions::new("match.dem", "out", ExportFormat::Csv);
        assert_eq!(options.source, None);
        assert!(!options.analyze_positions);
        assert!(!options.minify);
        assert!(options.executable_path.is_none());

        // Unset observers are no-ops
        options.observers.start("cmd");
        options.observers.stdout("data");
        options.observers.stderr("data");
        options.observers.end(1);
    }

    #[test]
    fn test_from_json_camel_case() {
        let options = AnalyzeOptions::from_json(
            r#"{
                "demoPath": "/demos/match.dem",
                "outputFolderPath": "/tmp/out",
                "format": "json",
                "source": "faceit",
                "analyzePositions": true
            }"#,
        )
        .unwrap();

        assert_eq!(options.demo_path, PathBuf::from("/demos/match.dem"));
        assert_eq!(options.output_folder_path, PathBuf::from("/tmp/out"));
        assert_eq!(options.format, ExportFormat::Json);
        assert_eq!(options.source, Some(DemoSource::Faceit));
        assert!(options.analyze_positions);
        assert!(!options.minify);
    }

    #[test]
    fn test_from_json_rejects_unknown_format() {
        let result = AnalyzeOptions::from_json(
            r#"{"demoPath": "a.dem", "outputFolderPath": "out", "format": "xml"}"#,
        );
        assert!(matches!(result, Err(crate::Error::InvalidOptions(_))));
    }

    #[test]
    fn test_observers_are_invoked() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s1 = seen.clone();
        let s2 = seen.clone();
        let options = AnalyzeOptions::new("a.dem", "out", ExportFormat::Json)
            .on_stdout(move |data| s1.lock().unwrap().push(format!("out:{data}")))
            .on_end(move |code| s2.lock().unwrap().push(format!("end:{code}")));

        options.observers.stdout("hello");
        options.observers.end(3);

        assert_eq!(*seen.lock().unwrap(), vec!["out:hello", "end:3"]);
    }
}
