//! Platform detection and bundled binary location
//!
//! The analyzer ships as one pre-built executable per supported platform,
//! laid out under the installation directory as `bin/<platform-dir>/csda[.exe]`.
//! [`resolve`] maps an OS/architecture pair to that relative path and
//! [`BinaryLocator`] anchors it to an installation directory.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// An operating system / CPU architecture pair
///
/// Identifiers are normalised so that both the Rust spellings
/// (`macos`, `x86_64`, `aarch64`) and the spellings used by the binary
/// layout (`darwin`, `x64`, `arm64`) name the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    os: String,
    arch: String,
}

impl PlatformKey {
    /// Create a key from raw identifiers
    pub fn new(os: impl AsRef<str>, arch: impl AsRef<str>) -> Self {
        Self {
            os: normalize_os(os.as_ref()).to_string(),
            arch: normalize_arch(arch.as_ref()).to_string(),
        }
    }

    /// The key of the platform this code was compiled for
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// The normalised OS identifier
    pub fn os(&self) -> &str {
        &self.os
    }

    /// The normalised architecture identifier
    pub fn arch(&self) -> &str {
        &self.arch
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

fn normalize_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        "win32" => "windows",
        other => other,
    }
}

fn normalize_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        other => other,
    }
}

/// Relative location of a bundled executable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutableDescriptor {
    /// Directory under `bin/` holding the executable
    pub platform_dir: &'static str,
    /// File name of the executable
    pub file_name: &'static str,
}

impl ExecutableDescriptor {
    /// The relative path, joined with the host's path separator
    pub fn relative_path(&self) -> PathBuf {
        Path::new("bin").join(self.platform_dir).join(self.file_name)
    }
}

impl fmt::Display for ExecutableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bin/{}/{}", self.platform_dir, self.file_name)
    }
}

/// Every platform a binary is bundled for, as `(os, arch, descriptor)`
pub const SUPPORTED_PLATFORMS: [(&str, &str, ExecutableDescriptor); 5] = [
    (
        "darwin",
        "x64",
        ExecutableDescriptor {
            platform_dir: "darwin-x64",
            file_name: "csda",
        },
    ),
    (
        "darwin",
        "arm64",
        ExecutableDescriptor {
            platform_dir: "darwin-arm64",
            file_name: "csda",
        },
    ),
    (
        "linux",
        "x64",
        ExecutableDescriptor {
            platform_dir: "linux-x64",
            file_name: "csda",
        },
    ),
    (
        "linux",
        "arm64",
        ExecutableDescriptor {
            platform_dir: "linux-arm64",
            file_name: "csda",
        },
    ),
    (
        "windows",
        "x64",
        ExecutableDescriptor {
            platform_dir: "windows-x64",
            file_name: "csda.exe",
        },
    ),
];

/// Look up the bundled executable for an OS/architecture pair
pub fn resolve(os: &str, arch: &str) -> Result<ExecutableDescriptor> {
    resolve_key(&PlatformKey::new(os, arch))
}

/// Look up the bundled executable for a [`PlatformKey`]
pub fn resolve_key(key: &PlatformKey) -> Result<ExecutableDescriptor> {
    SUPPORTED_PLATFORMS
        .iter()
        .find(|(os, arch, _)| *os == key.os() && *arch == key.arch())
        .map(|(_, _, descriptor)| *descriptor)
        .ok_or_else(|| Error::unsupported_platform(key.to_string()))
}

/// Resolves the absolute path of the bundled executable
#[derive(Debug, Clone)]
pub struct BinaryLocator {
    install_dir: PathBuf,
    platform: PlatformKey,
}

impl BinaryLocator {
    /// Locate binaries under `install_dir` for the current platform
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            platform: PlatformKey::current(),
        }
    }

    /// Locate binaries relative to the directory of the running executable
    pub fn from_current_exe() -> Result<Self> {
        Ok(Self::new(install_dir()?))
    }

    /// Override the platform used for resolution
    pub fn with_platform(mut self, platform: PlatformKey) -> Self {
        self.platform = platform;
        self
    }

    /// The installation directory binaries are resolved against
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Absolute path of the executable for the configured platform
    ///
    /// The file is not checked for existence; a missing binary surfaces
    /// as a spawn failure.
    pub fn locate(&self) -> Result<PathBuf> {
        let descriptor = resolve_key(&self.platform)?;
        let path = self.install_dir.join(descriptor.relative_path());
        tracing::debug!(platform = %self.platform, path = %path.display(), "Resolved analyzer binary");
        Ok(path)
    }
}

/// The directory containing the running executable
pub fn install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|source| Error::InstallDir { source })?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::InstallDir {
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} has no parent directory", exe.display()),
            ),
        })
}

/// Absolute path of the bundled executable for the host platform
pub fn locate() -> Result<PathBuf> {
    // Resolve first so an unsupported host fails before touching the filesystem
    resolve_key(&PlatformKey::current())?;
    BinaryLocator::from_current_exe()?.locate()
}
