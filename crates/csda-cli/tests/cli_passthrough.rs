//! End-to-end tests for the `csda` passthrough binary

use std::path::{Path, PathBuf};
use std::process::Command;

const CSDA: &str = env!("CARGO_BIN_EXE_csda");

/// Copy the built binary into `dir`, so it resolves `dir/bin/<platform>/csda`
fn install_shim(dir: &Path) -> PathBuf {
    let file_name = Path::new(CSDA).file_name().unwrap();
    let shim = dir.join(file_name);
    std::fs::copy(CSDA, &shim).unwrap();
    shim
}

#[cfg(unix)]
fn install_stub_analyzer(dir: &Path, body: &str) -> Option<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let key = csda_launcher::PlatformKey::current();
    let descriptor = csda_launcher::platform::resolve_key(&key).ok()?;
    let path = dir.join(descriptor.relative_path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    Some(path)
}

#[test]
#[cfg(unix)]
fn test_exit_code_is_mirrored() {
    let dir = tempfile::tempdir().unwrap();
    if install_stub_analyzer(dir.path(), "exit 2").is_none() {
        eprintln!("no bundled analyzer for this platform, skipping");
        return;
    }
    let shim = install_shim(dir.path());

    let status = Command::new(&shim).status().unwrap();

    assert_eq!(status.code(), Some(2));
}

#[test]
#[cfg(unix)]
fn test_arguments_and_streams_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    let body = r#"printf '%s\n' "$@"; echo to-stderr >&2"#;
    if install_stub_analyzer(dir.path(), body).is_none() {
        eprintln!("no bundled analyzer for this platform, skipping");
        return;
    }
    let shim = install_shim(dir.path());

    let output = Command::new(&shim)
        .args(["-demo-path=\"a b.dem\"", "-format", "json", "--help"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "-demo-path=\"a b.dem\"\n-format\njson\n--help\n"
    );
    assert_eq!(String::from_utf8_lossy(&output.stderr), "to-stderr\n");
}

#[test]
fn test_missing_analyzer_error_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let shim = install_shim(dir.path());

    let output = Command::new(&shim).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let supported = csda_launcher::platform::resolve_key(&csda_launcher::PlatformKey::current()).is_ok();
    // The launch error is the top-level message, not wrapped in context
    if supported {
        assert!(stderr.starts_with("Error: failed to spawn"), "stderr: {stderr}");
    } else {
        assert!(stderr.starts_with("Error: unsupported platform"), "stderr: {stderr}");
    }
}
