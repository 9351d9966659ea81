//! OS-level helpers: opening files with the desktop's default handler.

use crate::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

const NO_ARGS: &[&str] = &[];
// `start` treats the first quoted argument as a window title
const START_ARGS: &[&str] = &["/C", "start", ""];

/// Program and leading arguments that open a file on `os`
/// (a `std::env::consts::OS` value).
pub fn viewer_command(os: &str) -> (&'static str, &'static [&'static str]) {
    match os {
        "macos" => ("open", NO_ARGS),
        "windows" => ("cmd", START_ARGS),
        _ => ("xdg-open", NO_ARGS),
    }
}

/// Open `path` with the platform's default viewer.
///
/// The viewer is spawned and not waited for.
pub fn open_in_viewer(path: &Path) -> Result<()> {
    let (program, args) = viewer_command(std::env::consts::OS);
    debug!(program, path = %path.display(), "launching viewer");
    Command::new(program)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| Error::Other(format!("Failed to launch {}: {}", program, e)))
}
