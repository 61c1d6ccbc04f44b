//! Fake Ghostscript executables for unit tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Writes an executable `sh` script into `dir` that records its arguments in
/// `args.log`, parses `-o <out>`, `-dPDFSETTINGS=<settings>` and the trailing
/// input path, then runs `body` with `$out`, `$settings` and `$input` set.
pub fn fake_engine(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-gs");
    let script = format!(
        r#"#!/bin/sh
printf '%s\n' "$@" > "$(dirname "$0")/args.log"
out=""
settings=""
input=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    -dPDFSETTINGS=*) settings="${{1#-dPDFSETTINGS=}}" ;;
    -*) ;;
    *) input="$1" ;;
  esac
  shift
done
{}
"#,
        body
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Output size follows the preset: `/screen` 3 MiB, `/printer` 8 MiB,
/// anything else 1 MiB.
pub const SIZED_BY_PROFILE: &str = r#"case "$settings" in
  /screen) size=3145728 ;;
  /printer) size=8388608 ;;
  *) size=1048576 ;;
esac
head -c "$size" /dev/zero > "$out""#;

pub fn write_input(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"%PDF-1.4\n%%EOF\n").unwrap();
    path
}
