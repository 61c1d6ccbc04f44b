#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes a fake Ghostscript into `dir`. The script parses `-o <out>`,
/// `-dPDFSETTINGS=<settings>`, `-sDEVICE=<device>` and the input path, then
/// runs `body`.
#[cfg(unix)]
pub fn create_fake_engine(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-gs");
    let script = format!(
        r#"#!/bin/sh
out=""
settings=""
device=""
input=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    -dPDFSETTINGS=*) settings="${{1#-dPDFSETTINGS=}}" ;;
    -sDEVICE=*) device="${{1#-sDEVICE=}}" ;;
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

/// Engine whose output size depends on the preset: `/screen` 3 MiB,
/// `/printer` 8 MiB, otherwise 1 MiB.
pub const SIZED_BY_PROFILE: &str = r#"case "$settings" in
  /screen) size=3145728 ;;
  /printer) size=8388608 ;;
  *) size=1048576 ;;
esac
head -c "$size" /dev/zero > "$out""#;

/// Engine that fails on any input whose name contains "broken".
pub const FAILS_ON_BROKEN: &str = r#"case "$input" in
  *broken*) echo "Error: /syntaxerror in --token--" >&2; exit 1 ;;
esac
head -c 2048 /dev/zero > "$out""#;

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn create_test_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n").unwrap();
    path
}

pub fn create_test_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200]))
        .save(&path)
        .unwrap();
    path
}
