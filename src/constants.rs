/// Fixed size budget: 7 MiB. Outputs under it pass, outputs at or above warn.
pub const SIZE_BUDGET_BYTES: u64 = 7 * 1024 * 1024;
pub const DEFAULT_BUDGET_MB: u64 = 7;
pub const MAX_BUDGET_MB: u64 = 1024 * 1024;
pub const BYTES_PER_MB: u64 = 1024 * 1024;

pub const MIN_DPI: u32 = 10;
pub const MAX_DPI: u32 = 300;

pub const SCREEN_DPI: u32 = 72;
pub const EBOOK_DPI: u32 = 150;
pub const PRINTER_DPI: u32 = 300;

pub const MIN_STRENGTH: f32 = 0.2;
pub const MAX_STRENGTH: f32 = 1.0;
pub const DEFAULT_STRENGTH: f32 = 0.5;

/// PDF user space unit; a zoom of 1.0 renders one pixel per point.
pub const POINTS_PER_INCH: f32 = 72.0;

pub const COMPATIBILITY_LEVEL: &str = "1.4";
pub const OUTPUT_PREFIX: &str = "compressed_";
pub const RASTER_PAGE_PATTERN: &str = "page-%04d.png";

pub const ENGINE_ENV_VAR: &str = "PDF_SQUEEZE_ENGINE";

#[cfg(windows)]
pub const ENGINE_CANDIDATES: &[&str] = &["gswin64c", "gswin32c"];
#[cfg(not(windows))]
pub const ENGINE_CANDIDATES: &[&str] = &["gs"];

#[cfg(windows)]
pub const ENGINE_INSTALL_HINT: &str = "Ghostscript not found. Install it from ghostscript.com and \
     add its bin folder to PATH (e.g., C:\\Program Files\\gs\\gs10.x\\bin).";
#[cfg(not(windows))]
pub const ENGINE_INSTALL_HINT: &str = "Ghostscript ('gs') not found. Install it via your package manager \
     (e.g., brew install ghostscript on macOS, apt-get install ghostscript on Linux).";

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
