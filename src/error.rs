use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("{hint}")]
    EngineNotFound { hint: String },

    #[error("Ghostscript failed ({}){}", describe_exit(.code), describe_detail(.detail))]
    InvocationFailed { code: Option<i32>, detail: String },

    #[error("Output file was not created: {0}. Check input validity and permissions.")]
    OutputMissing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rasterization error: {0}")]
    Rasterization(String),

    #[error("Cancelled before the job started")]
    Cancelled,

    #[error("Compression error: {0}")]
    Unresolved(String),

    #[error("Invalid DPI value: {0}. Must be between {1} and {2}")]
    InvalidDpi(u32, u32, u32),

    #[error("Invalid strength value: {0}. Must be between {1} and {2}")]
    InvalidStrength(f32, f32, f32),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("No PDF files found in input path: {0}")]
    NoPdfFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

impl From<lopdf::Error> for CompressionError {
    fn from(err: lopdf::Error) -> Self {
        CompressionError::Rasterization(format!("PDF assembly failed: {}", err))
    }
}

impl From<image::ImageError> for CompressionError {
    fn from(err: image::ImageError) -> Self {
        CompressionError::Rasterization(format!("page image could not be decoded: {}", err))
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

fn describe_detail(detail: &str) -> String {
    if detail.is_empty() {
        ".".to_string()
    } else {
        format!(": {}", detail)
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;
