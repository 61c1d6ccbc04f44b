use crate::constants::COMPATIBILITY_LEVEL;
use crate::engine::EngineHandle;
use crate::error::{CompressionError, Result};
use crate::profile::EngineParameters;
use crate::raster::rasterize_document;
use crate::utils::{create_progress_spinner, format_file_size};
use crate::{info, success, verbose};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One unit of work: compress `input` into `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionJob {
    input: PathBuf,
    output: PathBuf,
    params: EngineParameters,
}

impl CompressionJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, params: EngineParameters) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            params,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn params(&self) -> &EngineParameters {
        &self.params
    }
}

/// Outcome of one job. On success the output exists and `size_bytes` is its
/// exact size on disk.
#[derive(Debug)]
pub struct CompressionResult {
    outcome: Result<u64>,
}

impl CompressionResult {
    pub fn success(size_bytes: u64) -> Self {
        Self { outcome: Ok(size_bytes) }
    }

    pub fn failure(error: CompressionError) -> Self {
        Self { outcome: Err(error) }
    }

    pub fn ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.outcome.as_ref().ok().copied()
    }

    /// Size in MiB, or `f64::INFINITY` when no artifact was produced.
    pub fn size_mib(&self) -> f64 {
        match self.outcome {
            Ok(size) => size as f64 / (1024.0 * 1024.0),
            Err(_) => f64::INFINITY,
        }
    }

    pub fn error(&self) -> Option<&CompressionError> {
        self.outcome.as_ref().err()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(|err| err.to_string())
    }
}

impl From<Result<u64>> for CompressionResult {
    fn from(outcome: Result<u64>) -> Self {
        Self { outcome }
    }
}

/// Runs `job` once against `engine`.
///
/// Every failure is folded into the returned result; nothing escapes and
/// nothing is retried.
pub fn invoke(job: CompressionJob, engine: &EngineHandle) -> CompressionResult {
    CompressionResult::from(run_job(&job, engine))
}

fn run_job(job: &CompressionJob, engine: &EngineHandle) -> Result<u64> {
    if let Some(parent) = job.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    if same_file(&job.input, &job.output) {
        return Err(CompressionError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("output would overwrite the input {}", job.input.display()),
        )));
    }
    remove_stale_output(&job.output)?;

    match job.params {
        EngineParameters::Downsample { pdf_settings, dpi } => {
            let args = build_pdfwrite_args(&job.input, &job.output, pdf_settings, dpi);
            run_engine(engine, &args)?;
        }
        EngineParameters::Rasterize { zoom } => {
            rasterize_document(engine, &job.input, &job.output, zoom)?;
        }
    }

    measure_output(&job.output)
}

/// Argument list for the `pdfwrite` re-encoding pass.
pub fn build_pdfwrite_args(input: &Path, output: &Path, pdf_settings: &str, dpi: u32) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-sDEVICE=pdfwrite".into(),
        format!("-dCompatibilityLevel={}", COMPATIBILITY_LEVEL).into(),
        format!("-dPDFSETTINGS={}", pdf_settings).into(),
        "-dDownsampleColorImages=true".into(),
        "-dDownsampleGrayImages=true".into(),
        "-dDownsampleMonoImages=true".into(),
        format!("-dColorImageResolution={}", dpi).into(),
        format!("-dGrayImageResolution={}", dpi).into(),
        format!("-dMonoImageResolution={}", dpi).into(),
    ];
    args.extend(non_interactive_args());
    args.push("-o".into());
    args.push(output.as_os_str().to_os_string());
    args.push(input.as_os_str().to_os_string());
    args
}

pub(crate) fn non_interactive_args() -> [OsString; 3] {
    ["-dNOPAUSE".into(), "-dBATCH".into(), "-dQUIET".into()]
}

/// Runs the engine synchronously with captured output. A non-zero exit
/// becomes `InvocationFailed` carrying the code and the last stderr line.
pub(crate) fn run_engine(engine: &EngineHandle, args: &[OsString]) -> Result<()> {
    verbose!(
        "{} {}",
        engine.path().display(),
        args.iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let output = Command::new(engine.path()).args(args).output()?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        verbose!("engine stderr: {}", stderr.trim());
    }

    if !output.status.success() {
        let detail = stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string();
        return Err(CompressionError::InvocationFailed {
            code: output.status.code(),
            detail,
        });
    }

    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// A leftover file from an earlier run must not pass for this run's output.
fn remove_stale_output(output: &Path) -> Result<()> {
    match fs::remove_file(output) {
        Ok(()) => {
            verbose!("Removed previous output {}", output.display());
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(CompressionError::Io(err)),
    }
}

fn measure_output(output: &Path) -> Result<u64> {
    match fs::metadata(output) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        Ok(_) => Err(CompressionError::OutputMissing(output.to_path_buf())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(CompressionError::OutputMissing(output.to_path_buf()))
        }
        Err(err) => Err(CompressionError::Io(err)),
    }
}

/// Single-file front end used by the `compress` subcommand.
///
/// Returns the result instead of an error so the caller decides the exit
/// status.
pub fn compress_file(
    input: &Path,
    output: &Path,
    params: EngineParameters,
    engine: &EngineHandle,
) -> CompressionResult {
    info!("🗜️  Compressing PDF: {:?}", input);
    info!("📁 Output: {:?}", output);

    if !input.is_file() {
        return CompressionResult::failure(CompressionError::FileNotFound(input.to_path_buf()));
    }
    let original_size = fs::metadata(input).map(|meta| meta.len()).unwrap_or(0);
    info!("📊 Original size: {}", format_file_size(original_size));

    let pb = create_progress_spinner("Running Ghostscript...");
    let result = invoke(CompressionJob::new(input, output, params), engine);
    pb.finish_and_clear();

    if let Some(size) = result.size_bytes() {
        info!("📈 Compressed size: {}", format_file_size(size));
        success!("Compression complete");
    }
    result
}
