use clap::Parser;
use pdf_squeeze::batch::{classify, BatchCoordinator, BatchOptions, BudgetStatus};
use pdf_squeeze::cli::{Args, Commands, QualityArgs};
use pdf_squeeze::constants::BYTES_PER_MB;
use pdf_squeeze::engine::EngineLocator;
use pdf_squeeze::error::{CompressionError, Result};
use pdf_squeeze::inputs::{collect_pdf_files, exclude_output_dir, BatchInput};
use pdf_squeeze::processing::compress_file;
use pdf_squeeze::profile::resolve;
use pdf_squeeze::{error, info, logger, success, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    let locator = match args.engine {
        Some(engine) => EngineLocator::new(Some(engine)),
        None => EngineLocator::from_env(),
    };
    let outcome = match args.command {
        Commands::Compress { input, output, quality, budget_mb } => {
            run_compress(&locator, &input, &output, &quality, budget_mb)
        }
        Commands::Batch { input, output, quality, threads, recursive, budget_mb } => {
            run_batch(locator, &input, output, &quality, threads, recursive, budget_mb)
        }
        Commands::Detect => run_detect(&locator),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}

/// `Ok(false)` means the file failed; `Err` is reserved for bad arguments.
fn run_compress(
    locator: &EngineLocator,
    input: &Path,
    output: &Path,
    quality: &QualityArgs,
    budget_mb: u64,
) -> Result<bool> {
    let selection = quality.selection()?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let engine = match locator.locate() {
        Ok(engine) => engine,
        Err(e) => {
            error!("{} failed: {}", name, e);
            return Ok(false);
        }
    };

    info!("⚙️  Profile: {}", selection);
    let result = compress_file(input, output, resolve(&selection), &engine);
    match classify(&result, budget_mb * BYTES_PER_MB) {
        BudgetStatus::Pass => {
            success!("{} → {:.2} MB", name, result.size_mib());
            Ok(true)
        }
        BudgetStatus::Warn => {
            warn!(
                "{} is {:.2} MB, above the {} MB budget",
                name,
                result.size_mib(),
                budget_mb
            );
            Ok(true)
        }
        BudgetStatus::Fail => {
            error!("{} failed: {}", name, result.error_message().unwrap_or_default());
            Ok(false)
        }
    }
}

fn run_batch(
    locator: EngineLocator,
    input: &str,
    output: PathBuf,
    quality: &QualityArgs,
    threads: Option<usize>,
    recursive: bool,
    budget_mb: u64,
) -> Result<bool> {
    let selection = quality.selection()?;
    info!("🚀 Starting batch compression...");
    info!("📁 Input: {}", input);
    info!("📁 Output: {:?}", output);

    let pdf_files = exclude_output_dir(collect_pdf_files(input, recursive)?, &output);
    if pdf_files.is_empty() {
        warn!("No PDF files found in the input path");
        return Ok(true);
    }
    info!("📊 Found {} PDF files to process", pdf_files.len());
    info!("⚙️  Profile: {}", selection);

    fs::create_dir_all(&output)
        .map_err(|_| CompressionError::DirectoryCreationFailed(output.clone()))?;

    let mut options = BatchOptions::new(output)
        .with_budget_bytes(budget_mb * BYTES_PER_MB)
        .with_progress(true);
    if let Some(threads) = threads {
        options = options.with_concurrency(threads);
    }

    let inputs: Vec<BatchInput> = pdf_files.into_iter().map(BatchInput::from_path).collect();
    let coordinator = BatchCoordinator::new(locator, options);
    let report = coordinator.run(&inputs, &selection);

    report.print_entries();
    report.print_summary();
    Ok(report.all_usable())
}

fn run_detect(locator: &EngineLocator) -> Result<bool> {
    match locator.locate() {
        Ok(engine) => {
            success!("Ghostscript found: {}", engine.path().display());
            match engine.version() {
                Ok(version) => info!("📋 Version: {}", version),
                Err(e) => warn!("Could not read engine version: {}", e),
            }
            Ok(true)
        }
        Err(e) => {
            error!("{}", e);
            Ok(false)
        }
    }
}
