use crate::constants::SIZE_BUDGET_BYTES;
use crate::engine::{EngineHandle, EngineLocator};
use crate::error::CompressionError;
use crate::inputs::{plan_output_paths, BatchInput};
use crate::processing::{invoke, CompressionJob, CompressionResult};
use crate::profile::{resolve, EngineParameters, ProfileSelection};
use crate::utils::{calculate_compression_ratio, create_progress_bar, format_file_size};
use crate::{error, info, success, verbose, warn};
use rayon::prelude::*;
use std::any::Any;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Where a result lands relative to the size budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BudgetStatus {
    /// Produced and under budget.
    Pass,
    /// Produced but at or over budget; still usable.
    Warn,
    /// Nothing usable was produced.
    Fail,
}

impl BudgetStatus {
    pub fn is_usable(&self) -> bool {
        !matches!(self, BudgetStatus::Fail)
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetStatus::Pass => "pass",
            BudgetStatus::Warn => "warn",
            BudgetStatus::Fail => "fail",
        };
        write!(f, "{}", label)
    }
}

/// Classifies one result against `budget_bytes`.
pub fn classify(result: &CompressionResult, budget_bytes: u64) -> BudgetStatus {
    match result.size_bytes() {
        Some(size) if size < budget_bytes => BudgetStatus::Pass,
        Some(_) => BudgetStatus::Warn,
        None => BudgetStatus::Fail,
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    /// Worker count; `1` processes the batch sequentially.
    pub concurrency: usize,
    pub budget_bytes: u64,
    pub show_progress: bool,
}

impl BatchOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            concurrency: num_cpus::get().max(1),
            budget_bytes: SIZE_BUDGET_BYTES,
            show_progress: false,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_budget_bytes(mut self, budget_bytes: u64) -> Self {
        self.budget_bytes = budget_bytes;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

#[derive(Debug)]
pub struct BatchEntry {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: CompressionResult,
    pub status: BudgetStatus,
}

/// Per-input outcomes, in input order.
#[derive(Debug)]
pub struct BatchReport {
    entries: Vec<BatchEntry>,
    budget_bytes: u64,
    elapsed: Duration,
}

impl BatchReport {
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<BatchEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn budget_bytes(&self) -> u64 {
        self.budget_bytes
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn count(&self, status: BudgetStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn statuses(&self) -> Vec<BudgetStatus> {
        self.entries.iter().map(|e| e.status).collect()
    }

    /// True when every input produced an artifact (pass or warn).
    pub fn all_usable(&self) -> bool {
        self.entries.iter().all(|e| e.status.is_usable())
    }

    pub fn total_output_bytes(&self) -> u64 {
        self.entries.iter().filter_map(|e| e.result.size_bytes()).sum()
    }

    /// One line per input: successes on stdout, failures on stderr.
    pub fn print_entries(&self) {
        let budget_mib = self.budget_bytes as f64 / (1024.0 * 1024.0);
        for entry in &self.entries {
            match entry.status {
                BudgetStatus::Pass => {
                    success!("{} → {:.2} MB", entry.name, entry.result.size_mib())
                }
                BudgetStatus::Warn => warn!(
                    "{} is {:.2} MB (over the {:.0} MB budget), kept at {}",
                    entry.name,
                    entry.result.size_mib(),
                    budget_mib,
                    entry.output.display()
                ),
                BudgetStatus::Fail => error!(
                    "{} failed: {}",
                    entry.name,
                    entry.result.error_message().unwrap_or_default()
                ),
            }
        }
    }

    pub fn print_summary(&self) {
        let total_before: u64 = self
            .entries
            .iter()
            .filter(|e| e.result.ok())
            .filter_map(|e| fs::metadata(&e.input).ok().map(|m| m.len()))
            .sum();
        let total_after = self.total_output_bytes();

        info!("\n📊 Batch Compression Summary:");
        info!("  📁 Total files: {}", self.len());
        info!("  ✅ Under budget: {}", self.count(BudgetStatus::Pass));
        info!("  ⚠️  Over budget: {}", self.count(BudgetStatus::Warn));
        info!("  ❌ Failed: {}", self.count(BudgetStatus::Fail));
        info!("  📊 Total original size: {}", format_file_size(total_before));
        info!("  📊 Total compressed size: {}", format_file_size(total_after));
        info!(
            "  🎯 Overall compression ratio: {:.1}%",
            calculate_compression_ratio(total_before, total_after)
        );
        info!("  ⏱️  Total time: {:?}", self.elapsed);
    }
}

/// Lets another thread stop a running batch. Jobs that already started run
/// to completion; the rest are reported as cancelled. A cancel applies to the
/// current (or next) `run` only; the flag is cleared when that run returns.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Runs batches of independent compression jobs against one engine.
pub struct BatchCoordinator {
    locator: EngineLocator,
    options: BatchOptions,
    cancel: CancelHandle,
}

impl BatchCoordinator {
    pub fn new(locator: EngineLocator, options: BatchOptions) -> Self {
        Self {
            locator,
            options,
            cancel: CancelHandle::default(),
        }
    }

    pub fn locator(&self) -> &EngineLocator {
        &self.locator
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Compresses every input and reports on each of them, in input order.
    ///
    /// The engine is resolved once up front. If it cannot be found, every
    /// input fails with the installation hint instead of the batch aborting.
    pub fn run(&self, inputs: &[BatchInput], selection: &ProfileSelection) -> BatchReport {
        let start_time = Instant::now();
        let params = resolve(selection);
        let engine = self.locator.locate().map_err(|err| err.to_string());
        if let Err(hint) = &engine {
            warn!("{}", hint);
        }

        let outputs = plan_output_paths(inputs, &self.options.output_dir);
        let concurrency = self.options.concurrency.clamp(1, inputs.len().max(1));
        verbose!(
            "Processing {} file(s) with {} worker(s), {}",
            inputs.len(),
            concurrency,
            selection
        );

        let progress = create_progress_bar(inputs.len() as u64, self.options.show_progress);
        let process = |index: usize| {
            let entry = self.process_one(&inputs[index], &outputs[index], params, &engine);
            progress.set_message(entry.name.clone());
            progress.inc(1);
            entry
        };

        // Indexed collection keeps input order whatever the completion order.
        let entries: Vec<BatchEntry> = match rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .build()
        {
            Ok(pool) => pool.install(|| (0..inputs.len()).into_par_iter().map(process).collect()),
            Err(err) => {
                warn!("Failed to build worker pool ({}), processing sequentially", err);
                (0..inputs.len()).map(process).collect()
            }
        };
        progress.finish_and_clear();
        if self.cancel.is_cancelled() {
            verbose!("Batch cancelled; clearing the cancel flag");
            self.cancel.reset();
        }

        BatchReport {
            entries,
            budget_bytes: self.options.budget_bytes,
            elapsed: start_time.elapsed(),
        }
    }

    fn process_one(
        &self,
        input: &BatchInput,
        output: &Path,
        params: EngineParameters,
        engine: &std::result::Result<EngineHandle, String>,
    ) -> BatchEntry {
        let result = if self.cancel.is_cancelled() {
            CompressionResult::failure(CompressionError::Cancelled)
        } else {
            match engine {
                Err(hint) => CompressionResult::failure(CompressionError::EngineNotFound {
                    hint: hint.clone(),
                }),
                Ok(_) if !input.path.is_file() => {
                    CompressionResult::failure(CompressionError::FileNotFound(input.path.clone()))
                }
                Ok(engine) => {
                    let job = CompressionJob::new(&input.path, output, params);
                    panic::catch_unwind(AssertUnwindSafe(|| invoke(job, engine)))
                        .unwrap_or_else(|payload| {
                            CompressionResult::failure(CompressionError::Unresolved(
                                panic_message(payload.as_ref()),
                            ))
                        })
                }
            }
        };

        let status = classify(&result, self.options.budget_bytes);
        verbose!("{}: {}", input.name, status);
        BatchEntry {
            name: input.name.clone(),
            input: input.path.clone(),
            output: output.to_path_buf(),
            result,
            status,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "job panicked".to_string())
}
