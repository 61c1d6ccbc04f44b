pub mod logger;

pub mod batch;
pub mod cli;
pub mod constants;
pub mod engine;
pub mod error;
pub mod inputs;
pub mod processing;
pub mod profile;
pub mod raster;
pub mod utils;

#[cfg(all(test, unix))]
mod test_support;

pub use batch::{classify, BatchCoordinator, BatchEntry, BatchOptions, BatchReport, BudgetStatus, CancelHandle};
pub use engine::{locate, EngineHandle, EngineLocator};
pub use error::{CompressionError, Result};
pub use inputs::{collect_pdf_files, exclude_output_dir, plan_output_paths, BatchInput, StagingArea};
pub use processing::{compress_file, invoke, CompressionJob, CompressionResult};
pub use profile::{resolve, CompressionProfile, EngineParameters, ProfileSelection};
