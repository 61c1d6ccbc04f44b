use crate::constants::{DEFAULT_BUDGET_MB, MAX_BUDGET_MB, MAX_DPI, MAX_STRENGTH, MIN_DPI, MIN_STRENGTH};
use crate::error::{CompressionError, Result};
use crate::profile::{CompressionProfile, ProfileSelection};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pdf-squeeze",
    about = "Batch PDF compression under a size budget, driven by Ghostscript",
    long_about = "pdf-squeeze re-encodes PDF documents through Ghostscript to bring them under a \
                  size budget (7 MB by default). Files are compressed independently, optionally in \
                  parallel, and every file gets its own pass / over-budget / failed verdict.",
    version,
    after_help = "EXAMPLES:\n  \
    pdf-squeeze compress scan.pdf small.pdf -p max\n  \
    pdf-squeeze compress scan.pdf small.pdf -s 0.4\n  \
    pdf-squeeze batch ./uploads ./compressed -r -j 4\n  \
    pdf-squeeze batch \"./uploads/*.pdf\" ./compressed -p high -d 200\n  \
    pdf-squeeze detect"
)]
pub struct Args {
    #[arg(
        long,
        global = true,
        help = "Ghostscript executable to use",
        long_help = "Path or name of the Ghostscript executable. Takes precedence over \
                     PDF_SQUEEZE_ENGINE and auto-detection (gswin64c/gswin32c on Windows, \
                     gs elsewhere)."
    )]
    pub engine: Option<PathBuf>,

    #[arg(short = 'q', long, global = true, help = "Only report failures")]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Show engine command lines and diagnostics"
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Preset names accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileArg {
    /// Smallest output (/screen)
    Max,
    /// Balanced size and quality (/ebook)
    Balanced,
    /// Keep image detail (/printer)
    High,
}

impl From<ProfileArg> for CompressionProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Max => CompressionProfile::MaxCompression,
            ProfileArg::Balanced => CompressionProfile::Balanced,
            ProfileArg::High => CompressionProfile::HighQuality,
        }
    }
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct QualityArgs {
    #[arg(
        short = 'p',
        long,
        value_enum,
        conflicts_with = "strength",
        help = "Compression profile (max, balanced, high; default: balanced)"
    )]
    pub profile: Option<ProfileArg>,

    #[arg(
        short = 'd',
        long,
        conflicts_with = "strength",
        help = "Image downsample resolution in DPI (10-300)",
        long_help = "Resolution color, gray and mono images are downsampled to. \
                     Defaults to the profile's resolution: max 72, balanced 150, high 300."
    )]
    pub dpi: Option<u32>,

    #[arg(
        short = 's',
        long,
        help = "Rasterize pages at this strength (0.2-1.0)",
        long_help = "Render every page to an image at this zoom factor and rebuild the document \
                     from the images. Lower values give smaller files. Cannot be combined with \
                     --profile or --dpi."
    )]
    pub strength: Option<f32>,
}

impl QualityArgs {
    /// Validates the flags and turns them into a selection.
    pub fn selection(&self) -> Result<ProfileSelection> {
        if let Some(strength) = self.strength {
            if !(MIN_STRENGTH..=MAX_STRENGTH).contains(&strength) {
                return Err(CompressionError::InvalidStrength(
                    strength,
                    MIN_STRENGTH,
                    MAX_STRENGTH,
                ));
            }
            return Ok(ProfileSelection::Strength(strength));
        }

        if let Some(dpi) = self.dpi {
            if !(MIN_DPI..=MAX_DPI).contains(&dpi) {
                return Err(CompressionError::InvalidDpi(dpi, MIN_DPI, MAX_DPI));
            }
        }

        Ok(ProfileSelection::Preset {
            profile: self.profile.map(CompressionProfile::from).unwrap_or_default(),
            dpi: self.dpi,
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Compress a single PDF file",
        long_about = "Compress one PDF and report whether the result fits the size budget. \
                      Exits non-zero when no output could be produced."
    )]
    Compress {
        #[arg(help = "Input PDF file path")]
        input: PathBuf,

        #[arg(help = "Output PDF file path")]
        output: PathBuf,

        #[command(flatten)]
        quality: QualityArgs,

        #[arg(
            long,
            default_value_t = DEFAULT_BUDGET_MB,
            value_parser = clap::value_parser!(u64).range(1..=MAX_BUDGET_MB),
            help = "Size budget in MB (default: 7)"
        )]
        budget_mb: u64,
    },

    #[command(
        about = "Compress multiple PDF files",
        long_about = "Compress every PDF found in a directory, file pattern or glob. Outputs are \
                      written as compressed_<name> into the output directory."
    )]
    Batch {
        #[arg(
            help = "Input file, directory, or glob",
            long_help = "Input can be a single PDF, a directory, or a glob expression. \
                         Examples: './uploads', './uploads/*.pdf'"
        )]
        input: String,

        #[arg(help = "Output directory path")]
        output: PathBuf,

        #[command(flatten)]
        quality: QualityArgs,

        #[arg(
            short = 'j',
            long,
            help = "Number of files compressed in parallel (default: CPU count)"
        )]
        threads: Option<usize>,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,

        #[arg(
            long,
            default_value_t = DEFAULT_BUDGET_MB,
            value_parser = clap::value_parser!(u64).range(1..=MAX_BUDGET_MB),
            help = "Size budget in MB (default: 7)"
        )]
        budget_mb: u64,
    },

    #[command(
        about = "Show which Ghostscript executable would be used",
        long_about = "Resolve the compression engine the same way compress and batch do, and \
                      print its location and version."
    )]
    Detect,
}
