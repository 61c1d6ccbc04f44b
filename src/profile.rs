//! Quality presets and their mapping onto Ghostscript parameters.
//!
//! Two ways of choosing a tradeoff are supported: a discrete
//! [`CompressionProfile`] (optionally with an explicit downsample DPI) that
//! drives the `pdfwrite` device, and a continuous strength in `[0.2, 1.0]`
//! that becomes the zoom factor of the rasterizing strategy.

use crate::constants::{DEFAULT_STRENGTH, EBOOK_DPI, PRINTER_DPI, SCREEN_DPI};
use std::fmt;

/// Named quality/size preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionProfile {
    /// `/screen`: smallest output, on-screen viewing only.
    MaxCompression,
    /// `/ebook`: the default tradeoff.
    #[default]
    Balanced,
    /// `/printer`: keeps most image detail.
    HighQuality,
}

impl CompressionProfile {
    pub fn all() -> [CompressionProfile; 3] {
        [
            CompressionProfile::MaxCompression,
            CompressionProfile::Balanced,
            CompressionProfile::HighQuality,
        ]
    }

    /// Parses a user-facing label.
    ///
    /// Accepts the full UI labels ("Max Compression (/screen)"), the
    /// Ghostscript preset names with or without the leading slash, and short
    /// names, all case-insensitive. Anything else falls back to
    /// [`CompressionProfile::Balanced`].
    ///
    /// # Example
    /// ```
    /// use pdf_squeeze::CompressionProfile;
    ///
    /// assert_eq!(CompressionProfile::from_label("/screen"), CompressionProfile::MaxCompression);
    /// assert_eq!(CompressionProfile::from_label("nonsense"), CompressionProfile::Balanced);
    /// ```
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "max compression (/screen)" | "max" | "max-compression" | "maxcompression"
            | "screen" | "/screen" => CompressionProfile::MaxCompression,
            "high quality (/printer)" | "high" | "high-quality" | "highquality" | "printer"
            | "/printer" => CompressionProfile::HighQuality,
            "balanced (/ebook)" | "balanced" | "ebook" | "/ebook" => CompressionProfile::Balanced,
            _ => CompressionProfile::default(),
        }
    }

    /// Ghostscript `-dPDFSETTINGS` value.
    pub fn pdf_settings(&self) -> &'static str {
        match self {
            CompressionProfile::MaxCompression => "/screen",
            CompressionProfile::Balanced => "/ebook",
            CompressionProfile::HighQuality => "/printer",
        }
    }

    /// Downsample resolution used when the caller gives no explicit DPI.
    pub fn default_dpi(&self) -> u32 {
        match self {
            CompressionProfile::MaxCompression => SCREEN_DPI,
            CompressionProfile::Balanced => EBOOK_DPI,
            CompressionProfile::HighQuality => PRINTER_DPI,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompressionProfile::MaxCompression => "Max Compression (/screen)",
            CompressionProfile::Balanced => "Balanced (/ebook)",
            CompressionProfile::HighQuality => "High Quality (/printer)",
        }
    }
}

impl fmt::Display for CompressionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What the caller picked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfileSelection {
    Preset {
        profile: CompressionProfile,
        dpi: Option<u32>,
    },
    Strength(f32),
}

impl ProfileSelection {
    pub fn preset(profile: CompressionProfile) -> Self {
        ProfileSelection::Preset { profile, dpi: None }
    }

    pub fn from_label(label: &str) -> Self {
        ProfileSelection::preset(CompressionProfile::from_label(label))
    }

    pub fn default_strength() -> Self {
        ProfileSelection::Strength(DEFAULT_STRENGTH)
    }
}

impl Default for ProfileSelection {
    fn default() -> Self {
        ProfileSelection::preset(CompressionProfile::default())
    }
}

impl fmt::Display for ProfileSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileSelection::Preset { profile, dpi } => {
                write!(f, "{} @ {} DPI", profile, dpi.unwrap_or(profile.default_dpi()))
            }
            ProfileSelection::Strength(strength) => write!(f, "strength {:.2}", strength),
        }
    }
}

/// Engine-level parameters of one job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineParameters {
    /// Re-encode through `pdfwrite`, downsampling images to `dpi`.
    Downsample {
        pdf_settings: &'static str,
        dpi: u32,
    },
    /// Render every page at `zoom` (1.0 = 72 DPI) and rebuild the document
    /// from the page images.
    Rasterize { zoom: f32 },
}

/// Maps a selection to engine parameters. Never fails; the strength is
/// passed through unchanged.
pub fn resolve(selection: &ProfileSelection) -> EngineParameters {
    match *selection {
        ProfileSelection::Preset { profile, dpi } => EngineParameters::Downsample {
            pdf_settings: profile.pdf_settings(),
            dpi: dpi.unwrap_or_else(|| profile.default_dpi()),
        },
        ProfileSelection::Strength(zoom) => EngineParameters::Rasterize { zoom },
    }
}
