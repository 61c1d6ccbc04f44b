//! Turning user input into an ordered list of PDF inputs, and deriving a
//! unique output path for each of them.

use crate::constants::OUTPUT_PREFIX;
use crate::error::{CompressionError, Result};
use crate::utils::is_pdf_file;
use glob::glob;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

const FALLBACK_NAME: &str = "document.pdf";

/// One document of a batch: the name it was supplied under and where its
/// bytes live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub name: String,
    pub path: PathBuf,
}

impl BatchInput {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Uses the file name of `path` as the input name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_NAME.to_string());
        Self { name, path }
    }
}

/// Working directory for inputs that arrive as bytes (uploads).
///
/// The directory and everything staged into it is removed on drop.
pub struct StagingArea {
    dir: TempDir,
    staged: usize,
}

impl StagingArea {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("pdf-squeeze-staging-").tempdir()?;
        Ok(Self { dir, staged: 0 })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `bytes` to the staging directory. The original `name` is kept
    /// for reporting; the on-disk name is prefixed with a sequence number so
    /// equal names never overwrite each other.
    pub fn stage(&mut self, name: &str, bytes: &[u8]) -> Result<BatchInput> {
        let file_name = format!("{:04}_{}", self.staged, safe_file_name(name));
        let path = self.dir.path().join(file_name);
        fs::write(&path, bytes)?;
        self.staged += 1;
        Ok(BatchInput::new(name, path))
    }
}

/// Collects PDF files from a file path, a directory, or a glob pattern.
///
/// Directory entries are returned sorted by file name; hidden entries are
/// skipped.
pub fn collect_pdf_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let input_path = Path::new(input);
    let mut pdf_files = Vec::new();

    if input_path.is_file() {
        pdf_files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path)
        } else {
            WalkDir::new(input_path).max_depth(1)
        };

        for entry in walker
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_pdf_file(path) {
                pdf_files.push(path.to_path_buf());
            }
        }
    } else if let Ok(glob_pattern) = glob(input) {
        for entry in glob_pattern.flatten() {
            if entry.is_file() && is_pdf_file(&entry) {
                pdf_files.push(entry);
            }
        }
    } else {
        return Err(CompressionError::NoPdfFilesFound(input.to_string()));
    }

    Ok(pdf_files)
}

/// Drops every file that lives under `output_dir`, so a rerun into a
/// directory nested in the input does not compress its own earlier outputs.
pub fn exclude_output_dir(files: Vec<PathBuf>, output_dir: &Path) -> Vec<PathBuf> {
    let output_dir = match fs::canonicalize(output_dir) {
        Ok(dir) => dir,
        Err(_) => return files,
    };
    files
        .into_iter()
        .filter(|file| {
            fs::canonicalize(file)
                .map(|file| !file.starts_with(&output_dir))
                .unwrap_or(true)
        })
        .collect()
}

/// Output path for every input, in input order: `compressed_<name>` inside
/// `output_dir`. A repeated name gets `_<n>` appended to its stem, so paths
/// stay unique and depend only on the input order.
pub fn plan_output_paths(inputs: &[BatchInput], output_dir: &Path) -> Vec<PathBuf> {
    let mut taken: HashSet<String> = HashSet::new();

    inputs
        .iter()
        .map(|input| {
            let file_name = safe_file_name(&input.name);
            let mut unique = file_name.clone();
            let mut n = 1;
            while !taken.insert(unique.to_lowercase()) {
                unique = with_suffix(&file_name, n);
                n += 1;
            }
            output_dir.join(format!("{}{}", OUTPUT_PREFIX, unique))
        })
        .collect()
}

fn with_suffix(file_name: &str, n: usize) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    }
}

/// Last path component of `name`; uploads may carry directory parts that
/// must not leak into output or staging paths.
fn safe_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_from_path_uses_file_name() {
        let input = BatchInput::from_path("/data/uploads/report.pdf");
        assert_eq!(input.name, "report.pdf");
        assert_eq!(input.path, PathBuf::from("/data/uploads/report.pdf"));
    }

    #[test]
    fn test_plan_output_paths_prefixes_names() {
        let inputs = vec![BatchInput::from_path("a.pdf"), BatchInput::from_path("b.pdf")];
        let outputs = plan_output_paths(&inputs, Path::new("/tmp/out"));
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("/tmp/out/compressed_a.pdf"),
                PathBuf::from("/tmp/out/compressed_b.pdf"),
            ]
        );
    }

    #[test]
    fn test_plan_output_paths_disambiguates_duplicates() {
        let inputs = vec![
            BatchInput::new("scan.pdf", "/x/scan.pdf"),
            BatchInput::new("scan.pdf", "/y/scan.pdf"),
            BatchInput::new("SCAN.pdf", "/z/SCAN.pdf"),
        ];
        let outputs = plan_output_paths(&inputs, Path::new("out"));
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("out/compressed_scan.pdf"),
                PathBuf::from("out/compressed_scan_1.pdf"),
                PathBuf::from("out/compressed_SCAN_2.pdf"),
            ]
        );
    }

    #[test]
    fn test_plan_output_paths_skips_suffix_already_in_use() {
        let inputs = vec![
            BatchInput::new("a.pdf", "/x/a.pdf"),
            BatchInput::new("a_1.pdf", "/x/a_1.pdf"),
            BatchInput::new("a.pdf", "/y/a.pdf"),
        ];
        let outputs = plan_output_paths(&inputs, Path::new("out"));
        assert_eq!(outputs[2], PathBuf::from("out/compressed_a_2.pdf"));
    }

    #[test]
    fn test_plan_output_paths_strips_directories_from_names() {
        let inputs = vec![BatchInput::new("../../etc/evil.pdf", "/tmp/evil.pdf")];
        let outputs = plan_output_paths(&inputs, Path::new("out"));
        assert_eq!(outputs, vec![PathBuf::from("out/compressed_evil.pdf")]);
    }

    #[test]
    fn test_staging_keeps_equal_names_apart() {
        let mut staging = StagingArea::new().unwrap();
        let first = staging.stage("a.pdf", b"first").unwrap();
        let second = staging.stage("a.pdf", b"second").unwrap();

        assert_eq!(first.name, "a.pdf");
        assert_eq!(second.name, "a.pdf");
        assert_ne!(first.path, second.path);
        assert_eq!(fs::read(&first.path).unwrap(), b"first");
        assert_eq!(fs::read(&second.path).unwrap(), b"second");
        assert!(first.path.starts_with(staging.path()));
    }

    #[test]
    fn test_collect_pdf_files_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("doc.pdf");
        File::create(&file).unwrap();

        let files = collect_pdf_files(&file.to_string_lossy(), false).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_collect_pdf_files_directory_sorted() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("b.pdf")).unwrap();
        File::create(temp_dir.path().join("a.PDF")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();
        File::create(temp_dir.path().join(".hidden.pdf")).unwrap();

        let files = collect_pdf_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_collect_pdf_files_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        File::create(temp_dir.path().join("top.pdf")).unwrap();
        File::create(subdir.join("nested.pdf")).unwrap();

        let flat = collect_pdf_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = collect_pdf_files(&temp_dir.path().to_string_lossy(), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_collect_pdf_files_glob_pattern() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("one.pdf")).unwrap();
        File::create(temp_dir.path().join("two.pdf")).unwrap();
        File::create(temp_dir.path().join("other.txt")).unwrap();

        let pattern = format!("{}/*.pdf", temp_dir.path().to_string_lossy());
        let files = collect_pdf_files(&pattern, false).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_collect_pdf_files_missing_path_yields_nothing() {
        let files = collect_pdf_files("/nonexistent/dir/*.pdf", false).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_exclude_output_dir_skips_previous_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("compressed");
        fs::create_dir(&output_dir).unwrap();
        File::create(temp_dir.path().join("a.pdf")).unwrap();
        File::create(output_dir.join("compressed_a.pdf")).unwrap();

        let files = collect_pdf_files(&temp_dir.path().to_string_lossy(), true).unwrap();
        assert_eq!(files.len(), 2);

        let files = exclude_output_dir(files, &output_dir);
        assert_eq!(files, vec![temp_dir.path().join("a.pdf")]);
    }

    #[test]
    fn test_exclude_output_dir_missing_dir_keeps_everything() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.pdf")).unwrap();

        let files = collect_pdf_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        let kept = exclude_output_dir(files.clone(), &temp_dir.path().join("not-yet-created"));
        assert_eq!(kept, files);
    }

    #[test]
    fn test_collect_pdf_files_invalid_glob() {
        let result = collect_pdf_files("/nonexistent/[", false);
        assert!(matches!(result, Err(CompressionError::NoPdfFilesFound(_))));
    }
}
