//! Discovery of the Ghostscript executable.
//!
//! An [`EngineLocator`] owns the process-wide answer to "which engine do we
//! run": it resolves lazily on first use, caches the handle, and only probes
//! again after an explicit [`EngineLocator::invalidate`] or
//! [`EngineLocator::redetect`].

use crate::constants::{ENGINE_CANDIDATES, ENGINE_ENV_VAR, ENGINE_INSTALL_HINT};
use crate::error::{CompressionError, Result};
use crate::{verbose, warn};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::RwLock;

/// A resolved, validated engine executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineHandle {
    path: PathBuf,
}

impl EngineHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Asks the engine for its version string (`gs --version`).
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.path).arg("--version").output()?;
        if !output.status.success() {
            return Err(CompressionError::InvocationFailed {
                code: output.status.code(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Resolves the engine once and hands out the cached handle afterwards.
#[derive(Debug, Default)]
pub struct EngineLocator {
    explicit_override: Option<PathBuf>,
    search_path: Option<OsString>,
    cached: RwLock<Option<EngineHandle>>,
}

impl EngineLocator {
    pub fn new(explicit_override: Option<PathBuf>) -> Self {
        Self {
            explicit_override,
            ..Self::default()
        }
    }

    /// Uses `PDF_SQUEEZE_ENGINE` as the override when it is set and non-empty.
    pub fn from_env() -> Self {
        let explicit_override = env::var_os(ENGINE_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::new(explicit_override)
    }

    /// Searches `search_path` instead of the process `PATH`.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn explicit_override(&self) -> Option<&Path> {
        self.explicit_override.as_deref()
    }

    /// Returns the cached handle, resolving it on first use.
    ///
    /// Failures are not cached, so a later call probes again.
    pub fn locate(&self) -> Result<EngineHandle> {
        if let Some(handle) = self.cached_handle() {
            return Ok(handle);
        }

        let mut cached = self
            .cached
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = cached.as_ref() {
            return Ok(handle.clone());
        }

        let handle = locate_in(self.explicit_override.as_deref(), self.search_path.clone())?;
        verbose!("Using engine: {}", handle.path().display());
        *cached = Some(handle.clone());
        Ok(handle)
    }

    pub fn invalidate(&self) {
        let mut cached = self
            .cached
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cached = None;
    }

    /// Drops the cached handle and probes again.
    pub fn redetect(&self) -> Result<EngineHandle> {
        self.invalidate();
        self.locate()
    }

    fn cached_handle(&self) -> Option<EngineHandle> {
        self.cached
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// One-shot lookup against the process `PATH`, without caching.
///
/// # Example
/// ```no_run
/// use pdf_squeeze::engine::locate;
///
/// match locate(None) {
///     Ok(engine) => println!("Ghostscript at {}", engine.path().display()),
///     Err(err) => eprintln!("{}", err),
/// }
/// ```
pub fn locate(explicit_override: Option<&Path>) -> Result<EngineHandle> {
    locate_in(explicit_override, None)
}

fn locate_in(explicit_override: Option<&Path>, search_path: Option<OsString>) -> Result<EngineHandle> {
    let search_path = search_path.or_else(|| env::var_os("PATH"));

    if let Some(candidate) = explicit_override {
        match resolve_override(candidate, search_path.as_ref()) {
            Some(path) => return Ok(EngineHandle { path }),
            None => warn!(
                "Engine override {} is not an executable, falling back to auto-detection",
                candidate.display()
            ),
        }
    }

    ENGINE_CANDIDATES
        .iter()
        .find_map(|name| find_on_path(name, search_path.as_ref()))
        .map(|path| EngineHandle { path })
        .ok_or_else(|| CompressionError::EngineNotFound {
            hint: ENGINE_INSTALL_HINT.to_string(),
        })
}

fn resolve_override(candidate: &Path, search_path: Option<&OsString>) -> Option<PathBuf> {
    let is_bare_name = candidate.components().count() == 1 && !candidate.is_absolute();
    if is_bare_name && !candidate.exists() {
        return candidate.to_str().and_then(|name| find_on_path(name, search_path));
    }
    is_executable(candidate).then(|| candidate.to_path_buf())
}

fn find_on_path(name: &str, search_path: Option<&OsString>) -> Option<PathBuf> {
    let search_path = search_path?;
    env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| executable_names(name).into_iter().map(move |file| dir.join(file)))
        .find(|path| is_executable(path))
}

#[cfg(windows)]
fn executable_names(name: &str) -> Vec<String> {
    vec![format!("{}.exe", name), name.to_string()]
}

#[cfg(not(windows))]
fn executable_names(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
