use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use rayon::prelude::*;

use crate::error::Error;

/// File extensions of instrument files readable by default.
#[cfg(not(feature = "thermo"))]
pub const DEFAULT_EXTENSIONS: &[&str] = &["mzml", "mgf"];

/// File extensions of instrument files readable by default, including Thermo RAW files.
#[cfg(feature = "thermo")]
pub const DEFAULT_EXTENSIONS: &[&str] = &["mzml", "mgf", "raw"];

/// Result of processing one file of a batch.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub path: PathBuf,
    pub result: Result<T, Error>,
}

/// Lists all files in `directory` with one of the given extensions (case insensitive),
/// sorted by path. Subdirectories are not searched.
///
/// # Arguments
/// * `directory` - Directory to search
/// * `extensions` - Extensions without leading dot
///
pub fn discover(directory: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| {
                extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(extension))
            })
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Processes each file independently and in parallel. Once `cancel` is set, files that
/// have not been started yet are reported as [`Error::Cancelled`]; running files finish.
///
/// # Arguments
/// * `files` - Files to process
/// * `cancel` - Cancellation flag
/// * `process` - Analysis of a single file
///
pub fn run<T, F>(files: &[PathBuf], cancel: &AtomicBool, process: F) -> Vec<BatchOutcome<T>>
where
    T: Send,
    F: Fn(&Path) -> Result<T, Error> + Sync,
{
    files
        .par_iter()
        .map(|path| {
            let result = if cancel.load(Ordering::SeqCst) {
                Err(Error::Cancelled)
            } else {
                log::info!("Analyzing {}", path.display());
                let result = process(path);
                match &result {
                    Ok(_) => log::info!("Completed {}", path.display()),
                    Err(err) => log::error!("Failed {}: {err}", path.display()),
                }
                result
            };
            BatchOutcome {
                path: path.clone(),
                result,
            }
        })
        .collect()
}
