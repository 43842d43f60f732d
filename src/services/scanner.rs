//! Project directory scanning.
//!
//! A directory is a Papyrus project if it directly contains a `.papyrus.*`
//! config file or a `.ppj` project file. Subdirectories are not searched.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;

use crate::config::loader::is_config_file_name;

/// Extension of Papyrus project files, compared case-insensitively
pub const PROJECT_FILE_EXTENSION: &str = "ppj";

/// What a scan found in a project directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub config_file: Option<Utf8PathBuf>,
    pub project_file: Option<Utf8PathBuf>,
}

impl ScanResult {
    pub fn is_eligible(&self) -> bool {
        self.config_file.is_some() || self.project_file.is_some()
    }
}

fn is_project_file_name(name: &str) -> bool {
    Utf8Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PROJECT_FILE_EXTENSION))
}

/// Scan a directory's immediate entries for a config file and a project file.
///
/// Entries are sorted by file name before matching rather than taken in
/// directory-listing order, which varies between file systems, so the same
/// contents always yield the same result. The first match per category wins.
/// Only regular files count. Entries whose names aren't UTF-8 are skipped.
///
/// # Errors
/// Any I/O error from listing the directory or reading entry metadata
pub fn scan_directory(dir: &Utf8Path) -> io::Result<ScanResult> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        match entry.file_name().into_string() {
            Ok(name) => entries.push(name),
            Err(name) => tracing::debug!("Skipping non UTF-8 entry {:?}", name),
        }
    }
    entries.sort();

    let mut result = ScanResult::default();
    for name in entries {
        let path = dir.join(&name);

        let wants_config = result.config_file.is_none() && is_config_file_name(&name);
        let wants_project = result.project_file.is_none() && is_project_file_name(&name);
        if !wants_config && !wants_project {
            continue;
        }
        if !fs::metadata(&path)?.is_file() {
            continue;
        }

        if wants_config {
            tracing::debug!("Found config file: {}", path);
            result.config_file = Some(path);
        } else {
            tracing::debug!("Found project file: {}", path);
            result.project_file = Some(path);
        }

        if result.config_file.is_some() && result.project_file.is_some() {
            break;
        }
    }

    Ok(result)
}
