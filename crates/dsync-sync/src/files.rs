//! Token file loading and writing.

use std::fs;
use std::path::{Path, PathBuf};

use dsync_types::TokenTree;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{SyncError, SyncResult};

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SyncError + '_ {
    move |source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read one canonical token document.
pub fn load_tree(path: &Path) -> SyncResult<TokenTree> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    TokenTree::from_json_str(&text).map_err(|source| SyncError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Every `*.json` file under `dir`, in sorted path order.
pub fn token_files(dir: &Path) -> SyncResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| SyncError::Io {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;
        let is_json = entry.path().extension().is_some_and(|ext| ext == "json");
        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Load token sources in the given order. A directory contributes all of its
/// token files in sorted order.
pub fn load_sources(paths: &[PathBuf]) -> SyncResult<Vec<(PathBuf, TokenTree)>> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            let files = token_files(path)?;
            if files.is_empty() {
                return Err(SyncError::NoSources(path.clone()));
            }
            for file in files {
                let tree = load_tree(&file)?;
                sources.push((file, tree));
            }
        } else {
            sources.push((path.clone(), load_tree(path)?));
        }
    }
    debug!(count = sources.len(), "loaded token sources");
    Ok(sources)
}

/// Write a token tree, creating parent directories.
pub fn write_tree(path: &Path, tree: &TokenTree, pretty: bool) -> SyncResult<()> {
    let text = tree.to_json_string(pretty)?;
    write_text(path, &text)
}

/// Write any serializable value as JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> SyncResult<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| SyncError::Serialization(e.into()))?;
    write_text(path, &text)
}

fn write_text(path: &Path, text: &str) -> SyncResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    fs::write(path, text).map_err(io_error(path))?;
    debug!(path = %path.display(), bytes = text.len(), "wrote file");
    Ok(())
}
