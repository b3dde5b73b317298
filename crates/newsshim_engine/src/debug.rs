use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use shim_logging::shim_info;
use tempfile::Builder;
use thiserror::Error;
use url::Url;

const UNKNOWN_HOST: &str = "unknown-host";

/// Debug artifact name: `debug_{host}_{epoch_ms}.json`.
pub fn debug_filename(url: &str, epoch_ms: i64) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(sanitize_host))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string());
    format!("debug_{host}_{epoch_ms}.json")
}

fn sanitize_host(host: &str) -> String {
    host.chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '[' | ']' | '\0'..='\u{1F}'
    )
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("debug path {0:?} exists but is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot create debug directory {dir:?}: {source}")]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes raw extractor output into the debug directory.
#[derive(Debug, Clone)]
pub struct DebugWriter {
    dir: PathBuf,
}

impl DebugWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Write `json` stamped with the current time.
    pub fn write(&self, url: &str, json: &str) -> Result<PathBuf, PersistError> {
        self.write_at(url, json, chrono::Utc::now().timestamp_millis())
    }

    /// Write `json` stamped with `epoch_ms`, replacing a same-named artifact.
    pub fn write_at(&self, url: &str, json: &str, epoch_ms: i64) -> Result<PathBuf, PersistError> {
        self.prepare_dir()?;
        let target = self.dir.join(debug_filename(url, epoch_ms));
        stage_and_rename(&self.dir, &target, json)?;
        shim_info!("Wrote debug artifact for {} to {:?}", url, target);
        Ok(target)
    }

    fn prepare_dir(&self) -> Result<(), PersistError> {
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(PersistError::NotADirectory(self.dir.clone())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir).map_err(|source| PersistError::CreateDir {
                    dir: self.dir.clone(),
                    source,
                })
            }
            Err(err) => Err(PersistError::Io(err)),
        }
    }
}

/// Stage the artifact in `dir`, sync it, then rename it over `target`.
/// On a name collision the last writer wins.
fn stage_and_rename(dir: &Path, target: &Path, json: &str) -> Result<(), PersistError> {
    let mut staged = Builder::new().prefix(".debug_").tempfile_in(dir)?;
    staged.write_all(json.as_bytes())?;
    staged.as_file().sync_all()?;
    staged.persist(target).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}
