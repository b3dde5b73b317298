use std::path::PathBuf;

use shim_logging::{shim_error, shim_warn};

use crate::debug::DebugWriter;
use crate::extract::{Extractor, ExtractorSettings, ProcessExtractor};
use crate::{Article, ArticleRecord, ScrapeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimSettings {
    /// Where debug artifacts are written. Defaults to the system temp dir.
    pub debug_dir: PathBuf,
}

impl Default for ShimSettings {
    fn default() -> Self {
        Self {
            debug_dir: std::env::temp_dir(),
        }
    }
}

/// Turns a URL into an [`ArticleRecord`] by delegating to an [`Extractor`].
///
/// Calls block for the whole lifetime of the extraction. There is no retry
/// and no timeout.
pub struct Shim {
    extractor: Box<dyn Extractor>,
    debug_writer: DebugWriter,
}

impl Shim {
    pub fn new(extractor: Box<dyn Extractor>, settings: ShimSettings) -> Self {
        Self {
            extractor,
            debug_writer: DebugWriter::new(settings.debug_dir),
        }
    }

    /// Shim backed by [`ProcessExtractor`].
    pub fn with_process(extractor: ExtractorSettings, settings: ShimSettings) -> Self {
        Self::new(Box::new(ProcessExtractor::new(extractor)), settings)
    }

    /// Extract `url` and decode the output as a JSON object.
    ///
    /// With `debug` set, the raw output of a successful run is written to the
    /// debug directory before decoding.
    pub fn scrape(&self, url: &str, debug: bool) -> Result<ArticleRecord, ScrapeError> {
        let output = self.extractor.extract(url)?;

        if !output.exit.success {
            shim_warn!(
                "Extractor `{}` failed for {} (code {:?})",
                output.command,
                url,
                output.exit.code
            );
            return Err(ScrapeError::ProcessFailed {
                command: output.command,
                code: output.exit.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        if debug {
            self.debug(url, &output.stdout)?;
        }

        serde_json::from_str::<ArticleRecord>(&output.stdout).map_err(|err| {
            shim_error!("Undecodable extractor output for {}: {}", url, err);
            ScrapeError::from(err)
        })
    }

    /// Like [`Shim::scrape`], projected onto [`Article`].
    pub fn scrape_article(&self, url: &str, debug: bool) -> Result<Article, ScrapeError> {
        Article::try_from(self.scrape(url, debug)?)
    }

    /// Persist `json` as a debug artifact for `url` and return its path.
    pub fn debug(&self, url: &str, json: &str) -> Result<PathBuf, ScrapeError> {
        Ok(self.debug_writer.write(url, json)?)
    }
}
