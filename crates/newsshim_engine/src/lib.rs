//! Newsshim engine: runs an external article extractor and decodes its output.
mod debug;
mod error;
mod extract;
mod shim;
mod types;

pub use debug::{debug_filename, DebugWriter, PersistError};
pub use error::ScrapeError;
pub use extract::{Extractor, ExtractorSettings, ProcessExtractor};
pub use shim::{Shim, ShimSettings};
pub use types::{Article, ArticleRecord, CommandLine, ExitInfo, ExtractionOutput};
