use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::ScrapeError;

/// Untyped article as emitted by the extraction process.
pub type ArticleRecord = Map<String, Value>;

/// Program and arguments of an extraction process, kept for error reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExitInfo {
    pub fn from_code(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutput {
    pub command: CommandLine,
    pub stdout: String,
    pub stderr: String,
    pub exit: ExitInfo,
}

/// Typed view over an [`ArticleRecord`].
///
/// `title` and `text` are required; the remaining well-known fields default
/// when absent or `null` and unknown keys are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub top_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub movies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    pub fn from_record(record: &ArticleRecord) -> Result<Self, ScrapeError> {
        Self::try_from(record.clone())
    }
}

impl TryFrom<ArticleRecord> for Article {
    type Error = ScrapeError;

    fn try_from(record: ArticleRecord) -> Result<Self, Self::Error> {
        Ok(serde_json::from_value(Value::Object(record))?)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
