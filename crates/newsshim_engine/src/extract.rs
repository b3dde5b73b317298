use std::path::PathBuf;
use std::process::{Command, Stdio};

use shim_logging::shim_debug;

use crate::{CommandLine, ExitInfo, ExtractionOutput, ScrapeError};

pub trait Extractor: Send + Sync {
    /// Run the extraction for `url` to completion.
    ///
    /// A non-success exit is reported through [`ExtractionOutput::exit`], not
    /// as an error; errors mean the extraction could not be started.
    fn extract(&self, url: &str) -> Result<ExtractionOutput, ScrapeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorSettings {
    pub interpreter: String,
    pub script: PathBuf,
    /// When set, the script is looked up in this directory.
    pub script_dir: Option<PathBuf>,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            script: PathBuf::from("ArticleScraping.py"),
            script_dir: None,
        }
    }
}

impl ExtractorSettings {
    pub fn script_path(&self) -> PathBuf {
        match &self.script_dir {
            Some(dir) => dir.join(&self.script),
            None => self.script.clone(),
        }
    }
}

/// Runs `<interpreter> <script> <url>` and captures its output.
#[derive(Debug, Clone, Default)]
pub struct ProcessExtractor {
    settings: ExtractorSettings,
}

impl ProcessExtractor {
    pub fn new(settings: ExtractorSettings) -> Self {
        Self { settings }
    }

    pub fn command_line(&self, url: &str) -> CommandLine {
        CommandLine {
            program: self.settings.interpreter.clone(),
            args: vec![
                self.settings.script_path().to_string_lossy().into_owned(),
                url.to_string(),
            ],
        }
    }
}

impl Extractor for ProcessExtractor {
    fn extract(&self, url: &str) -> Result<ExtractionOutput, ScrapeError> {
        let command = self.command_line(url);
        shim_debug!("Running extractor: {}", command);

        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ScrapeError::Spawn {
                command: command.clone(),
                source,
            })?;

        Ok(ExtractionOutput {
            command,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit: ExitInfo {
                success: output.status.success(),
                code: output.status.code(),
            },
        })
    }
}
