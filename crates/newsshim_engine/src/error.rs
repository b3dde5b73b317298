use std::io;

use thiserror::Error;

use crate::debug::PersistError;
use crate::CommandLine;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("process execution failed: `{command}` exited with {}: {stderr}", describe_code(.code))]
    ProcessFailed {
        command: CommandLine,
        code: Option<i32>,
        stderr: String,
    },
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: CommandLine,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode extractor output: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to write debug artifact: {0}")]
    DebugWrite(#[from] PersistError),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
