//! Command-line front end: scrape one URL and print the article as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use newsshim_engine::{ExtractorSettings, Shim, ShimSettings};
use shim_logging::{shim_info, LogDestination};

#[derive(Parser, Debug)]
#[command(name = "newsshim", version)]
#[command(about = "Extract an article by running an external scraper and print it as JSON")]
struct Args {
    /// URL of the article to extract
    url: String,

    /// Persist the raw extractor output in the debug directory
    #[arg(long)]
    debug: bool,

    /// Directory for debug artifacts (default: system temp dir)
    #[arg(long, env = "NEWSSHIM_DEBUG_DIR")]
    debug_dir: Option<PathBuf>,

    /// Interpreter used to run the extraction script
    #[arg(long, env = "NEWSSHIM_INTERPRETER", default_value = "python3")]
    interpreter: String,

    /// Extraction script, passed to the interpreter before the URL
    #[arg(long, env = "NEWSSHIM_SCRIPT", default_value = "ArticleScraping.py")]
    script: PathBuf,

    /// Directory holding the extraction script
    #[arg(long, env = "NEWSSHIM_SCRIPT_DIR")]
    script_dir: Option<PathBuf>,

    /// Print the typed article instead of the raw record
    #[arg(long)]
    typed: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn extractor_settings(&self) -> ExtractorSettings {
        ExtractorSettings {
            interpreter: self.interpreter.clone(),
            script: self.script.clone(),
            script_dir: self.script_dir.clone(),
        }
    }

    fn shim_settings(&self) -> ShimSettings {
        match &self.debug_dir {
            Some(dir) => ShimSettings {
                debug_dir: dir.clone(),
            },
            None => ShimSettings::default(),
        }
    }

    fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Stderr,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    shim_logging::initialize(args.log_destination(), level);

    let shim = Shim::with_process(args.extractor_settings(), args.shim_settings());
    let rendered = if args.typed {
        let article = shim
            .scrape_article(&args.url, args.debug)
            .with_context(|| format!("failed to scrape {}", args.url))?;
        serde_json::to_string_pretty(&article)?
    } else {
        let record = shim
            .scrape(&args.url, args.debug)
            .with_context(|| format!("failed to scrape {}", args.url))?;
        serde_json::to_string_pretty(&record)?
    };

    println!("{rendered}");
    shim_info!("Scraped {}", args.url);
    Ok(())
}
