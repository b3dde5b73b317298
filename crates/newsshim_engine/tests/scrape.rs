use std::fs;
use std::sync::{Arc, Mutex};

use newsshim_engine::{
    Article, CommandLine, ExitInfo, ExtractionOutput, Extractor, ScrapeError, Shim, ShimSettings,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

/// Replays a canned output and records the URLs it was asked for.
struct FakeExtractor {
    stdout: String,
    stderr: String,
    exit: ExitInfo,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeExtractor {
    fn succeeding(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit: ExitInfo::from_code(0),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(code: i32, stderr: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit: ExitInfo::from_code(code),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Extractor for FakeExtractor {
    fn extract(&self, url: &str) -> Result<ExtractionOutput, ScrapeError> {
        self.calls.lock().unwrap().push(url.to_string());
        Ok(ExtractionOutput {
            command: CommandLine {
                program: "fake".to_string(),
                args: vec![url.to_string()],
            },
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            exit: self.exit,
        })
    }
}

fn init_logging() {
    shim_logging::initialize_for_tests();
}

fn shim_in(dir: &TempDir, extractor: FakeExtractor) -> Shim {
    Shim::new(
        Box::new(extractor),
        ShimSettings {
            debug_dir: dir.path().to_path_buf(),
        },
    )
}

fn dir_entries(dir: &TempDir) -> Vec<std::path::PathBuf> {
    fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

#[test]
fn scrape_returns_decoded_record() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let extractor = FakeExtractor::succeeding(r#"{"title": "T", "text": "B"}"#);
    let calls = extractor.calls.clone();
    let shim = shim_in(&temp, extractor);

    let record = shim.scrape("https://example.com/a", false).unwrap();

    assert_eq!(
        serde_json::Value::Object(record),
        json!({"title": "T", "text": "B"})
    );
    assert_eq!(*calls.lock().unwrap(), vec!["https://example.com/a".to_string()]);
}

#[test]
fn scrape_passes_unknown_keys_through() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let shim = shim_in(
        &temp,
        FakeExtractor::succeeding(r#"{"anything": [1, 2], "nested": {"k": null}}"#),
    );

    let record = shim.scrape("https://example.com", false).unwrap();
    assert_eq!(record["anything"], json!([1, 2]));
    assert_eq!(record["nested"], json!({"k": null}));
}

#[test]
fn scrape_fails_on_non_success_exit() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let shim = shim_in(&temp, FakeExtractor::failing(2, "  boom\n"));

    let err = shim.scrape("https://example.com", true).unwrap_err();
    match err {
        ScrapeError::ProcessFailed {
            command,
            code,
            stderr,
        } => {
            assert_eq!(command.program, "fake");
            assert_eq!(code, Some(2));
            assert_eq!(stderr, "boom");
        }
        other => panic!("expected process failure, got {other:?}"),
    }
    // No artifact for failed runs, even with debug on.
    assert!(dir_entries(&temp).is_empty());
}

#[test]
fn scrape_fails_on_signal_termination() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut extractor = FakeExtractor::failing(0, "");
    extractor.exit = ExitInfo {
        success: false,
        code: None,
    };
    let shim = shim_in(&temp, extractor);

    let err = shim.scrape("https://example.com", false).unwrap_err();
    assert!(matches!(err, ScrapeError::ProcessFailed { code: None, .. }));
    assert!(err.to_string().contains("terminated by signal"));
}

#[test]
fn scrape_rejects_non_json_output() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let shim = shim_in(&temp, FakeExtractor::succeeding("Traceback: not json"));

    let err = shim.scrape("https://example.com", false).unwrap_err();
    assert!(matches!(err, ScrapeError::Decode(_)));
}

#[test]
fn scrape_rejects_json_that_is_not_an_object() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let shim = shim_in(&temp, FakeExtractor::succeeding("[1, 2, 3]"));

    let err = shim.scrape("https://example.com", false).unwrap_err();
    assert!(matches!(err, ScrapeError::Decode(_)));

    let shim = shim_in(&temp, FakeExtractor::succeeding("null"));
    let err = shim.scrape("https://example.com", false).unwrap_err();
    assert!(matches!(err, ScrapeError::Decode(_)));
}

#[test]
fn debug_scrape_writes_exactly_one_raw_artifact() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let raw = "{\"title\": \"T\",\n  \"text\": \"B\"}\n";
    let shim = shim_in(&temp, FakeExtractor::succeeding(raw));

    shim.scrape("https://news.example.org/story", true).unwrap();

    let entries = dir_entries(&temp);
    assert_eq!(entries.len(), 1);
    let name = entries[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("debug_news.example.org_"), "{name}");
    assert!(name.ends_with(".json"), "{name}");
    assert_eq!(fs::read_to_string(&entries[0]).unwrap(), raw);
}

#[test]
fn scrape_without_debug_writes_nothing() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let shim = shim_in(&temp, FakeExtractor::succeeding(r#"{"title": "T"}"#));

    shim.scrape("https://example.com", false).unwrap();
    assert!(dir_entries(&temp).is_empty());
}

#[test]
fn debug_artifact_survives_decode_failure() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let shim = shim_in(&temp, FakeExtractor::succeeding("garbage"));

    let err = shim.scrape("https://example.com", true).unwrap_err();
    assert!(matches!(err, ScrapeError::Decode(_)));

    let entries = dir_entries(&temp);
    assert_eq!(entries.len(), 1);
    assert_eq!(fs::read_to_string(&entries[0]).unwrap(), "garbage");
}

#[test]
fn debug_write_failure_is_reported() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("file");
    fs::write(&not_a_dir, "x").unwrap();
    let shim = Shim::new(
        Box::new(FakeExtractor::succeeding(r#"{"title": "T"}"#)),
        ShimSettings {
            debug_dir: not_a_dir,
        },
    );

    let err = shim.scrape("https://example.com", true).unwrap_err();
    assert!(matches!(err, ScrapeError::DebugWrite(_)));
}

#[test]
fn debug_can_be_called_directly() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let shim = shim_in(&temp, FakeExtractor::succeeding("{}"));

    let path = shim.debug("https://example.com/x", "{\"a\": 1}").unwrap();
    assert_eq!(path.parent().unwrap(), temp.path());
    assert_eq!(fs::read_to_string(path).unwrap(), "{\"a\": 1}");
}

#[test]
fn scrape_article_builds_typed_projection() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let shim = shim_in(
        &temp,
        FakeExtractor::succeeding(
            r#"{"title": "T", "text": "B", "authors": ["A. Writer"], "publish_date": null, "source": "wire"}"#,
        ),
    );

    let article = shim.scrape_article("https://example.com", false).unwrap();
    assert_eq!(article.title, "T");
    assert_eq!(article.text, "B");
    assert_eq!(article.authors, vec!["A. Writer".to_string()]);
    assert_eq!(article.publish_date, None);
    assert!(article.keywords.is_empty());
    assert_eq!(article.extra.get("source"), Some(&json!("wire")));
}

#[test]
fn typed_projection_requires_title_and_text() {
    let record = json!({"text": "B"}).as_object().unwrap().clone();
    let err = Article::from_record(&record).unwrap_err();
    assert!(matches!(err, ScrapeError::Decode(_)));

    let record = json!({"title": "T", "text": "B", "authors": "not a list"})
        .as_object()
        .unwrap()
        .clone();
    assert!(Article::from_record(&record).is_err());
}

#[test]
fn typed_projection_treats_null_lists_as_empty() {
    let record = json!({
        "title": "T",
        "text": "B",
        "authors": null,
        "images": null,
        "movies": null,
        "keywords": null
    })
    .as_object()
    .unwrap()
    .clone();

    let article = Article::from_record(&record).unwrap();
    assert!(article.authors.is_empty());
    assert!(article.images.is_empty());
    assert!(article.movies.is_empty());
    assert!(article.keywords.is_empty());
    assert!(article.extra.is_empty());
}
