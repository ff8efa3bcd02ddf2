//! Integration tests for recstream
//!
//! End-to-end runs over a tempdir-backed fs reader, built through the
//! iterator-URI front door.

use recstream::{Error, IterConfig, IterateError, RecordIterator};
use std::path::Path;
use std::sync::atomic::Ordering;
use tempfile::{tempdir, TempDir};

const LOCALITY: &str = r#"{"id":102527513,"properties":{"placetype":"locality","name":"San Francisco"}}"#;
const REGION: &str = r#"{"id":85688637,"properties":{"placetype":"region","name":"California"}}"#;

/// Lay out record fixtures in the chunked directory scheme
fn fixture_tree() -> TempDir {
    let dir = tempdir().unwrap();
    write_record(dir.path(), "102/527/513/102527513.json", LOCALITY);
    write_record(dir.path(), "856/886/37/85688637.json", REGION);
    dir
}

fn write_record(root: &Path, rel_path: &str, body: &str) {
    let abs = root.join(rel_path);
    std::fs::create_dir_all(abs.parent().unwrap()).unwrap();
    std::fs::write(abs, body).unwrap();
}

fn engine_for(root: &Path, query_suffix: &str) -> RecordIterator {
    let uri = format!("reader://?reader=fs://{}{}", root.display(), query_suffix);
    let config = IterConfig::parse(&uri).unwrap();
    RecordIterator::new(config).unwrap()
}

#[test]
fn test_single_record_no_filter() {
    let dir = fixture_tree();
    let engine = engine_for(dir.path(), "");

    let mut stream = engine.stream(["102527513"]).unwrap();
    let mut record = stream.next().unwrap().unwrap();

    assert_eq!(record.path(), "102/527/513/102527513.json");

    let mut body = String::new();
    record.body().read_to_string(&mut body).unwrap();
    assert_eq!(body, LOCALITY);

    assert!(stream.next().is_none());
    assert_eq!(engine.seen(), 1);
}

#[test]
fn test_include_filter_drops_everything() {
    let dir = fixture_tree();
    let engine = engine_for(dir.path(), "&include=properties.placetype=campus");

    let results: Vec<_> = engine.stream(["102527513"]).unwrap().collect();
    assert!(results.is_empty());
    assert_eq!(engine.seen(), 1);
}

#[test]
fn test_include_filter_selects() {
    let dir = fixture_tree();
    let engine = engine_for(dir.path(), "&include=properties.placetype=locality");

    let paths: Vec<String> = engine
        .stream(["102527513", "85688637"])
        .unwrap()
        .map(|r| r.unwrap().path().to_string())
        .collect();

    // The region record is dropped silently; no element, no error.
    assert_eq!(paths, vec!["102/527/513/102527513.json".to_string()]);
    assert_eq!(engine.seen(), 2);
}

#[test]
fn test_exclude_filter_vetoes() {
    let dir = fixture_tree();
    let engine = engine_for(dir.path(), "&exclude=properties.placetype=region");

    let paths: Vec<String> = engine
        .stream(["102527513", "85688637"])
        .unwrap()
        .map(|r| r.unwrap().path().to_string())
        .collect();

    assert_eq!(paths, vec!["102/527/513/102527513.json".to_string()]);
}

#[test]
fn test_malformed_identifier_yields_parse_error() {
    let dir = fixture_tree();
    let engine = engine_for(dir.path(), "");

    let results: Vec<_> = engine.stream(["wof-102527513"]).unwrap().collect();

    assert_eq!(results.len(), 1);
    let err = results[0].as_ref().unwrap_err();
    assert!(matches!(err, IterateError::Parse { .. }));
    assert_eq!(err.identifier(), "wof-102527513");
    assert_eq!(engine.seen(), 0);
}

#[test]
fn test_missing_record_yields_retrieval_error_and_continues() {
    let dir = fixture_tree();
    let engine = engine_for(dir.path(), "");

    let results: Vec<_> = engine.stream(["404", "102527513"]).unwrap().collect();

    assert_eq!(results.len(), 2);
    assert!(matches!(
        results[0].as_ref().unwrap_err(),
        IterateError::Retrieval { .. }
    ));
    assert_eq!(
        results[1].as_ref().unwrap().path(),
        "102/527/513/102527513.json"
    );
    assert_eq!(engine.seen(), 2);
}

#[test]
fn test_rewind_transparency() {
    let dir = fixture_tree();

    // Bytes as read with no filter configured.
    let plain = engine_for(dir.path(), "");
    let mut record = plain.stream(["102527513"]).unwrap().next().unwrap().unwrap();
    let mut unfiltered = Vec::new();
    record.body().read_to_end(&mut unfiltered).unwrap();

    // A passing filter consumes the whole body before the yield.
    let filtered = engine_for(dir.path(), "&include=properties.placetype=locality");
    let mut record = filtered
        .stream(["102527513"])
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    let mut rewound = Vec::new();
    record.body().read_to_end(&mut rewound).unwrap();

    assert_eq!(unfiltered, rewound);
    assert_eq!(rewound, LOCALITY.as_bytes());
}

#[test]
fn test_order_matches_input() {
    let dir = fixture_tree();
    let engine = engine_for(dir.path(), "");

    let paths: Vec<String> = engine
        .stream(["85688637", "102527513"])
        .unwrap()
        .map(|r| r.unwrap().path().to_string())
        .collect();

    assert_eq!(
        paths,
        vec![
            "856/886/37/85688637.json".to_string(),
            "102/527/513/102527513.json".to_string(),
        ]
    );
}

#[test]
fn test_alternate_identifier_resolves() {
    let dir = fixture_tree();
    write_record(
        dir.path(),
        "102/527/513/102527513-alt-quattroshapes.json",
        r#"{"id":102527513,"properties":{"src":"quattroshapes"}}"#,
    );

    let engine = engine_for(dir.path(), "");
    let mut stream = engine.stream(["102527513-alt-quattroshapes"]).unwrap();
    let record = stream.next().unwrap().unwrap();
    assert_eq!(record.path(), "102/527/513/102527513-alt-quattroshapes.json");
}

#[test]
fn test_progress_readable_from_other_thread() {
    let dir = fixture_tree();
    let engine = engine_for(dir.path(), "");

    assert!(!engine.is_running());

    let mut stream = engine.stream(["102527513", "85688637"]).unwrap();
    let first = stream.next().unwrap();
    assert!(first.is_ok());

    // Observe from a different thread while the stream is mid-flight.
    std::thread::scope(|scope| {
        let observer = scope.spawn(|| (engine.seen(), engine.is_running()));
        let (seen, running) = observer.join().unwrap();
        assert_eq!(seen, 1);
        assert!(running);
    });

    assert!(stream.next().is_some());
    assert!(stream.next().is_none());
    assert!(!engine.is_running());
    assert_eq!(engine.seen(), 2);
}

#[test]
fn test_shutdown_flag_cancels_from_other_thread() {
    let dir = fixture_tree();
    let engine = engine_for(dir.path(), "");

    let mut stream = engine.stream(["102527513", "85688637"]).unwrap();
    assert!(stream.next().is_some());

    let shutdown = engine.shutdown_flag();
    std::thread::scope(|scope| {
        scope
            .spawn(move || shutdown.store(true, Ordering::SeqCst))
            .join()
            .unwrap();
    });

    assert!(stream.next().is_none());
    assert!(!engine.is_running());
    assert_eq!(engine.seen(), 1);
}

#[test]
fn test_concurrent_streams_rejected() {
    let dir = fixture_tree();
    let engine = engine_for(dir.path(), "");

    let live = engine.stream(["102527513"]).unwrap();
    assert!(matches!(engine.stream(["85688637"]), Err(Error::Busy)));

    drop(live);
    let paths: Vec<_> = engine
        .stream(["85688637"])
        .unwrap()
        .map(|r| r.unwrap().path().to_string())
        .collect();
    assert_eq!(paths, vec!["856/886/37/85688637.json".to_string()]);
}

#[test]
fn test_close_then_stream_rejected() {
    let dir = fixture_tree();
    let engine = engine_for(dir.path(), "");

    engine.close().unwrap();
    engine.close().unwrap();
    assert!(matches!(engine.stream(["102527513"]), Err(Error::Closed)));
}

#[test]
fn test_bad_reader_root_fails_construction() {
    let config = IterConfig::parse("reader://?reader=fs:///no/such/root/anywhere").unwrap();
    assert!(RecordIterator::new(config).is_err());
}

#[test]
fn test_bad_filter_rule_fails_construction() {
    let dir = fixture_tree();
    let uri = format!(
        "reader://?reader=fs://{}&include=properties.x=[unclosed",
        dir.path().display()
    );
    let config = IterConfig::parse(&uri).unwrap();
    assert!(RecordIterator::new(config).is_err());
}
