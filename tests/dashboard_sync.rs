use std::path::Path;

use imdb_pipeline::{config::Settings, dashboard, pipeline};

fn settings(output: &Path, dash: &Path) -> Settings {
    Settings {
        contact_email: "test@example.com".into(),
        chart_url: "https://example.invalid/chart".into(),
        request_timeout_secs: 1,
        output_dir: output.to_path_buf(),
        dashboard_dir: dash.to_path_buf(),
    }
}

#[test]
fn missing_source_is_a_clean_skip() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path(), &dir.path().join("imdb-dashboard"));

    let copies = dashboard::sync(&settings).unwrap();
    assert!(copies.is_empty());
    assert!(!dir.path().join("imdb-dashboard").exists());
}

#[test]
fn sync_creates_directories_and_identical_copies() {
    let dir = tempfile::tempdir().unwrap();
    let dash = dir.path().join("imdb-dashboard");
    let settings = settings(dir.path(), &dash);

    let payload = br#"{"records":[],"summary":{"n_records":0,"anomalies_counts":{}}}"#;
    std::fs::write(dir.path().join(pipeline::FINAL_JSON), payload).unwrap();

    let copies = dashboard::sync(&settings).unwrap();
    assert_eq!(copies.len(), 2);
    assert_eq!(copies[0], dash.join("src").join(pipeline::FINAL_JSON));
    assert_eq!(copies[1], dash.join("public").join(pipeline::FINAL_JSON));
    for copy in &copies {
        assert_eq!(std::fs::read(copy).unwrap(), payload.to_vec());
    }
}

#[test]
fn sync_overwrites_stale_copies() {
    let dir = tempfile::tempdir().unwrap();
    let dash = dir.path().join("imdb-dashboard");
    let settings = settings(dir.path(), &dash);

    std::fs::create_dir_all(dash.join("public")).unwrap();
    std::fs::write(dash.join("public").join(pipeline::FINAL_JSON), b"stale").unwrap();
    std::fs::write(dir.path().join(pipeline::FINAL_JSON), b"fresh").unwrap();

    dashboard::sync(&settings).unwrap();
    assert_eq!(
        std::fs::read(dash.join("public").join(pipeline::FINAL_JSON)).unwrap(),
        b"fresh".to_vec()
    );
}
