use restsnap_config::{ComparisonMode, ConfigFile, ConfigOverrides, RunConfig};
use restsnap_core::TextEncoding;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_json_config_round_trip_into_run_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("restsnap.json");
    std::fs::write(
        &path,
        r#"{
            "dirs": {
                "requests": "data/requests",
                "responses": "data/responses",
                "samples": "data/samples",
                "errors": "data/errors"
            },
            "layout": { "spec": "json", "body": "body" },
            "encoding": "utf8",
            "timeout_secs": 15
        }"#,
    )
    .unwrap();

    let file = ConfigFile::load(&path).unwrap();
    let config = RunConfig::resolve(Some(file), ConfigOverrides::default()).unwrap();

    assert_eq!(config.dirs.requests, dir.path().join("data/requests"));
    assert_eq!(config.dirs.errors, dir.path().join("data/errors"));
    assert_eq!(config.layout.spec, "json");
    assert_eq!(config.layout.body, "body");
    assert_eq!(config.layout.capture, "cnt");
    assert_eq!(config.encoding, TextEncoding::Utf8);
    assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    assert_eq!(config.mode, ComparisonMode::Full);
}

#[test]
fn test_layout_collision_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("restsnap.yaml");
    std::fs::write(
        &path,
        "dirs:\n  requests: r\n  responses: o\n  samples: s\n  errors: e\nlayout:\n  sample_meta: cnt\n",
    )
    .unwrap();

    let file = ConfigFile::load(&path).unwrap();
    assert!(RunConfig::resolve(Some(file), ConfigOverrides::default()).is_err());
}
