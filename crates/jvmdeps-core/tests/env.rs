use jvmdeps_core::env::{interpolate, load_env_file};
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn load_env_file_skips_comments_and_blank_lines() {
    let mut tmp = NamedTempFile::new().unwrap();
    write!(tmp, "# comment\nUSER=ci\n\n TOKEN  =  abc \n").unwrap();
    tmp.flush().unwrap();

    let env = load_env_file(tmp.path()).unwrap();
    assert_eq!(env.get("USER"), Some(&"ci".to_string()));
    assert_eq!(env.get("TOKEN"), Some(&"abc".to_string()));
    assert_eq!(env.len(), 2);
}

#[test]
fn load_env_file_missing_is_empty() {
    let env = load_env_file(std::path::Path::new("/nonexistent/.jvmdeps.env")).unwrap();
    assert!(env.is_empty());
}

#[test]
fn interpolate_prefers_overrides() {
    let mut vars = BTreeMap::new();
    vars.insert("NEXUS_USER".to_string(), "robot".to_string());
    assert_eq!(interpolate("user=${env:NEXUS_USER}", &vars), "user=robot");
}

#[test]
fn interpolate_unknown_becomes_empty() {
    let vars = BTreeMap::new();
    assert_eq!(
        interpolate("${env:JVMDEPS_SURELY_UNSET_VAR}x", &vars),
        "x"
    );
}

#[test]
fn interpolate_does_not_rescan_substituted_values() {
    let mut vars = BTreeMap::new();
    vars.insert("A".to_string(), "${env:A}".to_string());
    assert_eq!(interpolate("${env:A}", &vars), "${env:A}");
}
