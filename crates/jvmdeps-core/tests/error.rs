use std::path::PathBuf;

use jvmdeps_core::declared::SourcePosition;
use jvmdeps_core::error::{ErrorSet, PipelineError, Stage};

#[test]
fn unknown_module_override_mentions_position() {
    let err = PipelineError::UnknownModuleOverride {
        dependency: "org.example:app".to_string(),
        module: "org.x:missing".to_string(),
        position: Some(SourcePosition {
            file: PathBuf::from("jvmdeps.toml"),
            line: 4,
            column: 1,
        }),
    };
    assert_eq!(
        err.to_string(),
        "jvmdeps.toml:4:1: force-versions of org.example:app references undeclared module org.x:missing"
    );
}

#[test]
fn conflict_without_position_says_so() {
    let err = PipelineError::ConflictingTransitiveVersion {
        module: "org.common:common".to_string(),
        unexpected: vec!["1.1".to_string(), "1.2".to_string()],
        declared: vec![],
        roots: vec!["app:app:1.0".to_string()],
        position: None,
    };
    let text = err.to_string();
    assert!(text.starts_with("<no position>: org.common:common"), "got: {text}");
    assert!(text.contains("1.1, 1.2"));
    assert!(text.contains("declared: []"));
}

#[test]
fn error_set_sorts_and_counts() {
    let set = ErrorSet::new(
        Stage::Fetch,
        vec![
            PipelineError::ArtifactFetchFailed {
                artifact: "z:z:1".to_string(),
                message: "404".to_string(),
            },
            PipelineError::ArtifactFetchFailed {
                artifact: "a:a:1".to_string(),
                message: "404".to_string(),
            },
        ],
    );
    assert_eq!(set.len(), 2);
    assert_eq!(set.to_string(), "artifact fetch failed with 2 error(s)");
    let first = set.iter().next().unwrap().to_string();
    assert!(first.contains("a:a:1"));
}

#[test]
fn error_set_keeps_identical_failures() {
    let failure = PipelineError::Interrupted {
        task: "fetch org.example:lib:1.0".to_string(),
    };
    let set = ErrorSet::new(Stage::Fetch, vec![failure.clone(), failure]);
    assert_eq!(set.len(), 2);
}
