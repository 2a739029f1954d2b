//! Forced-version validation for one declared dependency.

use std::collections::BTreeMap;

use jvmdeps_core::coordinate::Module;
use jvmdeps_core::declared::{DeclaredDependency, DeclaredSet};
use jvmdeps_core::error::PipelineError;
use jvmdeps_util::errors::collect_all;

/// Turn `dependency.force_versions` into concrete `(module, version)` pins.
///
/// Every override is checked; all failures come back together. A target must
/// be declared, and the requested version must be one of its declared
/// versions or an alias for one.
pub fn validate_overrides(
    dependency: &DeclaredDependency,
    declared: &DeclaredSet,
) -> Result<BTreeMap<Module, String>, Vec<PipelineError>> {
    let checked = dependency
        .force_versions
        .iter()
        .map(|(target, requested)| resolve_override(dependency, declared, target, requested));
    collect_all(checked).map(|pins| pins.into_iter().collect())
}

fn resolve_override(
    dependency: &DeclaredDependency,
    declared: &DeclaredSet,
    target: &Module,
    requested: &str,
) -> Result<(Module, String), PipelineError> {
    let Some(target_decl) = declared.get(target) else {
        return Err(PipelineError::UnknownModuleOverride {
            dependency: dependency.module.to_string(),
            module: target.to_string(),
            position: dependency.position.clone(),
        });
    };
    match target_decl.versions.resolve(requested) {
        Some(version) => Ok((target.clone(), version.to_string())),
        None => Err(PipelineError::UnknownVersionOverride {
            dependency: dependency.module.to_string(),
            module: target.to_string(),
            version: requested.to_string(),
            position: dependency.position.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jvmdeps_core::declared::{DeclaredVersions, SourcePosition};

    fn guava() -> DeclaredDependency {
        let mut versions = DeclaredVersions::single("31.1-jre");
        versions.insert("next", "32.0-jre");
        DeclaredDependency::new(Module::new("com.google.guava", "guava"), versions)
    }

    fn with_overrides(overrides: &[(&str, &str)]) -> DeclaredDependency {
        let mut dep = DeclaredDependency::new(
            Module::new("org.example", "app"),
            DeclaredVersions::single("1.0"),
        );
        dep.position = Some(SourcePosition {
            file: "jvmdeps.toml".into(),
            line: 4,
            column: 1,
        });
        for (module, version) in overrides {
            dep.force_versions
                .insert(Module::parse(module).unwrap(), version.to_string());
        }
        dep
    }

    #[test]
    fn aliases_and_concrete_versions_resolve() {
        let app = with_overrides(&[("com.google.guava:guava", "next")]);
        let set = DeclaredSet::new(vec![app.clone(), guava()]);
        let pins = validate_overrides(&app, &set).unwrap();
        assert_eq!(
            pins.get(&Module::new("com.google.guava", "guava")).map(String::as_str),
            Some("32.0-jre")
        );

        let app = with_overrides(&[("com.google.guava:guava", "31.1-jre")]);
        let set = DeclaredSet::new(vec![app.clone(), guava()]);
        assert!(validate_overrides(&app, &set).is_ok());
    }

    #[test]
    fn no_overrides_is_empty() {
        let app = with_overrides(&[]);
        let set = DeclaredSet::new(vec![app.clone()]);
        assert!(validate_overrides(&app, &set).unwrap().is_empty());
    }

    #[test]
    fn every_failure_is_reported() {
        let app = with_overrides(&[
            ("org.missing:thing", "1.0"),
            ("com.google.guava:guava", "99"),
        ]);
        let set = DeclaredSet::new(vec![app.clone(), guava()]);
        let errors = validate_overrides(&app, &set).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(
            e,
            PipelineError::UnknownModuleOverride { dependency, module, position: Some(_) }
                if dependency == "org.example:app" && module == "org.missing:thing"
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            PipelineError::UnknownVersionOverride { version, .. } if version == "99"
        )));
    }

    #[test]
    fn classifier_target_falls_back_to_base_declaration() {
        let app = with_overrides(&[("com.google.guava:guava:sources", "next")]);
        let set = DeclaredSet::new(vec![app.clone(), guava()]);
        let pins = validate_overrides(&app, &set).unwrap();
        assert_eq!(pins.len(), 1);
    }
}
