//! Module and artifact coordinates.

use std::fmt;

/// A library identity independent of the chosen version.
///
/// Two coordinates belong to the same module when group, artifact and
/// classifier all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Module {
    pub group: String,
    pub artifact: String,
    pub classifier: Option<String>,
}

impl Module {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier.filter(|c| !c.is_empty());
        self
    }

    /// Parse `"group:artifact"` or `"group:artifact:classifier"`.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return None;
        }
        match parts.as_slice() {
            [group, artifact] => Some(Self::new(*group, *artifact)),
            [group, artifact, classifier] => {
                Some(Self::new(*group, *artifact).with_classifier(Some(classifier.to_string())))
            }
            _ => None,
        }
    }

    /// The same module with the classifier dropped.
    pub fn base(&self) -> Module {
        Module::new(self.group.clone(), self.artifact.clone())
    }

    /// Pin this module to a concrete version.
    pub fn at(&self, version: impl Into<String>) -> Coordinate {
        Coordinate {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            version: version.into(),
            classifier: self.classifier.clone(),
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)?;
        if let Some(ref c) = self.classifier {
            write!(f, ":{c}")?;
        }
        Ok(())
    }
}

/// A concrete library artifact: module plus version.
///
/// The `Display` form `group:artifact:version[:classifier]` is the dependency
/// identity string used for artifact deduplication and output ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
}

impl Coordinate {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier.filter(|c| !c.is_empty());
        self
    }

    /// Parse `"group:artifact:version"` or `"group:artifact:version:classifier"`.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return None;
        }
        match parts.as_slice() {
            [group, artifact, version] => Some(Self::new(*group, *artifact, *version)),
            [group, artifact, version, classifier] => Some(
                Self::new(*group, *artifact, *version)
                    .with_classifier(Some(classifier.to_string())),
            ),
            _ => None,
        }
    }

    pub fn module(&self) -> Module {
        Module {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            classifier: self.classifier.clone(),
        }
    }

    /// File name of the JAR in Maven repository layout.
    pub fn jar_file_name(&self) -> String {
        match self.classifier {
            Some(ref c) => format!("{}-{}-{c}.jar", self.artifact, self.version),
            None => format!("{}-{}.jar", self.artifact, self.version),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(ref c) = self.classifier {
            write!(f, ":{c}")?;
        }
        Ok(())
    }
}
