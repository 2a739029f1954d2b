//! POM parsing: the parts a dependency walk needs.
//!
//! Coordinates, parent reference, `<properties>`, `<dependencies>` and
//! `<dependencyManagement>`. Profiles, plugins and licenses are ignored.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

/// Upper bound on nested `${...}` substitution rounds.
const MAX_INTERPOLATION_ROUNDS: usize = 16;

/// A parsed POM (Project Object Model) file.
#[derive(Debug, Clone, Default)]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<PomDependency>,
    pub dependency_management: Vec<PomDependency>,
}

/// Reference to a parent POM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// A dependency declared in a POM file.
#[derive(Debug, Clone, Default)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub optional: bool,
    pub classifier: Option<String>,
    /// `<type>`; absent means `jar`.
    pub type_: Option<String>,
    pub exclusions: Vec<PomExclusion>,
}

impl PomDependency {
    /// Whether this dependency is part of the transitive runtime closure.
    pub fn is_transitive(&self) -> bool {
        !self.optional
            && !matches!(
                self.scope.as_deref(),
                Some("test" | "provided" | "system" | "import")
            )
    }

    /// Whether this dependency ships a jar. `pom`-typed dependencies only
    /// contribute their own dependencies.
    pub fn has_jar(&self) -> bool {
        matches!(self.type_.as_deref().unwrap_or("jar"), "jar" | "bundle")
    }
}

/// An exclusion within a dependency declaration. A missing artifact (or `*`)
/// excludes the whole group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomExclusion {
    pub group_id: String,
    pub artifact_id: Option<String>,
}

impl PomExclusion {
    pub fn matches(&self, group: &str, artifact: &str) -> bool {
        let group_ok = self.group_id == "*" || self.group_id == group;
        let artifact_ok = match self.artifact_id.as_deref() {
            None | Some("*") => true,
            Some(a) => a == artifact,
        };
        group_ok && artifact_ok
    }
}

impl Pom {
    /// Effective group ID (falls back to parent).
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.group_id.as_str()))
    }

    /// Effective version (falls back to parent).
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.version.as_str()))
    }

    fn property(&self, key: &str) -> Option<String> {
        match key {
            "project.groupId" | "pom.groupId" | "groupId" => {
                self.effective_group_id().map(str::to_string)
            }
            "project.artifactId" | "pom.artifactId" | "artifactId" => self.artifact_id.clone(),
            "project.version" | "pom.version" | "version" => {
                self.effective_version().map(str::to_string)
            }
            "project.parent.groupId" => self.parent.as_ref().map(|p| p.group_id.clone()),
            "project.parent.version" => self.parent.as_ref().map(|p| p.version.clone()),
            _ => self.properties.get(key).cloned(),
        }
    }

    /// Substitute `${property}` references. Unknown properties are left as-is.
    pub fn interpolate(&self, input: &str) -> String {
        let mut current = input.to_string();
        for _ in 0..MAX_INTERPOLATION_ROUNDS {
            let mut out = String::with_capacity(current.len());
            let mut rest = current.as_str();
            while let Some(start) = rest.find("${") {
                let Some(len) = rest[start..].find('}') else {
                    break;
                };
                out.push_str(&rest[..start]);
                let key = &rest[start + 2..start + len];
                match self.property(key) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[start..=start + len]),
                }
                rest = &rest[start + len + 1..];
            }
            out.push_str(rest);
            if out == current {
                break;
            }
            current = out;
        }
        current
    }

    /// Interpolate coordinates of every dependency and managed dependency.
    pub fn resolve_properties(&mut self) {
        let snapshot = self.clone();
        for dep in self
            .dependencies
            .iter_mut()
            .chain(self.dependency_management.iter_mut())
        {
            dep.group_id = snapshot.interpolate(&dep.group_id);
            dep.artifact_id = snapshot.interpolate(&dep.artifact_id);
            dep.version = dep.version.as_deref().map(|v| snapshot.interpolate(v));
            dep.classifier = dep.classifier.as_deref().map(|c| snapshot.interpolate(c));
            dep.type_ = dep.type_.as_deref().map(|t| snapshot.interpolate(t));
        }
    }

    /// Inherit properties, coordinates and managed versions from a parent POM.
    /// Values declared in this POM win.
    pub fn apply_parent(&mut self, parent: &Pom) {
        for (k, v) in &parent.properties {
            self.properties
                .entry(k.clone())
                .or_insert_with(|| v.clone());
        }
        if self.group_id.is_none() {
            self.group_id = parent.effective_group_id().map(str::to_string);
        }
        if self.version.is_none() {
            self.version = parent.effective_version().map(str::to_string);
        }
        for managed in &parent.dependency_management {
            let shadowed = self.dependency_management.iter().any(|d| {
                d.group_id == managed.group_id && d.artifact_id == managed.artifact_id
            });
            if !shadowed {
                self.dependency_management.push(managed.clone());
            }
        }
    }

    /// Look up a version from dependency management for a given group:artifact.
    pub fn managed_version(&self, group_id: &str, artifact_id: &str) -> Option<&str> {
        self.dependency_management
            .iter()
            .find(|d| d.group_id == group_id && d.artifact_id == artifact_id)
            .and_then(|d| d.version.as_deref())
    }
}

/// Which list a `<dependency>` element belongs to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum DepList {
    Direct,
    Managed,
}

/// Parse a POM XML string into a `Pom` struct.
pub fn parse_pom(xml: &str) -> miette::Result<Pom> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pom = Pom::default();
    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut dep: Option<(DepList, PomDependency)> = None;
    let mut exclusion: Option<PomExclusion> = None;
    let mut parent: Option<ParentRef> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            jvmdeps_util::errors::JvmDepsError::Generic {
                message: format!("Failed to parse POM XML: {e}"),
            }
        })?;
        match event {
            Event::Start(ref e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                stack.push(tag);
                text.clear();
                match stack_path(&stack).as_str() {
                    "project/dependencies/dependency" => {
                        dep = Some((DepList::Direct, PomDependency::default()))
                    }
                    "project/dependencyManagement/dependencies/dependency" => {
                        dep = Some((DepList::Managed, PomDependency::default()))
                    }
                    "project/parent" => parent = Some(ParentRef::default()),
                    p if p.ends_with("dependency/exclusions/exclusion") && dep.is_some() => {
                        exclusion = Some(PomExclusion::default())
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                text = e.unescape().unwrap_or_default().trim().to_string();
            }
            Event::End(_) => {
                let path = stack_path(&stack);
                let leaf = stack.last().map(String::as_str).unwrap_or_default();
                let value = std::mem::take(&mut text);

                if let Some(ref mut excl) = exclusion {
                    if path.ends_with("exclusion") {
                        if let Some((_, ref mut d)) = dep {
                            d.exclusions.push(std::mem::take(excl));
                        }
                        exclusion = None;
                    } else {
                        match leaf {
                            "groupId" => excl.group_id = value,
                            "artifactId" => excl.artifact_id = Some(value),
                            _ => {}
                        }
                    }
                } else if let Some((list, ref mut d)) = dep {
                    if path.ends_with("dependencies/dependency") {
                        let finished = std::mem::take(d);
                        match list {
                            DepList::Direct => pom.dependencies.push(finished),
                            DepList::Managed => pom.dependency_management.push(finished),
                        }
                        dep = None;
                    } else if path.ends_with(&format!("dependency/{leaf}")) {
                        match leaf {
                            "groupId" => d.group_id = value,
                            "artifactId" => d.artifact_id = value,
                            "version" => d.version = Some(value),
                            "scope" => d.scope = Some(value),
                            "optional" => d.optional = value == "true",
                            "classifier" => d.classifier = Some(value).filter(|c| !c.is_empty()),
                            "type" => d.type_ = Some(value).filter(|t| !t.is_empty()),
                            _ => {}
                        }
                    }
                } else if path == "project/parent" {
                    pom.parent = parent.take();
                } else if let Some(ref mut p) = parent {
                    match path.as_str() {
                        "project/parent/groupId" => p.group_id = value,
                        "project/parent/artifactId" => p.artifact_id = value,
                        "project/parent/version" => p.version = value,
                        _ => {}
                    }
                } else if stack.len() == 3 && stack[1] == "properties" {
                    pom.properties.insert(leaf.to_string(), value);
                } else if stack.len() == 2 {
                    match leaf {
                        "groupId" => pom.group_id = Some(value),
                        "artifactId" => pom.artifact_id = Some(value),
                        "version" => pom.version = Some(value),
                        _ => {}
                    }
                }
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pom)
}

fn stack_path(stack: &[String]) -> String {
    stack.join("/")
}
