//! Build-file rendering.

use std::fmt::Write;

use jvmdeps_resolver::index::ResolutionIndex;

use crate::artifacts::ArtifactOutput;

/// Turns the artifact outputs into the text of a build file.
///
/// Rendering must be a pure function of its inputs.
pub trait BuildFileRenderer {
    fn render(&self, outputs: &[ArtifactOutput], index: &ResolutionIndex<'_>) -> String;
}

/// Renders a Starlark `list_dependencies()` macro for Bazel.
#[derive(Debug, Default, Clone, Copy)]
pub struct StarlarkRenderer;

impl BuildFileRenderer for StarlarkRenderer {
    fn render(&self, outputs: &[ArtifactOutput], index: &ResolutionIndex<'_>) -> String {
        let mut out = String::new();
        out.push_str("# Generated by jvmdeps. Do not edit.\n\n");
        out.push_str("def list_dependencies():\n");
        out.push_str("    return [\n");
        for output in outputs {
            out.push_str("        {\n");
            field(&mut out, "artifact", &output.id());
            field(&mut out, "sha256", &output.sha256);
            if let Some(url) = &output.url {
                field(&mut out, "url", url);
            }
            if let Some(repo) = &output.repository {
                field(&mut out, "repository", repo);
            }
            let deps = index.dependencies_of(&output.coordinate);
            if deps.is_empty() {
                out.push_str("            \"deps\": [],\n");
            } else {
                out.push_str("            \"deps\": [\n");
                for dep in deps {
                    let _ = writeln!(out, "                {},", quote(&dep.to_string()));
                }
                out.push_str("            ],\n");
            }
            out.push_str("        },\n");
        }
        out.push_str("    ]\n");
        out
    }
}

fn field(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "            \"{key}\": {},", quote(value));
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use jvmdeps_core::coordinate::Coordinate;
    use jvmdeps_core::declared::DeclaredSet;
    use jvmdeps_resolver::adapter::ResolvedGraph;

    fn coord(s: &str) -> Coordinate {
        Coordinate::parse(s).unwrap()
    }

    fn output(id: &str, sha: &str) -> ArtifactOutput {
        ArtifactOutput {
            coordinate: coord(id),
            repository: Some("central".into()),
            url: None,
            path: "/tmp/x.jar".into(),
            sha256: sha.into(),
        }
    }

    #[test]
    fn renders_dependencies_from_index() {
        let app = coord("a:app:1.0");
        let mut graph = ResolvedGraph::new(app.clone());
        graph.insert(&app.module(), coord("c:common:1.1"));
        let graphs = vec![graph];
        let declared = DeclaredSet::default();
        let index = ResolutionIndex::build(&graphs, &declared);

        let text = StarlarkRenderer.render(
            &[output("a:app:1.0", "aa"), output("c:common:1.1", "cc")],
            &index,
        );
        let expected = r#"# Generated by jvmdeps. Do not edit.

def list_dependencies():
    return [
        {
            "artifact": "a:app:1.0",
            "sha256": "aa",
            "repository": "central",
            "deps": [
                "c:common:1.1",
            ],
        },
        {
            "artifact": "c:common:1.1",
            "sha256": "cc",
            "repository": "central",
            "deps": [],
        },
    ]
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let graphs = vec![ResolvedGraph::new(coord("a:app:1.0"))];
        let declared = DeclaredSet::default();
        let index = ResolutionIndex::build(&graphs, &declared);
        let outputs = [output("a:app:1.0", "aa")];
        assert_eq!(
            StarlarkRenderer.render(&outputs, &index),
            StarlarkRenderer.render(&outputs, &index)
        );
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }
}
