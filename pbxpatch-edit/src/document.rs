//! Dual representation of a descriptor.
//!
//! [`Document`] is the authoritative, mutable line sequence; it round-trips the
//! input byte for byte. [`Snapshot`] is a read-only view derived from it (the
//! decoded object graph plus the section index) and must be recomputed after
//! every mutation.

use crate::decode::{GraphDecoder, OpenStepDecoder, graph_from_tree};
use crate::error::{EditError, EditResult};
use crate::locator::{Section, scan_sections};
use pbxpatch_types::isa::Isa;
use pbxpatch_types::record::{ObjectId, ProjectGraph};
use std::collections::BTreeMap;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    trailing_newline: bool,
    /// The input used `\r\n`; inserted lines follow suit.
    crlf: bool,
}

impl Document {
    /// Split on `\n` only; `\r` stays part of the line so CRLF input survives.
    pub fn from_text(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = if text.is_empty() {
            Vec::new()
        } else {
            body.split('\n').map(str::to_string).collect()
        };
        Self {
            lines,
            trailing_newline,
            crlf: text.contains("\r\n"),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Insert `new` so that its first line ends up at index `at`.
    pub fn insert_lines(&mut self, at: usize, new: Vec<String>) -> usize {
        let count = new.len();
        let at = at.min(self.lines.len());
        let crlf = self.crlf;
        self.lines.splice(
            at..at,
            new.into_iter().map(|mut line| {
                if crlf && !line.ends_with('\r') {
                    line.push('\r');
                }
                line
            }),
        );
        count
    }

    pub fn remove_lines(&mut self, range: Range<usize>) -> usize {
        let count = range.len();
        self.lines.drain(range);
        count
    }

    pub fn to_text(&self) -> String {
        let mut out = self.lines.join("\n");
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }

    pub fn snapshot(&self) -> EditResult<Snapshot> {
        self.snapshot_with(&OpenStepDecoder)
    }

    /// Derive both views and check they name the same records.
    pub fn snapshot_with(&self, decoder: &dyn GraphDecoder) -> EditResult<Snapshot> {
        let sections = scan_sections(&self.lines)?;
        let tree = decoder.decode(&self.to_text())?;
        let graph = graph_from_tree(&tree)?;
        check_agreement(&graph, &sections)?;
        Ok(Snapshot { graph, sections })
    }
}

/// Read-only decision view of a [`Document`] at one point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    graph: ProjectGraph,
    sections: Vec<Section>,
}

impl Snapshot {
    pub fn graph(&self) -> &ProjectGraph {
        &self.graph
    }

    /// Sections in text order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

fn check_agreement(graph: &ProjectGraph, sections: &[Section]) -> EditResult<()> {
    let mut declared: BTreeMap<&ObjectId, &Isa> = BTreeMap::new();
    for section in sections {
        for decl in &section.records {
            if let Some(previous) = declared.insert(&decl.id, &section.isa) {
                return Err(EditError::malformed(format!(
                    "{} is declared twice (sections `{previous}` and `{}`)",
                    decl.id, section.isa
                )));
            }
        }
    }

    for record in graph.records.values() {
        match declared.get(&record.id) {
            Some(isa) if **isa == record.isa => {}
            Some(isa) => {
                return Err(EditError::LocatorMismatch {
                    id: record.id.to_string(),
                    isa: record.isa.to_string(),
                    message: format!("is declared inside section `{isa}`"),
                });
            }
            None => {
                return Err(EditError::LocatorMismatch {
                    id: record.id.to_string(),
                    isa: record.isa.to_string(),
                    message: "has no declaration line inside a matching section".to_string(),
                });
            }
        }
    }

    if let Some((id, isa)) = declared.iter().find(|(id, _)| graph.get(id).is_none()) {
        return Err(EditError::LocatorMismatch {
            id: id.to_string(),
            isa: isa.to_string(),
            message: "is declared in the text but missing from the object graph".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SMALL: &str = "// !$*UTF8*$!\n{\n\tobjects = {\n\n\
/* Begin PBXBuildFile section */\n\
\t\tB1 /* a.m in Sources */ = {isa = PBXBuildFile; fileRef = F1 /* a.m */; };\n\
/* End PBXBuildFile section */\n\n\
/* Begin PBXFileReference section */\n\
\t\tF1 /* a.m */ = {isa = PBXFileReference; path = a.m; sourceTree = \"<group>\"; };\n\
/* End PBXFileReference section */\n\
\t};\n\trootObject = F1;\n}\n";

    #[test]
    fn text_round_trips_exactly() {
        for text in [SMALL, "", "a", "a\n", "a\r\nb\r\n", "\n\n"] {
            assert_eq!(Document::from_text(text).to_text(), text);
        }
    }

    #[test]
    fn insert_and_remove_keep_other_lines() {
        let mut doc = Document::from_text("a\nb\nc\n");
        doc.insert_lines(1, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(doc.to_text(), "a\nx\ny\nb\nc\n");
        doc.remove_lines(1..3);
        assert_eq!(doc.to_text(), "a\nb\nc\n");
    }

    #[test]
    fn inserted_lines_follow_crlf_input() {
        let mut doc = Document::from_text("a\r\nb\r\n");
        doc.insert_lines(1, vec!["x".to_string(), String::new()]);
        assert_eq!(doc.to_text(), "a\r\nx\r\n\r\nb\r\n");
    }

    #[test]
    fn snapshot_agrees_on_identifiers() {
        let snapshot = Document::from_text(SMALL).snapshot().expect("snapshot");
        assert_eq!(snapshot.sections().len(), 2);
        assert_eq!(snapshot.graph().records.len(), 2);
        assert!(snapshot.graph().contains(&ObjectId::from("B1"), &Isa::BuildFile));
    }

    #[test]
    fn record_outside_its_section_is_a_mismatch() {
        let text = SMALL.replace(
            "/* End PBXFileReference section */\n",
            "/* End PBXFileReference section */\n\t\tX1 = {isa = PBXGroup; };\n",
        );
        let err = Document::from_text(&text).snapshot().unwrap_err();
        assert!(
            matches!(err, EditError::LocatorMismatch { ref id, .. } if id == "X1"),
            "{err:?}"
        );
    }

    #[test]
    fn record_in_wrong_section_is_a_mismatch() {
        let text = SMALL.replace("isa = PBXBuildFile", "isa = PBXGroup");
        let err = Document::from_text(&text).snapshot().unwrap_err();
        assert!(matches!(err, EditError::LocatorMismatch { .. }), "{err:?}");
    }

    #[test]
    fn undecodable_text_is_malformed() {
        let text = SMALL.replace("path = a.m;", "path = a.m");
        let err = Document::from_text(&text).snapshot().unwrap_err();
        assert!(matches!(err, EditError::MalformedDocument { .. }), "{err:?}");
    }
}
