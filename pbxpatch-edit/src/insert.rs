//! Order-preserving insertion of records and references.
//!
//! All positions are computed from a [`Snapshot`] of the same [`Document`]
//! revision; each call performs exactly one contiguous insertion, so callers
//! must take a fresh snapshot before the next one.

use crate::document::{Document, Snapshot};
use crate::error::{EditError, EditResult};
use crate::locator::nesting_delta;
use pbxpatch_types::isa::Isa;
use pbxpatch_types::record::ObjectId;
use tracing::debug;

/// Where [`insert_record`] puts a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Immediately before the first declaration with a greater identifier.
    BeforeRecord { next: ObjectId, line: usize },
    /// Immediately before the section's end marker.
    SectionEnd { line: usize },
    /// A new section, placed by section name.
    NewSection { line: usize, blank_before: bool },
}

/// `<id> /* <comment> */,`
pub fn reference_text(id: &ObjectId, comment: &str) -> String {
    format!("{id} /* {comment} */,")
}

/// Leading whitespace of `line`.
pub fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

pub fn placement_for(
    doc: &Document,
    snapshot: &Snapshot,
    isa: &Isa,
    id: &ObjectId,
) -> EditResult<Placement> {
    if let Some(section) = snapshot.find_section(isa) {
        return Ok(match section.records.iter().find(|d| &d.id > id) {
            Some(next) => Placement::BeforeRecord {
                next: next.id.clone(),
                line: next.line,
            },
            None => Placement::SectionEnd { line: section.end },
        });
    }

    if let Some(next) = snapshot.sections().iter().find(|s| &s.isa > isa) {
        return Ok(Placement::NewSection {
            line: next.begin,
            blank_before: false,
        });
    }

    let after = match snapshot.sections().last() {
        Some(last) => last.end,
        None => doc
            .lines()
            .iter()
            .position(|l| l.trim() == "objects = {")
            .ok_or_else(|| EditError::malformed("no `objects = {` line to anchor a new section"))?,
    };
    Ok(Placement::NewSection {
        line: after + 1,
        blank_before: true,
    })
}

/// Insert a record's literal lines into the section for `isa`, keeping the
/// section in ascending identifier order and creating the section if needed.
///
/// Returns the number of lines inserted; `0` when `id` is already declared.
pub fn insert_record(
    doc: &mut Document,
    snapshot: &Snapshot,
    isa: &Isa,
    id: &ObjectId,
    block: &[String],
) -> EditResult<usize> {
    if snapshot.find_section(isa).is_some_and(|s| s.declares(id)) {
        return Ok(0);
    }

    let placement = placement_for(doc, snapshot, isa, id)?;
    debug!(%isa, %id, ?placement, "insert record");

    let inserted = match placement {
        Placement::BeforeRecord { line, .. } | Placement::SectionEnd { line } => {
            doc.insert_lines(line, block.to_vec())
        }
        Placement::NewSection { line, blank_before } => {
            let mut lines = Vec::with_capacity(block.len() + 3);
            if blank_before {
                lines.push(String::new());
            }
            lines.push(isa.begin_marker());
            lines.extend(block.iter().cloned());
            lines.push(isa.end_marker());
            if !blank_before {
                lines.push(String::new());
            }
            doc.insert_lines(line, lines)
        }
    };
    Ok(inserted)
}

/// Add `entry` to the reference list `field` of record `owner`.
///
/// With the field present the entry goes right after its `field = (` line;
/// order inside the list is not significant, only uniqueness. With the field
/// absent the whole list is added right after the declaration line.
///
/// Returns the number of lines inserted; `0` when the entry is already listed.
pub fn insert_reference(
    doc: &mut Document,
    snapshot: &Snapshot,
    owner_isa: &Isa,
    owner: &ObjectId,
    field: &str,
    entry: &ObjectId,
    comment: &str,
) -> EditResult<usize> {
    let record = snapshot
        .graph()
        .get(owner)
        .ok_or_else(|| EditError::RecordNotFound {
            section: owner_isa.to_string(),
            id: owner.to_string(),
        })?;
    if record.references(field, entry) {
        return Ok(0);
    }

    let range = snapshot.record_range(owner_isa, owner)?;
    let text = reference_text(entry, comment);
    let field_not_found = || EditError::FieldNotFound {
        id: owner.to_string(),
        field: field.to_string(),
    };

    if record.has_field(field) {
        let anchor = format!("{field} = (");
        let line = (range.start..=range.end)
            .find(|&i| doc.lines()[i].trim() == anchor)
            .ok_or_else(field_not_found)?;
        let indent = format!("{}\t", indentation(&doc.lines()[line]));
        debug!(%owner, field, %entry, line, "insert reference");
        return Ok(doc.insert_lines(line + 1, vec![format!("{indent}{text}")]));
    }

    let declaration = &doc.lines()[range.start];
    if nesting_delta(declaration) <= 0 {
        // Single-line record: there is no body line to put the field on.
        return Err(field_not_found());
    }
    let indent = format!("{}\t", indentation(declaration));
    debug!(%owner, field, %entry, "insert reference list");
    Ok(doc.insert_lines(
        range.start + 1,
        vec![
            format!("{indent}{field} = ("),
            format!("{indent}\t{text}"),
            format!("{indent});"),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn indentation_is_leading_whitespace() {
        assert_eq!(indentation("\t\t\tfiles = ("), "\t\t\t");
        assert_eq!(indentation("x"), "");
    }

    #[test]
    fn reference_text_has_comment_and_comma() {
        assert_eq!(
            reference_text(&ObjectId::from("AB"), "Pkg in Frameworks"),
            "AB /* Pkg in Frameworks */,"
        );
    }
}
