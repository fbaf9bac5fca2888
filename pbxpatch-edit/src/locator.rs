//! Section and record location over the line view.
//!
//! A section is the run of lines between `/* Begin <isa> section */` and
//! `/* End <isa> section */`. Inside it, a record declaration is a line of the
//! form `<id> [/* comment */] = {` at nesting depth zero.

use crate::decode::is_unquoted_char;
use crate::document::Snapshot;
use crate::error::{EditError, EditResult};
use pbxpatch_types::isa::Isa;
use pbxpatch_types::record::ObjectId;

const BEGIN_PREFIX: &str = "/* Begin ";
const END_PREFIX: &str = "/* End ";
const MARKER_SUFFIX: &str = " section */";

/// Inclusive range of line indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub id: ObjectId,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub isa: Isa,
    /// Line of the begin marker.
    pub begin: usize,
    /// Line of the end marker.
    pub end: usize,
    /// Declarations in text order.
    pub records: Vec<Declaration>,
}

impl Section {
    pub fn declares(&self, id: &ObjectId) -> bool {
        self.records.iter().any(|d| &d.id == id)
    }

    pub fn range(&self) -> LineRange {
        LineRange {
            start: self.begin,
            end: self.end,
        }
    }
}

impl Snapshot {
    pub fn find_section(&self, isa: &Isa) -> Option<&Section> {
        self.sections().iter().find(|s| &s.isa == isa)
    }

    /// Line range of a section's markers; `SectionNotFound` when absent.
    ///
    /// Callers that may need to create the section use [`Snapshot::find_section`].
    pub fn section_range(&self, isa: &Isa) -> EditResult<LineRange> {
        self.find_section(isa)
            .map(Section::range)
            .ok_or_else(|| EditError::SectionNotFound {
                section: isa.to_string(),
            })
    }

    /// Lines owned by one record: its declaration line through the line before
    /// the next declaration, or through the line before the end marker when it
    /// is the last record of the section.
    pub fn record_range(&self, isa: &Isa, id: &ObjectId) -> EditResult<LineRange> {
        let section = self
            .find_section(isa)
            .ok_or_else(|| EditError::SectionNotFound {
                section: isa.to_string(),
            })?;

        let pos = section
            .records
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| EditError::RecordNotFound {
                section: isa.to_string(),
                id: id.to_string(),
            })?;

        let start = section.records[pos].line;
        let end = section
            .records
            .get(pos + 1)
            .map_or(section.end, |next| next.line)
            - 1;
        Ok(LineRange { start, end })
    }
}

/// Scan the line view for sections and their declarations.
pub(crate) fn scan_sections(lines: &[String]) -> EditResult<Vec<Section>> {
    let mut sections: Vec<Section> = Vec::new();
    let mut open: Option<Section> = None;
    let mut depth = 0i64;

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if let Some(name) = marker_name(trimmed, BEGIN_PREFIX) {
            if let Some(current) = &open {
                return Err(EditError::malformed(format!(
                    "section `{name}` begins at line {} before section `{}` (line {}) ends",
                    idx + 1,
                    current.isa,
                    current.begin + 1
                )));
            }
            let isa = Isa::from(name);
            if sections.iter().any(|s| s.isa == isa) {
                return Err(EditError::malformed(format!(
                    "section `{name}` appears twice (line {})",
                    idx + 1
                )));
            }
            open = Some(Section {
                isa,
                begin: idx,
                end: idx,
                records: Vec::new(),
            });
            depth = 0;
            continue;
        }

        if let Some(name) = marker_name(trimmed, END_PREFIX) {
            match open.take() {
                Some(mut section) if section.isa.as_str() == name => {
                    section.end = idx;
                    sections.push(section);
                }
                Some(section) => {
                    return Err(EditError::malformed(format!(
                        "end marker for `{name}` at line {} does not close section `{}` (line {})",
                        idx + 1,
                        section.isa,
                        section.begin + 1
                    )));
                }
                None => {
                    return Err(EditError::malformed(format!(
                        "end marker for `{name}` at line {} has no begin marker",
                        idx + 1
                    )));
                }
            }
            continue;
        }

        if let Some(section) = open.as_mut() {
            if depth == 0
                && let Some(id) = declared_id(line)
            {
                section.records.push(Declaration {
                    id: ObjectId::from(id),
                    line: idx,
                });
            }
            depth += nesting_delta(line);
        }
    }

    if let Some(section) = open {
        return Err(EditError::malformed(format!(
            "section `{}` begins at line {} but has no end marker",
            section.isa,
            section.begin + 1
        )));
    }

    Ok(sections)
}

fn marker_name<'a>(trimmed: &'a str, prefix: &str) -> Option<&'a str> {
    trimmed.strip_prefix(prefix)?.strip_suffix(MARKER_SUFFIX)
}

/// `<id> [/* comment */] = {` -> `<id>`
pub(crate) fn declared_id(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let end = line.find(|c: char| !is_unquoted_char(c))?;
    let (id, rest) = line.split_at(end);
    if id.is_empty() || id.contains("/*") {
        return None;
    }

    let mut rest = rest.trim_start();
    if let Some(after) = rest.strip_prefix("/*") {
        let close = after.find("*/")?;
        rest = after[close + 2..].trim_start();
    }
    let rest = rest.strip_prefix('=')?.trim_start();
    rest.starts_with('{').then_some(id)
}

/// Net change of `{`/`(` nesting on one line, ignoring strings and comments.
pub(crate) fn nesting_delta(line: &str) -> i64 {
    let mut delta = 0;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                while let Some(s) = chars.next() {
                    match s {
                        '\\' => {
                            chars.next();
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for s in chars.by_ref() {
                    if prev == '*' && s == '/' {
                        break;
                    }
                    prev = s;
                }
            }
            '/' if chars.peek() == Some(&'/') => break,
            '{' | '(' => delta += 1,
            '}' | ')' => delta -= 1,
            _ => {}
        }
    }
    delta
}
