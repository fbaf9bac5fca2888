//! Literal removal of previously generated lines.
//!
//! Matching is on trimmed text, so re-indentation by an editor does not hide a
//! fragment, but any other change to the generated text does.

use crate::document::Document;
use pbxpatch_types::isa::Isa;

/// Remove every contiguous run of lines matching `fragment`.
///
/// Returns the number of lines removed.
pub fn remove_fragment(doc: &mut Document, fragment: &[String]) -> usize {
    if fragment.is_empty() {
        return 0;
    }

    let mut removed = 0;
    let mut i = 0;
    while i + fragment.len() <= doc.len() {
        let window = &doc.lines()[i..i + fragment.len()];
        let matches = window
            .iter()
            .zip(fragment)
            .all(|(line, wanted)| line.trim() == wanted.trim());
        if matches {
            removed += doc.remove_lines(i..i + fragment.len());
        } else {
            i += 1;
        }
    }
    removed
}

/// Remove an empty `isa` section (adjacent begin/end markers) together with
/// one neighbouring blank line, preferring the one before it.
pub fn remove_empty_section(doc: &mut Document, isa: &Isa) -> usize {
    let begin = isa.begin_marker();
    let end = isa.end_marker();
    let lines = doc.lines();

    let Some(at) = (0..lines.len().saturating_sub(1))
        .find(|&i| lines[i].trim() == begin && lines[i + 1].trim() == end)
    else {
        return 0;
    };

    let is_blank = |i: usize| lines.get(i).is_some_and(|l| l.trim().is_empty());
    let range = if at > 0 && is_blank(at - 1) {
        at - 1..at + 2
    } else if is_blank(at + 2) {
        at..at + 3
    } else {
        at..at + 2
    };
    doc.remove_lines(range)
}
