//! Edit engine for pbxpatch.
//!
//! Responsibilities:
//! - Parse a descriptor into a line view ([`Document`]) and a derived decision
//!   view ([`Snapshot`]) that must agree on every record identifier.
//! - Locate sections and the lines owned by a record.
//! - Insert records and references without reordering or rewriting any
//!   existing line.
//! - Remove previously generated literal fragments (undo).
//! - Render a unified diff preview.

mod decode;
mod document;
mod error;
mod insert;
mod locator;
mod undo;

pub use decode::{GraphDecoder, OpenStepDecoder, graph_from_tree};
pub use document::{Document, Snapshot};
pub use error::{EditError, EditResult};
pub use insert::{
    Placement, indentation, insert_record, insert_reference, placement_for, reference_text,
};
pub use locator::{Declaration, LineRange, Section};
pub use undo::{remove_empty_section, remove_fragment};

use diffy::PatchFormatter;
use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Unified diff of one file, or an empty string when nothing changed.
pub fn render_patch(path: &str, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

    let patch = diffy::create_patch(before, after);
    let formatter = PatchFormatter::new();
    let body = formatter.fmt_patch(&patch).to_string();
    // diffy repeats its own `---`/`+++` header; keep only the hunks.
    let hunks = body.find("@@").map_or(body.as_str(), |i| &body[i..]);
    out.push_str(hunks);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_is_empty_without_changes() {
        assert_eq!(render_patch("p.pbxproj", "a\n", "a\n"), "");
    }

    #[test]
    fn patch_shows_inserted_lines_once() {
        let patch = render_patch("p.pbxproj", "a\nc\n", "a\nb\nc\n");
        assert!(patch.starts_with("diff --git a/p.pbxproj b/p.pbxproj\n"));
        assert!(patch.contains("+b\n"));
        assert_eq!(patch.matches("+++ ").count(), 1);
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
