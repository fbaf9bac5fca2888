//! Shared DTOs for the pbxpatch workspace.
//!
//! # Design constraints
//! - [`record`] is the read-only decision view of a project descriptor. It is
//!   derived from the text and never written back.
//! - [`report`] types are intended to be serialized to disk.
//! - Prefer adding optional fields over changing semantics.

pub mod integration;
pub mod isa;
pub mod record;
pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const PBXPATCH_REPORT_V1: &str = "pbxpatch.report.v1";
}
