//! Embeddable core library for pbxpatch.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking into
//! a build tool or other host process.
//!
//! # Port traits
//!
//! All I/O is abstracted behind [`DocumentStore`](ports::DocumentStore) in
//! [`ports`]. The [`adapters`] module provides the filesystem-backed and
//! in-memory implementations.
//!
//! # Entry points
//!
//! - [`run_migration`](pipeline::run_migration): migrate or undo, with backup
//!   and post-write verification
//! - [`check`](pipeline::check): list pending steps without writing
//! - [`migrate`](pipeline::migrate): filesystem shortcut with default settings

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pipeline::{
    MigrateError, MigrationOutcome, check, describe_steps, migrate, run_migration,
};

// Re-export the shared types so embedders don't need pbxpatch-types directly.
pub use pbxpatch_types::integration::PackageIntegration;
pub use pbxpatch_types::report::{MigrationReport, MigrationState, MigrationStatus};
