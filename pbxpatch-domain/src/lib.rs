//! Domain logic: the ordered migration steps and the engine that runs them.
//!
//! This crate owns *what* has to be present for a package to be integrated
//! and in which order it is added. It does not own *where* lines go or how
//! they are located; that's the `pbxpatch-edit` crate.

mod migrator;
mod steps;

pub use migrator::Migrator;
pub use steps::{MigrationStep, builtin_steps};
