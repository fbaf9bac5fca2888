//! Migrate, undo and check pipelines.
//!
//! These entry points are I/O-agnostic: every read, write and backup copy
//! goes through the [`DocumentStore`] port. The descriptor is touched at most
//! twice per run (backup copy, then write), always after every step has
//! succeeded in memory.

use crate::adapters::FsDocumentStore;
use crate::ports::DocumentStore;
use crate::settings::MigrateSettings;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use pbxpatch_domain::Migrator;
use pbxpatch_edit::{Document, EditError, render_patch, sha256_hex};
use pbxpatch_types::integration::PackageIntegration;
use pbxpatch_types::report::{MigrationReport, MigrationState, MigrationStatus};
use tracing::{debug, info, warn};

/// Error type for pipeline results. Exit code 2 = the document or its
/// migration cannot be trusted, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error("project file not found: {path}")]
    DocumentNotFound { path: Utf8PathBuf },

    #[error("invalid integration identifiers: {0}")]
    InvalidIdentifiers(String),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("migration of {path} did not verify; still pending: {}", pending.join(", "))]
    VerificationFailed {
        path: Utf8PathBuf,
        /// Where the original was copied, when anything was written.
        backup: Option<Utf8PathBuf>,
        pending: Vec<String>,
    },

    #[error("{0:#}")]
    Io(#[from] anyhow::Error),
}

impl MigrateError {
    pub fn exit_code(&self) -> i32 {
        match self {
            MigrateError::Io(_) => 1,
            _ => 2,
        }
    }

    /// What the user can do next.
    pub fn recovery_hint(&self) -> String {
        match self {
            MigrateError::DocumentNotFound { .. } => {
                "point --project at an existing project.pbxproj".to_string()
            }
            MigrateError::InvalidIdentifiers(_) => {
                "fix the [integration] identifiers in pbxpatch.toml".to_string()
            }
            MigrateError::Edit(err) => err.manual_fallback(),
            MigrateError::VerificationFailed {
                backup: Some(backup),
                ..
            } => format!("restore the original from {backup}"),
            MigrateError::VerificationFailed { backup: None, .. } => {
                "nothing was written; add the pending entries manually".to_string()
            }
            MigrateError::Io(_) => "check the path and its permissions, then re-run".to_string(),
        }
    }
}

/// Outcome of `run_migration`.
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub report: MigrationReport,
    /// Unified diff of the change; empty for a no-op.
    pub patch: String,
}

/// Run the migration (or its undo) against `settings.project`.
///
/// Protocol: validate identifiers, read, parse, decide, apply every pending
/// step in memory, re-parse the result, copy the original to the backup
/// path, write, then re-read the written file and confirm every step holds.
/// An already-migrated document is never rewritten.
pub fn run_migration(
    settings: &MigrateSettings,
    store: &dyn DocumentStore,
) -> Result<MigrationOutcome, MigrateError> {
    let result = if settings.undo {
        run_undo(settings, store)
    } else {
        run_forward(settings, store)
    };
    if let Err(err) = &result {
        debug!(state = ?MigrationState::Failed, error = %err, "migration failed");
    }
    result
}

/// Keys of the steps that are still pending. Never writes.
pub fn check(
    settings: &MigrateSettings,
    store: &dyn DocumentStore,
) -> Result<Vec<String>, MigrateError> {
    let (original, _) = load(settings, store)?;
    let migrator = Migrator::new(&settings.integration);
    let pending = migrator.pending(&Document::from_text(&original))?;
    Ok(pending.into_iter().map(str::to_string).collect())
}

/// Step keys and descriptions, in application order.
pub fn describe_steps(integration: &PackageIntegration) -> Vec<(&'static str, String)> {
    Migrator::new(integration)
        .steps()
        .iter()
        .map(|s| (s.key(), s.describe()))
        .collect()
}

/// Filesystem-backed entry point with default backup settings.
pub fn migrate(
    path: &Utf8Path,
    integration: &PackageIntegration,
    undo: bool,
) -> Result<MigrationOutcome, MigrateError> {
    let settings = MigrateSettings {
        project: path.to_owned(),
        integration: integration.clone(),
        undo,
        ..MigrateSettings::default()
    };
    run_migration(&settings, &FsDocumentStore)
}

fn load(
    settings: &MigrateSettings,
    store: &dyn DocumentStore,
) -> Result<(String, MigrationReport), MigrateError> {
    settings
        .integration
        .validate()
        .map_err(MigrateError::InvalidIdentifiers)?;

    let path = &settings.project;
    if !store.exists(path) {
        return Err(MigrateError::DocumentNotFound { path: path.clone() });
    }

    let original = store.read_to_string(path)?;
    let report = MigrationReport::new(path.as_str(), sha256_hex(original.as_bytes()));
    Ok((original, report))
}

fn advance(report: &mut MigrationReport, state: MigrationState) {
    debug!(from = ?report.state, to = ?state, "state transition");
    report.state = state;
}

fn finish(
    mut report: MigrationReport,
    status: MigrationStatus,
    patch: String,
) -> MigrationOutcome {
    report.status = status;
    report.ended_at = Some(Utc::now());
    MigrationOutcome { report, patch }
}

fn run_forward(
    settings: &MigrateSettings,
    store: &dyn DocumentStore,
) -> Result<MigrationOutcome, MigrateError> {
    let (original, mut report) = load(settings, store)?;
    let path = &settings.project;
    let migrator = Migrator::new(&settings.integration);

    let mut doc = Document::from_text(&original);
    let pending = migrator.pending(&doc)?;
    advance(&mut report, MigrationState::Parsed);

    if pending.is_empty() {
        info!(%path, "already migrated");
        advance(&mut report, MigrationState::Validated);
        report.sha256_after = Some(report.sha256_before.clone());
        return Ok(finish(report, MigrationStatus::NoOp, String::new()));
    }
    debug!(?pending, "pending steps");

    report.steps = migrator.apply(&mut doc)?;
    advance(&mut report, MigrationState::StepsApplied);

    let updated = doc.to_text();
    advance(&mut report, MigrationState::Reserialized);

    let still_pending = migrator.pending(&Document::from_text(&updated))?;
    if !still_pending.is_empty() {
        warn!(%path, ?still_pending, "migrated text does not satisfy every step");
        return Err(MigrateError::VerificationFailed {
            path: path.clone(),
            backup: None,
            pending: still_pending.into_iter().map(str::to_string).collect(),
        });
    }
    advance(&mut report, MigrationState::Validated);

    let patch = render_patch(path.as_str(), &original, &updated);
    if settings.dry_run {
        info!(%path, lines = report.lines_changed(), "dry run; nothing written");
        report.sha256_after = Some(sha256_hex(updated.as_bytes()));
        return Ok(finish(report, MigrationStatus::DryRun, patch));
    }

    let backup = write_with_backup(settings, store, &updated, &mut report)?;

    let written = store.read_to_string(path)?;
    let pending: Vec<String> = match migrator.pending(&Document::from_text(&written)) {
        Ok(pending) => pending.into_iter().map(str::to_string).collect(),
        Err(err) => {
            warn!(%path, error = %err, "written file no longer parses");
            migrator
                .steps()
                .iter()
                .map(|s| s.key().to_string())
                .collect()
        }
    };
    if !pending.is_empty() {
        warn!(%path, %backup, ?pending, "verification failed after write");
        return Err(MigrateError::VerificationFailed {
            path: path.clone(),
            backup: Some(backup),
            pending,
        });
    }

    report.sha256_after = Some(sha256_hex(written.as_bytes()));
    info!(%path, steps = report.applied_steps().count(), "migrated");
    Ok(finish(report, MigrationStatus::Migrated, patch))
}

/// Literal removal of previously inserted fragments. Best effort: the result
/// is not re-validated.
fn run_undo(
    settings: &MigrateSettings,
    store: &dyn DocumentStore,
) -> Result<MigrationOutcome, MigrateError> {
    let (original, mut report) = load(settings, store)?;
    let path = &settings.project;
    let migrator = Migrator::new(&settings.integration);

    let mut doc = Document::from_text(&original);
    advance(&mut report, MigrationState::Parsed);

    report.steps = migrator.undo(&mut doc);
    advance(&mut report, MigrationState::StepsApplied);

    let updated = doc.to_text();
    advance(&mut report, MigrationState::Reserialized);

    if updated == original {
        info!(%path, "nothing to undo");
        report.sha256_after = Some(report.sha256_before.clone());
        return Ok(finish(report, MigrationStatus::NoOp, String::new()));
    }

    let patch = render_patch(path.as_str(), &original, &updated);
    report.sha256_after = Some(sha256_hex(updated.as_bytes()));
    if settings.dry_run {
        info!(%path, lines = report.lines_changed(), "dry run; nothing written");
        return Ok(finish(report, MigrationStatus::DryRun, patch));
    }

    write_with_backup(settings, store, &updated, &mut report)?;
    info!(%path, lines = report.lines_changed(), "undone");
    Ok(finish(report, MigrationStatus::Undone, patch))
}

/// Copy the original to the backup path, then write `contents` over it.
fn write_with_backup(
    settings: &MigrateSettings,
    store: &dyn DocumentStore,
    contents: &str,
    report: &mut MigrationReport,
) -> Result<Utf8PathBuf, MigrateError> {
    let path = &settings.project;
    let backup = settings.backup_path();

    store.copy(path, &backup)?;
    info!(%path, %backup, "backup written");
    report.backup_path = Some(backup.to_string());

    store.write(path, contents)?;
    info!(%path, bytes = contents.len(), "project written");
    advance(report, MigrationState::Written);
    Ok(backup)
}
