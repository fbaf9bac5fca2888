//! Clap-free settings for the migration pipeline.

use camino::Utf8PathBuf;
use pbxpatch_types::integration::PackageIntegration;

pub const DEFAULT_BACKUP_SUFFIX: &str = ".pbxpatch.bak";

#[derive(Debug, Clone)]
pub struct MigrateSettings {
    /// The `project.pbxproj` to migrate.
    pub project: Utf8PathBuf,
    pub integration: PackageIntegration,

    // Behaviour
    pub undo: bool,
    pub dry_run: bool,

    // Backups
    pub backup_suffix: String,
}

impl Default for MigrateSettings {
    fn default() -> Self {
        Self {
            project: Utf8PathBuf::from("ios/Runner.xcodeproj/project.pbxproj"),
            integration: PackageIntegration::default(),
            undo: false,
            dry_run: false,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

impl MigrateSettings {
    /// Sibling path the original is copied to before a write.
    pub fn backup_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{}{}", self.project, self.backup_suffix))
    }
}
