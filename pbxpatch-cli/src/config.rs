//! `pbxpatch.toml`: which package to wire into which target, and where the
//! backup copy goes.
//!
//! The file is optional. `--config` names one explicitly; otherwise the
//! working directory is searched. Command-line flags win over the file.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pbxpatch_core::settings::DEFAULT_BACKUP_SUFFIX;
use pbxpatch_types::integration::PackageIntegration;
use serde::Deserialize;
use tracing::debug;

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "pbxpatch.toml";

/// Parsed `pbxpatch.toml`. Missing tables and keys take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PbxpatchConfig {
    /// Literals describing the package to integrate.
    pub integration: PackageIntegration,

    /// Backup settings.
    pub backups: BackupsConfig,
}

/// Backups section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupsConfig {
    /// Suffix appended to the project path for the backup copy.
    pub suffix: String,
}

impl Default for BackupsConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

/// `dir/pbxpatch.toml`, if it is there.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    let found = path.is_file();
    debug!(%path, found, "config lookup");
    found.then_some(path)
}

/// Read `path` and parse it; errors name the file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<PbxpatchConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse TOML text into a [`PbxpatchConfig`].
pub fn parse_config(contents: &str) -> anyhow::Result<PbxpatchConfig> {
    toml::from_str(contents).context("invalid TOML")
}

/// Load an explicit config file, or discover one in `dir`, or fall back to
/// defaults.
pub fn load_or_default(
    explicit: Option<&Utf8Path>,
    dir: &Utf8Path,
) -> anyhow::Result<PbxpatchConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(PbxpatchConfig::default()),
    }
}

/// Settings a command runs with once flags are applied over the file.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
    pub integration: PackageIntegration,
    pub backup_suffix: String,
}

/// Applies command-line overrides to a loaded [`PbxpatchConfig`].
pub struct ConfigMerger {
    config: PbxpatchConfig,
}

impl ConfigMerger {
    pub fn new(config: PbxpatchConfig) -> Self {
        Self { config }
    }

    /// Merge with migrate/check command CLI arguments.
    ///
    /// `--target` replaces the configured target name when given.
    pub fn merge_migrate_args(self, cli_target: Option<&str>) -> MergedConfig {
        let mut integration = self.config.integration;
        if let Some(target) = cli_target {
            integration.target_name = target.to_string();
        }

        MergedConfig {
            integration,
            backup_suffix: self.config.backups.suffix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbxpatch_types::record::ObjectId;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[integration]
target_name = "App"
product_name = "AppPackage"
package_path = "Packages/AppPackage"
build_file_id = "AAAAAAAAAAAAAAAAAAAAAA01"
product_dependency_id = "AAAAAAAAAAAAAAAAAAAAAA02"
package_reference_id = "AAAAAAAAAAAAAAAAAAAAAA03"
frameworks_phase_id = "AAAAAAAAAAAAAAAAAAAAAA04"

[backups]
suffix = ".orig"
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(config.integration.target_name, "App");
        assert_eq!(config.integration.product_name, "AppPackage");
        assert_eq!(config.integration.package_path, "Packages/AppPackage");
        assert_eq!(
            config.integration.build_file_id,
            ObjectId::from("AAAAAAAAAAAAAAAAAAAAAA01")
        );
        assert_eq!(
            config.integration.frameworks_phase_id,
            ObjectId::from("AAAAAAAAAAAAAAAAAAAAAA04")
        );
        assert_eq!(config.backups.suffix, ".orig");
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let contents = r#"
[integration]
target_name = "App"
"#;

        let config = parse_config(contents).unwrap();
        let defaults = PackageIntegration::default();
        assert_eq!(config.integration.target_name, "App");
        assert_eq!(config.integration.product_name, defaults.product_name);
        assert_eq!(config.integration.build_file_id, defaults.build_file_id);
        assert_eq!(config.backups.suffix, DEFAULT_BACKUP_SUFFIX);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.integration, PackageIntegration::default());
        assert_eq!(config.backups.suffix, DEFAULT_BACKUP_SUFFIX);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = parse_config("[integration").unwrap_err();
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn test_merge_cli_target_overrides() {
        let config = parse_config("[integration]\ntarget_name = \"App\"\n").unwrap();
        let merged = ConfigMerger::new(config).merge_migrate_args(Some("Widget"));
        assert_eq!(merged.integration.target_name, "Widget");
    }

    #[test]
    fn test_merge_config_used_without_cli_target() {
        let config = parse_config("[integration]\ntarget_name = \"App\"\n").unwrap();
        let merged = ConfigMerger::new(config).merge_migrate_args(None);
        assert_eq!(merged.integration.target_name, "App");
        assert_eq!(merged.backup_suffix, DEFAULT_BACKUP_SUFFIX);
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
    }

    #[test]
    fn test_explicit_config_wins_over_discovery() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        std::fs::write(
            root.join(CONFIG_FILE_NAME),
            "[integration]\ntarget_name = \"Discovered\"\n",
        )
        .expect("write config");
        let explicit = root.join("other.toml");
        std::fs::write(&explicit, "[integration]\ntarget_name = \"Explicit\"\n")
            .expect("write config");

        let cfg = load_or_default(Some(&explicit), &root).expect("load");
        assert_eq!(cfg.integration.target_name, "Explicit");
        let cfg = load_or_default(None, &root).expect("load");
        assert_eq!(cfg.integration.target_name, "Discovered");
    }

    #[test]
    fn test_load_or_default_returns_default_when_missing() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let cfg = load_or_default(None, &root).expect("load default");
        assert_eq!(cfg.integration, PackageIntegration::default());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let err = load_or_default(Some(&root.join("absent.toml")), &root).unwrap_err();
        assert!(format!("{err:#}").contains("absent.toml"));
    }
}
