mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::ConfigMerger;
use fs_err as fs;
use pbxpatch_core::adapters::FsDocumentStore;
use pbxpatch_core::settings::MigrateSettings;
use pbxpatch_core::{
    MigrateError, MigrationReport, MigrationStatus, check, describe_steps, run_migration,
};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit code of `check` when steps are still pending.
const EXIT_PENDING: u8 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "pbxpatch",
    version,
    about = "Idempotent Swift package integration for Xcode project descriptors."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add (or with --undo, remove) the package integration.
    Migrate(MigrateArgs),
    /// Report which migration steps are still pending (exit 3 if any).
    Check(CheckArgs),
    /// List the migration steps in application order.
    Steps(StepsArgs),
}

#[derive(Debug, clap::Args)]
struct ProjectArgs {
    /// The project.pbxproj to operate on.
    #[arg(long, default_value = "ios/Runner.xcodeproj/project.pbxproj")]
    project: Utf8PathBuf,

    /// Name of the native target that links the package product.
    #[arg(long)]
    target: Option<String>,

    /// Config file (default: ./pbxpatch.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct MigrateArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Remove previously inserted fragments instead of adding them.
    #[arg(long, default_value_t = false)]
    undo: bool,

    /// Print the patch without writing or backing up.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Write the JSON migration report to this path.
    #[arg(long)]
    report: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct CheckArgs {
    #[command(flatten)]
    project: ProjectArgs,
}

#[derive(Debug, Parser)]
struct StepsArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Config file (default: ./pbxpatch.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match real_main() {
        Ok(code) => code,
        Err(e) => report_error(&e),
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Migrate(args) => cmd_migrate(args),
        Command::Check(args) => cmd_check(args),
        Command::Steps(args) => cmd_steps(args),
    }
}

fn report_error(e: &anyhow::Error) -> ExitCode {
    debug!("{:?}", e);
    match e.downcast_ref::<MigrateError>() {
        Some(err) => {
            eprintln!("error: {err}");
            eprintln!("hint: {}", err.recovery_hint());
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
        None => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn settings_for(args: &ProjectArgs) -> anyhow::Result<MigrateSettings> {
    let file_config = config::load_or_default(args.config.as_deref(), Utf8Path::new("."))
        .context("load pbxpatch.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_migrate_args(args.target.as_deref());
    debug!(
        "merged config: target={}, backup_suffix={}",
        merged.integration.target_name, merged.backup_suffix
    );

    Ok(MigrateSettings {
        project: args.project.clone(),
        integration: merged.integration,
        backup_suffix: merged.backup_suffix,
        ..MigrateSettings::default()
    })
}

fn cmd_migrate(args: MigrateArgs) -> anyhow::Result<ExitCode> {
    let settings = MigrateSettings {
        undo: args.undo,
        dry_run: args.dry_run,
        ..settings_for(&args.project)?
    };

    let outcome = run_migration(&settings, &FsDocumentStore)?;
    let report = &outcome.report;

    if let Some(path) = &args.report {
        write_report(path, report)?;
    }

    if report.status == MigrationStatus::DryRun {
        print!("{}", outcome.patch);
    }
    println!("{}", summary_line(report));
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<ExitCode> {
    let settings = settings_for(&args.project)?;
    let pending = check(&settings, &FsDocumentStore)?;

    if pending.is_empty() {
        println!("{}: migrated", settings.project);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}: {} step(s) pending", settings.project, pending.len());
    for key in &pending {
        println!("  - {}", key);
    }
    Ok(ExitCode::from(EXIT_PENDING))
}

fn cmd_steps(args: StepsArgs) -> anyhow::Result<ExitCode> {
    let file_config = config::load_or_default(args.config.as_deref(), Utf8Path::new("."))
        .context("load pbxpatch.toml config")?;
    let steps = describe_steps(&file_config.integration);

    match args.format {
        OutputFormat::Text => {
            println!("Migration steps:\n");
            println!("  {:<28} DESCRIPTION", "KEY");
            println!("  {:<28} -----------", "---");
            for (key, description) in &steps {
                println!("  {:<28} {}", key, description);
            }
            println!();
            println!("Use 'pbxpatch check' to see which steps are pending.");
        }
        OutputFormat::Json => {
            let steps: Vec<_> = steps
                .iter()
                .map(|(key, description)| {
                    serde_json::json!({
                        "key": key,
                        "description": description,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&steps)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn write_report(path: &Utf8Path, report: &MigrationReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent))?;
    }
    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    fs::write(path, format!("{json}\n")).with_context(|| format!("write {}", path))?;
    debug!(%path, "report written");
    Ok(())
}

fn summary_line(report: &MigrationReport) -> String {
    let steps = report.applied_steps().count();
    match report.status {
        MigrationStatus::NoOp => format!("{}: nothing to do", report.path),
        MigrationStatus::DryRun => format!(
            "{}: dry run, {} step(s) would change {} line(s)",
            report.path,
            steps,
            report.lines_changed()
        ),
        MigrationStatus::Migrated => format!(
            "{}: migrated ({} step(s), backup at {})",
            report.path,
            steps,
            report.backup_path.as_deref().unwrap_or("-")
        ),
        MigrationStatus::Undone => format!(
            "{}: undone ({} step(s), backup at {})",
            report.path,
            steps,
            report.backup_path.as_deref().unwrap_or("-")
        ),
    }
}
