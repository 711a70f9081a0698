//! Apply command implementation
//!
//! Builds the engine from the working directory's layout (config file,
//! manifest directory, registry directory, group ledger) and applies one
//! batch of added and removed paths.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use serde::Deserialize;
use tracing::debug;

use bank_fs::AssetPath;
use bank_groups::GroupLedger;
use bank_manifest::TomlManifestSource;
use bank_registry::{BankRecord, RecordStore};
use bank_sync::{BatchReport, Severity, SyncConfig, SyncEngine};

use crate::error::{CliError, Result};

/// Engine configuration, read from the working directory when present.
pub const CONFIG_PATH: &str = "bankreg.toml";

/// Path lists as emitted by the audio toolchain's post-generation step.
#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

/// Load the engine configuration, falling back to defaults when the
/// working directory carries no config file.
pub fn load_config(root: &Path) -> Result<SyncConfig> {
    let path = root.join(CONFIG_PATH);
    if !path.exists() {
        return Ok(SyncConfig::default());
    }
    let text = fs::read_to_string(&path)?;
    Ok(SyncConfig::parse(&text)?)
}

/// Wire up an engine over the stores rooted at `root`.
pub fn build_engine(root: &Path, config: SyncConfig) -> Result<SyncEngine> {
    let records = RecordStore::open(root.join(&config.registry_dir))?;
    let manifests = TomlManifestSource::new(root.join(&config.manifest_dir));
    let ledger = GroupLedger::open(root.join(&config.group_ledger))?;

    Ok(SyncEngine::new(config, records, Arc::new(manifests))
        .with_group_store(Arc::new(ledger))
        .with_init_observer(Box::new(|record: &BankRecord| {
            debug!(bank = %record.name, "initialization bank updated");
        })))
}

/// Run the apply command
pub fn run_apply(
    root: &Path,
    added: &[String],
    removed: &[String],
    delta: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut added: Vec<AssetPath> = added.iter().map(AssetPath::new).collect();
    let mut removed: Vec<AssetPath> = removed.iter().map(AssetPath::new).collect();

    if let Some(path) = delta {
        let delta: Delta = serde_json::from_str(&fs::read_to_string(path)?)?;
        added.extend(delta.added.iter().map(AssetPath::new));
        removed.extend(delta.removed.iter().map(AssetPath::new));
    }

    if added.is_empty() && removed.is_empty() {
        return Err(CliError::user(
            "Nothing to apply; pass --added, --removed, or --delta",
        ));
    }

    let config = load_config(root)?;
    let mut engine = build_engine(root, config)?;
    let report = engine.apply(&added, &removed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.success() {
        Ok(())
    } else {
        Err(CliError::user("Batch completed with errors"))
    }
}

fn print_report(report: &BatchReport) {
    if report.success() {
        println!("{} Batch {} applied:", "OK".green().bold(), report.batch_id);
    } else {
        println!(
            "{} Batch {} completed with errors:",
            "ERROR".red().bold(),
            report.batch_id
        );
    }
    println!(
        "   {} banks added, {} media updated",
        report.banks_added, report.media_added
    );
    println!(
        "   {} banks removed, {} media removed",
        report.banks_removed, report.media_removed
    );
    println!(
        "   {} files grouped, {} records flushed",
        report.grouped, report.records_flushed
    );

    if !report.diagnostics.is_empty() {
        println!();
        for diagnostic in &report.diagnostics {
            let tag = match diagnostic.severity {
                Severity::Warning => "warn".yellow().bold(),
                Severity::Error => "error".red().bold(),
            };
            println!("   {} {}", tag, diagnostic.message);
        }
    }
}
